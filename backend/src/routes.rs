use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, HttpResponseBuilder, web};
use futures::{StreamExt, TryStreamExt};
use log::{error, info, warn};
use serde::Serialize;
use serde_json::json;

use crate::analysis::analysis_service::{AnalysisError, AnalysisService};
use crate::db::result_repository::{ResultRepository, RetrievalError};
use crate::storage::s3_service::{MAX_IMAGE_BYTES, S3Service, StorageError};

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_json(mut builder: HttpResponseBuilder, message: impl Into<String>) -> HttpResponse {
    builder.json(ErrorResponse {
        error: message.into(),
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/upload").route(web::post().to(upload_image)))
        .service(web::resource("/api/results/{result_id}").route(web::get().to(get_result)))
        .service(web::resource("/api/test").route(web::get().to(test_connection)));
}

struct UploadedImage {
    data: Vec<u8>,
    mime_type: String,
}

/// Reads the first non-empty multipart field, stopping as soon as it grows
/// past the size ceiling.
async fn read_upload(payload: &mut Multipart) -> Result<Option<UploadedImage>, Error> {
    while let Some(mut field) = payload.try_next().await? {
        let mime_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            if data.len() + chunk.len() > MAX_IMAGE_BYTES {
                return Err(actix_web::error::ErrorBadRequest(StorageError::FileTooLarge));
            }
            data.extend_from_slice(&chunk);
        }

        if !data.is_empty() {
            return Ok(Some(UploadedImage { data, mime_type }));
        }
    }
    Ok(None)
}

async fn upload_image(
    service: web::Data<AnalysisService>,
    mut payload: Multipart,
) -> HttpResponse {
    let upload = match read_upload(&mut payload).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return error_json(HttpResponse::BadRequest(), "No file uploaded"),
        Err(e) => {
            warn!("Rejected upload: {}", e);
            return error_json(HttpResponse::BadRequest(), e.to_string());
        }
    };

    if let Err(e) = S3Service::validate_upload(&upload.data, &upload.mime_type) {
        warn!("Rejected upload of type '{}': {}", upload.mime_type, e);
        return error_json(HttpResponse::BadRequest(), e.to_string());
    }

    match service.analyze(&upload.data, &upload.mime_type).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            error!("Upload failed: {}", e);
            match &e {
                AnalysisError::NoSpecificLabels => error_json(HttpResponse::BadRequest(), e.to_string()),
                AnalysisError::Storage(_) | AnalysisError::Detector(_) => {
                    error_json(HttpResponse::BadGateway(), e.to_string())
                }
                AnalysisError::Persistence(_) => {
                    error_json(HttpResponse::InternalServerError(), "Failed to save analysis result")
                }
            }
        }
    }
}

async fn get_result(results: web::Data<ResultRepository>, path: web::Path<String>) -> HttpResponse {
    let result_id = path.into_inner();
    match results.fetch(&result_id).await {
        Ok(result) => {
            info!("Retrieved result: {}", result_id);
            HttpResponse::Ok().json(result)
        }
        Err(e @ RetrievalError::InvalidIdentifier(_)) => {
            warn!("Invalid result id requested: {}", result_id);
            error_json(HttpResponse::BadRequest(), e.to_string())
        }
        Err(RetrievalError::NotFound(_)) => error_json(HttpResponse::NotFound(), "Result not found"),
        Err(RetrievalError::Persistence(e)) => {
            error!("Failed to get result {}: {}", result_id, e);
            error_json(HttpResponse::InternalServerError(), "Failed to retrieve result")
        }
    }
}

async fn test_connection() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "message": "Backend is running"
    }))
}

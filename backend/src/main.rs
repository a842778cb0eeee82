use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use animal_lens::analysis::analysis_service::AnalysisService;
use animal_lens::classify::rules::LabelRules;
use animal_lens::config::{self, AppConfig};
use animal_lens::db;
use animal_lens::db::migrate;
use animal_lens::db::result_repository::ResultRepository;
use animal_lens::detection::rekognition_service::RekognitionService;
use animal_lens::routes::configure_routes;
use animal_lens::storage::s3_service::S3Service;
use aws_config::BehaviorVersion;
use aws_sdk_rekognition::Client as RekognitionClient;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::Region;
use std::sync::Arc;

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    log::error!("{}: {}", context, e);
    std::io::Error::other(format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    config::load_dotenv();

    let app_config =
        AppConfig::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    let rules = LabelRules::load_or_default(app_config.label_rules_path.as_deref())
        .map_err(|e| startup_error("Failed to load label rules", e))?;
    log::info!(
        "Label rules: floor {}%, {} generic labels, {} preferred labels",
        rules.confidence_floor,
        rules.generic_labels.len(),
        rules.priority_labels.len()
    );
    if rules.floor_is_shadowed_by(app_config.detector.min_confidence) {
        log::warn!(
            "Label floor {}% is below DETECTOR_MIN_CONFIDENCE {}%, so the detector minimum applies",
            rules.confidence_floor,
            app_config.detector.min_confidence
        );
    }

    let pool = db::connect(&app_config.database_url, app_config.db_max_connections)
        .await
        .map_err(|e| startup_error("Failed to connect to database", e))?;
    migrate::run_migrations(&pool)
        .await
        .map_err(|e| startup_error("Failed to run migrations", e))?;

    if let Some(seed_path) = &app_config.catalog_seed_path {
        let animals = migrate::load_catalog_seed(seed_path)
            .map_err(|e| startup_error("Failed to load catalog seed", e))?;
        migrate::seed_catalog(&pool, &animals)
            .await
            .map_err(|e| startup_error("Failed to seed catalog", e))?;
    }

    // Initialize AWS configuration
    let aws_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(app_config.aws_region.clone()))
        .load()
        .await;

    let s3_service = S3Service::new(
        S3Client::new(&aws_config),
        app_config.s3_bucket.clone(),
        app_config.aws_region.clone(),
    );
    let rekognition_service =
        RekognitionService::new(RekognitionClient::new(&aws_config), &app_config.detector);

    let result_repo = ResultRepository::new(pool);
    let analysis_service = AnalysisService::new(
        Arc::new(s3_service),
        Arc::new(rekognition_service),
        result_repo.clone(),
        rules,
        app_config.detector.timeout,
    );

    let frontend_url = app_config.frontend_url.clone();
    match &frontend_url {
        Some(origin) => log::info!("CORS restricted to {}", origin),
        None => log::warn!("FRONTEND_URL not set, allowing any origin"),
    }

    let bind_address = app_config.bind_address();
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let cors = match &frontend_url {
            Some(origin) => Cors::default().allowed_origin(origin),
            None => Cors::default().allow_any_origin(),
        };

        App::new()
            .wrap(
                cors.allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(web::Data::new(analysis_service.clone()))
            .app_data(web::Data::new(result_repo.clone()))
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use sha2::{Digest, Sha256};
use shared::ImageRef;

/// Largest accepted upload, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("S3 error: {0}")]
    S3(String),
    #[error("Invalid file type")]
    InvalidFormat,
    #[error("File too large")]
    FileTooLarge,
    #[error("Invalid image file")]
    InvalidImage,
}

/// Receives uploaded image bytes and hands back a stable reference to them.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn store(&self, image_data: &[u8], mime_type: &str) -> Result<ImageRef, StorageError>;
}

#[derive(Clone)]
pub struct S3Service {
    client: Client,
    bucket_name: String,
    region: String,
}

impl S3Service {
    pub fn new(client: Client, bucket_name: String, region: String) -> Self {
        Self {
            client,
            bucket_name,
            region,
        }
    }

    pub fn calculate_image_hash(image_data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(image_data);
        hex::encode(hasher.finalize())
    }

    pub fn generate_s3_key(image_hash: &str, file_extension: &str) -> String {
        format!("images/{}.{}", image_hash, file_extension)
    }

    pub fn object_url(bucket: &str, region: &str, key: &str) -> String {
        format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
    }

    pub fn extract_file_extension(mime_type: &str) -> Result<&'static str, StorageError> {
        match mime_type {
            "image/jpeg" => Ok("jpg"),
            "image/png" => Ok("png"),
            "image/webp" => Ok("webp"),
            "image/gif" => Ok("gif"),
            _ => Err(StorageError::InvalidFormat),
        }
    }

    pub fn validate_image_size(image_data: &[u8]) -> Result<(), StorageError> {
        if image_data.len() > MAX_IMAGE_BYTES {
            return Err(StorageError::FileTooLarge);
        }
        Ok(())
    }

    /// Checks an upload before anything is stored: size ceiling, accepted
    /// MIME type, and that the bytes really decode as an image.
    pub fn validate_upload(image_data: &[u8], mime_type: &str) -> Result<(), StorageError> {
        S3Service::validate_image_size(image_data)?;
        S3Service::extract_file_extension(mime_type)?;
        image::load_from_memory(image_data).map_err(|e| {
            log::warn!("Rejected upload that does not decode as an image: {}", e);
            StorageError::InvalidImage
        })?;
        Ok(())
    }

    pub async fn upload_image(
        &self,
        image_data: &[u8],
        s3_key: &str,
        mime_type: &str,
    ) -> Result<(), StorageError> {
        S3Service::validate_image_size(image_data)?;

        let body = ByteStream::from(image_data.to_vec());

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(s3_key)
            .body(body)
            .content_type(mime_type)
            .send()
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl BlobStore for S3Service {
    async fn store(&self, image_data: &[u8], mime_type: &str) -> Result<ImageRef, StorageError> {
        let file_extension = S3Service::extract_file_extension(mime_type)?;
        let image_hash = S3Service::calculate_image_hash(image_data);
        let s3_key = S3Service::generate_s3_key(&image_hash, file_extension);

        log::info!("Uploading {} bytes to s3://{}/{}", image_data.len(), self.bucket_name, s3_key);
        self.upload_image(image_data, &s3_key, mime_type).await?;

        let url = S3Service::object_url(&self.bucket_name, &self.region, &s3_key);
        log::info!("Successfully uploaded to S3: {}", url);
        Ok(ImageRef {
            bucket: self.bucket_name.clone(),
            key: s3_key,
            url,
        })
    }
}

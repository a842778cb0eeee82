#![allow(dead_code)]

use animal_lens::analysis::analysis_service::AnalysisService;
use animal_lens::classify::models::DetectedLabel;
use animal_lens::classify::rules::LabelRules;
use animal_lens::db;
use animal_lens::db::migrate;
use animal_lens::db::models::NewAnimal;
use animal_lens::db::result_repository::ResultRepository;
use animal_lens::detection::rekognition_service::{DetectorError, LabelDetector};
use animal_lens::storage::s3_service::{BlobStore, S3Service, StorageError};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbImage};
use shared::ImageRef;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const TEST_BUCKET: &str = "test-bucket";

/// Single-connection in-memory database that lives as long as the pool.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    migrate::run_migrations(&pool).await.unwrap();
    pool
}

pub fn animal(name: &str, species: &str) -> NewAnimal {
    NewAnimal {
        name: name.to_string(),
        species: Some(species.to_string()),
        habitat: Some("Domestic".to_string()),
        diet: Some("Omnivore".to_string()),
        description: Some(format!("{} test entry", name)),
    }
}

pub async fn seed(pool: &SqlitePool) {
    migrate::seed_catalog(
        pool,
        &[
            animal("Golden Retriever", "Canis lupus familiaris"),
            animal("Domestic Cat", "Felis catus"),
        ],
    )
    .await
    .unwrap();
}

pub async fn seeded_pool() -> SqlitePool {
    let pool = test_pool().await;
    seed(&pool).await;
    pool
}

/// Seeded database file under `dir`, opened the way the server opens it.
pub async fn seeded_file_pool(dir: &Path, max_connections: u32) -> SqlitePool {
    let url = format!("sqlite://{}", dir.join("lens.db").display());
    let pool = db::connect(&url, max_connections).await.unwrap();
    migrate::run_migrations(&pool).await.unwrap();
    seed(&pool).await;
    pool
}

pub async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

pub fn labels(pairs: &[(&str, f32)]) -> Vec<DetectedLabel> {
    pairs.iter().map(|(n, c)| DetectedLabel::new(*n, *c)).collect()
}

pub fn png_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(8, 8))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

#[derive(Default)]
pub struct FakeBlobStore {
    pub uploads: AtomicUsize,
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn store(&self, image_data: &[u8], mime_type: &str) -> Result<ImageRef, StorageError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        let extension = S3Service::extract_file_extension(mime_type)?;
        let key = S3Service::generate_s3_key(&S3Service::calculate_image_hash(image_data), extension);
        Ok(ImageRef {
            bucket: TEST_BUCKET.to_string(),
            url: S3Service::object_url(TEST_BUCKET, "ap-northeast-2", &key),
            key,
        })
    }
}

pub enum FakeDetector {
    Labels(Vec<DetectedLabel>),
    Failing,
    Slow(Duration),
}

#[async_trait]
impl LabelDetector for FakeDetector {
    async fn detect(&self, _image: &ImageRef) -> Result<Vec<DetectedLabel>, DetectorError> {
        match self {
            FakeDetector::Labels(labels) => Ok(labels.clone()),
            FakeDetector::Failing => Err(DetectorError::Rekognition("access denied".to_string())),
            FakeDetector::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(Vec::new())
            }
        }
    }
}

pub fn service_with(pool: &SqlitePool, detector: FakeDetector, timeout: Duration) -> AnalysisService {
    AnalysisService::new(
        Arc::new(FakeBlobStore::default()),
        Arc::new(detector),
        ResultRepository::new(pool.clone()),
        LabelRules::default(),
        timeout,
    )
}

pub fn service(pool: &SqlitePool, detected: Vec<DetectedLabel>) -> AnalysisService {
    service_with(pool, FakeDetector::Labels(detected), Duration::from_secs(5))
}

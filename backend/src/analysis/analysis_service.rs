use shared::{AnalysisPayload, ImageRef};
use std::sync::Arc;
use std::time::Duration;

use crate::classify::filter::filter_labels;
use crate::classify::models::DetectedLabel;
use crate::classify::resolver::resolve_label;
use crate::classify::router;
use crate::classify::rules::LabelRules;
use crate::db::RepositoryError;
use crate::db::catalog;
use crate::db::result_repository::ResultRepository;
use crate::detection::rekognition_service::{DetectorError, LabelDetector};
use crate::storage::s3_service::{BlobStore, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("No specific animals detected in image")]
    NoSpecificLabels,
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Detector error: {0}")]
    Detector(#[from] DetectorError),
    #[error("Persistence error: {0}")]
    Persistence(#[from] RepositoryError),
}

/// Turns one uploaded image into exactly one persisted classification.
#[derive(Clone)]
pub struct AnalysisService {
    blob_store: Arc<dyn BlobStore>,
    detector: Arc<dyn LabelDetector>,
    results: ResultRepository,
    rules: Arc<LabelRules>,
    detector_timeout: Duration,
}

impl AnalysisService {
    pub fn new(
        blob_store: Arc<dyn BlobStore>,
        detector: Arc<dyn LabelDetector>,
        results: ResultRepository,
        rules: LabelRules,
        detector_timeout: Duration,
    ) -> Self {
        Self {
            blob_store,
            detector,
            results,
            rules: Arc::new(rules),
            detector_timeout,
        }
    }

    pub async fn analyze(
        &self,
        image_data: &[u8],
        mime_type: &str,
    ) -> Result<AnalysisPayload, AnalysisError> {
        log::info!("=== Starting image upload and analysis ===");
        log::info!("Image details - size: {} bytes, type: {}", image_data.len(), mime_type);

        let image = self.blob_store.store(image_data, mime_type).await?;

        log::info!("Starting label detection for {}", image);
        let labels = self.detect(&image).await?;
        log::debug!("Detected labels: {:?}", labels);

        let filtered = filter_labels(&labels, &self.rules);
        log::info!("Filtered specific animal labels: {:?}", filtered);

        let resolved = resolve_label(&filtered, &self.rules).ok_or_else(|| {
            log::warn!("No specific animals detected in {}", image);
            AnalysisError::NoSpecificLabels
        })?;
        log::info!(
            "Selected label '{}' ({:.2}%)",
            resolved.name,
            resolved.confidence
        );

        // The catalog is read-only here, so the lookup stays outside the unit
        // of work and the transaction's first statement is a write.
        let catalog_match = catalog::find_match(self.results.pool(), &resolved.name).await?;
        log::info!(
            "Catalog lookup - '{}' is known: {}",
            resolved.name,
            catalog_match.is_some()
        );

        let outcome = router::route(image, resolved, catalog_match);
        let tx = self.results.begin().await?;
        let payload = self.results.persist(tx, &outcome).await?;

        log::info!("Analysis complete. Result id: {} ({})", payload.id, payload.kind);
        Ok(payload)
    }

    async fn detect(&self, image: &ImageRef) -> Result<Vec<DetectedLabel>, DetectorError> {
        tokio::time::timeout(self.detector_timeout, self.detector.detect(image))
            .await
            .map_err(|_| DetectorError::Timeout(self.detector_timeout.as_secs()))?
    }
}

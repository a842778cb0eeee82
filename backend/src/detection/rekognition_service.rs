use async_trait::async_trait;
use aws_sdk_rekognition::Client;
use aws_sdk_rekognition::types::{Image, Label, S3Object};
use shared::ImageRef;

use crate::classify::models::DetectedLabel;
use crate::config::DetectorSettings;

#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("Rekognition error: {0}")]
    Rekognition(String),
    #[error("Label detection timed out after {0}s")]
    Timeout(u64),
}

/// Returns the raw candidate labels for a stored image. An empty list is a
/// valid answer.
#[async_trait]
pub trait LabelDetector: Send + Sync {
    async fn detect(&self, image: &ImageRef) -> Result<Vec<DetectedLabel>, DetectorError>;
}

#[derive(Clone)]
pub struct RekognitionService {
    client: Client,
    max_labels: i32,
    min_confidence: f32,
}

impl RekognitionService {
    pub fn new(client: Client, settings: &DetectorSettings) -> Self {
        Self {
            client,
            max_labels: settings.max_labels,
            min_confidence: settings.min_confidence,
        }
    }

    fn to_detected(label: &Label) -> Option<DetectedLabel> {
        match (label.name(), label.confidence()) {
            (Some(name), Some(confidence)) => Some(DetectedLabel::new(name, confidence)),
            _ => None,
        }
    }
}

#[async_trait]
impl LabelDetector for RekognitionService {
    async fn detect(&self, image: &ImageRef) -> Result<Vec<DetectedLabel>, DetectorError> {
        let s3_object = S3Object::builder()
            .bucket(&image.bucket)
            .name(&image.key)
            .build();

        let response = self
            .client
            .detect_labels()
            .image(Image::builder().s3_object(s3_object).build())
            .max_labels(self.max_labels)
            .min_confidence(self.min_confidence)
            .send()
            .await
            .map_err(|e| {
                log::error!("Rekognition detect_labels failed for {}: {:?}", image, e);
                DetectorError::Rekognition(e.to_string())
            })?;

        let labels: Vec<DetectedLabel> = response
            .labels()
            .iter()
            .filter_map(RekognitionService::to_detected)
            .collect();

        log::debug!("Rekognition returned {} labels for {}", labels.len(), image);
        Ok(labels)
    }
}

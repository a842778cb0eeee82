use serde::{Deserialize, Serialize};
use shared::ImageRef;

use crate::db::models::CatalogAnimal;

/// One candidate concept reported by the label detector. Confidence is a
/// percentage in `0..=100`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLabel {
    pub name: String,
    pub confidence: f32,
}

impl DetectedLabel {
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }
}

/// The resolved decision for one upload. Created once, persisted, never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct ClassificationOutcome {
    pub image: ImageRef,
    pub label: String,
    pub confidence: f32,
    pub matched_animal: Option<CatalogAnimal>,
}

impl ClassificationOutcome {
    pub fn matched_animal_id(&self) -> Option<i64> {
        self.matched_animal.as_ref().map(|animal| animal.id)
    }
}

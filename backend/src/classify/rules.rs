use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const DEFAULT_CONFIDENCE_FLOOR: f32 = 80.0;

const DEFAULT_GENERIC_LABELS: &[&str] = &[
    "Animal",
    "Mammal",
    "Wildlife",
    "Pet",
    "Fauna",
    "Canine",
    "Carnivore",
    "Feline",
    "Face",
];

// Most specific first: breeds, then the species, then juvenile forms.
const DEFAULT_PRIORITY_LABELS: &[&str] = &["Golden Retriever", "Labrador", "Poodle", "Dog", "Puppy"];

#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("Failed to read label rules: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse label rules: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid confidence floor: {0}")]
    InvalidFloor(f32),
}

/// Static configuration shared by the label filter and the priority resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelRules {
    pub confidence_floor: f32,
    pub generic_labels: HashSet<String>,
    pub priority_labels: Vec<String>,
}

impl Default for LabelRules {
    fn default() -> Self {
        Self {
            confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
            generic_labels: DEFAULT_GENERIC_LABELS.iter().map(|s| s.to_string()).collect(),
            priority_labels: DEFAULT_PRIORITY_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl LabelRules {
    pub fn from_yaml(source: &str) -> Result<Self, RulesError> {
        let rules: LabelRules = serde_yaml::from_str(source)?;
        rules.validate()
    }

    pub fn load(path: &Path) -> Result<Self, RulesError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml(&source)
    }

    /// Reads the rules file when one is configured, otherwise the built-in set.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, RulesError> {
        match path {
            Some(path) => {
                log::info!("Loading label rules from {}", path.display());
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn is_generic(&self, name: &str) -> bool {
        self.generic_labels.contains(name)
    }

    /// True when the detector's own minimum already drops every label this
    /// floor would, making the floor inert.
    pub fn floor_is_shadowed_by(&self, detector_min_confidence: f32) -> bool {
        self.confidence_floor < detector_min_confidence
    }

    fn validate(self) -> Result<Self, RulesError> {
        if !(0.0..=100.0).contains(&self.confidence_floor) {
            return Err(RulesError::InvalidFloor(self.confidence_floor));
        }
        Ok(self)
    }
}

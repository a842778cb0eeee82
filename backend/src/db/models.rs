use serde::{Deserialize, Serialize};
use shared::{AnalysisPayload, ImageRef, MatchedAnimal, PENDING_REVIEW_MESSAGE, ResultKind};

/// Reference entity from the read-only `animals` catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CatalogAnimal {
    pub id: i64,
    pub name: String,
    pub species: Option<String>,
    pub habitat: Option<String>,
    pub diet: Option<String>,
    pub description: Option<String>,
}

/// Catalog entry as written by the seed file; ids are assigned on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAnimal {
    pub name: String,
    pub species: Option<String>,
    pub habitat: Option<String>,
    pub diet: Option<String>,
    pub description: Option<String>,
}

impl From<CatalogAnimal> for MatchedAnimal {
    fn from(animal: CatalogAnimal) -> Self {
        Self {
            id: animal.id,
            name: animal.name,
            species: animal.species,
            habitat: animal.habitat,
            diet: animal.diet,
            description: animal.description,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct IdentifiedResultRow {
    pub id: i64,
    pub image_bucket: String,
    pub image_key: String,
    pub image_url: String,
    pub label: String,
    pub confidence: f32,
    pub matched_animal_id: Option<i64>,
    pub created_at: String,
    pub animal_name: Option<String>,
    pub animal_species: Option<String>,
    pub animal_habitat: Option<String>,
    pub animal_diet: Option<String>,
    pub animal_description: Option<String>,
}

impl IdentifiedResultRow {
    pub fn into_payload(self) -> AnalysisPayload {
        let matched_animal = match (self.matched_animal_id, self.animal_name) {
            (Some(id), Some(name)) => Some(MatchedAnimal {
                id,
                name,
                species: self.animal_species,
                habitat: self.animal_habitat,
                diet: self.animal_diet,
                description: self.animal_description,
            }),
            _ => None,
        };

        AnalysisPayload {
            id: self.id,
            kind: ResultKind::Identified,
            image: ImageRef {
                bucket: self.image_bucket,
                key: self.image_key,
                url: self.image_url,
            },
            label: self.label,
            confidence: self.confidence,
            matched_animal,
            message: None,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct UnidentifiedResultRow {
    pub id: i64,
    pub image_bucket: String,
    pub image_key: String,
    pub image_url: String,
    pub label: String,
    pub confidence: f32,
    pub created_at: String,
}

impl UnidentifiedResultRow {
    pub fn into_payload(self) -> AnalysisPayload {
        AnalysisPayload {
            id: self.id,
            kind: ResultKind::Unidentified,
            image: ImageRef {
                bucket: self.image_bucket,
                key: self.image_key,
                url: self.image_url,
            },
            label: self.label,
            confidence: self.confidence,
            matched_animal: None,
            message: Some(PENDING_REVIEW_MESSAGE.to_string()),
            created_at: self.created_at,
        }
    }
}

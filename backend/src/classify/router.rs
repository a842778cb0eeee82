use shared::{ImageRef, ResultKind};

use super::models::{ClassificationOutcome, DetectedLabel};
use crate::db::models::CatalogAnimal;

/// Builds the outcome for a resolved label given the catalog lookup result.
/// A catalog match always routes to the identified store; anything else is
/// left for manual review. Confidence plays no part here.
pub fn route(
    image: ImageRef,
    resolved: DetectedLabel,
    catalog_match: Option<CatalogAnimal>,
) -> ClassificationOutcome {
    ClassificationOutcome {
        image,
        label: resolved.name,
        confidence: resolved.confidence,
        matched_animal: catalog_match,
    }
}

impl ClassificationOutcome {
    pub fn kind(&self) -> ResultKind {
        match self.matched_animal {
            Some(_) => ResultKind::Identified,
            None => ResultKind::Unidentified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> ImageRef {
        ImageRef {
            bucket: "lens".into(),
            key: "images/abc.jpg".into(),
            url: "https://lens.s3.ap-northeast-2.amazonaws.com/images/abc.jpg".into(),
        }
    }

    fn retriever() -> CatalogAnimal {
        CatalogAnimal {
            id: 3,
            name: "Golden Retriever".into(),
            species: Some("Canis lupus familiaris".into()),
            habitat: None,
            diet: None,
            description: None,
        }
    }

    #[test]
    fn catalog_match_routes_to_identified() {
        let outcome = route(
            image(),
            DetectedLabel::new("Golden Retriever", 92.0),
            Some(retriever()),
        );
        assert_eq!(outcome.kind(), ResultKind::Identified);
        assert_eq!(outcome.matched_animal_id(), Some(3));
        assert_eq!(outcome.label, "Golden Retriever");
        assert_eq!(outcome.confidence, 92.0);
    }

    #[test]
    fn no_match_routes_to_unidentified() {
        let outcome = route(image(), DetectedLabel::new("Otter", 81.0), None);
        assert_eq!(outcome.kind(), ResultKind::Unidentified);
        assert_eq!(outcome.matched_animal_id(), None);
        assert_eq!(outcome.image, image());
    }

    #[test]
    fn routing_ignores_confidence() {
        let low = route(image(), DetectedLabel::new("Golden Retriever", 80.0), Some(retriever()));
        let high = route(image(), DetectedLabel::new("Golden Retriever", 100.0), Some(retriever()));
        assert_eq!(low.kind(), high.kind());
    }
}

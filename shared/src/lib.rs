use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumString};

/// Message attached to every result that is waiting for manual curation.
pub const PENDING_REVIEW_MESSAGE: &str = "We don't have enough data about this animal yet. Our team will review and add it to our database soon.";

/// Opaque handle to an uploaded image, produced by the blob store and carried
/// unchanged through detection and persistence.
#[derive(Debug, Display, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[display(fmt = "s3://{}/{}", bucket, key)]
pub struct ImageRef {
    pub bucket: String,
    pub key: String,
    pub url: String,
}

#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResultKind {
    Identified,
    Unidentified,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MatchedAnimal {
    pub id: i64,
    pub name: String,
    pub species: Option<String>,
    pub habitat: Option<String>,
    pub diet: Option<String>,
    pub description: Option<String>,
}

/// The single response shape for an analysed upload, returned both by the
/// upload endpoint and by result lookups.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnalysisPayload {
    pub id: i64,
    pub kind: ResultKind,
    pub image: ImageRef,
    pub label: String,
    pub confidence: f32,
    pub matched_animal: Option<MatchedAnimal>,
    pub message: Option<String>,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn result_kind_uses_snake_case_everywhere() {
        assert_eq!(ResultKind::Unidentified.as_ref(), "unidentified");
        assert_eq!(ResultKind::Identified.to_string(), "identified");
        assert_eq!(ResultKind::from_str("identified").ok(), Some(ResultKind::Identified));
        assert_eq!(
            serde_json::to_string(&ResultKind::Identified).unwrap(),
            "\"identified\""
        );
    }

    #[test]
    fn image_ref_displays_as_object_location() {
        let image = ImageRef {
            bucket: "lens".into(),
            key: "images/abc.png".into(),
            url: "https://lens.s3.ap-northeast-2.amazonaws.com/images/abc.png".into(),
        };
        assert_eq!(image.to_string(), "s3://lens/images/abc.png");
    }

    #[test]
    fn unmatched_payload_serializes_null_animal() {
        let payload = AnalysisPayload {
            id: 7,
            kind: ResultKind::Unidentified,
            image: ImageRef {
                bucket: "lens".into(),
                key: "images/abc.png".into(),
                url: "https://example.test/images/abc.png".into(),
            },
            label: "Otter".into(),
            confidence: 81.0,
            matched_animal: None,
            message: Some(PENDING_REVIEW_MESSAGE.to_string()),
            created_at: "2024-01-01T00:00:00+00:00".into(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["matched_animal"].is_null());
        assert_eq!(json["kind"], "unidentified");
    }
}

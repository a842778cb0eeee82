use super::models::DetectedLabel;
use super::rules::LabelRules;

/// Keeps labels that clear the confidence floor and are not generic, in the
/// order the detector reported them. Confidences outside `0..=100` (and NaN)
/// are treated as malformed and dropped.
pub fn filter_labels(labels: &[DetectedLabel], rules: &LabelRules) -> Vec<DetectedLabel> {
    labels
        .iter()
        .filter(|label| label.confidence >= rules.confidence_floor && label.confidence <= 100.0)
        .filter(|label| !rules.is_generic(&label.name))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, f32)]) -> Vec<DetectedLabel> {
        pairs.iter().map(|(n, c)| DetectedLabel::new(*n, *c)).collect()
    }

    #[test]
    fn drops_generic_and_low_confidence_labels() {
        let rules = LabelRules::default();
        let input = labels(&[
            ("Golden Retriever", 92.0),
            ("Animal", 99.0),
            ("Dog", 95.0),
            ("Grass", 79.9),
        ]);
        let kept = filter_labels(&input, &rules);
        assert_eq!(kept, labels(&[("Golden Retriever", 92.0), ("Dog", 95.0)]));
    }

    #[test]
    fn floor_is_inclusive() {
        let kept = filter_labels(&labels(&[("Otter", 80.0)]), &LabelRules::default());
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn all_noise_yields_empty() {
        let input = labels(&[("Wildlife", 99.0), ("Mammal", 91.0), ("Otter", 50.0)]);
        assert!(filter_labels(&input, &LabelRules::default()).is_empty());
    }

    #[test]
    fn malformed_confidences_are_dropped() {
        let input = labels(&[("Otter", f32::NAN), ("Seal", 140.0), ("Heron", 88.0)]);
        assert_eq!(
            filter_labels(&input, &LabelRules::default()),
            labels(&[("Heron", 88.0)])
        );
    }

    #[test]
    fn generic_match_is_exact() {
        let kept = filter_labels(&labels(&[("Animal Shelter", 90.0)]), &LabelRules::default());
        assert_eq!(kept.len(), 1);
    }
}

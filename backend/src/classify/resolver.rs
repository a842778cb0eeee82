use super::models::DetectedLabel;
use super::rules::LabelRules;

/// Picks exactly one label from an already filtered set.
///
/// The preference list is walked in order; the first preferred name present
/// wins, taking its highest-confidence occurrence. Without any preferred name
/// the globally most confident label wins. Equal confidences resolve to the
/// label seen first. Returns `None` only for an empty input.
pub fn resolve_label(filtered: &[DetectedLabel], rules: &LabelRules) -> Option<DetectedLabel> {
    let preferred = rules.priority_labels.iter().find_map(|preferred| {
        most_confident(filtered.iter().filter(|label| &label.name == preferred))
    });

    preferred
        .or_else(|| most_confident(filtered.iter()))
        .cloned()
}

fn most_confident<'a>(labels: impl Iterator<Item = &'a DetectedLabel>) -> Option<&'a DetectedLabel> {
    labels.fold(None, |best, label| match best {
        Some(current) if current.confidence >= label.confidence => Some(current),
        _ => Some(label),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, f32)]) -> Vec<DetectedLabel> {
        pairs.iter().map(|(n, c)| DetectedLabel::new(*n, *c)).collect()
    }

    fn rules(priority: &[&str]) -> LabelRules {
        LabelRules {
            priority_labels: priority.iter().map(|s| s.to_string()).collect(),
            ..LabelRules::default()
        }
    }

    #[test]
    fn first_preference_beats_more_confident_labels() {
        let input = labels(&[("Golden Retriever", 92.0), ("Dog", 95.0)]);
        let chosen = resolve_label(&input, &rules(&["Golden Retriever", "Dog"])).unwrap();
        assert_eq!(chosen, DetectedLabel::new("Golden Retriever", 92.0));
    }

    #[test]
    fn later_preference_used_when_earlier_absent() {
        let input = labels(&[("Puppy", 97.0), ("Dog", 88.0), ("Grass", 99.0)]);
        let chosen = resolve_label(&input, &rules(&["Labrador", "Dog", "Puppy"])).unwrap();
        assert_eq!(chosen, DetectedLabel::new("Dog", 88.0));
    }

    #[test]
    fn duplicate_preferred_name_takes_highest_confidence() {
        let input = labels(&[("Dog", 84.0), ("Dog", 93.0), ("Dog", 90.0)]);
        let chosen = resolve_label(&input, &rules(&["Dog"])).unwrap();
        assert_eq!(chosen.confidence, 93.0);
    }

    #[test]
    fn falls_back_to_global_maximum() {
        let input = labels(&[("Otter", 81.0), ("River", 96.0), ("Seal", 90.0)]);
        let chosen = resolve_label(&input, &rules(&["Dog"])).unwrap();
        assert_eq!(chosen, DetectedLabel::new("River", 96.0));
    }

    #[test]
    fn equal_confidence_keeps_first_seen() {
        let input = labels(&[("Otter", 90.0), ("Beaver", 90.0), ("Seal", 85.0)]);
        let chosen = resolve_label(&input, &rules(&[])).unwrap();
        assert_eq!(chosen.name, "Otter");

        let input = labels(&[("Heron", 88.0), ("Egret", 91.0), ("Stork", 91.0)]);
        let chosen = resolve_label(&input, &rules(&["Dog"])).unwrap();
        assert_eq!(chosen.name, "Egret");
    }

    #[test]
    fn empty_input_resolves_to_nothing() {
        assert!(resolve_label(&[], &LabelRules::default()).is_none());
    }
}

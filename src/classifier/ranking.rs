use super::interface::Classification;

const PROBABILITY_TOLERANCE: f32 = 1e-3;

/// Returns `scores` as probabilities, applying softmax only when they are not
/// already a distribution (models exported with or without a final softmax).
pub fn to_probabilities(scores: &[f32]) -> Vec<f32> {
    let in_range = scores.iter().all(|s| (0.0..=1.0).contains(s));
    let sum: f32 = scores.iter().sum();
    if in_range && (sum - 1.0).abs() <= PROBABILITY_TOLERANCE {
        return scores.to_vec();
    }

    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// Ranks raw network output and keeps the best `k` entries.
///
/// A score vector with one more entry than there are labels is treated as
/// having a leading background class, which is dropped.
pub fn rank_scores(scores: &[f32], labels: &[String], k: usize) -> Vec<Classification> {
    let probabilities = to_probabilities(scores);
    let offset = usize::from(probabilities.len() == labels.len() + 1);

    let mut ranked: Vec<(usize, f32)> = probabilities
        .into_iter()
        .enumerate()
        .skip(offset)
        .map(|(idx, p)| (idx - offset, p))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(k);

    ranked
        .into_iter()
        .map(|(idx, confidence)| {
            let label = labels
                .get(idx)
                .cloned()
                .unwrap_or_else(|| format!("class_{}", idx));
            Classification::new(label, confidence)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_probabilities_pass_through() {
        let scores = [0.1, 0.7, 0.2];
        assert_eq!(to_probabilities(&scores), scores.to_vec());
    }

    #[test]
    fn test_logits_get_softmax() {
        let probs = to_probabilities(&[2.0, 1.0, -3.5]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(probs[0] > probs[1] && probs[1] > probs[2]);
    }

    #[test]
    fn test_rank_orders_and_truncates() {
        let ranked = rank_scores(&[0.05, 0.6, 0.1, 0.25], &labels(&["a", "b", "c", "d"]), 2);
        assert_eq!(
            ranked,
            vec![Classification::new("b", 0.6), Classification::new("d", 0.25)]
        );
    }

    #[test]
    fn test_background_class_dropped() {
        let ranked = rank_scores(&[0.5, 0.1, 0.4], &labels(&["cat", "dog"]), 5);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].label, "dog");
        assert_eq!(ranked[1].label, "cat");
    }

    #[test]
    fn test_unknown_index_gets_placeholder_label() {
        let ranked = rank_scores(&[0.1, 0.2, 0.3, 0.4], &labels(&["only"]), 1);
        assert_eq!(ranked[0].label, "class_3");
    }
}

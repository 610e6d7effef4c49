use store::Weight;

/// Weighted contribution of one chunk match: `similarity² × weight`.
///
/// Squaring keeps strong matches nearly intact (0.9 → 0.81) while
/// collapsing weak ones (0.3 → 0.09), so a pile of mediocre matches
/// cannot outscore one excellent match on an essential requirement.
/// Cosine similarity below zero carries no signal for this purpose and
/// contributes nothing.
pub fn weighted_contribution(similarity: f32, weight: Weight) -> f32 {
    let s = similarity.clamp(0.0, 1.0);
    s * s * weight.factor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_in_similarity_for_fixed_weight() {
        for weight in [Weight::General, Weight::Desirable, Weight::Essential] {
            let high = weighted_contribution(0.9, weight);
            let mid = weighted_contribution(0.6, weight);
            let low = weighted_contribution(0.3, weight);
            assert!(high > mid);
            assert!(mid > low);
        }
    }

    #[test]
    fn monotonic_in_weight_for_fixed_similarity() {
        let s = 0.7;
        assert!(
            weighted_contribution(s, Weight::Essential) > weighted_contribution(s, Weight::Desirable)
        );
        assert!(
            weighted_contribution(s, Weight::Desirable) > weighted_contribution(s, Weight::General)
        );
    }

    #[test]
    fn squaring_penalizes_weak_matches() {
        assert!((weighted_contribution(0.9, Weight::General) - 0.81).abs() < 1e-6);
        assert!((weighted_contribution(0.3, Weight::General) - 0.09).abs() < 1e-6);
        assert!((weighted_contribution(0.95, Weight::Essential) - 2.7075).abs() < 1e-4);
    }

    #[test]
    fn negative_and_overlong_similarities_are_clamped() {
        assert_eq!(weighted_contribution(-0.4, Weight::Essential), 0.0);
        assert_eq!(weighted_contribution(1.5, Weight::General), 1.0);
    }
}

//! Feature importance ranking.

/// A ranked feature with name, importance score, and rank.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedFeature {
    /// Feature name.
    pub name: String,
    /// Normalized importance score (sums to 1.0 across all features).
    pub importance: f64,
    /// 1-based rank (1 = most important).
    pub rank: usize,
}

/// Pair importances with column names, sort descending, assign 1-based
/// ranks, and keep the first `top_k` entries with positive importance.
pub(crate) fn rank_features(
    importances: &[f64],
    names: &[String],
    top_k: usize,
) -> Vec<RankedFeature> {
    let mut features: Vec<RankedFeature> = names
        .iter()
        .zip(importances)
        .map(|(name, &importance)| RankedFeature {
            name: name.clone(),
            importance,
            rank: 0,
        })
        .collect();

    // Stable sort keeps column order among ties.
    features.sort_by(|a, b| b.importance.total_cmp(&a.importance));

    for (i, feat) in features.iter_mut().enumerate() {
        feat.rank = i + 1;
    }

    features.retain(|f| f.importance > 0.0);
    features.truncate(top_k);
    features
}

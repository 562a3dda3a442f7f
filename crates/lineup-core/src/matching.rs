//! Match scorer: similarity confidence between two artist names.
//!
//! The scorer is intentionally cheap. Exact and containment matches are
//! handled first; everything else falls back to a bag-of-characters
//! overlap ratio. The overlap heuristic is permissive by design and must
//! always be paired with the review band below — it can over-merge short
//! names and under-merge long ones, which is why ambiguous scores route
//! to human review instead of auto-linking.

use crate::identity::normalize;

/// Scores at or above this auto-link without review.
///
/// Together with [`REVIEW_THRESHOLD`] this is the tuning surface for
/// merge behavior; changing either changes merge outcomes.
pub const AUTO_LINK_THRESHOLD: f64 = 0.85;

/// Scores in `[REVIEW_THRESHOLD, AUTO_LINK_THRESHOLD)` are flagged for
/// human review and never auto-linked.
pub const REVIEW_THRESHOLD: f64 = 0.60;

/// The decision band a similarity score falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchBand {
    /// Confident enough to link without review.
    AutoLink,
    /// Ambiguous: create a merge candidate, do not link.
    Review,
    /// Treated as no match at all.
    NoMatch,
}

impl MatchBand {
    /// Classify a similarity score.
    #[must_use]
    pub fn of(score: f64) -> Self {
        if score >= AUTO_LINK_THRESHOLD {
            Self::AutoLink
        } else if score >= REVIEW_THRESHOLD {
            Self::Review
        } else {
            Self::NoMatch
        }
    }
}

/// Similarity confidence in `[0, 1]` between two artist names.
///
/// First rule that applies wins:
/// 1. identical normal forms: `1.0`
/// 2. one normal form contains the other: `0.85`
/// 3. character-overlap ratio: characters of the shorter normal form
///    that occur anywhere in the longer, divided by the longer's length.
///
/// Symmetric: `score(a, b) == score(b, a)`. Equal-length pairs are
/// ordered lexicographically before the overlap count so the directional
/// rule 3 cannot break symmetry.
#[must_use]
pub fn score(name_a: &str, name_b: &str) -> f64 {
    let a = normalize(name_a);
    let b = normalize(name_b);

    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return 0.85;
    }

    let (shorter, longer) = order_pair(&a, &b);
    let longer_len = longer.chars().count();
    if longer_len == 0 {
        return 0.0;
    }
    let overlap = shorter.chars().filter(|&c| longer.contains(c)).count();
    #[allow(clippy::cast_precision_loss)]
    let ratio = overlap as f64 / longer_len as f64;
    ratio
}

/// Order two normalized names as (shorter, longer), breaking length
/// ties lexicographically.
fn order_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    let (la, lb) = (a.chars().count(), b.chars().count());
    if la < lb || (la == lb && a <= b) {
        (a, b)
    } else {
        (b, a)
    }
}

// src/similarity.rs

//! Fast approximate similarity between two byte sequences.
//!
//! The measure treats both inputs as multisets of bytes and counts how many
//! bytes of `a` can be paired with an unused byte of equal value in `b`. It is
//! an upper bound of a real alignment ratio and runs in linear time, so
//! repetitive content (minified bundles) can score higher than its true
//! edit distance would suggest.

use crate::model::Ratio;

/// Similarity of `a` and `b` in `[0, 100]`. Two empty inputs score 100.
pub fn score(a: &[u8], b: &[u8]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }

    let mut available = [0usize; 256];
    for &byte in b {
        available[byte as usize] += 1;
    }

    let mut matches = 0usize;
    for &byte in a {
        let slot = &mut available[byte as usize];
        if *slot > 0 {
            *slot -= 1;
            matches += 1;
        }
    }

    200.0 * matches as f64 / total as f64
}

/// Compares repository content with remote content.
///
/// Both sides must be valid UTF-8, otherwise the pair is not comparable and
/// the invalid ratio is returned without scoring.
pub fn compare_text(snapshot: &[u8], remote: &[u8]) -> Ratio {
    if std::str::from_utf8(snapshot).is_err() || std::str::from_utf8(remote).is_err() {
        return Ratio::Invalid;
    }
    Ratio::Score(score(snapshot, remote))
}

//! Approximate string matching.
//!
//! Scores how well a query occurs somewhere in a text, tolerating typos.
//! The score combines edit distance and match position the way Fuse.js
//! does, so thresholds tuned for the web front end carry over:
//!
//! ```text
//! score = errors / query_len + start / distance
//! ```
//!
//! `errors` is the smallest edit distance between the query and any
//! substring of the text ending at a given position (Sellers' algorithm),
//! and `start` is where that substring begins. `0.0` is a perfect match at
//! the start of the text; higher is worse.

/// Tuning for [`FuzzyMatcher`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    /// Maximum accepted score.
    pub threshold: f64,
    /// How far from the start a match may drift before the location penalty
    /// alone reaches `1.0`.
    pub distance: usize,
    /// Score on edit distance only.
    pub ignore_location: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            distance: 100,
            ignore_location: false,
        }
    }
}

/// Smallest score ever reported for a match, so weighted products stay
/// informative.
pub const MIN_SCORE: f64 = 0.001;

/// A lowercased query, ready to be matched against many texts.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    pattern: Vec<char>,
    options: MatchOptions,
}

impl FuzzyMatcher {
    pub fn new(query: &str, options: MatchOptions) -> Self {
        Self {
            pattern: query.to_lowercase().chars().collect(),
            options,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// Score `text` (already lowercased). Returns `None` if no position
    /// scores within the threshold.
    pub fn score(&self, text: &[char]) -> Option<f64> {
        let m = self.pattern.len();
        if m == 0 {
            return None;
        }
        if text == self.pattern.as_slice() {
            return Some(0.0);
        }

        let threshold = self.options.threshold;
        let distance = self.options.distance.max(1) as f64;

        // A match starting past this point cannot beat the threshold on
        // location alone, so the rest of the text is never scanned.
        let scan_len = if self.options.ignore_location {
            text.len()
        } else {
            let max_errors = (threshold * m as f64).floor() as usize;
            let max_start = (threshold * distance).floor() as usize;
            text.len().min(max_start + m + max_errors)
        };

        // prev[i]: edits to match pattern[..i] against a substring ending
        // at the previous text position.
        let mut prev: Vec<usize> = (0..=m).collect();
        let mut curr = vec![0usize; m + 1];
        let mut best: Option<f64> = None;

        for (j, &tc) in text[..scan_len].iter().enumerate() {
            curr[0] = 0;
            for i in 1..=m {
                let substitute = prev[i - 1] + usize::from(self.pattern[i - 1] != tc);
                let skip_text = prev[i] + 1;
                let skip_pattern = curr[i - 1] + 1;
                curr[i] = substitute.min(skip_text).min(skip_pattern);
            }

            let errors = curr[m];
            let end = j + 1;
            let accuracy = errors as f64 / m as f64;
            let score = if self.options.ignore_location {
                accuracy
            } else {
                let start = end.saturating_sub(m);
                accuracy + start as f64 / distance
            };

            if score <= threshold && best.map_or(true, |b| score < b) {
                best = Some(score);
            }

            std::mem::swap(&mut prev, &mut curr);
        }

        best.map(|s| s.max(MIN_SCORE))
    }

    /// Convenience wrapper that lowercases `text` first.
    pub fn score_str(&self, text: &str) -> Option<f64> {
        let chars: Vec<char> = text.to_lowercase().chars().collect();
        self.score(&chars)
    }
}

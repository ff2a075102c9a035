//! Line-positional similarity between an expected and an actual output.
//!
//! Lines are compared by index only: an inserted or deleted line shifts every
//! later comparison. Missing lines on the shorter side compare as `""`.

use serde::{Deserialize, Serialize};

/// A position where expected and actual output disagree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDifference {
    /// 1-based line number
    pub line: usize,
    pub expected: String,
    pub actual: String,
}

/// Fraction of positions at which both texts hold the same line, in `[0, 1]`.
///
/// Both inputs are split on `\n` only. Comparison is exact, whitespace included.
pub fn compare(expected: &str, actual: &str) -> f64 {
    let a: Vec<&str> = expected.split('\n').collect();
    let b: Vec<&str> = actual.split('\n').collect();
    let max = a.len().max(b.len());
    if max == 0 {
        return 1.0;
    }

    let same = (0..max)
        .filter(|&i| line_at(&a, i) == line_at(&b, i))
        .count();

    same as f64 / max as f64
}

/// Lists every line position where `expected` and `actual` differ.
pub fn line_differences(expected: &str, actual: &str) -> Vec<LineDifference> {
    let a: Vec<&str> = expected.split('\n').collect();
    let b: Vec<&str> = actual.split('\n').collect();
    let max = a.len().max(b.len());

    (0..max)
        .filter_map(|i| {
            let (exp, act) = (line_at(&a, i), line_at(&b, i));
            (exp != act).then(|| LineDifference {
                line: i + 1,
                expected: exp.to_string(),
                actual: act.to_string(),
            })
        })
        .collect()
}

fn line_at<'a>(lines: &[&'a str], index: usize) -> &'a str {
    lines.get(index).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical_texts() {
        assert!(approx(compare("a\nb\nc", "a\nb\nc"), 1.0));
    }

    #[test]
    fn test_one_line_differs() {
        assert!(approx(compare("a\nb\nc", "a\nx\nc"), 2.0 / 3.0));
    }

    #[test]
    fn test_both_empty() {
        assert!(approx(compare("", ""), 1.0));
    }

    #[test]
    fn test_missing_line_counts_as_mismatch() {
        assert!(approx(compare("a\nb", "a"), 0.5));
        assert!(approx(compare("a", "a\nb"), 0.5));
    }

    #[test]
    fn test_missing_line_matches_empty_line() {
        // "a\n" has an empty second line, which equals the padded "".
        assert!(approx(compare("a\n", "a"), 1.0));
    }

    #[test]
    fn test_insertion_shifts_all_following_lines() {
        assert!(approx(compare("a\nb\nc", "x\na\nb\nc"), 0.0));
    }

    #[test]
    fn test_whitespace_is_significant() {
        assert!(approx(compare("Hello, Python!", "Hello, Python! "), 0.0));
    }

    #[test]
    fn test_line_differences() {
        let diffs = line_differences("a\nb\nc", "a\nx");
        assert_eq!(
            diffs,
            vec![
                LineDifference { line: 2, expected: "b".into(), actual: "x".into() },
                LineDifference { line: 3, expected: "c".into(), actual: "".into() },
            ]
        );
        assert!(line_differences("same", "same").is_empty());
    }

    #[test]
    fn test_compare_is_repeatable() {
        assert_eq!(compare("a\nb", "a\nc"), compare("a\nb", "a\nc"));
    }
}

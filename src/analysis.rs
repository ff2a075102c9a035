use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::session::SessionStats;

lazy_static! {
    // All-caps names and letter-plus-digits names such as `x12`
    static ref UNIDIOMATIC_NAME: Regex =
        Regex::new(r"\b([A-Z]{2,}|[a-zA-Z][0-9]{2,})\b").expect("naming pattern is valid");
}

const SYNTAX_TIP_THRESHOLD: u32 = 30;
const SPEED_TIP_THRESHOLD: u32 = 40;
const NAMING_TIP_THRESHOLD: u32 = 30;

/// Estimated weak spots, each as a 0-100 frequency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaknessReport {
    pub syntax_errors: u32,
    pub coding_speed: u32,
    pub naming_issues: u32,
    pub suggestions: Vec<String>,
}

impl WeaknessReport {
    pub fn analyze(stats: &SessionStats, code: &str, now: DateTime<Utc>) -> Self {
        let minutes = (stats.elapsed(now).as_secs_f64() / 60.0).max(1.0);

        let syntax_errors =
            percent(stats.error_count as f64 / stats.run_count.max(1) as f64 * 100.0);
        let coding_speed = percent(stats.code_modifications as f64 / minutes * 10.0);
        let naming_issues = percent(count_unidiomatic_names(code) as f64 * 10.0);

        let mut report = Self {
            syntax_errors,
            coding_speed,
            naming_issues,
            suggestions: Vec::new(),
        };
        report.suggestions = report.build_suggestions();
        report
    }

    fn build_suggestions(&self) -> Vec<String> {
        let mut suggestions = Vec::new();
        if self.syntax_errors >= SYNTAX_TIP_THRESHOLD {
            suggestions.push(
                "Fewer syntax errors: before printing, check that quotes pair up and parentheses close."
                    .to_string(),
            );
        }
        if self.coding_speed >= SPEED_TIP_THRESHOLD {
            suggestions.push(
                "Work more efficiently: list the steps first, then write and test in chunks instead of many small edits."
                    .to_string(),
            );
        }
        if self.naming_issues >= NAMING_TIP_THRESHOLD {
            suggestions.push(
                "Better names: use lowercase with underscores, e.g. total_score, run_count.".to_string(),
            );
        }
        if suggestions.is_empty() {
            suggestions.push("Steady performance! Keep up the good typing and checking habits.".to_string());
        }
        suggestions
    }
}

pub fn count_unidiomatic_names(code: &str) -> usize {
    UNIDIOMATIC_NAME.find_iter(code).count()
}

fn percent(value: f64) -> u32 {
    value.round().clamp(0.0, 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_clean_session_gets_steady_message() {
        let now = Utc::now();
        let stats = SessionStats::new(10, now);
        let report = WeaknessReport::analyze(&stats, "total_score = 1", now);

        assert_eq!(report.syntax_errors, 0);
        assert_eq!(report.coding_speed, 0);
        assert_eq!(report.naming_issues, 0);
        assert_eq!(report.suggestions.len(), 1);
        assert!(report.suggestions[0].starts_with("Steady"));
    }

    #[test]
    fn test_error_rate_uses_run_count() {
        let now = Utc::now();
        let mut stats = SessionStats::new(10, now);
        stats.record_run(false);
        stats.record_run(true);
        stats.record_run(true);

        let report = WeaknessReport::analyze(&stats, "", now);
        assert_eq!(report.syntax_errors, 33);
        assert!(report.suggestions[0].starts_with("Fewer syntax errors"));
    }

    #[test]
    fn test_error_rate_is_capped() {
        let now = Utc::now();
        let mut stats = SessionStats::new(10, now);
        stats.error_count = 5;
        let report = WeaknessReport::analyze(&stats, "", now);
        assert_eq!(report.syntax_errors, 100);
    }

    #[test]
    fn test_coding_speed_over_elapsed_minutes() {
        let now = Utc::now();
        let mut stats = SessionStats::new(10, now - Duration::minutes(10));
        stats.code_modifications = 50;
        let report = WeaknessReport::analyze(&stats, "", now);
        assert_eq!(report.coding_speed, 50);

        // Less than a minute counts as one minute.
        let mut fresh = SessionStats::new(10, now);
        fresh.code_modifications = 3;
        assert_eq!(WeaknessReport::analyze(&fresh, "", now).coding_speed, 30);
    }

    #[test]
    fn test_naming_issues() {
        assert_eq!(count_unidiomatic_names("TOTAL = x12 + y1 + abc"), 2);
        let now = Utc::now();
        let stats = SessionStats::new(10, now);
        let report = WeaknessReport::analyze(&stats, "AB = 1\nCD = 2\nv99 = 3", now);
        assert_eq!(report.naming_issues, 30);
        assert!(report.suggestions.iter().any(|s| s.starts_with("Better names")));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::grader::{GradeOutcome, GradeReport, Question};

/// Learning statistics for one practice session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Session start time
    pub started_at: DateTime<Utc>,
    pub run_count: u64,
    pub check_count: u64,
    pub successful_runs: u64,
    /// Failed runs plus checks stopped by a syntax issue
    pub error_count: u64,
    pub code_modifications: u64,
    pub completed_questions: u32,
    pub total_questions: u32,
    /// Every 0-100 score produced by a check, oldest first
    pub scores: Vec<u32>,
    #[serde(default)]
    pub last_code: String,
}

/// Derived 0-100 indicators shown alongside the average score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubScores {
    pub main: u32,
    pub quality: u32,
    pub pass: u32,
    pub stability: u32,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new(10, Utc::now())
    }
}

impl SessionStats {
    pub fn new(total_questions: u32, started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            run_count: 0,
            check_count: 0,
            successful_runs: 0,
            error_count: 0,
            code_modifications: 0,
            completed_questions: 0,
            total_questions,
            scores: Vec::new(),
            last_code: String::new(),
        }
    }

    pub fn record_run(&mut self, success: bool) {
        self.run_count += 1;
        if success {
            self.successful_runs += 1;
        } else {
            self.error_count += 1;
        }
    }

    pub fn record_grade(&mut self, report: &GradeReport, question: &Question) {
        self.check_count += 1;
        match &report.outcome {
            GradeOutcome::Scored { score, passed, .. } => {
                self.scores.push(*score);
                if *passed {
                    let reached = question.number.min(self.total_questions);
                    self.completed_questions = self.completed_questions.max(reached);
                }
            }
            GradeOutcome::SyntaxError(_) => self.error_count += 1,
        }
        debug!(
            checks = self.check_count,
            completed = self.completed_questions,
            "Recorded check"
        );
    }

    /// Returns true and counts a modification when `content` differs from the
    /// code seen last time.
    pub fn note_code(&mut self, content: &str) -> bool {
        if self.last_code == content {
            return false;
        }
        self.code_modifications += 1;
        self.last_code = content.to_string();
        true
    }

    pub fn average_score(&self) -> u32 {
        if self.scores.is_empty() {
            return 0;
        }
        let sum: u64 = self.scores.iter().map(|&s| u64::from(s)).sum();
        (sum as f64 / self.scores.len() as f64).round() as u32
    }

    /// Percentage of runs that succeeded, 0 when nothing ran yet
    pub fn success_rate(&self) -> u32 {
        if self.run_count == 0 {
            return 0;
        }
        (self.successful_runs as f64 / self.run_count as f64 * 100.0).round() as u32
    }

    pub fn progress_percent(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        (f64::from(self.completed_questions) / f64::from(self.total_questions) * 100.0).round() as u32
    }

    pub fn sub_scores(&self) -> SubScores {
        let main = self.average_score().min(100);
        SubScores {
            main,
            quality: (f64::from(main) * 0.94).round() as u32,
            pass: (f64::from(self.success_rate()) * 0.95).round() as u32,
            stability: 100u64.saturating_sub(self.error_count.saturating_mul(3)) as u32,
        }
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started_at).to_std().unwrap_or_default()
    }
}

/// Formats a duration as `MM:SS`, or `HH:MM:SS` once it reaches an hour.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{:02}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::scorer::{self, LineDifference};
use crate::simulator;

/// Placeholder shown for a missing line in feedback
const EMPTY_LINE: &str = "(empty)";

/// An exercise with the output it expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// 1-based position in the course
    pub number: u32,
    pub title: String,
    pub expected_output: Vec<String>,
}

impl Default for Question {
    fn default() -> Self {
        Self {
            number: 1,
            title: "Basic output".to_string(),
            expected_output: vec![
                "Hello, Python!".to_string(),
                "I am learning basic output".to_string(),
                "This is question 1 ✅".to_string(),
            ],
        }
    }
}

impl Question {
    pub fn expected_text(&self) -> String {
        self.expected_output.join("\n")
    }
}

/// GradingPolicy holds the thresholds applied to a similarity score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingPolicy {
    /// Minimum 0-100 score counted as a pass
    pub pass_threshold: u32,
}

impl Default for GradingPolicy {
    fn default() -> Self {
        Self { pass_threshold: 85 }
    }
}

/// Coarse rating of a 0-100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: u32) -> Self {
        if score >= 85 {
            ScoreBand::Excellent
        } else if score >= 70 {
            ScoreBand::Good
        } else if score >= 50 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "excellent",
            ScoreBand::Good => "good",
            ScoreBand::Fair => "fair",
            ScoreBand::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GradeOutcome {
    /// The simulated output was compared against the question
    Scored {
        /// Rounded similarity, 0-100
        score: u32,
        passed: bool,
        differences: Vec<LineDifference>,
    },
    /// The code failed the balance check and was never compared
    SyntaxError(String),
}

/// The GradeReport contains everything a check produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeReport {
    pub question_number: u32,
    /// Simulated output, or the error text when the check failed
    pub output: String,
    pub outcome: GradeOutcome,
    pub feedback: Vec<String>,
}

impl GradeReport {
    pub fn score(&self) -> Option<u32> {
        match self.outcome {
            GradeOutcome::Scored { score, .. } => Some(score),
            GradeOutcome::SyntaxError(_) => None,
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self.outcome, GradeOutcome::Scored { passed: true, .. })
    }
}

/// Converts a similarity in `[0, 1]` to a rounded 0-100 score.
pub fn to_score(similarity: f64) -> u32 {
    (similarity.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Simulates `code`, scores its output against `question`, and builds feedback.
pub fn grade(code: &str, question: &Question, policy: &GradingPolicy) -> GradeReport {
    let output = match simulator::simulate_to_string(code) {
        Ok(output) => output,
        Err(issue) => {
            info!(question = question.number, "Check stopped by syntax issue: {}", issue);
            return GradeReport {
                question_number: question.number,
                output: format!("Error: {}", issue),
                outcome: GradeOutcome::SyntaxError(issue.to_string()),
                feedback: vec![
                    "Syntax problem detected: check that quotes and parentheses are paired."
                        .to_string(),
                ],
            };
        }
    };

    let expected = question.expected_text();
    let score = to_score(scorer::compare(&expected, &output));
    let passed = score >= policy.pass_threshold;
    debug!(question = question.number, score, passed, "Scored simulated output");

    let mut feedback = Vec::new();
    let differences = if passed {
        feedback.push("Output matches the exercise. Well done!".to_string());
        feedback.push("Next step: try building the text in a variable before printing it.".to_string());
        Vec::new()
    } else {
        feedback.push("Output does not fully match: check punctuation, spaces and symbols.".to_string());
        feedback.push("Each line needs its own print call; mind the line breaks.".to_string());
        let differences = scorer::line_differences(&expected, &output);
        for diff in &differences {
            feedback.push(format!(
                "Line {} differs: expected \"{}\" / actual \"{}\"",
                diff.line,
                or_placeholder(&diff.expected),
                or_placeholder(&diff.actual),
            ));
        }
        differences
    };

    GradeReport {
        question_number: question.number,
        output,
        outcome: GradeOutcome::Scored { score, passed, differences },
        feedback,
    }
}

fn or_placeholder(line: &str) -> &str {
    if line.is_empty() {
        EMPTY_LINE
    } else {
        line
    }
}

// py-diagnose: offline checks for beginner Python print exercises.

pub mod analysis;
pub mod config;
pub mod grader;
pub mod logging;
pub mod scorer;
pub mod session;
pub mod simulator;
pub mod storage;

pub use analysis::WeaknessReport;
pub use config::DiagnoseConfig;
pub use grader::{grade, GradeOutcome, GradeReport, GradingPolicy, Question, ScoreBand};
pub use scorer::{compare, line_differences, LineDifference};
pub use session::{format_duration, SessionStats};
pub use simulator::{check_balance, simulate, SyntaxIssue, NO_OUTPUT_DETECTED};
pub use storage::Store;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::session::SessionStats;

const CODE_FILE: &str = "python_diagnose_code.py";
const STATS_FILE: &str = "session.json";

/// File-backed store for the saved submission and session statistics
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn save_code(&self, code: &str) -> Result<()> {
        let path = self.ensure_root()?.join(CODE_FILE);
        fs::write(&path, code)
            .with_context(|| format!("Failed to save code to {:?}", path))?;
        info!("Saved code to {:?}", path);
        Ok(())
    }

    /// Returns the saved code, or `None` when nothing was saved yet.
    pub fn load_code(&self) -> Result<Option<String>> {
        let path = self.root.join(CODE_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let code = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read saved code from {:?}", path))?;
        Ok(Some(code))
    }

    pub fn save_stats(&self, stats: &SessionStats) -> Result<()> {
        let path = self.ensure_root()?.join(STATS_FILE);
        let json = serde_json::to_string_pretty(stats)
            .context("Failed to serialize session statistics")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write session statistics to {:?}", path))?;
        debug!("Wrote session statistics to {:?}", path);
        Ok(())
    }

    /// Loads the stored session, or starts a fresh one with `total_questions`.
    pub fn load_stats(&self, total_questions: u32) -> Result<SessionStats> {
        let path = self.root.join(STATS_FILE);
        if !path.exists() {
            debug!("No session file at {:?}, starting a new session", path);
            return Ok(SessionStats::new(total_questions, chrono::Utc::now()));
        }
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session statistics from {:?}", path))?;
        let mut stats: SessionStats = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse session statistics in {:?}", path))?;
        stats.total_questions = total_questions;
        stats.completed_questions = stats.completed_questions.min(total_questions);
        Ok(stats)
    }

    /// Deletes the stored session; the saved code is kept.
    pub fn reset_stats(&self) -> Result<()> {
        let path = self.root.join(STATS_FILE);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {:?}", path))?;
        }
        Ok(())
    }

    fn ensure_root(&self) -> Result<&Path> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create data directory: {:?}", self.root))?;
        Ok(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_code_roundtrip() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("data"));

        assert_eq!(store.load_code().unwrap(), None);
        store.save_code("print(\"hi\")").unwrap();
        assert_eq!(store.load_code().unwrap().as_deref(), Some("print(\"hi\")"));
    }

    #[test]
    fn test_stats_persist_and_reset() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path());

        let mut stats = store.load_stats(10).unwrap();
        assert_eq!(stats.run_count, 0);
        stats.record_run(true);
        stats.scores.push(88);
        store.save_stats(&stats).unwrap();

        let loaded = store.load_stats(12).unwrap();
        assert_eq!(loaded.run_count, 1);
        assert_eq!(loaded.scores, vec![88]);
        assert_eq!(loaded.total_questions, 12);

        store.reset_stats().unwrap();
        assert_eq!(store.load_stats(10).unwrap().run_count, 0);
    }

    #[test]
    fn test_shrunk_course_caps_progress() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path());

        let mut stats = store.load_stats(10).unwrap();
        stats.completed_questions = 8;
        store.save_stats(&stats).unwrap();

        let loaded = store.load_stats(5).unwrap();
        assert_eq!(loaded.completed_questions, 5);
        assert_eq!(loaded.progress_percent(), 100);
    }

    #[test]
    fn test_corrupt_stats_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(STATS_FILE), "{not json").unwrap();
        assert!(Store::new(dir.path()).load_stats(10).is_err());
    }
}

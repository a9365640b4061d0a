//! Run reporting - job summary and step outputs.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Appending to the files the runner points us at

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub mod formatter;

pub use formatter::{diff_details, output_entry};

/// Destinations for the job summary and step outputs.
///
/// Both are optional; outside a runner the text goes to the log instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub step_summary: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl RunReport {
    pub fn new(step_summary: Option<PathBuf>, output: Option<PathBuf>) -> Self {
        RunReport {
            step_summary,
            output,
        }
    }

    /// Append markdown to the job summary
    pub fn append_summary(&self, markdown: &str) -> Result<()> {
        match &self.step_summary {
            Some(path) => append(path, markdown),
            None => {
                tracing::info!("Job summary:\n{}", markdown);
                Ok(())
            }
        }
    }

    /// Set a step output
    pub fn set_output(&self, name: &str, value: &str) -> Result<()> {
        match &self.output {
            Some(path) => append(path, &output_entry(name, value)),
            None => {
                tracing::info!(name, value, "Step output");
                Ok(())
            }
        }
    }
}

fn append(path: &Path, text: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_summary_is_appended() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.md");
        let report = RunReport::new(Some(path.clone()), None);

        report.append_summary("first").unwrap();
        report.append_summary("second\n").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_output_written_as_name_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("output");
        fs::write(&path, "EXISTING=1\n").unwrap();
        let report = RunReport::new(None, Some(path.clone()));

        report.set_output("GHA_UPDATE_PR_NUMBER", "7").unwrap();

        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "EXISTING=1\nGHA_UPDATE_PR_NUMBER=7\n"
        );
    }

    #[test]
    fn test_missing_destinations_only_log() {
        let report = RunReport::default();
        assert!(report.append_summary("text").is_ok());
        assert!(report.set_output("NAME", "value").is_ok());
    }
}

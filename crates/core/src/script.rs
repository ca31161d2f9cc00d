//! Loading command scripts from disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::command::Command;

/// A parsed command together with the line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    /// 1-based line number in the source.
    pub number: usize,
    /// Parsed command.
    pub command: Command,
}

/// Every command of a script, in file order.
#[derive(Debug, Clone, Default)]
pub struct Script {
    /// Where the script was read from, when it came from a file.
    pub path: Option<PathBuf>,
    /// Commands in execution order; blank and comment lines are dropped.
    pub lines: Vec<ScriptLine>,
}

impl Script {
    /// Parse script text, failing on the first malformed line.
    pub fn parse(source: &str) -> Result<Self> {
        let mut lines = Vec::new();
        for (index, text) in source.lines().enumerate() {
            let number = index + 1;
            let parsed = Command::parse_line(text)
                .with_context(|| format!("line {number}: '{}'", text.trim()))?;
            if let Some(command) = parsed {
                lines.push(ScriptLine { number, command });
            }
        }
        Ok(Self { path: None, lines })
    }

    /// Read and parse a script file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read script {}", path.display()))?;
        let mut script = Self::parse(&source)
            .with_context(|| format!("failed to parse script {}", path.display()))?;
        script.path = Some(path.to_path_buf());
        debug!(path = %path.display(), commands = script.lines.len(), "script loaded");
        Ok(script)
    }

    /// Whether the script opens its own station before using one.
    pub fn opens_station(&self) -> bool {
        matches!(
            self.lines.first().map(|line| &line.command),
            Some(Command::Open { .. })
        )
    }

    /// Number of commands in the script.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the script holds no commands.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn keeps_line_numbers() -> Result<()> {
        let script = Script::parse("# yard shuffle\nopen 2\n\narrive 0 50\n  add 0 7 # hopper\n")?;
        assert!(script.opens_station());
        let numbers: Vec<_> = script.lines.iter().map(|line| line.number).collect();
        assert_eq!(numbers, vec![2, 4, 5]);
        Ok(())
    }

    #[test]
    fn reports_the_failing_line() {
        let err = Script::parse("open 1\narrive 0 -4\n").unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("line 2"), "{message}");
        assert!(message.contains("must not be negative"), "{message}");
    }

    #[tokio::test]
    async fn loads_from_disk() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("shunt.txt");
        fs::write(&path, "arrive 0 10\nadd 0 4\nshow\n")?;

        let script = Script::load(&path).await?;
        assert_eq!(script.len(), 3);
        assert!(!script.opens_station());
        assert_eq!(script.path.as_deref(), Some(path.as_path()));
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_names_the_path() {
        let err = Script::load("/nonexistent/station/script.txt")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/station/script.txt"));
    }
}

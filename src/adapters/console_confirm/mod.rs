//! Console confirmation adapter
//!
//! Asks yes/no questions on stderr and reads the answer from stdin.

use std::io::{self, BufRead, Write};
use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::ports::*;

/// Interactive stdin/stderr confirmation
pub struct ConsoleConfirmAdapter;

impl ConsoleConfirmAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleConfirmAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfirmPort for ConsoleConfirmAdapter {
    async fn confirm_overwrite(&self, destination: &Path) -> Result<bool, DomainError> {
        let question = format!(
            "Output {} already exists. Overwrite existing outputs? [y/N] ",
            destination.display()
        );

        let answer = tokio::task::spawn_blocking(move || -> io::Result<String> {
            let mut stderr = io::stderr().lock();
            stderr.write_all(question.as_bytes())?;
            stderr.flush()?;

            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))??;

        Ok(is_affirmative(&answer))
    }
}

/// `y` or `yes`, case-insensitive; anything else, including EOF, is no
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;
use std::fs::{File, OpenOptions, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }

    fn colored_label(self) -> colored::ColoredString {
        match self {
            Severity::Info => self.label().normal(),
            Severity::Warning => self.label().yellow(),
            Severity::Error => self.label().red().bold(),
        }
    }
}

/// Per-run log writer. Every message goes to an append-only file whose name
/// embeds the run timestamp (so repeated runs never collide) and is mirrored
/// to stdout. A write failure on the file degrades to a stderr note rather
/// than aborting a repair that may already have mutated the disk.
pub struct RunLogger {
    path: PathBuf,
    file: File,
}

impl RunLogger {
    pub fn new(log_dir: &Path) -> Result<Self> {
        create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        let path = log_dir.join(format!("winrefix-{stamp}.log"));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log(&mut self, severity: Severity, message: &str) {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        println!("[{stamp}] [{}] {message}", severity.colored_label());

        let line = format!("[{stamp}] [{}] {message}\n", severity.label());
        if let Err(e) = self.file.write_all(line.as_bytes()) {
            eprintln!("Warning: failed to write to {}: {e}", self.path.display());
        }
    }

    pub fn info(&mut self, message: &str) {
        self.log(Severity::Info, message);
    }

    pub fn warning(&mut self, message: &str) {
        self.log(Severity::Warning, message);
    }

    pub fn error(&mut self, message: &str) {
        self.log(Severity::Error, message);
    }
}

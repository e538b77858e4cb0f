pub mod error;
pub mod layout;
pub mod logging;
pub mod run;
pub mod script;
pub mod status;
pub mod tools;

use std::path::Path;

use anyhow::Result;

use crate::repair::logging::RunLogger;
use crate::repair::run::run_repair;
use crate::repair::tools::WindowsTools;

/// Result of one repair run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairOutcome {
    /// The recovery partition was recreated; carries a summary for the user.
    Repaired(String),
    /// Nothing needed doing (WinRE disabled and not forced).
    NoOp(String),
}

/// Entry point for the CLI: wires the run logger and the real OS tools into
/// the repair procedure and reports the result. The log file path is
/// announced at the end of every run, success or failure, so the run can be
/// audited afterwards.
pub fn handle_repair_command(force: bool, log_dir: &Path) -> Result<()> {
    let mut logger = RunLogger::new(log_dir)?;
    logger.info(&format!(
        "winrefix starting (force: {force}), logging to {}",
        logger.path().display()
    ));

    let result = run_repair(&WindowsTools, &mut logger, force);

    // Success and no-op summaries are logged by the procedure itself.
    if let Err(e) = &result {
        logger.error(&format!("Repair failed: {e}"));
    }
    logger.info(&format!("Full log: {}", logger.path().display()));

    result.map(|_| ()).map_err(Into::into)
}

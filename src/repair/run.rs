use std::io::Write;
use tempfile::NamedTempFile;

use crate::repair::RepairOutcome;
use crate::repair::error::RepairError;
use crate::repair::layout::ResizePlan;
use crate::repair::logging::RunLogger;
use crate::repair::script::build_diskpart_script;
use crate::repair::status::parse_winre_info;
use crate::repair::tools::SystemTools;

/// Execute the one-shot repair: inspect WinRE, plan the resize, drive the
/// external tools, log every step.
///
/// Strictly sequential; the first error is terminal for the run and there is
/// no rollback. If the disable/partition/enable sequence is interrupted, the
/// system stays in whatever state the OS tools left it. Re-running on an
/// already healthy system repeats the full destructive sequence; each run
/// unconditionally recreates the recovery partition when WinRE is enabled
/// or `force` is set.
pub fn run_repair(
    tools: &dyn SystemTools,
    logger: &mut RunLogger,
    force: bool,
) -> Result<RepairOutcome, RepairError> {
    if !tools.is_elevated() {
        return Err(RepairError::NotElevated);
    }

    logger.info("Querying Windows RE status");
    let info = tools.winre_info()?;
    let status = parse_winre_info(&info)?;

    if !status.enabled && !force {
        logger.info("Windows RE is disabled; nothing to repair (use --force to override)");
        return Ok(RepairOutcome::NoOp(
            "Windows RE is disabled; no changes were made".to_string(),
        ));
    }

    // --force skips the enabled check, never the target resolution: without
    // a parsed disk/partition there is nothing safe to operate on.
    let location = status.location.ok_or_else(|| {
        RepairError::InvalidState(
            "Windows RE disk and partition could not be determined; refusing to guess a target"
                .to_string(),
        )
    })?;
    logger.info(&format!(
        "Windows RE is on disk {} partition {}",
        location.disk, location.partition
    ));

    let layout = tools.disk_layout(location.disk)?;
    let plan = ResizePlan::build(location, &layout)?;
    logger.info(&format!(
        "Plan: shrink partition {} by 250 MB, recreate partition {} ({:?}, currently {} bytes)",
        plan.shrink_partition, plan.winre_partition, plan.style, plan.winre_size_bytes
    ));

    let script = build_diskpart_script(&plan);
    let mut script_file = NamedTempFile::new()?;
    script_file.write_all(script.as_bytes())?;
    script_file.flush()?;
    logger.info(&format!(
        "Partitioning script written to {}:\n{}",
        script_file.path().display(),
        script.trim_end()
    ));

    logger.info("Disabling Windows RE");
    let out = tools.set_winre_enabled(false)?;
    log_tool_output(logger, &out);

    logger.info("Running partitioning script");
    let out = tools.run_partition_script(script_file.path())?;
    log_tool_output(logger, &out);

    logger.info("Re-enabling Windows RE");
    let out = tools.set_winre_enabled(true)?;
    log_tool_output(logger, &out);

    // Removing the transient script is best-effort only.
    if let Err(e) = script_file.close() {
        logger.warning(&format!("Could not remove partitioning script: {e}"));
    }

    let summary = format!(
        "Recovery partition on disk {} recreated as partition {} with 250 MB of additional space",
        plan.disk, plan.winre_partition
    );
    logger.info(&summary);
    Ok(RepairOutcome::Repaired(summary))
}

fn log_tool_output(logger: &mut RunLogger, output: &str) {
    let trimmed = output.trim();
    if !trimmed.is_empty() {
        logger.info(trimmed);
    }
}

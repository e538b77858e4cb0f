use std::path::Path;
use std::process::Command;

use crate::repair::error::RepairError;
use crate::repair::layout::{DiskLayout, parse_layout_output};

/// Narrow seam over the OS utilities the repair drives. The procedure only
/// ever talks to this trait, so tests can substitute an implementation that
/// records calls and returns scripted output instead of touching a disk.
pub trait SystemTools {
    /// Whether the process runs in an elevated security context.
    fn is_elevated(&self) -> bool;

    /// Raw text of the recovery environment status query.
    fn winre_info(&self) -> Result<String, RepairError>;

    /// Toggle WinRE registration. Returns the tool's output for logging.
    fn set_winre_enabled(&self, enabled: bool) -> Result<String, RepairError>;

    /// Partition table style and partition records for one disk.
    fn disk_layout(&self, disk: u32) -> Result<DiskLayout, RepairError>;

    /// Run a batch of partitioning directives from a script file. Returns
    /// the tool's output verbatim for logging.
    fn run_partition_script(&self, script_path: &Path) -> Result<String, RepairError>;
}

/// Real implementation backed by `reagentc`, `diskpart` and a PowerShell
/// disk enumeration query.
pub struct WindowsTools;

impl WindowsTools {
    fn run_reagentc(&self, verb: &str) -> Result<String, RepairError> {
        let output = Command::new("reagentc").arg(verb).output()?;
        if !output.status.success() {
            return Err(RepairError::tool_failed("reagentc", &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl SystemTools for WindowsTools {
    fn is_elevated(&self) -> bool {
        // `net session` succeeds only in an elevated context; the
        // conventional script-level elevation probe.
        Command::new("net")
            .arg("session")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn winre_info(&self) -> Result<String, RepairError> {
        self.run_reagentc("/info")
    }

    fn set_winre_enabled(&self, enabled: bool) -> Result<String, RepairError> {
        self.run_reagentc(if enabled { "/enable" } else { "/disable" })
    }

    fn disk_layout(&self, disk: u32) -> Result<DiskLayout, RepairError> {
        // First line: partition style. Following lines: "Number|Size".
        let ps_script = format!(
            "(Get-Disk -Number {disk}).PartitionStyle; \
             Get-Partition -DiskNumber {disk} | Sort-Object PartitionNumber | \
             ForEach-Object {{ \"$($_.PartitionNumber)|$($_.Size)\" }}"
        );

        let output = Command::new("powershell")
            .args(["-NoProfile", "-NonInteractive", "-Command", &ps_script])
            .output()?;
        if !output.status.success() {
            return Err(RepairError::tool_failed("powershell", &output));
        }

        parse_layout_output(&String::from_utf8_lossy(&output.stdout))
    }

    fn run_partition_script(&self, script_path: &Path) -> Result<String, RepairError> {
        let output = Command::new("diskpart")
            .arg("/s")
            .arg(script_path)
            .output()?;
        if !output.status.success() {
            return Err(RepairError::tool_failed("diskpart", &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

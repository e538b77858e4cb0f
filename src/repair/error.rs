use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepairError {
    #[error("Administrator privileges are required to modify the partition table")]
    NotElevated,

    #[error("Failed to parse reagentc output: {0}")]
    StatusParse(String),

    #[error("Cannot repair in the current state: {0}")]
    InvalidState(String),

    #[error("{tool} failed: {output}")]
    ToolFailed { tool: String, output: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RepairError {
    /// Build a `ToolFailed` from an external tool's captured output.
    /// Keeps the raw text verbatim so a failed diskpart run can be diagnosed
    /// from the log alone.
    pub fn tool_failed(tool: &str, output: &std::process::Output) -> Self {
        let mut text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if !stderr.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(stderr);
        }
        let code = output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        RepairError::ToolFailed {
            tool: tool.to_string(),
            output: format!("exit code {code}: {text}"),
        }
    }
}

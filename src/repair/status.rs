use regex::Regex;

use crate::repair::error::RepairError;

/// Where the registered WinRE volume lives, as reported by `reagentc /info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinreLocation {
    pub disk: u32,
    pub partition: u32,
}

/// Snapshot of WinRE registration at inspection time. Read once per run,
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinreStatus {
    pub enabled: bool,
    pub location: Option<WinreLocation>,
}

/// Parse the free-text output of `reagentc /info`.
///
/// The enabled marker is a "Windows RE status" line containing "Enabled".
/// The location is scraped from the device path, e.g.
/// `\\?\GLOBALROOT\device\harddisk0\partition4\Recovery\WindowsRE`.
///
/// An enabled status with no parsable location is malformed tool output and
/// fatal for the run; a disabled status legitimately carries no location.
pub fn parse_winre_info(text: &str) -> Result<WinreStatus, RepairError> {
    let enabled = text.lines().any(|line| {
        let line = line.trim().to_ascii_lowercase();
        line.contains("windows re status") && line.contains("enabled") && !line.contains("disabled")
    });

    let location_re = Regex::new(r"(?i)harddisk(\d+)\\partition(\d+)")
        .map_err(|e| RepairError::StatusParse(format!("invalid location pattern: {e}")))?;

    // A digit run can still overflow u32; that must surface as a parse
    // failure, never fall back to a guessed index.
    let location = match location_re.captures(text) {
        Some(caps) => Some(WinreLocation {
            disk: parse_index("disk", &caps[1])?,
            partition: parse_index("partition", &caps[2])?,
        }),
        None => None,
    };

    if enabled && location.is_none() {
        return Err(RepairError::StatusParse(format!(
            "status reports WinRE enabled but no harddiskN\\partitionM location was found in:\n{}",
            text.trim()
        )));
    }

    Ok(WinreStatus { enabled, location })
}

fn parse_index(what: &str, digits: &str) -> Result<u32, RepairError> {
    digits
        .parse()
        .map_err(|_| RepairError::StatusParse(format!("{what} index '{digits}' is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENABLED_INFO: &str = r"
Windows Recovery Environment (Windows RE) and system reset configuration
Information:

    Windows RE status:         Enabled
    Windows RE location:       \\?\GLOBALROOT\device\harddisk0\partition4\Recovery\WindowsRE
    Boot Configuration Data (BCD) identifier: 00000000-0000-0000-0000-000000000000
";

    const DISABLED_INFO: &str = r"
Windows Recovery Environment (Windows RE) and system reset configuration
Information:

    Windows RE status:         Disabled
";

    #[test]
    fn parses_enabled_with_location() {
        let status = parse_winre_info(ENABLED_INFO).unwrap();
        assert!(status.enabled);
        assert_eq!(
            status.location,
            Some(WinreLocation { disk: 0, partition: 4 })
        );
    }

    #[test]
    fn parses_device_path_variant() {
        let text = r"Windows RE status: Enabled
Windows RE location: \\Device\Harddisk0\Partition4";
        let status = parse_winre_info(text).unwrap();
        assert!(status.enabled);
        assert_eq!(
            status.location,
            Some(WinreLocation { disk: 0, partition: 4 })
        );
    }

    #[test]
    fn parses_multi_digit_indices() {
        let text = r"Windows RE status: Enabled
Windows RE location: \\?\GLOBALROOT\device\harddisk12\partition15\Recovery\WindowsRE";
        let status = parse_winre_info(text).unwrap();
        assert_eq!(
            status.location,
            Some(WinreLocation { disk: 12, partition: 15 })
        );
    }

    #[test]
    fn disabled_yields_no_location() {
        let status = parse_winre_info(DISABLED_INFO).unwrap();
        assert!(!status.enabled);
        assert_eq!(status.location, None);
    }

    #[test]
    fn disabled_marker_is_not_mistaken_for_enabled() {
        // "Disabled" contains "abled" but not the enabled marker
        let status = parse_winre_info("Windows RE status: Disabled").unwrap();
        assert!(!status.enabled);
    }

    #[test]
    fn enabled_without_location_is_a_parse_error() {
        let text = "Windows RE status: Enabled\nWindows RE location: <garbled>";
        let err = parse_winre_info(text).unwrap_err();
        assert!(matches!(err, RepairError::StatusParse(_)));
    }

    #[test]
    fn overflowing_index_is_a_parse_error_not_disk_zero() {
        let text = r"Windows RE status: Enabled
Windows RE location: \\?\GLOBALROOT\device\harddisk99999999999\partition4\Recovery\WindowsRE";
        let err = parse_winre_info(text).unwrap_err();
        assert!(matches!(err, RepairError::StatusParse(_)));
    }

    #[test]
    fn empty_output_parses_as_disabled() {
        let status = parse_winre_info("").unwrap();
        assert!(!status.enabled);
        assert_eq!(status.location, None);
    }
}

use crate::repair::error::RepairError;
use crate::repair::status::WinreLocation;

/// Partition table style of the target disk. The recovery partition type
/// identifier differs between the two, so the repair must know which one it
/// is dealing with before generating any directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionStyle {
    Gpt,
    Mbr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionInfo {
    pub number: u32,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskLayout {
    pub style: PartitionStyle,
    pub partitions: Vec<PartitionInfo>,
}

/// Parse the pipe-delimited enumeration emitted by the PowerShell query:
/// first line is the disk's partition style, every following line is
/// `PartitionNumber|SizeInBytes`.
pub fn parse_layout_output(text: &str) -> Result<DiskLayout, RepairError> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let style = match lines.next() {
        Some(s) if s.eq_ignore_ascii_case("GPT") => PartitionStyle::Gpt,
        Some(s) if s.eq_ignore_ascii_case("MBR") => PartitionStyle::Mbr,
        Some(other) => {
            return Err(RepairError::InvalidState(format!(
                "unsupported partition style '{other}' (expected GPT or MBR)"
            )));
        }
        None => {
            return Err(RepairError::StatusParse(
                "partition enumeration returned no output".to_string(),
            ));
        }
    };

    let mut partitions = Vec::new();
    for line in lines {
        let mut parts = line.split('|');
        let number = parts.next().and_then(|n| n.trim().parse::<u32>().ok());
        let size = parts.next().and_then(|s| s.trim().parse::<u64>().ok());
        match (number, size) {
            (Some(number), Some(size_bytes)) => partitions.push(PartitionInfo { number, size_bytes }),
            _ => {
                return Err(RepairError::StatusParse(format!(
                    "unexpected partition record: '{line}'"
                )));
            }
        }
    }

    Ok(DiskLayout { style, partitions })
}

/// The computed shrink-and-recreate plan. Consumed once by the script
/// builder, then discarded with the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlan {
    pub disk: u32,
    /// Partition immediately before WinRE; gives up 250 MB.
    pub shrink_partition: u32,
    /// The WinRE partition itself; deleted and recreated.
    pub winre_partition: u32,
    pub style: PartitionStyle,
    /// Size of the existing WinRE partition. Logged, never acted on.
    pub winre_size_bytes: u64,
}

impl ResizePlan {
    /// Validate the layout against the repair's preconditions and build the
    /// plan. The shrink targets the partition before WinRE and the recreate
    /// assumes WinRE is last on the disk, so anything else is refused, even
    /// under --force.
    pub fn build(location: WinreLocation, layout: &DiskLayout) -> Result<Self, RepairError> {
        let winre = layout
            .partitions
            .iter()
            .find(|p| p.number == location.partition)
            .ok_or_else(|| {
                RepairError::InvalidState(format!(
                    "partition {} not found on disk {}",
                    location.partition, location.disk
                ))
            })?;

        let last = layout.partitions.iter().map(|p| p.number).max().unwrap_or(0);
        if winre.number != last {
            return Err(RepairError::InvalidState(format!(
                "WinRE partition {} is not the last partition on disk {} (last is {}); \
                 the shrink-and-recreate repair only supports a trailing recovery partition",
                winre.number, location.disk, last
            )));
        }

        let predecessor = winre.number.checked_sub(1).filter(|n| *n >= 1);
        let shrink_partition = match predecessor {
            Some(n) if layout.partitions.iter().any(|p| p.number == n) => n,
            _ => {
                return Err(RepairError::InvalidState(format!(
                    "no partition precedes WinRE partition {} on disk {}; nothing to shrink",
                    winre.number, location.disk
                )));
            }
        };

        Ok(ResizePlan {
            disk: location.disk,
            shrink_partition,
            winre_partition: winre.number,
            style: layout.style,
            winre_size_bytes: winre.size_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(style: PartitionStyle, numbers: &[(u32, u64)]) -> DiskLayout {
        DiskLayout {
            style,
            partitions: numbers
                .iter()
                .map(|&(number, size_bytes)| PartitionInfo { number, size_bytes })
                .collect(),
        }
    }

    #[test]
    fn parses_gpt_enumeration() {
        let text = "GPT\n1|104857600\n3|255057920000\n4|554696704\n";
        let layout = parse_layout_output(text).unwrap();
        assert_eq!(layout.style, PartitionStyle::Gpt);
        assert_eq!(layout.partitions.len(), 3);
        assert_eq!(
            layout.partitions[2],
            PartitionInfo { number: 4, size_bytes: 554_696_704 }
        );
    }

    #[test]
    fn parses_mbr_enumeration_case_insensitively() {
        let layout = parse_layout_output("mbr\n1|1000\n2|2000").unwrap();
        assert_eq!(layout.style, PartitionStyle::Mbr);
    }

    #[test]
    fn raw_style_is_invalid_state() {
        let err = parse_layout_output("RAW\n").unwrap_err();
        assert!(matches!(err, RepairError::InvalidState(_)));
    }

    #[test]
    fn malformed_record_is_a_parse_error() {
        let err = parse_layout_output("GPT\nnot-a-record").unwrap_err();
        assert!(matches!(err, RepairError::StatusParse(_)));
    }

    #[test]
    fn builds_plan_when_winre_is_last() {
        let location = WinreLocation { disk: 0, partition: 4 };
        let layout = layout(
            PartitionStyle::Gpt,
            &[(1, 100), (2, 200), (3, 300), (4, 554_696_704)],
        );
        let plan = ResizePlan::build(location, &layout).unwrap();
        assert_eq!(plan.disk, 0);
        assert_eq!(plan.shrink_partition, 3);
        assert_eq!(plan.winre_partition, 4);
        assert_eq!(plan.style, PartitionStyle::Gpt);
        assert_eq!(plan.winre_size_bytes, 554_696_704);
    }

    #[test]
    fn refuses_when_winre_is_not_last() {
        let location = WinreLocation { disk: 0, partition: 3 };
        let layout = layout(PartitionStyle::Gpt, &[(1, 100), (2, 200), (3, 300), (4, 400)]);
        let err = ResizePlan::build(location, &layout).unwrap_err();
        assert!(matches!(err, RepairError::InvalidState(_)));
    }

    #[test]
    fn refuses_when_winre_partition_is_missing_from_disk() {
        let location = WinreLocation { disk: 1, partition: 9 };
        let layout = layout(PartitionStyle::Mbr, &[(1, 100), (2, 200)]);
        let err = ResizePlan::build(location, &layout).unwrap_err();
        assert!(matches!(err, RepairError::InvalidState(_)));
    }

    #[test]
    fn refuses_when_no_predecessor_exists() {
        let location = WinreLocation { disk: 0, partition: 1 };
        let layout = layout(PartitionStyle::Gpt, &[(1, 100)]);
        let err = ResizePlan::build(location, &layout).unwrap_err();
        assert!(matches!(err, RepairError::InvalidState(_)));
    }

    #[test]
    fn refuses_gap_before_winre() {
        // Partition numbering with a hole right before WinRE: select would
        // target a nonexistent partition, so the plan must refuse.
        let location = WinreLocation { disk: 0, partition: 4 };
        let layout = layout(PartitionStyle::Mbr, &[(1, 100), (2, 200), (4, 400)]);
        let err = ResizePlan::build(location, &layout).unwrap_err();
        assert!(matches!(err, RepairError::InvalidState(_)));
    }
}

use crate::repair::layout::{PartitionStyle, ResizePlan};

/// GPT partition type for a Windows recovery partition.
pub const GPT_RECOVERY_TYPE: &str = "de94bba4-06d1-4d40-a16a-bfd50179d6ac";

/// Hidden + no-drive-letter; Windows requires these flags to recognize a GPT
/// partition as the recovery partition.
pub const GPT_RECOVERY_ATTRIBUTES: &str = "0x8000000000000001";

/// MBR partition type code for a recovery partition.
pub const MBR_RECOVERY_TYPE: &str = "27";

/// KB5034441 needs at least this much additional space for the WinRE update
/// tooling. Desired and minimum are both pinned to it so the shrink either
/// yields the full amount or fails outright.
pub const SHRINK_MB: u32 = 250;

/// Render the ordered diskpart directives for a resize plan.
///
/// The directives shrink the partition before WinRE, delete the WinRE
/// partition (override, because recovery partitions are a protected type),
/// recreate it with the style-appropriate type identifier, and format it.
/// diskpart consumes the result via `/s <file>`.
pub fn build_diskpart_script(plan: &ResizePlan) -> String {
    let mut lines = vec![
        format!("select disk {}", plan.disk),
        format!("select partition {}", plan.shrink_partition),
        format!("shrink desired={SHRINK_MB} minimum={SHRINK_MB}"),
        format!("select partition {}", plan.winre_partition),
        "delete partition override".to_string(),
    ];

    match plan.style {
        PartitionStyle::Gpt => {
            lines.push(format!("create partition primary id={GPT_RECOVERY_TYPE}"));
            lines.push(format!("gpt attributes={GPT_RECOVERY_ATTRIBUTES}"));
        }
        PartitionStyle::Mbr => {
            lines.push(format!("create partition primary id={MBR_RECOVERY_TYPE}"));
        }
    }

    lines.push("format quick fs=ntfs label=\"Windows RE tools\"".to_string());

    let mut script = lines.join("\n");
    script.push('\n');
    script
}

mod repair;

use clap::Parser;
use std::path::PathBuf;

/// Repairs the Windows RE partition sizing defect from KB5034441 by
/// shrinking the preceding partition and recreating the recovery partition
/// with 250 MB of additional space.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Attempt the repair even if Windows RE reports as disabled
    #[arg(short, long)]
    force: bool,

    /// Directory for the per-run log file (defaults to the system temp dir)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    let log_dir = cli.log_dir.unwrap_or_else(std::env::temp_dir);

    if let Err(e) = repair::handle_repair_command(cli.force, &log_dir) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

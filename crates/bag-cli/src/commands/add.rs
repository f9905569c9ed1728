use std::path::PathBuf;

use anyhow::Result;
use bag_core::Bag;
use clap::Args;

use super::report_outcome;
use crate::Cli;

#[derive(Args)]
pub struct AddArgs {
    /// Bag directory
    bag: PathBuf,

    /// File to copy into the bag
    file: PathBuf,

    /// Add to the payload instead of as a tag file
    #[arg(long)]
    payload: bool,

    /// Destination below data/ (payload only; default: the file name)
    #[arg(long, requires = "payload", value_name = "REL")]
    dest: Option<String>,

    /// Worker threads used for hashing
    #[arg(short, long, env = "BAGR_PROCESSES", default_value_t = 1)]
    processes: usize,
}

pub fn run(args: &AddArgs, _cli: &Cli) -> Result<i32> {
    let bag = Bag::open(&args.bag)?;
    let outcome = if args.payload {
        bag.add_payload_file(&args.file, args.dest.as_deref(), args.processes)
    } else {
        bag.add_tag_file(&args.file, args.processes)
    };
    report_outcome(outcome)
}

use std::path::PathBuf;

use anyhow::Result;
use bag_core::{Bag, ValidateOptions, ValidationMode};
use clap::Args;

use super::report_outcome;
use crate::Cli;

#[derive(Args)]
pub struct ValidateArgs {
    /// Bag directory
    bag: PathBuf,

    /// Only compare Payload-Oxum; skips digest recomputation
    #[arg(long)]
    fast: bool,

    /// Worker threads used for hashing
    #[arg(short, long, env = "BAGR_PROCESSES", default_value_t = 1)]
    processes: usize,
}

pub fn run(args: &ValidateArgs, _cli: &Cli) -> Result<i32> {
    let bag = Bag::open(&args.bag)?;
    let options = ValidateOptions {
        mode: if args.fast {
            ValidationMode::Fast
        } else {
            ValidationMode::Complete
        },
        processes: args.processes,
    };
    report_outcome(bag.validate(&options))
}

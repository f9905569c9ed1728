use std::path::PathBuf;

use anyhow::{Context, Result};
use bag_core::{Bag, CreateOptions};
use bag_hash::HashAlgorithm;
use clap::Args;

use super::parse_algorithm;
use crate::Cli;

#[derive(Args)]
pub struct CreateArgs {
    /// Directory to bag; its contents are moved into data/
    dir: PathBuf,

    /// Checksum algorithm; repeat or comma-separate for several manifests
    #[arg(
        short,
        long = "algorithm",
        env = "BAGR_ALGORITHM",
        value_delimiter = ',',
        value_parser = parse_algorithm,
        default_value = "sha256"
    )]
    algorithms: Vec<HashAlgorithm>,

    /// Worker threads used for hashing
    #[arg(short, long, env = "BAGR_PROCESSES", default_value_t = 1)]
    processes: usize,

    /// Extra bag-info.txt record
    #[arg(short, long = "tag", value_name = "LABEL=VALUE", value_parser = parse_tag)]
    tags: Vec<(String, String)>,
}

fn parse_tag(raw: &str) -> Result<(String, String), String> {
    let (label, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=VALUE, got '{raw}'"))?;
    let label = label.trim();
    if label.is_empty() || label.contains(':') {
        return Err(format!("invalid tag label '{label}'"));
    }
    Ok((label.to_string(), value.trim().to_string()))
}

pub fn run(args: &CreateArgs, _cli: &Cli) -> Result<i32> {
    let today = chrono::Local::now().date_naive();
    let mut options = CreateOptions::new(today)
        .with_algorithms(args.algorithms.iter().copied())
        .with_processes(args.processes);
    options.extra_tags = args.tags.clone();

    let bag = Bag::create(&args.dir, &options)
        .with_context(|| format!("unable to create bag in '{}'", args.dir.display()))?;
    println!("created bag at {}", bag.root().display());
    Ok(0)
}

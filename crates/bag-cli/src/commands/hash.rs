use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use bag_hash::{digest_file, HashAlgorithm};
use clap::Args;

use super::parse_algorithm;
use crate::Cli;

#[derive(Args)]
pub struct HashArgs {
    /// Checksum algorithm
    #[arg(
        short,
        long,
        env = "BAGR_ALGORITHM",
        value_parser = parse_algorithm,
        default_value = "sha256"
    )]
    algorithm: HashAlgorithm,

    /// Files to hash
    #[arg(value_name = "file", required = true)]
    files: Vec<PathBuf>,
}

pub fn run(args: &HashArgs, _cli: &Cli) -> Result<i32> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for file in &args.files {
        let digest = digest_file(args.algorithm, file)
            .with_context(|| format!("unable to hash '{}'", file.display()))?;
        writeln!(out, "{digest}  {}", file.display())?;
    }

    Ok(0)
}

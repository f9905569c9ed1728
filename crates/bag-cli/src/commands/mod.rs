pub mod add;
pub mod create;
pub mod hash;
pub mod validate;

use anyhow::Result;
use bag_core::{BagError, ValidationReport};
use bag_hash::HashAlgorithm;
use clap::Subcommand;

use crate::Cli;

/// Exit status for a bag that was inspected and found invalid.
pub const EXIT_INVALID: i32 = 1;

#[derive(Subcommand)]
pub enum Commands {
    /// Turn a directory into a bag in place
    Create(create::CreateArgs),
    /// Check a bag's payload against its manifests
    Validate(validate::ValidateArgs),
    /// Add a tag file or payload file to an existing bag
    Add(add::AddArgs),
    /// Print file digests in manifest format
    Hash(hash::HashArgs),
}

pub fn run(cli: Cli) -> Result<i32> {
    match &cli.command {
        Commands::Create(args) => create::run(args, &cli),
        Commands::Validate(args) => validate::run(args, &cli),
        Commands::Add(args) => add::run(args, &cli),
        Commands::Hash(args) => hash::run(args, &cli),
    }
}

/// clap value parser for `--algorithm`.
pub fn parse_algorithm(name: &str) -> Result<HashAlgorithm, String> {
    name.parse::<HashAlgorithm>().map_err(|e| {
        let known: Vec<&str> = HashAlgorithm::ALL.iter().map(|a| a.name()).collect();
        format!("{e} (supported: {})", known.join(", "))
    })
}

/// Print the outcome of an operation that ends in validation.
///
/// An invalid bag is a normal outcome with its own exit code; anything else
/// propagates as a fatal error.
pub fn report_outcome(outcome: Result<ValidationReport, BagError>) -> Result<i32> {
    match outcome {
        Ok(report) => {
            println!("{}", report.message());
            Ok(if report.is_valid() { 0 } else { EXIT_INVALID })
        }
        Err(BagError::Invalid(report)) => {
            println!("{}", report.message());
            Ok(EXIT_INVALID)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_parser() {
        assert_eq!(parse_algorithm("SHA-512"), Ok(HashAlgorithm::Sha512));
        let err = parse_algorithm("crc32").unwrap_err();
        assert!(err.contains("md5"), "{err}");
    }
}

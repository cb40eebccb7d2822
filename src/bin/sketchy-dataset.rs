//! Sketchy dataset CLI tool
//!
//! Prepares sketch/photo train-test splits, samples triplets and evaluates
//! retrieval using the sketchy-dataset library.

#[cfg(feature = "cli")]
use sketchy_dataset::cli;

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}

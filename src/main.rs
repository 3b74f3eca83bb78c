use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use birdclef_manifest::cli::{run, Args};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    run(&args)?;
    Ok(())
}

use std::io::{self, BufWriter};

use anyhow::Result;
use clap::Parser;

use neo_explorer::cli::{self, Cli};
use neo_explorer::load_database;

fn main() -> Result<()> {
    env_logger::init();

    let args = Cli::parse();
    let db = load_database(&args.neofile, &args.cadfile)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    cli::run(&args, &db, &mut out)
}

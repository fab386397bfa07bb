//! Decompresses a BGZF file to a plain file, ignoring block boundaries.

use clap::Parser;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;

#[derive(Debug, Parser)]
struct Cli {
    #[command()]
    input_file: String,
    #[arg(short, long)]
    output: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let file_reader = BufReader::new(File::open(&cli.input_file)?);
    let mut file_writer = File::create(&cli.output)?;

    let mut reader = MultiGzDecoder::new(file_reader);
    std::io::copy(&mut reader, &mut file_writer)?;

    Ok(())
}

//! Prints the lines of a Tabix-indexed file overlapping a region, in the
//! style of `tabix -h file.vcf.gz chr1:100-200`.

use clap::Parser;
use std::io::{stdout, Write};
use tabix_reader::TabixReader;

#[derive(Debug, Parser)]
struct Args {
    /// Path to the BGZF-compressed data file (its `.tbi` index must sit
    /// alongside it).
    file: String,
    /// Region as `ref:begin-end`, 1-based inclusive.
    region: String,
}

fn parse_region(region: &str) -> anyhow::Result<(&str, u64, u64)> {
    let (name, range) = region
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("expected ref:begin-end, got {region:?}"))?;
    let (begin, end) = range
        .split_once('-')
        .ok_or_else(|| anyhow::anyhow!("expected ref:begin-end, got {region:?}"))?;
    Ok((name, begin.parse()?, end.parse()?))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let (ref_name, begin, end) = parse_region(&args.region)?;

    let mut reader = TabixReader::from_path(&args.file)?;
    let stdout = stdout();
    let mut out = stdout.lock();

    for line in reader.fetch(ref_name, begin, end)? {
        out.write_all(&line?)?;
        out.write_all(b"\n")?;
    }

    Ok(())
}

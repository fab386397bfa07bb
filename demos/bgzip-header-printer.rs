//! Prints the per-member header metadata of a BGZF file, one line per block.

use clap::Parser;
use std::fs::File;
use std::io::{stdout, BufReader, Read, Seek, SeekFrom, Write};

#[derive(Debug, Parser)]
struct Args {
    #[command()]
    file: String,
    #[arg(short, long)]
    output: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let parser = Args::parse();

    let mut file = BufReader::new(File::open(&parser.file)?);
    let mut out: Box<dyn Write> = if let Some(out) = parser.output {
        Box::new(File::create(out)?)
    } else {
        Box::new(stdout().lock())
    };

    writeln!(out, "offset\theader-size\tcompressed-size\tdecompressed-size")?;

    loop {
        let offset = file.stream_position()?;
        let header = tabix_reader::header::BgzfHeader::from_reader(&mut file)?;
        let compressed_size = header.block_size()?;
        file.seek(SeekFrom::Current(
            compressed_size as i64 - header.header_size() as i64 - 4,
        ))?;

        let mut size_buf: [u8; 4] = [0, 0, 0, 0];
        file.read_exact(&mut size_buf)?;
        let uncompressed_size = u32::from_le_bytes(size_buf);
        writeln!(
            out,
            "{offset}\t{}\t{compressed_size}\t{uncompressed_size}",
            header.header_size()
        )?;

        if uncompressed_size == 0 {
            break;
        }
    }

    Ok(())
}

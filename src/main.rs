use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sim8086")]
#[command(about = "Disassemble 8086 machine code into nasm syntax", long_about = None)]
struct Args {
  /// Machine code image to decode
  file: PathBuf,

  /// Print bare instruction lines without the `bits 16` header
  #[arg(long)]
  no_header: bool,
}

fn main() -> Result<()> {
  env_logger::init();
  let args = Args::parse();

  let data = std::fs::read(&args.file)
    .with_context(|| format!("Error reading file `{}`", args.file.display()))?;
  log::debug!("read {} bytes from {}", data.len(), args.file.display());

  if args.no_header {
    let lines = sim8086::decode_lines(&data)
      .with_context(|| format!("Error decoding `{}`", args.file.display()))?;
    for line in lines {
      println!("{line}");
    }
  } else {
    let instructions = sim8086::disassemble(&data)
      .with_context(|| format!("Error decoding `{}`", args.file.display()))?;
    print!("; src: `{}`\n{instructions}", args.file.display());
  }
  Ok(())
}

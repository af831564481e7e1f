use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;

use k0s_decay::{
    decoder::CatalogDecoder, format::OutputFormat, image::Image, program::Program,
    strategy::Strategy, Address,
};

fn parse_addr(s: &str) -> Result<Address, String> {
    let trimmed = s.trim();
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Address::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex address '{}': {}", s, e))
    } else {
        Address::from_str(trimmed).map_err(|e| format!("Invalid address '{}': {}", s, e))
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Flow-following disassembler for NEC 78K/0S flash images"
)]
struct Cli {
    /// Raw flash image to disassemble
    image: PathBuf,

    /// Disassembly strategy
    #[arg(short, long, value_enum, default_value_t = Strategy::Recursive)]
    strategy: Strategy,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Start address (hex with 0x or decimal); replaces the vector table scan
    #[arg(short, long = "entry", value_parser = parse_addr)]
    entries: Vec<Address>,

    /// Write the listing here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let image = Image::open(&cli.image)
        .with_context(|| format!("failed to read image {}", cli.image.display()))?;
    log::info!("Disassembling {} with {}", image, cli.strategy);

    let decoder = CatalogDecoder::new();
    let mut program = Program::new(image);
    if cli.entries.is_empty() {
        cli.strategy.run(&mut program, &decoder)?;
    } else {
        cli.strategy.run_from(&mut program, &decoder, &cli.entries)?;
    }

    let listing = cli.format.get_formatter().format(&program)?;
    match &cli.output {
        Some(path) => fs::write(path, listing)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", listing),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0x82", 0x82)]
    #[case("0XFF00", 0xFF00)]
    #[case("130", 130)]
    #[case(" 0x0082 ", 0x82)]
    fn test_parse_addr(#[case] input: &str, #[case] expected: Address) {
        assert_eq!(parse_addr(input), Ok(expected));
    }

    #[test]
    fn test_parse_addr_rejects_garbage() {
        assert!(parse_addr("0xZZ").is_err());
        assert!(parse_addr("label_0082").is_err());
    }

    #[test]
    fn test_cli_arguments() {
        let cli = Cli::try_parse_from([
            "k0s-decay",
            "fw.bin",
            "--strategy",
            "linear",
            "--format",
            "json-lines",
            "--entry",
            "0x82",
            "--entry",
            "0x100",
        ])
        .unwrap();

        assert_eq!(cli.strategy, Strategy::Linear);
        assert_eq!(cli.format, OutputFormat::JsonLines);
        assert_eq!(cli.entries, vec![0x82, 0x100]);
        assert!(cli.output.is_none());

        let cli = Cli::try_parse_from(["k0s-decay", "fw.bin"]).unwrap();
        assert_eq!(cli.strategy, Strategy::Recursive);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.entries.is_empty());
    }
}

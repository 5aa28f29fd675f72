use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rasterpaint::CanvasSize;

#[derive(Parser, Debug)]
#[command(name = "rasterpaint", about = "Replay a drawing command script onto a canvas")]
struct Cli {
    /// JSON array of canvas commands.
    script: PathBuf,

    /// Canvas size as WIDTHxHEIGHT; defaults to config.json or 1000x1000.
    #[arg(long, value_parser = parse_size)]
    size: Option<CanvasSize>,
}

fn parse_size(value: &str) -> Result<CanvasSize, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value:?}"))?;
    Ok(CanvasSize::from_input(width, height))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    rasterpaint::run(&cli.script, cli.size)
        .with_context(|| format!("failed to replay {}", cli.script.display()))
}

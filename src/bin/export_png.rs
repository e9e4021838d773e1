use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use nes_special_editor::{export::write_png, SpecialManager};

#[derive(Parser, Debug)]
struct Args {
    /// Special definitions file; built-in special content is used when it does not exist
    #[arg(long)]
    path: PathBuf,

    /// PNG file to write
    #[arg(long)]
    output: PathBuf,

    /// Special palette row used to color the tiles (0-7)
    #[arg(long, default_value_t = 0)]
    row: usize,
}

pub fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut manager = SpecialManager::new()?;
    manager
        .load(&args.path)
        .with_context(|| format!("Unable to load {}", args.path.display()))?;
    write_png(
        &args.output,
        manager.special_table(),
        manager.special_palette(),
        args.row,
    )
    .with_context(|| format!("Unable to export {}", args.output.display()))?;
    Ok(())
}

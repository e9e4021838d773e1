use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use nes_special_editor::{
    common::{BlockValue, LevelType},
    config::{get_global_config_path, GlobalConfig},
    properties::parse_hex,
    LoadSource, SpecialManager,
};

#[derive(Parser, Debug)]
struct Args {
    /// Special definitions file (graphics are read from the `.chr` file beside it)
    #[arg(long)]
    path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize the loaded special content
    Info,
    /// Look up the behavior of a block
    Property { level_type: String, block: String },
    /// Load the special content and write it to another location
    Copy { output: PathBuf },
    /// Remember a project directory for later runs
    SetProject { dir: PathBuf },
}

fn parse_byte(s: &str) -> Result<u8> {
    let v = parse_hex(s)?;
    u8::try_from(v).with_context(|| format!("{} does not fit in a byte", s))
}

fn open_manager(path: Option<&PathBuf>) -> Result<SpecialManager> {
    let mut manager = SpecialManager::new()?;
    match path {
        Some(path) => {
            let source = manager
                .load(path)
                .with_context(|| format!("Unable to load {}", path.display()))?;
            if source == LoadSource::Defaults {
                info!("{} not found, using built-in special content", path.display());
            }
        }
        None => {
            manager.load_default_specials()?;
            manager.load_default_special_graphics()?;
        }
    }
    Ok(manager)
}

pub fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config_path = get_global_config_path()?;
    let mut config = GlobalConfig::load(&config_path)?;
    let path = args.path.clone().or_else(|| config.special_path());

    match args.command {
        Command::Info => {
            let manager = open_manager(path.as_ref())?;
            let palette = manager.special_palette();
            println!("Banks: {}", manager.banks().len());
            println!("Palette: {}", palette.name);
            for lt in manager.level_types() {
                if let Some(def) = manager.get_special_definition(lt) {
                    println!(
                        "Level type {:X}: {} special blocks, {} block properties",
                        lt,
                        def.len(),
                        manager.block_properties().block_count(lt)
                    );
                }
            }
        }
        Command::Property { level_type, block } => {
            let level_type: LevelType = parse_byte(&level_type)?;
            let block: BlockValue = parse_byte(&block)?;
            let manager = SpecialManager::new()?;
            let property = manager.get_property(level_type, block)?;
            println!("{}", property);
        }
        Command::Copy { output } => {
            let manager = open_manager(path.as_ref())?;
            if path.as_ref() == Some(&output) {
                bail!("Output must differ from the input.");
            }
            manager
                .save(&output)
                .with_context(|| format!("Unable to save {}", output.display()))?;
        }
        Command::SetProject { dir } => {
            config.set_project_dir(dir);
            config.save(&config_path)?;
        }
    }
    Ok(())
}

use anyhow::Result;
use lineup_resolve::config::{config_file_path, ensure_config_file, Config};

#[derive(Debug, clap::Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a commented default config file if none exists
    Init,
}

pub fn run_config(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("Config file: {}", config_file_path().display());
            println!("  database_path: {}", config.database_path.display());
            println!("  batch_size:    {}", config.batch_size);
        }
        ConfigAction::Init => {
            let path = config_file_path();
            if ensure_config_file()? {
                println!("Created {}", path.display());
            } else {
                println!("Config file already exists at {}", path.display());
            }
        }
    }
    Ok(())
}

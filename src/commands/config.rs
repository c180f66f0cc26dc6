use anyhow::Result;
use calgrid_core::config::{Config, SERVER_ENV};
use owo_colors::OwoColorize;

pub fn path() -> Result<()> {
    let config_path = Config::config_path()?;
    let config = Config::load()?;

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!("{}", "Service".bold());
    println!("  URL:     {}", config.server_url);
    if std::env::var(SERVER_ENV).is_ok() {
        println!("  {}", format!("(from ${SERVER_ENV})").dimmed());
    }

    Ok(())
}

pub fn init() -> Result<()> {
    let config_path = Config::config_path()?;

    if config_path.exists() {
        println!("{} {}", "Config already exists at".dimmed(), config_path.display());
        return Ok(());
    }

    Config::create_default_config(&config_path)?;
    println!("{} {}", "Wrote".green(), config_path.display());
    Ok(())
}

use anyhow::{Context, Result};
use colored::Colorize;
use ethos_infrastructure::ConfigService;

/// Prints the effective configuration, optionally creating the file first.
///
/// An invalid file is still shown, followed by the validation error.
pub fn run(service: &ConfigService, init: bool) -> Result<()> {
    if init {
        if service.init()? {
            println!(
                "{}",
                format!("Wrote default config to {}", service.path().display()).bright_green()
            );
        } else {
            println!(
                "{}",
                format!("Config already exists at {}", service.path().display()).yellow()
            );
        }
    }

    let config = service.load_effective()?;
    let rendered = toml::to_string_pretty(&config).context("Failed to render config")?;

    println!("{}", format!("# {}", service.path().display()).bright_black());
    print!("{}", rendered);
    if let Err(e) = config.validate() {
        eprintln!("{}", format!("Warning: {}", e).yellow());
    }
    Ok(())
}

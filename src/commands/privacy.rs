use anyhow::{Result, bail};
use opcal_core::settings::SharedSettings;
use owo_colors::OwoColorize;

pub fn run(state: Option<&str>) -> Result<()> {
    let settings = SharedSettings::load()?;

    match state {
        None => {
            let mode = if settings.current().privacy_mode {
                "on".green().to_string()
            } else {
                "off".dimmed().to_string()
            };
            println!("Privacy mode is {mode}");
        }
        Some("on") => {
            settings.set_privacy_mode(true)?;
            println!("Privacy mode {}", "enabled".green());
        }
        Some("off") => {
            settings.set_privacy_mode(false)?;
            println!("Privacy mode {}", "disabled".dimmed());
        }
        Some(other) => bail!("Expected 'on' or 'off', got '{other}'"),
    }

    Ok(())
}

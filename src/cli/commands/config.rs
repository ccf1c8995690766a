//! Config command - show or initialize configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::RepoCacheResult;
use crate::ui::{self, Mark, UiContext};

/// Execute the config command
pub fn execute(args: ConfigArgs, manager: &ConfigManager, config: &Config) -> RepoCacheResult<()> {
    match args.action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => print!("{}", toml::to_string_pretty(config)?),
        ConfigAction::Path => println!("{}", manager.path().display()),
        ConfigAction::Init { force } => {
            let ctx = UiContext::detect();
            let path = manager.path().display().to_string();

            if manager.path().exists() && !force {
                ui::step(
                    &ctx,
                    Mark::Warn,
                    &format!("Config already exists at {}", path),
                    Some("use --force to overwrite"),
                );
            } else {
                manager.save(&Config::default())?;
                ui::step(&ctx, Mark::Ok, "Configuration initialized", Some(&path));
            }
        }
    }

    Ok(())
}

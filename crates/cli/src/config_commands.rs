use std::path::{Path, PathBuf};

use {anyhow::Result, clap::Subcommand};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the config file in effect (or where one would be created).
    Path,
}

pub fn handle_config(action: &ConfigAction, explicit: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Path => {
            let path = resolved_path(explicit);
            if path.exists() {
                println!("{}", path.display());
            } else {
                println!("{} (not created yet)", path.display());
            }
            Ok(())
        },
    }
}

fn resolved_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(conduit_config::find_or_default_config_path)
}

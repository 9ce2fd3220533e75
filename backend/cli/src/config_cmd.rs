//! CLI Config Command
//!
//! `config show` prints the effective config with secrets redacted;
//! `config init` writes a default file.

use anyhow::{bail, Result};

use streamchat_config::{apply_all_defaults, redacted_yaml, write_config, StreamChatConfig};

use crate::config::config_path;
use crate::terminal_output::note_success;
use crate::GlobalArgs;

pub fn show(config: &StreamChatConfig) -> Result<()> {
    print!("{}", redacted_yaml(config)?);
    Ok(())
}

pub async fn init(global: &GlobalArgs, force: bool) -> Result<()> {
    let path = config_path(global);
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }

    let config = apply_all_defaults(StreamChatConfig::default());
    write_config(&config, &path).await?;
    note_success(&format!("Wrote {}", path.display()));
    Ok(())
}

//! CLI Prompts Command
//!
//! Lists the suggested prompts from the config.

use anyhow::Result;

use streamchat_config::StreamChatConfig;

use crate::terminal_output::{note_info, paint, BOLD, DIM};

pub fn run(config: &StreamChatConfig) -> Result<()> {
    let prompts = config.prompts();
    if prompts.is_empty() {
        note_info("No suggested prompts configured");
        return Ok(());
    }

    println!("{}", paint(BOLD, "Suggested prompts"));
    for (i, prompt) in prompts.iter().enumerate() {
        println!("  {} {prompt}", paint(DIM, &format!("{}.", i + 1)));
    }
    println!();
    println!("Use one in chat with {}", paint(BOLD, "/use N"));
    Ok(())
}

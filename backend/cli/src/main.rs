mod ask_cmd;
mod chat_cmd;
mod config;
mod config_cmd;
mod prompts_cmd;
mod terminal_output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use streamchat_config::EndpointRequirement;

#[derive(Parser)]
#[command(name = "streamchat")]
#[command(about = "Chat with a hosted language model, streamed token by token")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone, Debug, Default)]
pub struct GlobalArgs {
    /// Path to the config file (default: ~/.streamchat/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Inference endpoint URL, overriding config and environment
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Use the offline echo endpoint instead of a remote one
    #[arg(long, global = true)]
    pub echo: bool,

    /// Disable colors and markdown styling
    #[arg(long, global = true)]
    pub plain: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (the default)
    Chat,
    /// Send one prompt and stream the reply to stdout
    Ask {
        prompt: String,
        #[arg(long)]
        max_new_tokens: Option<u32>,
        #[arg(long)]
        temperature: Option<f32>,
    },
    /// List the suggested prompts
    Prompts,
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config with secrets redacted
    Show,
    /// Write a default config file
    Init {
        /// Overwrite an existing file (the old one is kept as a backup)
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.global.plain {
        terminal_output::disable_color();
    }

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let config = config::load(&cli.global, endpoint_requirement(&cli.global)).await?;
            let endpoint = config::build_endpoint(&config, cli.global.echo)?;
            chat_cmd::run(&config, endpoint.as_ref(), cli.global.plain).await
        }
        Commands::Ask {
            prompt,
            max_new_tokens,
            temperature,
        } => {
            let config = config::load(&cli.global, endpoint_requirement(&cli.global)).await?;
            let endpoint = config::build_endpoint(&config, cli.global.echo)?;
            ask_cmd::run(&config, endpoint.as_ref(), &prompt, max_new_tokens, temperature).await
        }
        Commands::Prompts => {
            let config = config::load(&cli.global, EndpointRequirement::Optional).await?;
            prompts_cmd::run(&config)
        }
        Commands::Config {
            action: ConfigAction::Show,
        } => {
            let config = config::load(&cli.global, EndpointRequirement::Optional).await?;
            config_cmd::show(&config)
        }
        // Never loads the existing file, so a broken config can be replaced.
        Commands::Config {
            action: ConfigAction::Init { force },
        } => config_cmd::init(&cli.global, force).await,
    }
}

/// The echo endpoint needs no URL.
fn endpoint_requirement(global: &GlobalArgs) -> EndpointRequirement {
    if global.echo {
        EndpointRequirement::Optional
    } else {
        EndpointRequirement::Required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_chat() {
        let cli = Cli::try_parse_from(["streamchat", "--echo"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.global.echo);
    }

    #[test]
    fn parses_ask_with_parameters() {
        let cli = Cli::try_parse_from([
            "streamchat",
            "ask",
            "what is life?",
            "--max-new-tokens",
            "64",
            "--temperature",
            "0.7",
            "--plain",
        ])
        .unwrap();
        assert!(cli.global.plain);
        match cli.command {
            Some(Commands::Ask {
                prompt,
                max_new_tokens,
                temperature,
            }) => {
                assert_eq!(prompt, "what is life?");
                assert_eq!(max_new_tokens, Some(64));
                assert_eq!(temperature, Some(0.7));
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn parses_config_init_force() {
        let cli = Cli::try_parse_from(["streamchat", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Init { force: true }
            })
        ));
    }
}

//! Interactive chat REPL.
//!
//! Plain lines are submissions, sent exactly as typed; lines starting with
//! `/` are commands, and `//` sends a line that starts with a literal slash.

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use logging::{ChatEvent, ChatEventLogger};
use markdown::{CodeBlockAnalyzer, IrParser, Renderer};
use streamchat_config::StreamChatConfig;
use streamchat_core::{transcript, ChatError, ChatSession, InferenceEndpoint};

use crate::terminal_output::{
    note_error, note_info, note_success, note_warn, paint, TerminalSink, BOLD, CYAN, DIM, MAGENTA,
};

const HELP: &str = "\
Commands:
  /help          show this help
  /clear         forget the conversation
  /tokens N      set max new tokens (10-1024)
  /temp X        set temperature (0.1-2.5)
  /params        show generation parameters
  /prompts       list suggested prompts
  /use N         submit suggested prompt N
  /history       show the conversation
  /code          print code blocks of the last reply
  /save PATH     export the conversation (.json or .md)
  /quit          leave
  //text         send text starting with a literal /";

/// One parsed REPL line.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Submit(String),
    Help,
    Clear,
    Tokens(u32),
    Temperature(f32),
    Params,
    Prompts,
    Use(usize),
    History,
    Code,
    Save(PathBuf),
    Quit,
    Empty,
}

impl ReplCommand {
    /// Parse one input line. `Err` carries a usage message for the user.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            return Ok(ReplCommand::Empty);
        }
        if let Some(literal) = line.strip_prefix("//") {
            return Ok(ReplCommand::Submit(format!("/{literal}")));
        }
        let Some(command) = line.strip_prefix('/') else {
            return Ok(ReplCommand::Submit(line.to_string()));
        };
        let command = command.trim_end();

        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };
        match name {
            "help" | "?" => Ok(ReplCommand::Help),
            "clear" => Ok(ReplCommand::Clear),
            "tokens" => arg
                .parse()
                .map(ReplCommand::Tokens)
                .map_err(|_| "usage: /tokens N".to_string()),
            "temp" | "temperature" => arg
                .parse()
                .map(ReplCommand::Temperature)
                .map_err(|_| "usage: /temp X".to_string()),
            "params" => Ok(ReplCommand::Params),
            "prompts" => Ok(ReplCommand::Prompts),
            "use" => match arg.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(ReplCommand::Use(n)),
                _ => Err("usage: /use N (see /prompts)".to_string()),
            },
            "history" => Ok(ReplCommand::History),
            "code" => Ok(ReplCommand::Code),
            "save" if !arg.is_empty() => Ok(ReplCommand::Save(PathBuf::from(arg))),
            "save" => Err("usage: /save PATH".to_string()),
            "quit" | "exit" | "q" => Ok(ReplCommand::Quit),
            other => Err(format!("unknown command /{other}; try /help")),
        }
    }
}

/// Submit one input, stream the reply to stdout, and log chat events.
///
/// On error the partial reply stays on screen and nothing is recorded.
pub async fn submit_turn(
    session: &mut ChatSession,
    endpoint: &dyn InferenceEndpoint,
    input: &str,
) -> Result<(), ChatError> {
    // Rejected before anything is logged as submitted.
    if input.is_empty() {
        return Err(ChatError::EmptyInput);
    }
    let session_id = session.id().to_string();
    let parameters = session.parameters();
    ChatEventLogger::log_event(
        &session_id,
        ChatEvent::Submitted {
            input: input.to_string(),
            max_new_tokens: parameters.max_new_tokens(),
            temperature: parameters.temperature(),
        },
    );

    let start = Instant::now();
    let mut sink = TerminalSink::new(std::io::stdout());
    let result = session.submit(endpoint, input, &mut sink).await;
    sink.finish_line();

    match result {
        Ok(turn) => {
            if sink.printed() == 0 {
                note_info("(empty response)");
            }
            ChatEventLogger::log_event(
                &session_id,
                ChatEvent::Completed {
                    output_chars: turn.model_text.chars().count(),
                    latency_ms: start.elapsed().as_millis() as u64,
                },
            );
            Ok(())
        }
        Err(e) => {
            ChatEventLogger::log_event(
                &session_id,
                ChatEvent::Aborted {
                    error_msg: e.to_string(),
                },
            );
            Err(e)
        }
    }
}

struct Repl<'a> {
    session: ChatSession,
    endpoint: &'a dyn InferenceEndpoint,
    prompts: &'a [String],
    plain: bool,
}

impl Repl<'_> {
    /// Returns `false` when the REPL should stop.
    async fn handle(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Empty => {}
            ReplCommand::Submit(input) => self.submit(&input).await,
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::Clear => {
                let turns = self.session.history().len();
                self.session.clear();
                ChatEventLogger::log_event(&self.session.id().to_string(), ChatEvent::Cleared { turns });
                note_success("Conversation cleared");
            }
            ReplCommand::Tokens(n) => match self.session.set_max_new_tokens(n) {
                Ok(()) => note_success(&format!("max new tokens = {n}")),
                Err(e) => note_error(&e.to_string()),
            },
            ReplCommand::Temperature(t) => match self.session.set_temperature(t) {
                Ok(()) => note_success(&format!("temperature = {t}")),
                Err(e) => note_error(&e.to_string()),
            },
            ReplCommand::Params => {
                let p = self.session.parameters();
                println!(
                    "max new tokens: {}  temperature: {}",
                    p.max_new_tokens(),
                    p.temperature()
                );
            }
            ReplCommand::Prompts => self.list_prompts(),
            ReplCommand::Use(n) => match n.checked_sub(1).and_then(|i| self.prompts.get(i)) {
                Some(prompt) => {
                    println!("{} {prompt}", paint(MAGENTA, "you ›"));
                    let prompt = prompt.clone();
                    self.submit(&prompt).await;
                }
                None => note_warn(&format!("no prompt #{n}; see /prompts")),
            },
            ReplCommand::History => self.show_history(),
            ReplCommand::Code => self.show_code(),
            ReplCommand::Save(path) => {
                match transcript::export(&path, self.session.id(), self.session.history()).await {
                    Ok(()) => note_success(&format!(
                        "Saved {} turns to {}",
                        self.session.history().len(),
                        path.display()
                    )),
                    Err(e) => note_error(&format!("{e:#}")),
                }
            }
            ReplCommand::Quit => return false,
        }
        true
    }

    async fn submit(&mut self, input: &str) {
        if let Err(e) = submit_turn(&mut self.session, self.endpoint, input).await {
            note_error(&e.to_string());
        }
    }

    fn list_prompts(&self) {
        if self.prompts.is_empty() {
            note_info("No suggested prompts configured");
            return;
        }
        for (i, prompt) in self.prompts.iter().enumerate() {
            println!("  {} {prompt}", paint(DIM, &format!("{}.", i + 1)));
        }
    }

    fn render(&self, markdown: &str) -> String {
        let nodes = IrParser::parse(markdown);
        if self.plain {
            Renderer::to_plain_text(&nodes)
        } else {
            Renderer::to_ansi(&nodes)
        }
    }

    fn show_history(&self) {
        let history = self.session.history();
        if history.is_empty() {
            note_info("No conversation yet");
            return;
        }
        for turn in history {
            println!("{} {}", paint(MAGENTA, "you ›"), turn.user_text);
            println!("{}", paint(CYAN, "model ›"));
            print!("{}", self.render(&turn.model_text));
            println!();
        }
    }

    fn show_code(&self) {
        let Some(last) = self.session.history().last() else {
            note_info("No reply yet");
            return;
        };
        let blocks = CodeBlockAnalyzer::extract_blocks(&IrParser::parse(&last.model_text));
        if blocks.is_empty() {
            note_info("The last reply has no code blocks");
            return;
        }
        for (lang, content) in blocks {
            let label = if lang.is_empty() { "code".to_string() } else { lang };
            println!("{}", paint(DIM, &format!("── {label} ──")));
            print!("{content}");
        }
    }
}

/// Run the REPL until `/quit` or end of input.
pub async fn run(config: &StreamChatConfig, endpoint: &dyn InferenceEndpoint, plain: bool) -> Result<()> {
    let mut repl = Repl {
        session: ChatSession::new(config.generation.parameters()?),
        endpoint,
        prompts: config.prompts(),
        plain,
    };

    println!(
        "{} {}",
        paint(BOLD, "streamchat"),
        paint(DIM, &format!("({} endpoint; /help for commands)", endpoint.name()))
    );

    info!(session = %repl.session.id(), endpoint = endpoint.name(), "Chat started");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", paint(MAGENTA, "you ›"));
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read from stdin")? else {
            println!();
            break;
        };
        match ReplCommand::parse(&line) {
            Ok(command) => {
                if !repl.handle(command).await {
                    break;
                }
            }
            Err(usage) => note_warn(&usage),
        }
    }
    Ok(())
}

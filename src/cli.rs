use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::coordination::CircuitBreaker;
use crate::domain::{parse_trade_command, Order, Side};
use crate::error::{HlError, Result};
use crate::services::{format_preview, OrderPipeline, Submission};

#[derive(Parser)]
#[command(name = "hlbot")]
#[command(version = "0.1.0")]
#[command(about = "Natural-language order entry for Hyperliquid perps", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory (default.toml, <HLBOT_ENV>.toml)
    #[arg(short, long, default_value = "config", global = true)]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a phrase and print the order payload
    Parse {
        /// e.g. "Buy 0.5 BTC @30000 3x"
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Parse a phrase and print the confirmation prompt
    Preview {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Buy SYMBOL SIZE [PRICE] [LEVERAGE]
    Buy {
        #[arg(num_args = 0.., allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Sell SYMBOL SIZE [PRICE] [LEVERAGE]
    Sell {
        #[arg(num_args = 0.., allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Interactive order shell with preview/confirm
    Shell,
}

/// Rebuild the chat form of a positional command (`/buy ETH 1.5`)
pub fn slash_command(side: Side, args: &[String]) -> String {
    std::iter::once(format!("/{}", side.as_str()))
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Map an error to the reply a chat user should see
pub fn user_reply(err: &HlError) -> String {
    match err {
        HlError::Parse(e) => e.user_message(),
        HlError::Command(e) => e.to_string(),
        other => format!("Error: {other}"),
    }
}

/// One conversation: at most one order awaits confirmation.
pub struct ShellSession {
    pipeline: OrderPipeline,
    breaker: Arc<CircuitBreaker>,
    pending: Option<Order>,
}

impl ShellSession {
    pub fn new(pipeline: OrderPipeline, breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            pipeline,
            breaker,
            pending: None,
        }
    }

    pub fn pending(&self) -> Option<&Order> {
        self.pending.as_ref()
    }

    /// Handle one input line and return the reply
    pub fn handle(&mut self, line: &str) -> String {
        let line = line.trim();
        let lower = line.to_lowercase();

        if self.pending.is_some() {
            match lower.as_str() {
                "yes" | "y" | "confirm" => return self.confirm_pending(),
                "no" | "n" | "cancel" => {
                    self.pending = None;
                    return "Order cancelled.".to_string();
                }
                _ => {}
            }
        }

        match lower.as_str() {
            "help" | "?" => return shell_help(),
            "status" => return self.status(),
            "reset" => {
                self.breaker.reset();
                return "Circuit breaker reset.".to_string();
            }
            "record-error" => {
                self.breaker.record_api_error();
                return self.status();
            }
            _ => {}
        }

        let result = if let Some(rest) = lower.strip_prefix("/buy") {
            self.preview_command(Side::Buy, rest, line)
        } else if let Some(rest) = lower.strip_prefix("/sell") {
            self.preview_command(Side::Sell, rest, line)
        } else {
            self.pipeline
                .preview(line)
                .map(|(prompt, order)| self.hold(prompt, order))
        };

        result.unwrap_or_else(|e| user_reply(&e))
    }

    fn preview_command(&mut self, side: Side, rest: &str, line: &str) -> Result<String> {
        // "/buyer" is not a command
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return self
                .pipeline
                .preview(line)
                .map(|(prompt, order)| self.hold(prompt, order));
        }
        let request = parse_trade_command(side, line)?;
        let order = self.pipeline.price(request, None);
        let prompt = format_preview(&self.pipeline.payload(&order))?;
        Ok(self.hold(prompt, order))
    }

    fn hold(&mut self, prompt: String, order: Order) -> String {
        self.pending = Some(order);
        format!("{prompt} (yes/no)")
    }

    fn confirm_pending(&mut self) -> String {
        let Some(order) = self.pending.take() else {
            return "Nothing to confirm.".to_string();
        };
        let order = self.pipeline.confirm(order);
        match self.pipeline.submit(&order, &self.breaker) {
            Submission::Accepted(payload) => match payload.to_json() {
                Ok(json) => format!("Order submitted!\n{json}"),
                Err(e) => user_reply(&e.into()),
            },
            Submission::Paused { message } => message,
        }
    }

    fn status(&self) -> String {
        let stats = self.breaker.stats();
        let budget = self.pipeline.budget().snapshot();
        let resume = stats
            .resume_in
            .map(|d| format!(", resumes in {}s", d.as_secs()))
            .unwrap_or_default();
        format!(
            "breaker: {} ({} errors in window, {} trips{})\nbudget: {} / {} spent",
            stats.state,
            stats.errors_in_window,
            stats.total_trips,
            resume,
            budget.spent,
            budget.monthly_budget
        )
    }
}

/// Run the interactive shell until `exit` or EOF
pub fn run_shell(mut session: ShellSession) -> Result<()> {
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    println!("\x1b[36mhlbot order shell\x1b[0m");
    println!("Type an order like \"Short ETH 2 at 3500\" or \"/buy BTC 0.1\".");
    println!("Type 'help' for available commands, 'exit' to quit.");
    println!();

    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline("\x1b[36morder>\x1b[0m ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                if matches!(line, "exit" | "quit" | "q") {
                    break;
                }
                println!("{}", session.handle(line));
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(HlError::Readline(e)),
        }
    }

    Ok(())
}

fn shell_help() -> String {
    [
        "Available commands:",
        "  <phrase>                 e.g. Buy 0.5 BTC @30000 3x",
        "  /buy|/sell SYMBOL SIZE [PRICE] [LEVERAGE]",
        "  yes | no                 confirm or cancel the pending order",
        "  status                   breaker and budget state",
        "  record-error             register an upstream API error",
        "  reset                    clear the circuit breaker",
        "  exit                     quit shell",
    ]
    .join("\n")
}

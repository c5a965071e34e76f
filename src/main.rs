use clap::Parser;
use hlbot::cli::{self, Cli, Commands, ShellSession};
use hlbot::config::{AppConfig, LoggingConfig};
use hlbot::coordination::CircuitBreaker;
use hlbot::domain::{parse_trade_command, Side};
use hlbot::error::{HlError, Result};
use hlbot::services::{format_preview, OrderPipeline};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", cli::user_reply(&e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.config)?;

    match &cli.command {
        Commands::Parse { text } => {
            init_logging_simple();
            let pipeline = OrderPipeline::from_config(&config);
            let payload = pipeline.parse_order(&text.join(" "))?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Commands::Preview { text } => {
            init_logging_simple();
            let pipeline = OrderPipeline::from_config(&config);
            let (prompt, _) = pipeline.preview(&text.join(" "))?;
            println!("{prompt}");
        }
        Commands::Buy { args } => {
            init_logging_simple();
            run_trade_command(&config, Side::Buy, args)?;
        }
        Commands::Sell { args } => {
            init_logging_simple();
            run_trade_command(&config, Side::Sell, args)?;
        }
        Commands::Shell => {
            init_logging(&config.logging);
            run_shell_mode(&config)?;
        }
    }

    Ok(())
}

fn load_config(dir: &str) -> Result<AppConfig> {
    let config = AppConfig::load_from(dir)?;
    config
        .validate()
        .map_err(|errors| HlError::Validation(errors.join("; ")))?;
    Ok(config)
}

fn run_trade_command(config: &AppConfig, side: Side, args: &[String]) -> Result<()> {
    let pipeline = OrderPipeline::from_config(config);
    let request = parse_trade_command(side, &cli::slash_command(side, args))?;
    let order = pipeline.price(request, None);
    println!("{}", format_preview(&pipeline.payload(&order))?);
    Ok(())
}

fn run_shell_mode(config: &AppConfig) -> Result<()> {
    let pipeline = OrderPipeline::from_config(config);
    let breaker = Arc::new(CircuitBreaker::new(config.breaker.clone()));
    breaker.set_alert_callback(|msg| {
        error!(alert = msg, "Circuit breaker alert");
        eprintln!("\x1b[31mALERT:\x1b[0m {msg}");
    });

    info!(
        monthly_budget = %config.budget.monthly_budget,
        builder_fee = config.fees.builder_fee_default,
        zero_fee = config.fees.launch_zero_fee,
        "Starting order shell"
    );

    cli::run_shell(ShellSession::new(pipeline, breaker))
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},hlbot=debug", config.level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn init_logging_simple() {
    // Minimal logging for one-shot commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .try_init();
}

// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, info};
use std::future::Future;
use std::io::{IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use nounph::app_config::{self, API_KEY_ENV, Config, OracleProvider};
use nounph::display::{Renderer, outcome_message};
use nounph::oracle::{LlmOracle, Oracle};
use nounph::repl::{HELP, ReplCommand};
use nounph::scoring::snap_target;
use nounph::session::{OperationKind, OperationOutcome, SessionController};

/// CLI Wrapper for OracleProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliOracleProvider {
    Ollama,
    OpenAI,
    Anthropic,
    LMStudio,
    Gemini,
}

impl From<CliOracleProvider> for OracleProvider {
    fn from(cli_provider: CliOracleProvider) -> Self {
        match cli_provider {
            CliOracleProvider::Ollama => OracleProvider::Ollama,
            CliOracleProvider::OpenAI => OracleProvider::OpenAI,
            CliOracleProvider::Anthropic => OracleProvider::Anthropic,
            CliOracleProvider::LMStudio => OracleProvider::LMStudio,
            CliOracleProvider::Gemini => OracleProvider::Gemini,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate text into German and score its nouns
    Analyze {
        /// Text to analyze
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Analyze text, then rewrite it toward a target pH
    Rewrite {
        /// Target pH between 1 (masculine) and 14 (feminine)
        #[arg(short, long, value_name = "PH")]
        target: Option<f64>,

        /// Text to rewrite
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Line-oriented session: type text, then :analyze or :rewrite <ph>
    Interactive,

    /// Check that the configured provider is reachable
    Check,

    /// Generate shell completions for nounph
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Oracle provider to use
    #[arg(short, long, value_enum, global = true)]
    provider: Option<CliOracleProvider>,

    /// Model name to use
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

/// nounph - the pH of German nouns
///
/// Translates text into German, sorts its nouns by grammatical gender and
/// scores the balance on a pH scale from 1 (masculine) to 14 (feminine).
#[derive(Parser, Debug)]
#[command(name = "nounph")]
#[command(version = "0.1.0")]
#[command(about = "Measure and rewrite the gender balance of German nouns")]
#[command(long_about = "nounph translates text into German with an LLM, tags every noun with its gender and \
scores the text from pH 1 (all masculine) to pH 14 (all feminine), 7 being neutral.

EXAMPLES:
    nounph analyze \"My father drives the car\"          # Score a sentence
    nounph rewrite -t 10 \"My father drives the car\"    # Rewrite toward pH 10
    nounph -p ollama -m llama3.1 interactive            # Interactive session on a local model
    nounph check                                        # Test the provider connection
    nounph completions bash > nounph.bash               # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created. API keys may also be given in NOUNPH_API_KEY.

SUPPORTED PROVIDERS:
    gemini    - Google Gemini API (default, requires API key)
    ollama    - Local Ollama server
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic Claude API (requires API key)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

// @struct: Custom logger implementation
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and colour for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "\x1B[1;31m"),
            Level::Warn => ("🚧 ", "\x1B[1;33m"),
            Level::Info => (" ", "\x1B[1;32m"),
            Level::Debug => ("🔍 ", "\x1B[1;36m"),
            Level::Trace => ("📋 ", "\x1B[1;35m"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::style_for_level(record.level());
            let _ = writeln!(std::io::stderr(), "{}{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Warn until the configuration says otherwise
    CustomLogger::init(LevelFilter::Warn)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "nounph", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli.global)?;
    let oracle = Arc::new(LlmOracle::from_config(&config));
    info!("Using {} ({})", oracle.provider().display_name(), oracle.model());

    let controller = SessionController::new(oracle.clone(), &config.session);
    let renderer = Renderer::new(std::io::stdout().is_terminal());

    match cli.command {
        Commands::Analyze { text } => run_analyze(&controller, &renderer, text).await,
        Commands::Rewrite { target, text } => {
            let target = snap_target(target.unwrap_or(config.session.default_target_score));
            run_rewrite(&controller, &renderer, text, target).await
        }
        Commands::Interactive => run_interactive(&controller, &renderer, &config).await,
        Commands::Check => run_check(oracle.as_ref()).await,
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load the configuration file and apply CLI overrides
fn load_config(options: &GlobalArgs) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(Path::new(&options.config_path))?;

    if let Some(provider) = &options.provider {
        config.oracle.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        config.oracle.active_provider_config_mut().model = model.clone();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }

    config.apply_api_key_fallback(std::env::var(API_KEY_ENV).ok());

    config.validate()
        .context("Configuration validation failed")?;

    debug!("Loaded configuration from {}", options.config_path);
    Ok(config)
}

fn spinner(message: &str) -> ProgressBar {
    let progress_bar = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    progress_bar.set_style(style);
    progress_bar.set_message(message.to_string());
    progress_bar.enable_steady_tick(Duration::from_millis(100));
    progress_bar
}

async fn with_spinner<F: Future>(message: &str, operation: F) -> F::Output {
    let progress_bar = spinner(message);
    let output = operation.await;
    progress_bar.finish_and_clear();
    output
}

/// Turn a non-successful outcome into an error carrying the stored message
fn outcome_to_result(controller: &SessionController, kind: OperationKind, outcome: OperationOutcome) -> Result<()> {
    match outcome_message(kind, outcome, &controller.snapshot()) {
        None => Ok(()),
        Some(message) => Err(anyhow!(message)),
    }
}

async fn analyze_current(controller: &SessionController) -> Result<()> {
    let outcome = with_spinner("Analyzing...", controller.analyze()).await;
    outcome_to_result(controller, OperationKind::Analyze, outcome)
}

async fn rewrite_current(controller: &SessionController, target: f64) -> Result<()> {
    let message = format!("Rewriting toward pH {:.1}...", target);
    let outcome = with_spinner(&message, controller.rewrite(target)).await;
    outcome_to_result(controller, OperationKind::Rewrite, outcome)
}

async fn run_analyze(controller: &SessionController, renderer: &Renderer, text: String) -> Result<()> {
    controller.set_input(text);
    analyze_current(controller).await?;
    println!("{}", renderer.analysis_panel(&controller.snapshot()));
    Ok(())
}

async fn run_rewrite(controller: &SessionController, renderer: &Renderer, text: String, target: f64) -> Result<()> {
    controller.set_input(text);
    analyze_current(controller).await?;
    println!("{}\n", renderer.analysis_panel(&controller.snapshot()));

    rewrite_current(controller, target).await?;
    println!("{}", renderer.rewrite_panel(&controller.snapshot()));
    Ok(())
}

async fn run_check(oracle: &LlmOracle) -> Result<()> {
    let provider = oracle.provider().display_name().to_string();
    with_spinner(&format!("Connecting to {}...", provider), oracle.test_connection())
        .await
        .with_context(|| format!("Could not reach {} ({})", provider, oracle.model()))?;
    println!("Connected to {} ({})", provider, oracle.model());
    Ok(())
}

async fn run_interactive(controller: &SessionController, renderer: &Renderer, config: &Config) -> Result<()> {
    println!("{}\n", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read from stdin")? else {
            break;
        };
        let Some(command) = ReplCommand::parse(&line) else {
            continue;
        };

        let result = match command {
            ReplCommand::SetInput(text) => {
                controller.set_input(text);
                Ok(())
            }
            ReplCommand::Analyze => analyze_current(controller).await
                .map(|_| println!("{}", renderer.analysis_panel(&controller.snapshot()))),
            ReplCommand::Rewrite(target) => {
                let target = target.unwrap_or_else(|| snap_target(config.session.default_target_score));
                rewrite_current(controller, target).await
                    .map(|_| println!("{}", renderer.rewrite_panel(&controller.snapshot())))
            }
            ReplCommand::Show => {
                println!("{}", renderer.session(&controller.snapshot()));
                Ok(())
            }
            ReplCommand::Help => {
                println!("{}", HELP);
                Ok(())
            }
            ReplCommand::Quit => break,
            ReplCommand::Invalid(message) => {
                println!("{}", message);
                Ok(())
            }
        };

        if let Err(e) = result {
            eprintln!("{}", e);
        }
    }

    Ok(())
}

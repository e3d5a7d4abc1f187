// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};
use std::io::Write;
use std::path::PathBuf;

use weblingo::app_config::{Config, LogLevel, TranslationUnitMode};
use weblingo::app_controller::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for TranslationUnitMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliUnitMode {
    Block,
    Textnode,
}

impl From<CliUnitMode> for TranslationUnitMode {
    fn from(mode: CliUnitMode) -> Self {
        match mode {
            CliUnitMode::Block => TranslationUnitMode::Block,
            CliUnitMode::Textnode => TranslationUnitMode::TextNode,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a page snapshot
    Translate(TranslateArgs),

    /// Generate shell completions for weblingo
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Page snapshot JSON to translate
    #[arg(value_name = "SNAPSHOT")]
    input_path: PathBuf,

    /// Output path (defaults to <stem>.<lang>.json next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Target language code (e.g., 'ru', 'de', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Grouping of text into translation units
    #[arg(short, long, value_enum)]
    unit: Option<CliUnitMode>,

    /// Disable the persistent translation cache
    #[arg(long)]
    no_cache: bool,

    /// Disable token protection
    #[arg(long)]
    no_token_protect: bool,

    /// Require placeholders to come back in their original order
    #[arg(long)]
    strict_tokens: bool,
}

/// weblingo - LLM translation of web page snapshots
#[derive(Parser, Debug)]
#[command(name = "weblingo")]
#[command(version)]
#[command(about = "LLM-powered web page translation tool")]
#[command(long_about = "weblingo translates the visible text of a captured web page with an LLM \
and writes the translated snapshot back out.

EXAMPLES:
    weblingo translate page.json                    # Translate using default config
    weblingo translate -t de page.json              # Translate to German
    weblingo translate -o out.json -f page.json     # Explicit output, overwrite
    weblingo translate --no-cache -m gpt-5.1 page.json
    weblingo completions bash > weblingo.bash       # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created. The API key is read from the config or from
    OPENAI_API_KEY.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let _ = writeln!(std::io::stderr(), "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Level is raised or lowered once the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "weblingo", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => {
            if let Err(e) = run_translate(args).await {
                error!("{:#}", e);
                return Err(anyhow!("Translation failed"));
            }
            Ok(())
        }
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, &options);
    log::set_max_level(config.log_level.to_level_filter());

    info!(
        "Translating {:?} to {} with {}",
        options.input_path, config.target_language, config.translation.model
    );

    let controller = Controller::with_config(config)?;
    let summary = controller
        .run(&options.input_path, options.output.clone(), options.force_overwrite)
        .await?;

    info!(
        "Done: {} parts, {} attributes, {} cache hits, {} failures",
        summary.applied_parts,
        summary.applied_attrs,
        summary.stats.cache_hits,
        summary.stats.failures.len()
    );
    Ok(())
}

// @modifies: config with command-line overrides
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(model) = &options.model {
        config.translation.model = model.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    if let Some(unit) = &options.unit {
        config.extraction.translation_unit = unit.clone().into();
    }
    if options.no_cache {
        config.translation.use_cache = false;
    }
    if options.no_token_protect {
        config.translation.token_protect = false;
    }
    if options.strict_tokens {
        config.translation.token_protect_strict = true;
    }
}

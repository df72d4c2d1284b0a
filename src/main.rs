use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use envlint::{
  config::{Config, DEFAULT_CONFIG_FILE, DEFAULT_ENV_FILE},
  doctor::{Doctor, DoctorOptions},
  init::{EnvInit, EnvInitOptions},
  lint::{EnvLint, EnvLintOptions},
  render,
};
use std::{io::Write, path::PathBuf, process::ExitCode};

#[derive(Parser)]
#[command(
  name = "envlint",
  about = "Validate .env files against .env.example",
  long_about = "Check for missing keys, value formats, empty required fields, and more.",
  version,
  author
)]
struct Cli {
  #[command(subcommand)]
  command: Option<Command>,

  /// Path to the example env file (default: .env.example)
  #[arg(long, global = true)]
  example: Option<PathBuf>,

  /// Path to the env file to check (default: .env)
  #[arg(long, global = true)]
  env: Option<PathBuf>,

  /// Path to the config file
  #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
  config: PathBuf,

  /// Treat warnings as errors
  #[arg(long)]
  strict: bool,

  /// Output format
  #[arg(long, value_enum, default_value_t = Format::Text)]
  format: Format,

  /// Only show errors
  #[arg(long)]
  quiet: bool,

  /// Verbose output (-v for verbose, -vv for very verbose)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  verbose: u8,
}

#[derive(Subcommand)]
enum Command {
  /// Generate .env.example from existing .env
  Init,
  /// Check project setup for envlint
  Doctor,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
  Text,
  Json,
}

fn setup_tracing(verbose: u8) {
  use tracing_subscriber::fmt;
  use tracing_subscriber::prelude::*;

  let log_level = match verbose {
    0 => "warn",
    1 => "debug",
    _ => "trace",
  };

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(tracing_subscriber::EnvFilter::new(
      std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
    ))
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  setup_tracing(cli.verbose);

  match run(cli) {
    Ok(code) => code,
    Err(err) => {
      eprintln!("{} {err}", "Error:".red().bold());
      ExitCode::from(2)
    }
  }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
  let loaded = Config::load_from(&cli.config)?;
  let config_file = loaded.is_some().then(|| cli.config.clone());
  let config = loaded.unwrap_or_default();

  let example = cli.example.clone().unwrap_or_else(|| config.example.clone());

  match cli.command {
    Some(Command::Init) => {
      let env_file = cli.env.unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_FILE));
      let keys = EnvInit::init_with_options(EnvInitOptions {
        env_file: env_file.clone(),
        template_file: example.clone(),
      })?;

      println!(
        "\n  {} Generated {} from {} ({keys} keys)\n",
        "✓".green(),
        example.display(),
        env_file.display()
      );
      Ok(ExitCode::SUCCESS)
    }
    Some(Command::Doctor) => {
      let report = Doctor::run(DoctorOptions {
        dir: std::env::current_dir()?,
        config,
        config_file,
      });

      render::write_doctor(&mut std::io::stdout().lock(), &report)?;
      Ok(ExitCode::SUCCESS)
    }
    None => {
      let env_file = cli.env.unwrap_or_else(|| config.env_file());
      let mut rules = config.rule_options();
      rules.strict |= cli.strict;

      let report = EnvLint::lint_with_options(EnvLintOptions {
        template_file: example.clone(),
        env_file: env_file.clone(),
        rules,
      })?;

      let mut out = std::io::stdout().lock();
      match cli.format {
        Format::Json => render::write_json(&mut out, &report)?,
        Format::Text => render::write_text(&mut out, &report, &env_file, &example, cli.quiet)?,
      }
      out.flush()?;

      if report.has_errors() {
        Ok(ExitCode::FAILURE)
      } else {
        Ok(ExitCode::SUCCESS)
      }
    }
  }
}

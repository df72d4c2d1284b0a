//! Template comparison.
//!
//! This module runs every rule in [`crate::rules`] over a template and an
//! env file and collects the findings into a [`Report`].
//!
//! # Lint Logic
//!
//! The lint process:
//! 1. Builds a key lookup for both files (last duplicate wins)
//! 2. Counts the distinct keys across both files
//! 3. Runs every rule independently
//! 4. Raises extra-key findings to errors when `no_extra` is set
//! 5. Promotes all warnings to errors when `strict` is set
//!
//! # Examples
//!
//! ```rust,no_run
//! use envlint::lint::{EnvLint, EnvLintOptions};
//! use envlint::rules::RuleOptions;
//! use std::path::PathBuf;
//!
//! let options = EnvLintOptions {
//!     template_file: PathBuf::from(".env.example"),
//!     env_file: PathBuf::from(".env"),
//!     rules: RuleOptions::default(),
//! };
//!
//! let report = EnvLint::lint_with_options(options).unwrap();
//! println!("{} error(s)", report.error_count());
//! ```

use std::{collections::BTreeSet, path::PathBuf};

#[cfg(feature = "tracing")]
use tracing::{debug, info};

use crate::{
  parse::{Entry, EnvFile, ParseError, index},
  report::Report,
  rules::{self, RuleOptions, Severity},
};

/// Compares `actual` against `template`.
pub fn check(template: &[Entry], actual: &[Entry], options: &RuleOptions) -> Report {
  let template = index(template);
  let actual = index(actual);

  // Ignored keys still count here.
  let total_keys = template
    .keys()
    .chain(actual.keys())
    .collect::<BTreeSet<_>>()
    .len();

  #[cfg(feature = "tracing")]
  debug!(
    template_keys = template.len(),
    actual_keys = actual.len(),
    total_keys,
    "Running rules"
  );

  let mut extra = rules::extra_keys(&template, &actual, options);
  if options.no_extra {
    for issue in &mut extra {
      issue.severity = Severity::Error;
    }
  }

  let mut issues = rules::missing_keys(&template, &actual, options);
  issues.extend(extra);
  issues.extend(rules::required_empty(&template, &actual, options));
  issues.extend(rules::invalid_urls(&actual, options));
  issues.extend(rules::invalid_ports(&actual, options));
  issues.extend(rules::invalid_emails(&actual, options));
  issues.extend(rules::invalid_booleans(&actual, options));

  let mut report = Report::new(issues, total_keys);
  if options.strict {
    report.promote_warnings();
  }

  #[cfg(feature = "tracing")]
  debug!(
    errors = report.error_count(),
    warnings = report.warning_count(),
    "Rules finished"
  );

  report
}

/// File-level lint service.
pub struct EnvLint;

impl EnvLint {
  /// Reads the template and the env file, then checks one against the other.
  ///
  /// Both files are read before any rule runs; a read failure aborts the run.
  pub fn lint_with_options(options: EnvLintOptions) -> Result<Report, EnvLintError> {
    let EnvLintOptions {
      template_file,
      env_file,
      rules,
    } = options;

    #[cfg(feature = "tracing")]
    info!(?template_file, ?env_file, "Starting env lint");

    let template = EnvFile::from_path(&template_file).map_err(EnvLintError::TemplateRead)?;
    let actual = EnvFile::from_path(&env_file).map_err(EnvLintError::EnvRead)?;

    Ok(check(&template.entries, &actual.entries, &rules))
  }
}

/// Errors that abort a lint run before any rule is evaluated.
#[derive(Debug, thiserror::Error)]
pub enum EnvLintError {
  /// Error reading the template file
  #[error("{0}")]
  TemplateRead(ParseError),
  /// Error reading the env file
  #[error("{0}")]
  EnvRead(ParseError),
}

/// Inputs of a file-level lint run.
#[derive(Debug, Clone)]
pub struct EnvLintOptions {
  /// Template declaring the expected keys, usually `.env.example`.
  pub template_file: PathBuf,
  /// Env file being validated.
  pub env_file: PathBuf,
  pub rules: RuleOptions,
}

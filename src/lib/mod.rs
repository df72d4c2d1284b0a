//! Environment file linting library.
//!
//! This library parses `.env` files and validates them against a template
//! (usually `.env.example`), reporting missing and extra keys, empty required
//! values and malformed URLs, ports, emails and booleans.
//!
//! # Features
//!
//! - **Template-driven**: a key is required when the template marks it
//!   `# required` or ships a non-empty default
//! - **Quoting aware**: single and double quotes, inline comments and
//!   multi-line double-quoted values
//! - **Reference aware**: values like `${BASE_URL}/api` are never judged
//! - **Optional tracing**: Detailed logging when the `tracing` feature is enabled
//!
//! # Example
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
//! assert!(!report.has_errors());
//! ```

pub mod config;
pub mod doctor;
pub mod init;
pub mod lint;
pub mod parse;
pub mod render;
pub mod report;
pub mod rules;

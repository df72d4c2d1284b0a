//! Template scaffolding for `envlint init`.
//!
//! Builds a template from an existing env file: every assignment keeps its
//! key and inline comment but loses its value. Blank lines, comment lines and
//! lines without `=` are copied through unchanged.

use std::path::PathBuf;

#[cfg(feature = "tracing")]
use tracing::{debug, info};

use crate::parse::{EnvLine, Scanner};

/// Writes a template next to an existing env file.
pub struct EnvInit;

impl EnvInit {
  /// Generates `template_file` from `env_file` and returns the number of keys written.
  ///
  /// Refuses to overwrite an existing template, and refuses to write one when
  /// a multi-line value in `env_file` never closes, since that value and
  /// every key after it would silently go missing.
  pub fn init_with_options(options: EnvInitOptions) -> Result<usize, InitError> {
    let EnvInitOptions {
      env_file,
      template_file,
    } = options;

    if !env_file.is_file() {
      return Err(InitError::EnvNotFound(env_file));
    }
    if template_file.exists() {
      return Err(InitError::TemplateExists(template_file));
    }

    let source = std::fs::read_to_string(&env_file).map_err(|source| InitError::Read {
      path: env_file.clone(),
      source,
    })?;
    let Scaffold {
      template,
      keys,
      unterminated_line,
    } = Self::scaffold(&source);

    if let Some(line) = unterminated_line {
      return Err(InitError::Unterminated {
        path: env_file,
        line,
      });
    }

    #[cfg(feature = "tracing")]
    debug!(?template_file, keys, "Writing template");

    std::fs::write(&template_file, template).map_err(|source| InitError::Write {
      path: template_file.clone(),
      source,
    })?;

    #[cfg(feature = "tracing")]
    info!("Template generated");

    Ok(keys)
  }

  /// Strips the values from `source`.
  pub fn scaffold(source: &str) -> Scaffold {
    let mut scanner = Scanner::new();
    let mut out = String::with_capacity(source.len());
    let mut keys = 0;

    for (i, line) in source.lines().enumerate() {
      match scanner.scan_line(i + 1, line) {
        EnvLine::Empty | EnvLine::Comment(_) | EnvLine::Malformed(_) => {
          out.push_str(line);
          out.push('\n');
        }
        EnvLine::Continuation => {}
        EnvLine::Variable(entry) => {
          keys += 1;
          out.push_str(&entry.key);
          out.push('=');
          if !entry.comment.is_empty() {
            out.push_str(" # ");
            out.push_str(&entry.comment);
          }
          out.push('\n');
        }
      }
    }

    Scaffold {
      template: out,
      keys,
      unterminated_line: scanner.finish(),
    }
  }
}

/// Output of [`EnvInit::scaffold`].
#[derive(Debug, PartialEq, Eq)]
pub struct Scaffold {
  pub template: String,
  pub keys: usize,
  /// Start line of a multi-line value that never closed.
  pub unterminated_line: Option<usize>,
}

/// Errors from template generation.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
  #[error("{} not found", .0.display())]
  EnvNotFound(PathBuf),
  #[error("{} already exists, remove it first or use a different name", .0.display())]
  TemplateExists(PathBuf),
  #[error("{}:{line}: multi-line value is never closed", .path.display())]
  Unterminated { path: PathBuf, line: usize },
  #[error("cannot read {}: {source}", .path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("cannot write {}: {source}", .path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Inputs of template generation.
pub struct EnvInitOptions {
  /// Existing env file to read.
  pub env_file: PathBuf,
  /// Template file to create.
  pub template_file: PathBuf,
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_scaffold() {
    let source = "# Database\nDB_HOST=localhost\nDB_PASS=\"s3cret\" # required\n\nCERT=\"-----BEGIN-----\nabc\n-----END-----\"\nnot an assignment\nAPI_KEY=abc # rotate monthly\n";
    let scaffold = EnvInit::scaffold(source);

    assert_eq!(scaffold.keys, 4);
    assert_eq!(scaffold.unterminated_line, None);
    assert_eq!(
      scaffold.template,
      "# Database\nDB_HOST=\nDB_PASS= # required\n\nCERT=\nnot an assignment\nAPI_KEY= # rotate monthly\n"
    );
  }

  #[test]
  fn test_init_writes_template() {
    let temp_dir = TempDir::new().unwrap();
    let env_file = temp_dir.path().join(".env");
    let template_file = temp_dir.path().join(".env.example");
    std::fs::write(&env_file, "A=1\nB=2 # required\n").unwrap();

    let keys = EnvInit::init_with_options(EnvInitOptions {
      env_file,
      template_file: template_file.clone(),
    })
    .unwrap();

    assert_eq!(keys, 2);
    assert_eq!(
      std::fs::read_to_string(template_file).unwrap(),
      "A=\nB= # required\n"
    );
  }

  #[test]
  fn test_init_refuses_existing_template() {
    let temp_dir = TempDir::new().unwrap();
    let env_file = temp_dir.path().join(".env");
    let template_file = temp_dir.path().join(".env.example");
    std::fs::write(&env_file, "A=1\n").unwrap();
    std::fs::write(&template_file, "KEEP=me\n").unwrap();

    let result = EnvInit::init_with_options(EnvInitOptions {
      env_file,
      template_file: template_file.clone(),
    });

    assert!(matches!(result, Err(InitError::TemplateExists(_))));
    assert_eq!(std::fs::read_to_string(template_file).unwrap(), "KEEP=me\n");
  }

  #[test]
  fn test_init_rejects_unterminated_value() {
    let temp_dir = TempDir::new().unwrap();
    let env_file = temp_dir.path().join(".env");
    let template_file = temp_dir.path().join(".env.example");
    std::fs::write(&env_file, "A=1\nCERT=\"-----BEGIN-----\nB=2\n").unwrap();

    assert_eq!(EnvInit::scaffold("A=1\nCERT=\"open\nB=2\n").unterminated_line, Some(2));

    let result = EnvInit::init_with_options(EnvInitOptions {
      env_file,
      template_file: template_file.clone(),
    });

    let err = result.unwrap_err();
    assert!(matches!(err, InitError::Unterminated { line: 2, .. }));
    assert!(err.to_string().ends_with(".env:2: multi-line value is never closed"));
    assert!(!template_file.exists());
  }

  #[test]
  fn test_init_missing_env() {
    let temp_dir = TempDir::new().unwrap();

    let result = EnvInit::init_with_options(EnvInitOptions {
      env_file: temp_dir.path().join(".env"),
      template_file: temp_dir.path().join(".env.example"),
    });

    assert!(matches!(result, Err(InitError::EnvNotFound(_))));
  }
}

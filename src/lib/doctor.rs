//! Project setup checks for `envlint doctor`.

use std::{
  path::{Path, PathBuf},
  process::Command,
};

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::config::{Config, DEFAULT_ENV_FILE};

const GITIGNORE: &str = ".gitignore";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
  Pass,
  Fail,
  Warn,
  Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
  pub status: CheckStatus,
  pub message: String,
}

impl Check {
  fn new(status: CheckStatus, message: impl Into<String>) -> Self {
    Self {
      status,
      message: message.into(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
  pub title: &'static str,
  pub checks: Vec<Check>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DoctorReport {
  pub sections: Vec<Section>,
}

impl DoctorReport {
  /// Number of failed checks.
  pub fn problems(&self) -> usize {
    self
      .sections
      .iter()
      .flat_map(|section| &section.checks)
      .filter(|check| check.status == CheckStatus::Fail)
      .count()
  }

  pub fn section(&self, title: &str) -> Option<&Section> {
    self.sections.iter().find(|section| section.title == title)
  }
}

pub struct DoctorOptions {
  /// Project directory the checks run in.
  pub dir: PathBuf,
  pub config: Config,
  /// Config file path, when one was loaded.
  pub config_file: Option<PathBuf>,
}

pub struct Doctor;

impl Doctor {
  pub fn run(options: DoctorOptions) -> DoctorReport {
    let DoctorOptions {
      dir,
      config,
      config_file,
    } = options;

    #[cfg(feature = "tracing")]
    debug!(?dir, ?config_file, "Running doctor");

    DoctorReport {
      sections: vec![
        Self::files(&dir, &config),
        Self::config(config_file.as_deref()),
        Self::git(&dir),
      ],
    }
  }

  fn files(dir: &Path, config: &Config) -> Section {
    let mut checks = Vec::new();

    let example = config.example.display();
    if dir.join(&config.example).is_file() {
      checks.push(Check::new(CheckStatus::Pass, format!("{example} found")));
    } else {
      checks.push(Check::new(CheckStatus::Fail, format!("{example} not found")));
    }

    for env_file in &config.env_files {
      let name = env_file.display();
      if dir.join(env_file).is_file() {
        checks.push(Check::new(CheckStatus::Pass, format!("{name} found")));
      } else {
        checks.push(Check::new(
          CheckStatus::Warn,
          format!("{name} not found (may be expected)"),
        ));
      }
    }

    Section {
      title: "Files",
      checks,
    }
  }

  fn config(config_file: Option<&Path>) -> Section {
    let check = match config_file {
      Some(path) => Check::new(CheckStatus::Pass, format!("{} found", path.display())),
      None => Check::new(CheckStatus::Info, "no config file (using defaults)"),
    };

    Section {
      title: "Config",
      checks: vec![check],
    }
  }

  fn git(dir: &Path) -> Section {
    let mut checks = Vec::new();

    if !in_git_repo(dir) {
      checks.push(Check::new(CheckStatus::Info, "not inside a git repository"));
      return Section {
        title: "Git",
        checks,
      };
    }
    checks.push(Check::new(CheckStatus::Pass, "inside git repository"));

    match std::fs::read_to_string(dir.join(GITIGNORE)) {
      Ok(content) => {
        checks.push(Check::new(CheckStatus::Pass, ".gitignore found"));
        if gitignore_lists(&content, DEFAULT_ENV_FILE) {
          checks.push(Check::new(CheckStatus::Pass, ".env is in .gitignore"));
        } else {
          checks.push(Check::new(
            CheckStatus::Fail,
            ".env is NOT in .gitignore, secrets may leak!",
          ));
        }
      }
      Err(_) => checks.push(Check::new(CheckStatus::Fail, "no .gitignore found")),
    }

    Section {
      title: "Git",
      checks,
    }
  }
}

/// Whether `dir` lies inside a git work tree. False when git is unavailable.
pub fn in_git_repo(dir: &Path) -> bool {
  Command::new("git")
    .args(["rev-parse", "--is-inside-work-tree"])
    .current_dir(dir)
    .output()
    .is_ok_and(|output| {
      output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "true"
    })
}

/// Whether `.gitignore` content lists `pattern` verbatim on a line of its own.
pub fn gitignore_lists(content: &str, pattern: &str) -> bool {
  content.lines().any(|line| line.trim() == pattern)
}

//! Terminal and JSON output.
//!
//! Colors come from [`colored`], which turns itself off when `NO_COLOR` is set.

use std::{io, path::Path};

use colored::Colorize;

use crate::{
  doctor::{CheckStatus, DoctorReport},
  report::Report,
  rules::{Issue, Rule, Severity},
};

const PASS: &str = "✓";
const FAIL: &str = "✗";
const WARN: &str = "!";

/// Writes the human-readable report. `quiet` hides warnings.
pub fn write_text<W: io::Write>(
  out: &mut W,
  report: &Report,
  env_file: &Path,
  example_file: &Path,
  quiet: bool,
) -> io::Result<()> {
  title(out, env_file, example_file)?;

  let missing = report.by_rule(Rule::MissingKey);
  if !missing.is_empty() {
    header(out, "Missing keys")?;
    for issue in missing {
      match (&issue.detail, issue.severity) {
        (Some(detail), Severity::Error) => {
          line(out, FAIL, &format!("{}  {}", issue.key, format!("({detail})").dimmed()))?
        }
        (None, Severity::Error) => line(out, FAIL, &issue.key)?,
        (_, Severity::Warning) => line(out, WARN, &issue.key)?,
      }
    }
  }

  let visible = |issue: &&Issue| !quiet || issue.severity == Severity::Error;

  let extra: Vec<_> = report.by_rule(Rule::ExtraKey).into_iter().filter(visible).collect();
  if !extra.is_empty() {
    header(out, "Extra keys")?;
    for issue in extra {
      line(out, glyph(issue.severity), &issue.key)?;
    }
  }

  let values: Vec<_> = report.value_issues().into_iter().filter(visible).collect();
  if !values.is_empty() {
    header(out, "Value problems")?;
    for issue in values {
      let detail = issue.detail.as_deref().unwrap_or_default();
      line(out, glyph(issue.severity), &with_detail(&issue.key, detail))?;
    }
  }

  summary(out, report)?;
  writeln!(out)
}

fn glyph(severity: Severity) -> &'static str {
  match severity {
    Severity::Error => FAIL,
    Severity::Warning => WARN,
  }
}

/// Writes the machine-readable report.
pub fn write_json<W: io::Write>(out: &mut W, report: &Report) -> io::Result<()> {
  serde_json::to_writer_pretty(&mut *out, &report.to_json())?;
  writeln!(out)
}

/// Writes the `doctor` checks, section by section.
pub fn write_doctor<W: io::Write>(out: &mut W, report: &DoctorReport) -> io::Result<()> {
  writeln!(out, "\n  {}", "envlint doctor".bright_blue())?;

  for section in &report.sections {
    header(out, section.title)?;
    for check in &section.checks {
      match check.status {
        CheckStatus::Pass => line(out, PASS, &check.message)?,
        CheckStatus::Fail => line(out, FAIL, &check.message)?,
        CheckStatus::Warn => line(out, WARN, &check.message)?,
        CheckStatus::Info => writeln!(out, "  {}", check.message.dimmed())?,
      }
    }
  }

  writeln!(out)?;
  match report.problems() {
    0 => line(out, PASS, "Everything looks good.")?,
    n => writeln!(out, "  {}", format!("{n} problem(s) found, see above.").red())?,
  }
  writeln!(out)
}

fn title<W: io::Write>(out: &mut W, env_file: &Path, example_file: &Path) -> io::Result<()> {
  writeln!(
    out,
    "\n  {} {}",
    "envlint".bright_blue(),
    format!("· {} vs {}", env_file.display(), example_file.display()).dimmed()
  )
}

fn header<W: io::Write>(out: &mut W, title: &str) -> io::Result<()> {
  writeln!(out, "\n  {}\n", title.bold())
}

fn line<W: io::Write>(out: &mut W, glyph: &str, message: &str) -> io::Result<()> {
  let glyph = match glyph {
    PASS => glyph.green(),
    FAIL => glyph.red(),
    _ => glyph.yellow(),
  };
  writeln!(out, "  {glyph} {message}")
}

fn with_detail(key: &str, detail: &str) -> String {
  format!("{key} {}", format!("— {detail}").dimmed())
}

fn summary<W: io::Write>(out: &mut W, report: &Report) -> io::Result<()> {
  let errors = report.error_count();
  let warnings = report.warning_count();

  let icon = if errors > 0 { FAIL.red() } else { PASS.green() };
  write!(
    out,
    "\n  {icon} {} of {} keys valid",
    report.valid_count(),
    report.total_keys()
  )?;
  if errors > 0 {
    write!(out, " {}", format!("· {errors} error(s)").red())?;
  }
  if warnings > 0 {
    write!(out, " {}", format!("· {warnings} warning(s)").yellow())?;
  }
  writeln!(out)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{lint::check, parse::EnvFile, rules::RuleOptions};

  fn render(report: &Report, quiet: bool) -> String {
    colored::control::set_override(false);
    let mut out = Vec::new();
    write_text(
      &mut out,
      report,
      Path::new(".env"),
      Path::new(".env.example"),
      quiet,
    )
    .unwrap();
    String::from_utf8(out).unwrap()
  }

  fn sample() -> Report {
    let template = EnvFile::from("API_KEY=\nDB_PORT=5432 # required\nDEBUG=false\n");
    let actual = EnvFile::from("DB_PORT=99999\nDEBUG=maybe\nLEGACY=1\n");
    check(&template.entries, &actual.entries, &RuleOptions::default())
  }

  #[test]
  fn test_text_sections() {
    let text = render(&sample(), false);

    assert!(text.contains("envlint · .env vs .env.example"));
    assert!(text.contains("Missing keys"));
    assert!(text.contains("✗ API_KEY"));
    assert!(text.contains("Extra keys"));
    assert!(text.contains("! LEGACY"));
    assert!(text.contains("Value problems"));
    assert!(text.contains("✗ DB_PORT — must be 1-65535, got \"99999\""));
    assert!(text.contains("! DEBUG — expected boolean value"));
    assert!(text.contains("0 of 4 keys valid · 2 error(s) · 2 warning(s)"));
  }

  #[test]
  fn test_quiet_hides_warnings() {
    let text = render(&sample(), true);

    assert!(!text.contains("Extra keys"));
    assert!(!text.contains("LEGACY"));
    assert!(!text.contains("DEBUG"));
    assert!(text.contains("DB_PORT"));
    assert!(text.contains("2 warning(s)"));
  }

  #[test]
  fn test_quiet_keeps_extra_key_errors() {
    let template = EnvFile::from("A=1\nPORT=80\n");
    let actual = EnvFile::from("A=1\nPORT=80\nLEGACY=1\nDEBUG=maybe\n");
    let options = RuleOptions {
      no_extra: true,
      ..RuleOptions::default()
    };
    let report = check(&template.entries, &actual.entries, &options);
    let text = render(&report, true);

    assert!(text.contains("Extra keys"));
    assert!(text.contains("✗ LEGACY"));
    assert!(text.contains("✗ DEBUG"));
    assert!(!text.contains("Value problems"));
  }

  #[test]
  fn test_clean_report() {
    let template = EnvFile::from("A=1\n");
    let report = check(&template.entries, &template.entries, &RuleOptions::default());
    let text = render(&report, false);

    assert!(text.contains("✓ 1 of 1 keys valid"));
    assert!(!text.contains("error(s)"));
  }

  #[test]
  fn test_json_output() {
    let mut out = Vec::new();
    write_json(&mut out, &sample()).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(json["valid"], false);
    assert_eq!(json["total"], 4);
    assert_eq!(json["errors"], 2);
    assert_eq!(json["warnings"], 2);
    assert_eq!(json["issues"].as_array().unwrap().len(), 4);
  }
}

use serde::Serialize;

use crate::rules::{Issue, Rule, Severity};

/// Everything one lint run found.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Report {
  issues: Vec<Issue>,
  total_keys: usize,
}

impl Report {
  pub fn new(issues: Vec<Issue>, total_keys: usize) -> Self {
    Self { issues, total_keys }
  }

  pub fn issues(&self) -> &[Issue] {
    &self.issues
  }

  /// Number of distinct keys across the template and the checked file.
  pub fn total_keys(&self) -> usize {
    self.total_keys
  }

  pub fn by_rule(&self, rule: Rule) -> Vec<&Issue> {
    self.issues.iter().filter(|issue| issue.rule == rule).collect()
  }

  /// Issues about values, i.e. everything but missing and extra keys.
  pub fn value_issues(&self) -> Vec<&Issue> {
    self
      .issues
      .iter()
      .filter(|issue| issue.rule.is_value_rule())
      .collect()
  }

  pub fn error_count(&self) -> usize {
    self.count(Severity::Error)
  }

  pub fn warning_count(&self) -> usize {
    self.count(Severity::Warning)
  }

  pub fn has_errors(&self) -> bool {
    self.error_count() > 0
  }

  /// Keys without a finding, clamped at zero.
  pub fn valid_count(&self) -> usize {
    self
      .total_keys
      .saturating_sub(self.error_count() + self.warning_count())
  }

  /// Rewrites every warning as an error.
  pub fn promote_warnings(&mut self) {
    for issue in &mut self.issues {
      issue.severity = Severity::Error;
    }
  }

  pub fn to_json(&self) -> JsonReport<'_> {
    JsonReport {
      valid: !self.has_errors(),
      total: self.total_keys,
      errors: self.error_count(),
      warnings: self.warning_count(),
      issues: &self.issues,
    }
  }

  fn count(&self, severity: Severity) -> usize {
    self
      .issues
      .iter()
      .filter(|issue| issue.severity == severity)
      .count()
  }
}

/// Machine-readable report document.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
  pub valid: bool,
  pub total: usize,
  pub errors: usize,
  pub warnings: usize,
  pub issues: &'a [Issue],
}

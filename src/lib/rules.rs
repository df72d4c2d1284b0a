//! Individual lint rules.
//!
//! Every rule is a pure function over the key lookups of the template and the
//! checked file. Rules never look at each other's output; severity overrides
//! (`no_extra`, strict mode) are applied afterwards by [`crate::lint::check`].

use std::fmt;

use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::trace;

use crate::parse::{Entry, Index};

const MIN_PORT: u16 = 1;
const BOOLEAN_VALUES: [&str; 8] = ["true", "false", "1", "0", "yes", "no", "on", "off"];
const BOOLEAN_KEY_MARKERS: [&str; 4] = ["ENABLED", "ACTIVE", "DISABLE", "DEBUG"];
const BOOLEAN_KEY_PREFIX: &str = "IS_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
  MissingKey,
  ExtraKey,
  RequiredEmpty,
  InvalidUrl,
  InvalidPort,
  InvalidEmail,
  InvalidBoolean,
}

impl Rule {
  pub fn as_str(self) -> &'static str {
    match self {
      Rule::MissingKey => "missing-key",
      Rule::ExtraKey => "extra-key",
      Rule::RequiredEmpty => "required-empty",
      Rule::InvalidUrl => "invalid-url",
      Rule::InvalidPort => "invalid-port",
      Rule::InvalidEmail => "invalid-email",
      Rule::InvalidBoolean => "invalid-boolean",
    }
  }

  /// Whether the rule judges a value rather than the presence of a key.
  pub fn is_value_rule(self) -> bool {
    !matches!(self, Rule::MissingKey | Rule::ExtraKey)
  }
}

impl fmt::Display for Rule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Error,
  Warning,
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
  pub rule: Rule,
  pub key: String,
  pub severity: Severity,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub detail: Option<String>,
  /// Line of the offending entry in the checked file.
  #[serde(rename = "line", skip_serializing_if = "Option::is_none")]
  pub line_number: Option<usize>,
}

impl Issue {
  fn new(rule: Rule, key: &str, severity: Severity) -> Self {
    Self {
      rule,
      key: key.to_string(),
      severity,
      detail: None,
      line_number: None,
    }
  }

  fn with_detail(mut self, detail: impl Into<String>) -> Self {
    self.detail = Some(detail.into());
    self
  }

  fn at(mut self, entry: &Entry) -> Self {
    self.line_number = Some(entry.line_number);
    self
  }
}

/// Rule configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOptions {
  /// Promote every warning to an error once all rules ran.
  pub strict: bool,
  /// Report extra keys as errors instead of warnings.
  pub no_extra: bool,
  pub strict_urls: bool,
  pub strict_ports: bool,
  /// Keys treated as required whatever the template says.
  pub required_keys: Vec<String>,
  /// Keys excluded from every rule.
  pub ignore_keys: Vec<String>,
}

impl Default for RuleOptions {
  fn default() -> Self {
    Self {
      strict: false,
      no_extra: false,
      strict_urls: true,
      strict_ports: true,
      required_keys: Vec::new(),
      ignore_keys: Vec::new(),
    }
  }
}

impl RuleOptions {
  pub fn is_ignored(&self, key: &str) -> bool {
    self.ignore_keys.iter().any(|k| k == key)
  }

  pub fn is_explicitly_required(&self, key: &str) -> bool {
    self.required_keys.iter().any(|k| k == key)
  }
}

/// A template key is required when its comment says so, when it ships a
/// non-empty default, or when the options list it.
pub fn is_declared_required(template: &Entry, options: &RuleOptions) -> bool {
  template.required || !template.value.is_empty() || options.is_explicitly_required(&template.key)
}

/// Keys in the template that the checked file lacks.
pub fn missing_keys(template: &Index, actual: &Index, options: &RuleOptions) -> Vec<Issue> {
  template
    .iter()
    .filter(|(key, _)| !options.is_ignored(key) && !actual.contains_key(*key))
    .map(|(key, entry)| {
      let issue = Issue::new(Rule::MissingKey, key, Severity::Error);
      if is_declared_required(entry, options) {
        issue.with_detail("required")
      } else {
        issue
      }
    })
    .collect()
}

/// Keys in the checked file that the template does not know.
pub fn extra_keys(template: &Index, actual: &Index, options: &RuleOptions) -> Vec<Issue> {
  actual
    .iter()
    .filter(|(key, _)| !options.is_ignored(key) && !template.contains_key(*key))
    .map(|(key, entry)| Issue::new(Rule::ExtraKey, key, Severity::Warning).at(entry))
    .collect()
}

/// Required keys whose value is blank. References count as non-empty.
pub fn required_empty(template: &Index, actual: &Index, options: &RuleOptions) -> Vec<Issue> {
  template
    .iter()
    .filter(|(key, _)| !options.is_ignored(key))
    .filter_map(|(key, template_entry)| {
      let entry = actual.get(key)?;
      let blank = !entry.is_reference && entry.value.trim().is_empty();

      (blank && is_declared_required(template_entry, options)).then(|| {
        Issue::new(Rule::RequiredEmpty, key, Severity::Error)
          .with_detail("required but empty")
          .at(entry)
      })
    })
    .collect()
}

/// Values of `*URL*` keys that are not absolute URLs with a host.
pub fn invalid_urls(actual: &Index, options: &RuleOptions) -> Vec<Issue> {
  if !options.strict_urls {
    return Vec::new();
  }

  scan_values(actual, options, |key| contains_ignore_case(key, "URL"))
    .filter(|(_, value)| !is_absolute_url(value))
    .map(|(entry, _)| {
      Issue::new(Rule::InvalidUrl, &entry.key, Severity::Error)
        .with_detail("invalid URL format")
        .at(entry)
    })
    .collect()
}

/// Values of `*PORT*` keys outside 1-65535.
pub fn invalid_ports(actual: &Index, options: &RuleOptions) -> Vec<Issue> {
  if !options.strict_ports {
    return Vec::new();
  }

  scan_values(actual, options, |key| contains_ignore_case(key, "PORT"))
    .filter(|(_, value)| !is_port(value))
    .map(|(entry, value)| {
      Issue::new(Rule::InvalidPort, &entry.key, Severity::Error)
        .with_detail(format!("must be {MIN_PORT}-{}, got {value:?}", u16::MAX))
        .at(entry)
    })
    .collect()
}

/// Values of `*EMAIL*` keys missing an `@` or a `.`.
pub fn invalid_emails(actual: &Index, options: &RuleOptions) -> Vec<Issue> {
  scan_values(actual, options, |key| contains_ignore_case(key, "EMAIL"))
    .filter(|(_, value)| !value.contains('@') || !value.contains('.'))
    .map(|(entry, _)| {
      Issue::new(Rule::InvalidEmail, &entry.key, Severity::Warning)
        .with_detail("invalid email format")
        .at(entry)
    })
    .collect()
}

/// Values of boolean-looking keys that are not a recognised boolean spelling.
pub fn invalid_booleans(actual: &Index, options: &RuleOptions) -> Vec<Issue> {
  scan_values(actual, options, is_boolean_key)
    .filter(|(_, value)| !BOOLEAN_VALUES.contains(&value.to_lowercase().as_str()))
    .map(|(entry, _)| {
      Issue::new(Rule::InvalidBoolean, &entry.key, Severity::Warning)
        .with_detail("expected boolean value")
        .at(entry)
    })
    .collect()
}

/// Entries whose key matches `applies`, paired with their trimmed value.
/// Ignored keys, blank values and references are left out.
fn scan_values<'a>(
  actual: &'a Index<'a>,
  options: &'a RuleOptions,
  applies: impl Fn(&str) -> bool + 'a,
) -> impl Iterator<Item = (&'a Entry, &'a str)> + 'a {
  actual.iter().filter_map(move |(key, entry)| {
    if options.is_ignored(key) || !applies(*key) {
      return None;
    }
    let value = entry.value.trim();
    if value.is_empty() || entry.is_reference {
      return None;
    }

    #[cfg(feature = "tracing")]
    trace!(key, value, "Checking value format");

    Some((*entry, value))
  })
}

/// `scheme://host...`. The `://` is checked up front because the URL parser
/// repairs forms like `http:host` and `https:/host` on its own.
fn is_absolute_url(value: &str) -> bool {
  let Some((scheme, _)) = value.split_once("://") else {
    return false;
  };
  if scheme.is_empty() {
    return false;
  }

  url::Url::parse(value)
    .map(|url| url.host_str().is_some_and(|host| !host.is_empty()))
    .unwrap_or(false)
}

fn is_port(value: &str) -> bool {
  value.parse::<u16>().is_ok_and(|port| port >= MIN_PORT)
}

fn is_boolean_key(key: &str) -> bool {
  let upper = key.to_uppercase();
  upper.starts_with(BOOLEAN_KEY_PREFIX)
    || BOOLEAN_KEY_MARKERS
      .iter()
      .any(|marker| upper.contains(marker))
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
  haystack.to_uppercase().contains(&needle.to_uppercase())
}

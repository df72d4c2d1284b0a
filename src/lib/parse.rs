use std::{
  collections::BTreeMap,
  fmt,
  path::{Path, PathBuf},
  sync::LazyLock,
};

use regex::Regex;

#[cfg(feature = "tracing")]
use tracing::{debug, trace, warn};

const COMMENT_PREFIX: char = '#';
const ASSIGNMENT_OPERATOR: char = '=';
const DOUBLE_QUOTE: char = '"';
const SINGLE_QUOTE: char = '\'';
const INLINE_COMMENT_MARKER: &str = " #";
const REQUIRED_MARKER: &str = "required";

static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\$(?:\{[A-Za-z_][A-Za-z0-9_]*\}|[A-Za-z_][A-Za-z0-9_]*)")
    .expect("reference pattern is a valid regex")
});

/// Key to entry lookup, last occurrence of a key wins.
pub type Index<'a> = BTreeMap<&'a str, &'a Entry>;

/// A single assignment parsed from an env file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entry {
  pub key: String,
  /// Unquoted value, without the inline comment.
  pub value: String,
  /// Inline comment text after `#`, trimmed. Empty when absent.
  pub comment: String,
  /// 1-based line the assignment starts on.
  pub line_number: usize,
  /// The inline comment mentions "required".
  pub required: bool,
  /// The value contains a `$NAME` or `${NAME}` substitution.
  pub is_reference: bool,
}

impl Entry {
  pub fn new(
    key: impl Into<String>,
    value: impl Into<String>,
    comment: impl Into<String>,
    line_number: usize,
  ) -> Self {
    let value = value.into();
    let comment = comment.into();

    Self {
      key: key.into(),
      required: comment.to_lowercase().contains(REQUIRED_MARKER),
      is_reference: is_reference(&value),
      value,
      comment,
      line_number,
    }
  }
}

impl fmt::Display for Entry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{}", self.key, ASSIGNMENT_OPERATOR)?;

    if !needs_quotes(&self.value) {
      write!(f, "{}", self.value)?;
    } else if !self.value.contains('\n')
      && self.value.contains(DOUBLE_QUOTE)
      && !self.value.contains(SINGLE_QUOTE)
    {
      write!(f, "{SINGLE_QUOTE}{}{SINGLE_QUOTE}", self.value)?;
    } else {
      write!(f, "{DOUBLE_QUOTE}{}{DOUBLE_QUOTE}", self.value)?;
    }

    if !self.comment.is_empty() {
      write!(f, "{INLINE_COMMENT_MARKER} {}", self.comment)?;
    }
    Ok(())
  }
}

fn needs_quotes(value: &str) -> bool {
  value.trim() != value
    || value.contains(INLINE_COMMENT_MARKER)
    || value.contains('\n')
    || value.starts_with([COMMENT_PREFIX, DOUBLE_QUOTE, SINGLE_QUOTE])
}

/// Reports whether `value` contains a `$NAME` or `${NAME}` substitution token.
pub fn is_reference(value: &str) -> bool {
  REFERENCE_PATTERN.is_match(value)
}

/// Builds a key lookup over `entries`. Later duplicates overwrite earlier ones.
pub fn index(entries: &[Entry]) -> Index<'_> {
  let mut map = BTreeMap::new();
  for entry in entries {
    map.insert(entry.key.as_str(), entry);
  }
  map
}

/// What a single source line turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvLine<'a> {
  Empty,
  Comment(&'a str),
  /// Non-comment line without `=`. Ignored.
  Malformed(&'a str),
  /// Consumed by an open multi-line value.
  Continuation,
  Variable(Entry),
}

#[derive(Debug, Default)]
enum ScanState {
  #[default]
  Normal,
  Multiline {
    key: String,
    start_line: usize,
    buffer: String,
  },
}

/// Line scanner that carries multi-line double-quoted values across lines.
#[derive(Debug, Default)]
pub struct Scanner {
  state: ScanState,
}

impl Scanner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Feeds the next line. `line_number` is 1-based.
  pub fn scan_line<'a>(&mut self, line_number: usize, line: &'a str) -> EnvLine<'a> {
    match std::mem::take(&mut self.state) {
      ScanState::Multiline {
        key,
        start_line,
        mut buffer,
      } => {
        buffer.push('\n');
        buffer.push_str(line);

        if !line.trim().ends_with(DOUBLE_QUOTE) {
          self.state = ScanState::Multiline {
            key,
            start_line,
            buffer,
          };
          return EnvLine::Continuation;
        }

        let closed = buffer.trim_end();
        let value = closed.strip_suffix(DOUBLE_QUOTE).unwrap_or(closed);

        #[cfg(feature = "tracing")]
        trace!(key = %key, start_line, line_number, "Closed multi-line value");

        EnvLine::Variable(Entry::new(key, value, "", start_line))
      }
      ScanState::Normal => self.scan_assignment(line_number, line),
    }
  }

  fn scan_assignment<'a>(&mut self, line_number: usize, line: &'a str) -> EnvLine<'a> {
    let trimmed = line.trim();

    if trimmed.is_empty() {
      return EnvLine::Empty;
    }
    if let Some(comment) = trimmed.strip_prefix(COMMENT_PREFIX) {
      return EnvLine::Comment(comment);
    }

    let Some((key, region)) = trimmed.split_once(ASSIGNMENT_OPERATOR) else {
      #[cfg(feature = "tracing")]
      trace!(line_number, "Skipping line without assignment");
      return EnvLine::Malformed(trimmed);
    };

    let key = key.trim();
    let region = region.trim();

    if let Some(body) = region.strip_prefix(DOUBLE_QUOTE)
      && !body.contains(DOUBLE_QUOTE)
    {
      #[cfg(feature = "tracing")]
      trace!(key, line_number, "Opening multi-line value");

      self.state = ScanState::Multiline {
        key: key.to_string(),
        start_line: line_number,
        buffer: body.to_string(),
      };
      return EnvLine::Continuation;
    }

    let (value, comment) = split_value(region);
    EnvLine::Variable(Entry::new(key, value, comment, line_number))
  }

  /// Ends the scan. An unterminated multi-line value is discarded; returns
  /// the line it started on.
  pub fn finish(self) -> Option<usize> {
    let ScanState::Multiline { start_line, .. } = self.state else {
      return None;
    };

    #[cfg(feature = "tracing")]
    warn!(start_line, "Unterminated multi-line value consumed the rest of the file");

    Some(start_line)
  }
}

/// Splits the trimmed right-hand side of an assignment into value and comment.
fn split_value(region: &str) -> (&str, &str) {
  for quote in [DOUBLE_QUOTE, SINGLE_QUOTE] {
    if let Some(body) = region.strip_prefix(quote)
      && let Some((value, rest)) = body.split_once(quote)
    {
      let comment = rest
        .trim()
        .strip_prefix(COMMENT_PREFIX)
        .map(str::trim)
        .unwrap_or_default();
      return (value, comment);
    }
  }

  if let Some(comment) = region.strip_prefix(COMMENT_PREFIX) {
    return ("", comment.trim());
  }

  match region.split_once(INLINE_COMMENT_MARKER) {
    Some((value, comment)) => (value.trim(), comment.trim()),
    None => (region, ""),
  }
}

/// The assignments of one env file, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvFile {
  pub entries: Vec<Entry>,
  /// Start line of a double-quoted value that never closed. Every line after
  /// it was consumed as part of that value.
  pub unterminated_line: Option<usize>,
}

impl From<&str> for EnvFile {
  fn from(s: &str) -> Self {
    #[cfg(feature = "tracing")]
    debug!("Parsing env file with {} lines", s.lines().count());

    let mut scanner = Scanner::new();
    let entries: Vec<Entry> = s
      .lines()
      .enumerate()
      .filter_map(|(i, line)| match scanner.scan_line(i + 1, line) {
        EnvLine::Variable(entry) => Some(entry),
        _ => None,
      })
      .collect();
    let unterminated_line = scanner.finish();

    #[cfg(feature = "tracing")]
    debug!("Parsed {} entries", entries.len());

    Self {
      entries,
      unterminated_line,
    }
  }
}

impl EnvFile {
  /// Reads and parses the env file at `path`.
  pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
    let path = path.as_ref();

    #[cfg(feature = "tracing")]
    debug!(?path, "Reading env file");

    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Ok(content.as_str().into())
  }

  pub fn index(&self) -> Index<'_> {
    index(&self.entries)
  }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
  #[error("cannot read {}: {source}", .path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

use envlint::lint::{EnvLint, EnvLintError, EnvLintOptions};
use envlint::rules::{Rule, RuleOptions, Severity};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_lint_integration() {
  let temp_dir = TempDir::new().unwrap();

  let env_path = temp_dir.path().join(".env");
  let template_path = temp_dir.path().join(".env.example");

  let template_content = "# Database configuration
DATABASE_URL= # required
REDIS_URL=
APP_PORT=3000

# Flags
DEBUG=false
API_KEY= # required
";
  let env_content = "DATABASE_URL=\"postgres://localhost:5432/app\"
APP_PORT=abc
DEBUG=true
API_KEY=
LEGACY_FLAG=1
";

  fs::write(&env_path, env_content).unwrap();
  fs::write(&template_path, template_content).unwrap();

  let options = EnvLintOptions {
    template_file: template_path,
    env_file: env_path,
    rules: RuleOptions::default(),
  };

  let report = EnvLint::lint_with_options(options).unwrap();

  assert_eq!(report.total_keys(), 6);

  let missing = report.by_rule(Rule::MissingKey);
  assert_eq!(missing.len(), 1);
  assert_eq!(missing[0].key, "REDIS_URL");

  let extra = report.by_rule(Rule::ExtraKey);
  assert_eq!(extra.len(), 1);
  assert_eq!(extra[0].key, "LEGACY_FLAG");
  assert_eq!(extra[0].severity, Severity::Warning);
  assert_eq!(extra[0].line_number, Some(5));

  let port = report.by_rule(Rule::InvalidPort);
  assert_eq!(port.len(), 1);
  assert_eq!(port[0].key, "APP_PORT");
  assert_eq!(port[0].line_number, Some(2));

  let empty = report.by_rule(Rule::RequiredEmpty);
  assert_eq!(empty.len(), 1);
  assert_eq!(empty[0].key, "API_KEY");

  assert!(report.error_count() >= 2);
  assert!(report.has_errors());
}

#[test]
fn test_multiline_and_references_integration() {
  let temp_dir = TempDir::new().unwrap();

  let env_path = temp_dir.path().join(".env");
  let template_path = temp_dir.path().join(".env.example");

  fs::write(
    &template_path,
    "BASE_URL=http://localhost\nFULL_URL=\nPRIVATE_KEY= # required\nIS_PUBLIC=\n",
  )
  .unwrap();
  fs::write(
    &env_path,
    "BASE_URL=http://localhost:8080\nFULL_URL=${BASE_URL}/api\nPRIVATE_KEY=\"-----BEGIN KEY-----\nabc\n-----END KEY-----\"\nIS_PUBLIC=$PUBLIC\n",
  )
  .unwrap();

  let report = EnvLint::lint_with_options(EnvLintOptions {
    template_file: template_path,
    env_file: env_path,
    rules: RuleOptions::default(),
  })
  .unwrap();

  assert!(report.issues().is_empty(), "{:?}", report.issues());
  assert_eq!(report.valid_count(), 4);
}

#[test]
fn test_missing_env_file() {
  let temp_dir = TempDir::new().unwrap();
  let template_path = temp_dir.path().join(".env.example");
  fs::write(&template_path, "A=\n").unwrap();

  let result = EnvLint::lint_with_options(EnvLintOptions {
    template_file: template_path,
    env_file: temp_dir.path().join(".env"),
    rules: RuleOptions::default(),
  });

  assert!(matches!(result, Err(EnvLintError::EnvRead(_))));
}

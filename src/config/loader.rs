//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{BodyErrorsConfig, LoglensConfig, LogglyConfig};
use super::secret::secret_string;
use crate::domain::errors::LoglensError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into LoglensConfig
/// 4. Applies environment variable overrides (LOGLENS_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, a referenced environment
/// variable is not set, TOML parsing fails or validation fails.
///
/// # Examples
///
/// ```no_run
/// use loglens::config::loader::load_config;
///
/// let config = load_config("loglens.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<LoglensConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(LoglensError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        LoglensError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: LoglensConfig = toml::from_str(&contents)
        .map_err(|e| LoglensError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        LoglensError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Builds configuration from defaults and `LOGLENS_*` environment variables only
///
/// Used when no configuration file exists, so the tool can run from a plain
/// environment (or a `.env` file).
pub fn load_from_env() -> Result<LoglensConfig> {
    let mut config = LoglensConfig::default();
    apply_env_overrides(&mut config)?;
    config.validate().map_err(|e| {
        LoglensError::Configuration(format!("Configuration validation failed: {}", e))
    })?;
    Ok(config)
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is a valid regex")
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. All missing variables are reported in
/// one error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(LoglensError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env(name) {
        Some(val) => val.parse().map(Some).map_err(|_| {
            LoglensError::Configuration(format!("Environment variable {name}='{val}' is not valid"))
        }),
        None => Ok(None),
    }
}

/// Applies environment variable overrides using LOGLENS_* prefix
///
/// Environment variables follow the pattern: LOGLENS_<SECTION>_<KEY>, for
/// example LOGLENS_LOGGLY_BASE_URL or LOGLENS_FETCH_MAX_CONCURRENCY. Setting
/// any variable of an absent optional section creates that section.
fn apply_env_overrides(config: &mut LoglensConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env("LOGLENS_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Remote search overrides
    let loggly_vars = [
        "LOGLENS_LOGGLY_BASE_URL",
        "LOGLENS_LOGGLY_QUERY",
        "LOGLENS_LOGGLY_TOKEN",
        "LOGLENS_LOGGLY_SOURCE_GROUP",
        "LOGLENS_LOGGLY_PAGE_SIZE",
    ];
    if config.loggly.is_none() && loggly_vars.iter().any(|v| env(v).is_some()) {
        config.loggly = Some(LogglyConfig::default());
    }
    if let Some(ref mut loggly) = config.loggly {
        if let Some(val) = env("LOGLENS_LOGGLY_BASE_URL") {
            loggly.base_url = val;
        }
        if let Some(val) = env("LOGLENS_LOGGLY_QUERY") {
            loggly.query = val;
        }
        if let Some(val) = env("LOGLENS_LOGGLY_TOKEN") {
            loggly.token = Some(secret_string(val));
        }
        if let Some(val) = env("LOGLENS_LOGGLY_SOURCE_GROUP") {
            loggly.source_group = Some(val);
        }
        if let Some(size) = parse_env("LOGLENS_LOGGLY_PAGE_SIZE")? {
            loggly.page_size = size;
        }
    }

    // Fetch overrides
    if let Some(secs) = parse_env("LOGLENS_FETCH_INTERVAL_SECONDS")? {
        config.fetch.interval_seconds = secs;
    }
    if let Some(concurrency) = parse_env("LOGLENS_FETCH_MAX_CONCURRENCY")? {
        config.fetch.max_concurrency = concurrency;
    }
    if let Some(retries) = parse_env("LOGLENS_FETCH_MAX_RETRIES")? {
        config.fetch.max_retries = retries;
    }
    if let Some(delay) = parse_env("LOGLENS_FETCH_RETRY_DELAY_MS")? {
        config.fetch.retry_delay_ms = delay;
    }

    // Session overrides
    if let Some(days) = parse_env("LOGLENS_SESSIONS_DURATION_DAYS")? {
        config.sessions.duration_days = days;
    }
    if let Some(val) = env("LOGLENS_SESSIONS_OUTPUT") {
        config.sessions.output = Some(val);
    }

    // Body-error overrides
    if config.body_errors.is_none() {
        if let Some(input) = env("LOGLENS_BODY_ERRORS_INPUT_CSV") {
            config.body_errors = Some(BodyErrorsConfig {
                input_csv: input,
                ..Default::default()
            });
        }
    }
    if let Some(ref mut body_errors) = config.body_errors {
        if let Some(val) = env("LOGLENS_BODY_ERRORS_INPUT_CSV") {
            body_errors.input_csv = val;
        }
        if let Some(val) = env("LOGLENS_BODY_ERRORS_DAILY_TOTALS_CSV") {
            body_errors.daily_totals_csv = Some(val);
        }
        if let Some(val) = env("LOGLENS_BODY_ERRORS_ERRORS_OUTPUT") {
            body_errors.errors_output = val;
        }
        if let Some(val) = env("LOGLENS_BODY_ERRORS_DAILY_COUNTS_OUTPUT") {
            body_errors.daily_counts_output = val;
        }
        if let Some(val) = env("LOGLENS_BODY_ERRORS_DAILY_PERCENTAGES_OUTPUT") {
            body_errors.daily_percentages_output = val;
        }
    }

    // Logging overrides
    if let Some(enabled) = parse_env("LOGLENS_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = enabled;
    }
    if let Some(val) = env("LOGLENS_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("LOGLENS_UNIT_SUBST_VAR", "test_value");
        let input = "token = \"${LOGLENS_UNIT_SUBST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "token = \"test_value\"");
        std::env::remove_var("LOGLENS_UNIT_SUBST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("LOGLENS_UNIT_MISSING_A");
        std::env::remove_var("LOGLENS_UNIT_MISSING_B");
        let input = "a = \"${LOGLENS_UNIT_MISSING_A}\"\nb = \"${LOGLENS_UNIT_MISSING_B}\"";
        let err = substitute_env_vars(input).unwrap_err().to_string();
        assert!(err.contains("LOGLENS_UNIT_MISSING_A"));
        assert!(err.contains("LOGLENS_UNIT_MISSING_B"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("LOGLENS_UNIT_COMMENTED");
        let input = "# token = \"${LOGLENS_UNIT_COMMENTED}\"\nquery = \"*\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(LoglensError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "info"

[loggly]
base_url = "https://company.loggly.com/apiv2"
query = "json.req.path:/session"
token = "token-abc"
source_group = "prod"

[fetch]
interval_seconds = 120
max_concurrency = 4

[body_errors]
input_csv = "exports/body_errors.csv"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        let loggly = config.loggly.unwrap();
        assert_eq!(loggly.base_url, "https://company.loggly.com/apiv2");
        assert_eq!(loggly.page_size, 1000);
        assert_eq!(config.fetch.interval_seconds, 120);
        assert_eq!(config.fetch.max_retries, 3);
        let body_errors = config.body_errors.unwrap();
        assert_eq!(body_errors.errors_output, "errors.csv");
        assert_eq!(body_errors.group_label, "error type/datetime");
    }
}

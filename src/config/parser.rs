use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;

    // Parse TOML
    let mut config: Config = toml::from_str(&content)?;

    // Environment override for the data directory
    apply_env_overrides(&mut config);

    // Validate the configuration
    validate(&config)?;

    Ok(config)
}

/// Loads a configuration from an optional path
///
/// With no path this returns the built-in defaults (with environment
/// overrides applied), so the CLI can run without any flags.
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(p) => load_config(p),
        None => {
            let mut config = Config::default();
            apply_env_overrides(&mut config);
            validate(&config)?;
            Ok(config)
        }
    }
}

/// Applies environment variable overrides to a loaded configuration
///
/// `DATA_DIR` overrides `storage.data-dir`, matching the scheduled-job
/// convention where the data directory is provided by the environment.
pub fn apply_env_overrides(config: &mut Config) {
    if let Ok(dir) = std::env::var("DATA_DIR") {
        if !dir.is_empty() {
            config.storage.data_dir = dir;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawl]
start-page = 100
max-page = 200
pages-per-run = 5
batch-size = 10

[storage]
data-dir = "./crawl-data"
shard-prefix = "entries"
max-shard-mb = 50
"#;
        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawl.start_page, 100);
        assert_eq!(config.crawl.max_page, 200);
        assert_eq!(config.crawl.pages_per_run, 5);
        assert_eq!(config.crawl.batch_size, 10);
        assert_eq!(config.storage.shard_prefix, "entries");
        assert_eq!(config.storage.max_shard_mb, 50);
        // Unspecified sections fall back to defaults
        assert_eq!(config.fetch.link_retries, 3);
    }

    #[test]
    fn test_load_empty_config_uses_defaults() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawl.start_page, 6019);
        assert_eq!(config.crawl.max_page, 7185);
        assert_eq!(config.crawl.batch_size, 20);
        assert_eq!(config.storage.max_shard_mb, 95);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let file = create_temp_config("[crawl\nstart-page = ");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = load_config_or_default(None).unwrap();
        assert!(config.crawl.start_page <= config.crawl.max_page);
    }
}

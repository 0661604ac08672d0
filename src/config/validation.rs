use crate::config::types::Config;
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates a parsed configuration
///
/// Checks that the crawl range is sane, the run budget leaves room for its
/// safety margins, the base URL parses, and every CSS selector compiles.
///
/// # Arguments
///
/// * `config` - The configuration to validate
///
/// # Returns
///
/// * `Ok(())` - Configuration is valid
/// * `Err(ConfigError)` - First validation failure found
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl(config)?;
    validate_site(config)?;
    validate_fetch(config)?;
    validate_storage(config)?;
    Ok(())
}

fn validate_crawl(config: &Config) -> Result<(), ConfigError> {
    let crawl = &config.crawl;

    if crawl.start_page == 0 {
        return Err(ConfigError::Validation(
            "crawl.start-page must be at least 1".to_string(),
        ));
    }

    if crawl.max_page < crawl.start_page {
        return Err(ConfigError::Validation(format!(
            "crawl.max-page ({}) must not be below crawl.start-page ({})",
            crawl.max_page, crawl.start_page
        )));
    }

    if crawl.pages_per_run == 0 {
        return Err(ConfigError::Validation(
            "crawl.pages-per-run must be at least 1".to_string(),
        ));
    }

    if crawl.batch_size == 0 {
        return Err(ConfigError::Validation(
            "crawl.batch-size must be at least 1".to_string(),
        ));
    }

    if crawl.collect_margin_secs >= crawl.max_runtime_secs
        || crawl.extract_margin_secs >= crawl.max_runtime_secs
    {
        return Err(ConfigError::Validation(format!(
            "crawl.max-runtime-secs ({}) must exceed both safety margins ({} and {})",
            crawl.max_runtime_secs, crawl.collect_margin_secs, crawl.extract_margin_secs
        )));
    }

    Ok(())
}

fn validate_site(config: &Config) -> Result<(), ConfigError> {
    let site = &config.site;

    let url = Url::parse(&site.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", site.base_url, e)))?;
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{}: missing host",
            site.base_url
        )));
    }

    if site.host.is_empty() {
        return Err(ConfigError::Validation(
            "site.host must not be empty".to_string(),
        ));
    }

    if site.link_patterns.is_empty() {
        return Err(ConfigError::Validation(
            "site.link-patterns must contain at least one pattern".to_string(),
        ));
    }

    for (name, selector) in [
        ("site.link-selector", &site.link_selector),
        ("site.h1-selector", &site.h1_selector),
        ("site.h2-selector", &site.h2_selector),
        ("site.content-selector", &site.content_selector),
    ] {
        if Selector::parse(selector).is_err() {
            return Err(ConfigError::InvalidSelector(format!(
                "{}: {:?}",
                name, selector
            )));
        }
    }

    Ok(())
}

fn validate_fetch(config: &Config) -> Result<(), ConfigError> {
    let fetch = &config.fetch;

    if fetch.link_retries == 0 || fetch.field_retries == 0 {
        return Err(ConfigError::Validation(
            "fetch retry counts must be at least 1".to_string(),
        ));
    }

    if fetch.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "fetch.request-timeout-secs must be at least 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_storage(config: &Config) -> Result<(), ConfigError> {
    let storage = &config.storage;

    if storage.data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "storage.data-dir must not be empty".to_string(),
        ));
    }

    if storage.shard_prefix.is_empty() || storage.shard_prefix.contains('/') {
        return Err(ConfigError::Validation(format!(
            "storage.shard-prefix must be a bare file name prefix, got {:?}",
            storage.shard_prefix
        )));
    }

    if storage.max_shard_mb == 0 {
        return Err(ConfigError::Validation(
            "storage.max-shard-mb must be at least 1".to_string(),
        ));
    }

    Ok(())
}

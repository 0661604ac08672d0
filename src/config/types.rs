use serde::Deserialize;

/// Main configuration structure for glosswalk
///
/// Every section is optional in the TOML file; missing sections fall back to
/// the built-in defaults so the crawler can run without any config file.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Crawl range and run-budget configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// First listing page of the assigned crawl range
    #[serde(rename = "start-page", default = "default_start_page")]
    pub start_page: u32,

    /// Last listing page of the assigned crawl range (inclusive)
    #[serde(rename = "max-page", default = "default_max_page")]
    pub max_page: u32,

    /// How many listing pages a single run attempts
    #[serde(rename = "pages-per-run", default = "default_pages_per_run")]
    pub pages_per_run: u32,

    /// Buffered records flushed to the store at this count
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    /// Wall-clock ceiling for one run, in seconds
    #[serde(rename = "max-runtime-secs", default = "default_max_runtime_secs")]
    pub max_runtime_secs: u64,

    /// Link collection stops this many seconds before the ceiling
    #[serde(rename = "collect-margin-secs", default = "default_collect_margin_secs")]
    pub collect_margin_secs: u64,

    /// Field extraction stops this many seconds before the ceiling
    #[serde(rename = "extract-margin-secs", default = "default_extract_margin_secs")]
    pub extract_margin_secs: u64,
}

/// Target site layout: page URLs, selectors, and link filters
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Listing page base URL; page N > 1 is fetched as `<base>?page=N`
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Host an entry link must belong to
    #[serde(default = "default_host")]
    pub host: String,

    /// Path substrings, at least one of which an entry link must contain
    #[serde(rename = "link-patterns", default = "default_link_patterns")]
    pub link_patterns: Vec<String>,

    /// Selector matching entry anchors inside a listing page
    #[serde(rename = "link-selector", default = "default_link_selector")]
    pub link_selector: String,

    /// Selector for the primary title on an entry page
    #[serde(rename = "h1-selector", default = "default_h1_selector")]
    pub h1_selector: String,

    /// Selector for the secondary title on an entry page
    #[serde(rename = "h2-selector", default = "default_h2_selector")]
    pub h2_selector: String,

    /// Selector for the entry body text
    #[serde(rename = "content-selector", default = "default_content_selector")]
    pub content_selector: String,

    /// Lowercase phrases identifying an anti-automation challenge page
    #[serde(rename = "challenge-keywords", default = "default_challenge_keywords")]
    pub challenge_keywords: Vec<String>,
}

/// HTTP fetch behavior: timeouts, retries, and politeness delays
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Total window allowed for a challenge page to clear, in seconds
    #[serde(rename = "challenge-timeout-secs", default = "default_challenge_timeout_secs")]
    pub challenge_timeout_secs: u64,

    /// Pause between challenge re-checks, in seconds
    #[serde(rename = "challenge-poll-secs", default = "default_challenge_poll_secs")]
    pub challenge_poll_secs: u64,

    /// Fetch attempts for a listing page before degrading to no links
    #[serde(rename = "link-retries", default = "default_link_retries")]
    pub link_retries: u32,

    /// Fetch attempts for an entry page before degrading to empty fields
    #[serde(rename = "field-retries", default = "default_field_retries")]
    pub field_retries: u32,

    /// Fixed delay between retry attempts, in seconds
    #[serde(rename = "retry-wait-secs", default = "default_retry_wait_secs")]
    pub retry_wait_secs: u64,

    /// Politeness pause before each listing-page fetch, in seconds
    #[serde(rename = "page-pause-secs", default = "default_page_pause_secs")]
    pub page_pause_secs: u64,

    /// Politeness pause before each entry-page fetch, in seconds
    #[serde(rename = "entry-pause-secs", default = "default_entry_pause_secs")]
    pub entry_pause_secs: u64,
}

/// On-disk layout of the record store
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the checkpoint, shards, and index snapshot
    ///
    /// The `DATA_DIR` environment variable overrides this at load time.
    #[serde(rename = "data-dir", default = "default_data_dir")]
    pub data_dir: String,

    /// Shard file prefix; shards are named `<prefix>_<NNN>.json`
    #[serde(rename = "shard-prefix", default = "default_shard_prefix")]
    pub shard_prefix: String,

    /// Shard size ceiling in megabytes
    #[serde(rename = "max-shard-mb", default = "default_max_shard_mb")]
    pub max_shard_mb: u64,
}

fn default_start_page() -> u32 {
    6019
}

fn default_max_page() -> u32 {
    7185
}

fn default_pages_per_run() -> u32 {
    10
}

fn default_batch_size() -> usize {
    20
}

fn default_max_runtime_secs() -> u64 {
    // 5.5 hours, a safety margin under a 6-hour CI job limit
    5 * 3600 + 1800
}

fn default_collect_margin_secs() -> u64 {
    600
}

fn default_extract_margin_secs() -> u64 {
    300
}

fn default_base_url() -> String {
    "https://fmit.vn/en/glossary".to_string()
}

fn default_host() -> String {
    "fmit.vn".to_string()
}

fn default_link_patterns() -> Vec<String> {
    vec!["/glossary/".to_string(), "/tu-dien-quan-ly/".to_string()]
}

fn default_link_selector() -> String {
    ".dictionary-items li.item a".to_string()
}

fn default_h1_selector() -> String {
    "h1.dictionary-detail-title".to_string()
}

fn default_h2_selector() -> String {
    "h2.dictionary-detail-title".to_string()
}

fn default_content_selector() -> String {
    "div.dictionary-details".to_string()
}

fn default_challenge_keywords() -> Vec<String> {
    [
        "just a moment",
        "checking your browser",
        "please enable cookies",
        "attention required",
        "verify you are human",
        "enable javascript",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/144.0.0.0 Safari/537.36"
        .to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_challenge_timeout_secs() -> u64 {
    45
}

fn default_challenge_poll_secs() -> u64 {
    5
}

fn default_link_retries() -> u32 {
    3
}

fn default_field_retries() -> u32 {
    5
}

fn default_retry_wait_secs() -> u64 {
    10
}

fn default_page_pause_secs() -> u64 {
    3
}

fn default_entry_pause_secs() -> u64 {
    2
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_shard_prefix() -> String {
    "glossary".to_string()
}

fn default_max_shard_mb() -> u64 {
    // Safety margin below GitHub's 100 MB file limit
    95
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_page: default_start_page(),
            max_page: default_max_page(),
            pages_per_run: default_pages_per_run(),
            batch_size: default_batch_size(),
            max_runtime_secs: default_max_runtime_secs(),
            collect_margin_secs: default_collect_margin_secs(),
            extract_margin_secs: default_extract_margin_secs(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            host: default_host(),
            link_patterns: default_link_patterns(),
            link_selector: default_link_selector(),
            h1_selector: default_h1_selector(),
            h2_selector: default_h2_selector(),
            content_selector: default_content_selector(),
            challenge_keywords: default_challenge_keywords(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            challenge_timeout_secs: default_challenge_timeout_secs(),
            challenge_poll_secs: default_challenge_poll_secs(),
            link_retries: default_link_retries(),
            field_retries: default_field_retries(),
            retry_wait_secs: default_retry_wait_secs(),
            page_pause_secs: default_page_pause_secs(),
            entry_pause_secs: default_entry_pause_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            shard_prefix: default_shard_prefix(),
            max_shard_mb: default_max_shard_mb(),
        }
    }
}

impl SiteConfig {
    /// Builds the URL of a listing page; page 1 is the bare base URL
    pub fn page_url(&self, page: u32) -> String {
        if page <= 1 {
            self.base_url.clone()
        } else {
            format!("{}?page={}", self.base_url, page)
        }
    }
}

impl StorageConfig {
    /// Shard size ceiling in bytes
    pub fn max_shard_bytes(&self) -> u64 {
        self.max_shard_mb * 1024 * 1024
    }
}

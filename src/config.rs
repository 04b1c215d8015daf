use std::{fmt, ops::RangeInclusive, path::PathBuf, time::Duration};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

pub const DEFAULT_BASE_URL: &str = "https://www.congress.gov";
pub const DEFAULT_REQUEST_INTERVAL_MS: u64 = 5000;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chamber {
    House,
    Senate,
}

impl Chamber {
    pub fn slug(self) -> &'static str {
        match self {
            Chamber::House => "house",
            Chamber::Senate => "senate",
        }
    }
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BillType {
    Bill,
    JointResolution,
    ConcurrentResolution,
    Resolution,
}

impl BillType {
    pub fn slug(self) -> &'static str {
        match self {
            BillType::Bill => "bill",
            BillType::JointResolution => "joint-resolution",
            BillType::ConcurrentResolution => "concurrent-resolution",
            BillType::Resolution => "resolution",
        }
    }

    /// Citation prefix, e.g. `H.R.` for a House bill.
    pub fn prefix(self, chamber: Chamber) -> &'static str {
        match (chamber, self) {
            (Chamber::House, BillType::Bill) => "H.R.",
            (Chamber::Senate, BillType::Bill) => "S.",
            (Chamber::House, BillType::JointResolution) => "H.J.Res.",
            (Chamber::Senate, BillType::JointResolution) => "S.J.Res.",
            (Chamber::House, BillType::ConcurrentResolution) => "H.Con.Res.",
            (Chamber::Senate, BillType::ConcurrentResolution) => "S.Con.Res.",
            (Chamber::House, BillType::Resolution) => "H.Res.",
            (Chamber::Senate, BillType::Resolution) => "S.Res.",
        }
    }
}

impl fmt::Display for BillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// `117` -> `117th`, `101` -> `101st`, `112` -> `112th`.
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one. Zero means a failed fetch is final.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for every following one.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        }
    }

    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(retry.saturating_sub(1)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Everything a scrape run needs to know.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub congress_number: u32,
    pub chamber: Chamber,
    pub bill_type: BillType,
    pub start_index: u32,
    pub end_index: u32,
    pub output_path: PathBuf,
    pub base_url: String,
    /// Also fetch the text page of every bill and store it as `raw_text`.
    pub fetch_text: bool,
    /// Minimum pause between two network requests. Zero disables throttling.
    pub request_interval: Duration,
    pub request_timeout: Option<Duration>,
    pub retry: RetryPolicy,
    pub cache_dir: Option<PathBuf>,
}

impl ScrapeConfig {
    pub fn new(
        congress_number: u32,
        chamber: Chamber,
        bill_type: BillType,
        range: RangeInclusive<u32>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            congress_number,
            chamber,
            bill_type,
            start_index: *range.start(),
            end_index: *range.end(),
            output_path: output_path.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            fetch_text: false,
            request_interval: Duration::from_millis(DEFAULT_REQUEST_INTERVAL_MS),
            request_timeout: None,
            retry: RetryPolicy::none(),
            cache_dir: None,
        }
    }

    /// Reads the config from the environment (and `.env`, if present).
    pub fn from_env() -> anyhow::Result<Self> {
        let scraping_env = ScrapingEnv::load_from_env()?;
        let config = Self::from(scraping_env);
        config.validate()?;
        Ok(config)
    }

    pub fn indices(&self) -> RangeInclusive<u32> {
        self.start_index..=self.end_index
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.congress_number == 0 {
            bail!("congress number must be at least 1");
        }
        if self.start_index == 0 {
            bail!("bill numbers start at 1, got start index 0");
        }
        if self.start_index > self.end_index {
            bail!(
                "start index {} is greater than end index {}",
                self.start_index,
                self.end_index
            );
        }
        if self.base_url.trim().is_empty() {
            bail!("base url must not be empty");
        }
        Ok(())
    }
}

/// The env vars read by [`ScrapeConfig::from_env`].
#[derive(Debug, Deserialize)]
pub struct ScrapingEnv {
    congress_number: u32,
    chamber: Chamber,
    bill_type: BillType,
    start_index: u32,
    end_index: u32,
    output_path: String,
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default)]
    fetch_text: bool,
    #[serde(default = "default_request_interval_ms")]
    request_interval_ms: u64,
    request_timeout_secs: Option<u64>,
    #[serde(default)]
    max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    retry_backoff_ms: u64,
    cache_dir: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_interval_ms() -> u64 {
    DEFAULT_REQUEST_INTERVAL_MS
}

fn default_retry_backoff_ms() -> u64 {
    DEFAULT_RETRY_BACKOFF_MS
}

impl From<ScrapingEnv> for ScrapeConfig {
    fn from(env: ScrapingEnv) -> Self {
        Self {
            congress_number: env.congress_number,
            chamber: env.chamber,
            bill_type: env.bill_type,
            start_index: env.start_index,
            end_index: env.end_index,
            output_path: PathBuf::from(env.output_path),
            base_url: env.base_url.trim_end_matches('/').to_string(),
            fetch_text: env.fetch_text,
            request_interval: Duration::from_millis(env.request_interval_ms),
            request_timeout: env.request_timeout_secs.map(Duration::from_secs),
            retry: RetryPolicy {
                max_retries: env.max_retries,
                backoff: Duration::from_millis(env.retry_backoff_ms),
            },
            cache_dir: env.cache_dir.filter(|dir| !dir.is_empty()).map(PathBuf::from),
        }
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config =
            envy::from_env::<Self>().context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_pairs(extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = [
            ("CONGRESS_NUMBER", "117"),
            ("CHAMBER", "senate"),
            ("BILL_TYPE", "joint-resolution"),
            ("START_INDEX", "1"),
            ("END_INDEX", "70"),
            ("OUTPUT_PATH", "data/bills.jsonl"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        pairs.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        pairs
    }

    #[test]
    fn ordinals() {
        assert_eq!(ordinal(117), "117th");
        assert_eq!(ordinal(101), "101st");
        assert_eq!(ordinal(102), "102nd");
        assert_eq!(ordinal(103), "103rd");
        assert_eq!(ordinal(111), "111th");
        assert_eq!(ordinal(112), "112th");
        assert_eq!(ordinal(113), "113th");
        assert_eq!(ordinal(121), "121st");
    }

    #[test]
    fn prefixes_follow_chamber_and_type() {
        assert_eq!(BillType::Bill.prefix(Chamber::House), "H.R.");
        assert_eq!(BillType::Bill.prefix(Chamber::Senate), "S.");
        assert_eq!(
            BillType::ConcurrentResolution.prefix(Chamber::Senate),
            "S.Con.Res."
        );
    }

    #[test]
    fn env_defaults_are_applied() {
        let env: ScrapingEnv = envy::from_iter(env_pairs(&[])).unwrap();
        let config = ScrapeConfig::from(env);
        assert_eq!(config.chamber, Chamber::Senate);
        assert_eq!(config.bill_type, BillType::JointResolution);
        assert_eq!(config.indices(), 1..=70);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(!config.fetch_text);
        assert_eq!(
            config.request_interval,
            Duration::from_millis(DEFAULT_REQUEST_INTERVAL_MS)
        );
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.cache_dir, None);
        config.validate().unwrap();
    }

    #[test]
    fn env_overrides() {
        let env: ScrapingEnv = envy::from_iter(env_pairs(&[
            ("BASE_URL", "http://localhost:8080/"),
            ("FETCH_TEXT", "true"),
            ("REQUEST_INTERVAL_MS", "0"),
            ("REQUEST_TIMEOUT_SECS", "30"),
            ("MAX_RETRIES", "2"),
            ("RETRY_BACKOFF_MS", "250"),
            ("CACHE_DIR", "cache/html"),
        ]))
        .unwrap();
        let config = ScrapeConfig::from(env);
        assert_eq!(config.base_url, "http://localhost:8080");
        assert!(config.fetch_text);
        assert_eq!(config.request_interval, Duration::ZERO);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.retry.backoff, Duration::from_millis(250));
        assert_eq!(config.cache_dir, Some(PathBuf::from("cache/html")));
    }

    #[test]
    fn unknown_chamber_is_rejected() {
        let mut pairs = env_pairs(&[]);
        pairs[1].1 = "parliament".to_string();
        assert!(envy::from_iter::<_, ScrapingEnv>(pairs).is_err());
    }

    #[test]
    fn inverted_range_is_invalid() {
        let config = ScrapeConfig::new(117, Chamber::House, BillType::Bill, 5..=3, "out.jsonl");
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_start_index_is_invalid() {
        let config = ScrapeConfig::new(117, Chamber::House, BillType::Bill, 0..=3, "out.jsonl");
        assert!(config.validate().is_err());
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy {
            max_retries: 3,
            backoff: Duration::from_millis(100),
        };
        assert_eq!(policy.delay_before_retry(1), Duration::from_millis(100));
        assert_eq!(policy.delay_before_retry(2), Duration::from_millis(200));
        assert_eq!(policy.delay_before_retry(3), Duration::from_millis(400));
    }
}

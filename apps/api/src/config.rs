use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::retry::RetryPolicy;
use crate::ranking::weights::EvaluationWeights;

/// Longest single backoff sleep the retry schedule may reach.
const MAX_BACKOFF_DELAY: Duration = Duration::from_secs(600);

/// Application configuration loaded from environment variables.
/// Fails at startup if `OPENAI_API_KEY` is missing or any value is malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub model_name: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub weights: EvaluationWeights,
    pub batch_size: usize,
    pub max_retries: u32,
    pub backoff_factor: f64,
    pub allowed_extensions: Vec<String>,
    pub max_file_size_mb: u64,
    pub cv_input_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model_name: std::env::var("MODEL_NAME").unwrap_or_else(|_| "gpt-4".to_string()),
            temperature: parse_env("TEMPERATURE", 0.2)?,
            max_tokens: parse_env("MAX_TOKENS", 4096)?,
            top_p: parse_env("TOP_P", 1.0)?,
            weights: EvaluationWeights {
                skills: parse_env("WEIGHT_SKILLS", 0.4)?,
                experience: parse_env("WEIGHT_EXPERIENCE", 0.4)?,
                education: parse_env("WEIGHT_EDUCATION", 0.2)?,
            },
            batch_size: parse_env("BATCH_SIZE", 5)?,
            max_retries: parse_env("MAX_RETRIES", 3)?,
            backoff_factor: parse_env("BACKOFF_FACTOR", 2.0)?,
            allowed_extensions: std::env::var("ALLOWED_EXTENSIONS")
                .map(|v| parse_extensions(&v))
                .unwrap_or_else(|_| default_extensions()),
            max_file_size_mb: parse_env("MAX_FILE_SIZE_MB", 5)?,
            cv_input_dir: std::env::var("CV_INPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./cvs")),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make every run fail before it starts.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("BATCH_SIZE must be at least 1");
        }
        if self.max_retries == 0 {
            bail!("MAX_RETRIES must be at least 1");
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor < 0.0 {
            bail!("BACKOFF_FACTOR must be a non-negative number");
        }
        let longest_delay = self.retry_policy().delay_for(self.max_retries - 1);
        if longest_delay > MAX_BACKOFF_DELAY {
            bail!(
                "BACKOFF_FACTOR {} with MAX_RETRIES {} sleeps {}s before the last attempt, above the {}s limit",
                self.backoff_factor,
                self.max_retries,
                longest_delay.as_secs(),
                MAX_BACKOFF_DELAY.as_secs()
            );
        }
        if self.max_file_size_mb == 0 {
            bail!("MAX_FILE_SIZE_MB must be at least 1");
        }
        if let Err(reason) = self.weights.validate() {
            bail!("Invalid default weights: {reason}");
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.backoff_factor)
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

fn default_extensions() -> Vec<String> {
    ["pdf", "docx", "txt"].iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        openai_api_key: "test-key".to_string(),
        openai_base_url: "http://localhost:0/v1".to_string(),
        model_name: "gpt-4".to_string(),
        temperature: 0.2,
        max_tokens: 4096,
        top_p: 1.0,
        weights: EvaluationWeights::default(),
        batch_size: 2,
        max_retries: 3,
        backoff_factor: 2.0,
        allowed_extensions: default_extensions(),
        max_file_size_mb: 5,
        cv_input_dir: PathBuf::from("./cvs"),
        port: 8080,
        rust_log: "info".to_string(),
    }
}

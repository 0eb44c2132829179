//! Explicit loader configuration, built once by the caller.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::normalize::MissingPolicy;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

const SHORT_PATTERN: usize = 2;

/// One mapping rule: any pattern found in the name selects `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRule {
    pub patterns: Vec<String>,
    pub target: String,
}

/// Maps display names ("Mexico City") to backend keys ("mexicocity").
///
/// Rules are tried in order. Patterns match as substrings, except patterns
/// of two characters or fewer, which must match a whole word: "la" matches
/// "LA" but not "Atlanta". Names no rule matches are lowercased with
/// whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityNameMapper {
    pub rules: Vec<CityRule>,
}

impl Default for CityNameMapper {
    fn default() -> Self {
        let rule = |patterns: &[&str], target: &str| CityRule {
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            target: target.to_string(),
        };
        CityNameMapper {
            rules: vec![
                rule(&["mexico", "cdmx"], "mexicocity"),
                rule(&["los angeles", "la"], "la"),
            ],
        }
    }
}

impl CityNameMapper {
    pub fn map(&self, name: &str) -> String {
        let city = name.trim().to_lowercase();
        let words: Vec<&str> = city
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let matches = |pattern: &String| {
            if pattern.chars().count() <= SHORT_PATTERN {
                words.contains(&pattern.as_str())
            } else {
                city.contains(pattern.as_str())
            }
        };

        self.rules
            .iter()
            .find(|rule| rule.patterns.iter().any(matches))
            .map(|rule| rule.target.clone())
            .unwrap_or_else(|| city.split_whitespace().collect())
    }
}

/// Everything a [`crate::loader::LocationLoader`] needs.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub api_base_url: String,
    pub city_names: CityNameMapper,
    pub expected_hours: u32,
    pub missing_policy: MissingPolicy,
    pub request_timeout: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            city_names: CityNameMapper::default(),
            expected_hours: 24,
            missing_policy: MissingPolicy::Zero,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl LoaderConfig {
    /// Reads overrides from `AIRGUARD_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = LoaderConfig::default();

        if let Some(url) = lookup("AIRGUARD_API_BASE_URL") {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(hours) = lookup("AIRGUARD_EXPECTED_HOURS") {
            config.expected_hours = hours
                .parse()
                .with_context(|| format!("AIRGUARD_EXPECTED_HOURS is not a number: '{hours}'"))?;
        }
        if let Some(policy) = lookup("AIRGUARD_MISSING_POLICY") {
            config.missing_policy = policy.parse()?;
        }
        if let Some(secs) = lookup("AIRGUARD_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("AIRGUARD_TIMEOUT_SECS is not a number: '{secs}'"))?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

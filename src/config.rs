use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::services::compatibility::ScoringVariant;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Which genders a requester sees when the search carries no explicit
/// gender filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenderPolicy {
    /// Only candidates sharing the requester's gender.
    #[default]
    Same,
    Opposite,
    Any,
}

impl FromStr for GenderPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "same" => Ok(GenderPolicy::Same),
            "opposite" => Ok(GenderPolicy::Opposite),
            "any" => Ok(GenderPolicy::Any),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// External id used as the caller when a request carries no token.
    /// Unset in production.
    pub dev_external_id: Option<i64>,
    pub search_limit: usize,
    pub gender_policy: GenderPolicy,
    pub scoring_variant: ScoringVariant,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            dev_external_id: None,
            search_limit: 50,
            gender_policy: GenderPolicy::default(),
            scoring_variant: ScoringVariant::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Settings::default();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let host = env::var("HOST").unwrap_or(defaults.host);
        let port = parse_var("PORT")?.unwrap_or(defaults.port);
        let dev_external_id = parse_var("DEV_EXTERNAL_ID")?;
        let search_limit = parse_var::<usize>("SEARCH_LIMIT")?
            .unwrap_or(defaults.search_limit)
            .clamp(1, 100);
        let gender_policy = parse_var("GENDER_POLICY")?.unwrap_or(defaults.gender_policy);
        let scoring_variant = parse_var("SCORING_VARIANT")?.unwrap_or(defaults.scoring_variant);

        Ok(Settings {
            database_url,
            host,
            port,
            dev_external_id,
            search_limit,
            gender_policy,
            scoring_variant,
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(None),
    }
}

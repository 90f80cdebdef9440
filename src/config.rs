use chrono::Duration;
use std::env;
use std::fmt::Display;
use std::str::FromStr;

use crate::engine::commission::CommissionRates;
use crate::engine::eligibility::RankingPolicy;
use crate::error::ConfigError;

/// Process configuration, read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub engine: EngineSettings,
}

/// Tunables the assignment and commission engine reads.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// How many ranked candidates a shortlist offers the order to.
    pub shortlist_size: usize,
    /// How long a shortlist or manual offer stays open.
    pub offer_window: Duration,
    pub ranking: RankingPolicy,
    pub commission: CommissionRates,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            shortlist_size: 3,
            offer_window: Duration::hours(24),
            ranking: RankingPolicy::default(),
            commission: CommissionRates::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let port = parse_or("PORT", 8080u16)?;

        let defaults = EngineSettings::default();

        let shortlist_size = parse_or("SHORTLIST_SIZE", defaults.shortlist_size)?;
        if shortlist_size == 0 {
            return Err(ConfigError::Invalid {
                key: "SHORTLIST_SIZE",
                reason: "must be at least 1".to_string(),
            });
        }

        let offer_window_hours = parse_or("OFFER_WINDOW_HOURS", 24i64)?;
        if offer_window_hours <= 0 {
            return Err(ConfigError::Invalid {
                key: "OFFER_WINDOW_HOURS",
                reason: "must be positive".to_string(),
            });
        }

        let default_delivery_fee =
            parse_or("DEFAULT_DELIVERY_FEE", defaults.commission.default_delivery_fee)?;
        if default_delivery_fee < 0 {
            return Err(ConfigError::Invalid {
                key: "DEFAULT_DELIVERY_FEE",
                reason: "must not be negative".to_string(),
            });
        }

        let ranking = match env::var("RANKING_ORDER") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.ranking,
        };

        Ok(Self {
            database_url,
            port,
            engine: EngineSettings {
                shortlist_size,
                offer_window: Duration::hours(offer_window_hours),
                ranking,
                commission: CommissionRates {
                    default_delivery_fee,
                    ..defaults.commission
                },
            },
        })
    }
}

fn parse_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

//! Which designers may work an order, best first.
//!
//! Everything here is pure: it reads an order and a designer pool and never
//! writes, so it backs both shortlisting and the recommendation view.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::models::designers::{self, DesignerStatus};
use crate::models::orders;

/// Title words shorter than this are ignored by the title fallback.
const MIN_TITLE_TOKEN_LEN: usize = 3;

/// One criterion of the ranking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankKey {
    /// Higher skill tier first.
    Skill,
    /// Higher rating first.
    Rating,
    /// Lower current load first.
    Load,
}

impl FromStr for RankKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skill" => Ok(Self::Skill),
            "rating" => Ok(Self::Rating),
            "load" => Ok(Self::Load),
            other => Err(ConfigError::Invalid {
                key: "RANKING_ORDER",
                reason: format!("unknown ranking key '{other}'"),
            }),
        }
    }
}

impl fmt::Display for RankKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Skill => "skill",
            Self::Rating => "rating",
            Self::Load => "load",
        };
        f.write_str(name)
    }
}

/// Precedence of ranking criteria. Designer id always breaks the final tie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingPolicy {
    keys: Vec<RankKey>,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            keys: vec![RankKey::Skill, RankKey::Rating, RankKey::Load],
        }
    }
}

impl RankingPolicy {
    /// Keys are applied in the given order; repeats are dropped.
    pub fn new(keys: impl IntoIterator<Item = RankKey>) -> Self {
        let mut unique = Vec::new();
        for key in keys {
            if !unique.contains(&key) {
                unique.push(key);
            }
        }
        Self { keys: unique }
    }

    pub fn keys(&self) -> &[RankKey] {
        &self.keys
    }

    /// `Less` means `a` ranks ahead of `b`.
    pub fn compare(&self, a: &designers::Model, b: &designers::Model) -> Ordering {
        self.keys
            .iter()
            .map(|key| match key {
                RankKey::Skill => b.skill_level.cmp(&a.skill_level),
                RankKey::Rating => b.rating.total_cmp(&a.rating),
                RankKey::Load => a.current_load.cmp(&b.current_load),
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    }
}

impl FromStr for RankingPolicy {
    type Err = ConfigError;

    /// Parses a comma-separated list such as `rating,skill,load`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keys = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(RankKey::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        if keys.is_empty() {
            return Err(ConfigError::Invalid {
                key: "RANKING_ORDER",
                reason: "at least one ranking key is required".to_string(),
            });
        }

        Ok(Self::new(keys))
    }
}

impl fmt::Display for RankingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

/// Rank every eligible designer in `pool` for `order`, most preferred first.
pub fn rank_candidates<'a>(
    order: &orders::Model,
    pool: &'a [designers::Model],
    policy: &RankingPolicy,
) -> Vec<&'a designers::Model> {
    let mut eligible: Vec<&designers::Model> = pool
        .iter()
        .filter(|designer| is_eligible(order, designer))
        .collect();
    eligible.sort_by(|a, b| policy.compare(a, b));
    eligible
}

/// Available, with spare capacity, and a specialty that fits the order.
pub fn is_eligible(order: &orders::Model, designer: &designers::Model) -> bool {
    designer.status == DesignerStatus::Available
        && designer.has_capacity()
        && matches_specialty(order, &designer.specialty_tags())
}

/// Case-insensitive specialty match.
///
/// With a category, a tag matches when either string contains the other.
/// Without one, any title word of at least three characters is matched the
/// same way.
pub fn matches_specialty(order: &orders::Model, specialties: &[String]) -> bool {
    let tags: Vec<String> = specialties
        .iter()
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect();

    let category = order
        .category
        .as_deref()
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty());

    match category {
        Some(category) => tags.iter().any(|tag| overlaps(tag, &category)),
        None => title_tokens(&order.title)
            .iter()
            .any(|token| tags.iter().any(|tag| overlaps(tag, token))),
    }
}

fn overlaps(tag: &str, token: &str) -> bool {
    tag.contains(token) || token.contains(tag)
}

fn title_tokens(title: &str) -> Vec<String> {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() >= MIN_TITLE_TOKEN_LEN)
        .map(str::to_lowercase)
        .collect()
}

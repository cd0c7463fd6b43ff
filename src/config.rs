//! Application-level configuration: competition goal, milestone table, ward
//! roster, and seed accounts.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::dao::models::Role;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "WARD_POINTS_CONFIG_PATH";
/// Competition goal used when the config file does not provide one.
const DEFAULT_GOAL_POINTS: i64 = 1300;

/// A point-total threshold mapped to the achievement it unlocks.
#[derive(Clone, Debug, Deserialize)]
pub struct Milestone {
    /// Verified point total at which the achievement is earned.
    pub threshold: i64,
    /// Unique achievement kind, at most one award per ward.
    pub kind: String,
    /// Display title.
    pub title: String,
    /// Longer description shown alongside the title.
    #[serde(default)]
    pub description: String,
    /// Display icon (usually an emoji).
    pub icon: String,
}

/// Account seeded into the store at startup.
#[derive(Clone, Debug, Deserialize)]
pub struct AccountSeed {
    /// Login email, unique across accounts.
    pub email: String,
    /// Secret compared verbatim at login.
    pub password: String,
    /// Role governing what the account may decide.
    pub role: Role,
    /// Ward name the account approves for; required for `ward_approver`.
    #[serde(default)]
    pub ward: Option<String>,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    goal_points: i64,
    milestones: Vec<Milestone>,
    wards: Vec<String>,
    accounts: Vec<AccountSeed>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in
    /// defaults when the file is missing or malformed.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        goal = config.goal_points,
                        wards = config.wards.len(),
                        milestones = config.milestones.len(),
                        "loaded competition config"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Build a config directly from its parts. Primarily used by tests.
    pub fn with_parts(
        goal_points: i64,
        mut milestones: Vec<Milestone>,
        wards: Vec<String>,
        accounts: Vec<AccountSeed>,
    ) -> Self {
        milestones.sort_by_key(|m| m.threshold);
        Self {
            goal_points,
            milestones,
            wards,
            accounts,
        }
    }

    /// Fixed competition goal the progress percentage is computed against.
    pub fn goal_points(&self) -> i64 {
        self.goal_points
    }

    /// Milestones whose threshold the given verified total has reached, in
    /// ascending threshold order.
    pub fn milestones_reached(&self, verified_points: i64) -> impl Iterator<Item = &Milestone> {
        self.milestones
            .iter()
            .filter(move |m| verified_points >= m.threshold)
    }

    /// Ward names seeded into an empty store at startup.
    pub fn wards(&self) -> &[String] {
        &self.wards
    }

    /// Accounts seeded into an empty store at startup.
    pub fn accounts(&self) -> &[AccountSeed] {
        &self.accounts
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::with_parts(
            DEFAULT_GOAL_POINTS,
            default_milestones(),
            Vec::new(),
            Vec::new(),
        )
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file.
struct RawConfig {
    #[serde(default)]
    goal_points: Option<i64>,
    #[serde(default)]
    milestones: Option<Vec<Milestone>>,
    #[serde(default)]
    wards: Vec<String>,
    #[serde(default)]
    accounts: Vec<AccountSeed>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self::with_parts(
            value.goal_points.unwrap_or(DEFAULT_GOAL_POINTS),
            value.milestones.unwrap_or_else(default_milestones),
            value.wards,
            value.accounts,
        )
    }
}

fn resolve_config_path() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn milestone(threshold: i64, kind: &str, title: &str, icon: &str) -> Milestone {
    Milestone {
        threshold,
        kind: kind.to_string(),
        title: title.to_string(),
        description: String::new(),
        icon: icon.to_string(),
    }
}

fn default_milestones() -> Vec<Milestone> {
    vec![
        milestone(100, "first_100", "First 100 Points!", "💯"),
        milestone(500, "first_500", "First to 500!", "⚡"),
        milestone(1000, "first_1000", "Thousand Club!", "🎯"),
        milestone(DEFAULT_GOAL_POINTS, "goal_reached", "Goal Achieved!", "🏆"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestones_reached_respects_thresholds() {
        let config = AppConfig::default();
        let kinds: Vec<_> = config
            .milestones_reached(650)
            .map(|m| m.kind.as_str())
            .collect();
        assert_eq!(kinds, ["first_100", "first_500"]);
        assert_eq!(config.milestones_reached(99).count(), 0);
        assert_eq!(config.milestones_reached(1300).count(), 4);
    }

    #[test]
    fn with_parts_sorts_milestones_ascending() {
        let config = AppConfig::with_parts(
            1300,
            vec![
                milestone(500, "b", "B", "⚡"),
                milestone(100, "a", "A", "💯"),
            ],
            Vec::new(),
            Vec::new(),
        );
        let thresholds: Vec<_> = config.milestones_reached(500).map(|m| m.threshold).collect();
        assert_eq!(thresholds, [100, 500]);
    }
}

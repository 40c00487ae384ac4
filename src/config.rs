//! Runtime configuration.
//!
//! Values come from environment variables and fall back to logged defaults.
//! The resulting [`StudyConfig`] is passed explicitly to the store and to
//! every scheduling call; nothing in the crate reads ambient state.

use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use log::{info, warn};

use crate::error::{Result, StudyError};
use crate::models::SchedulerPolicy;

pub const DB_VAR: &str = "LEGAL_STUDY_DB";
pub const OWNER_VAR: &str = "LEGAL_STUDY_OWNER";
pub const PASS_THRESHOLD_VAR: &str = "LEGAL_STUDY_PASS_THRESHOLD";
pub const MAX_LEVEL_VAR: &str = "LEGAL_STUDY_MAX_LEVEL";

const DEFAULT_DB: &str = "study.sqlite3";
const DEFAULT_OWNER: &str = "local";

#[derive(Clone, Debug)]
pub struct StudyConfig {
    pub database_path: PathBuf,
    pub owner_id: String,
    pub policy: SchedulerPolicy,
}

impl StudyConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, so callers and tests can
    /// supply values without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = PathBuf::from(load_or_default(&lookup, DB_VAR, DEFAULT_DB));
        let owner_id = load_or_default(&lookup, OWNER_VAR, DEFAULT_OWNER);

        let defaults = SchedulerPolicy::default();
        let pass_threshold = try_parse(&lookup, PASS_THRESHOLD_VAR, defaults.pass_threshold)?;
        let max_level = try_parse(&lookup, MAX_LEVEL_VAR, defaults.max_level)?;
        let policy = SchedulerPolicy::new(pass_threshold, max_level)?;

        if owner_id.trim().is_empty() {
            return Err(StudyError::Config(format!("{OWNER_VAR} must not be empty")));
        }

        Ok(Self {
            database_path,
            owner_id,
            policy,
        })
    }
}

fn load_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn try_parse<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e| {
            warn!("Invalid {key} value: {e}");
            StudyError::Config(format!("invalid {key} value {raw:?}: {e}"))
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

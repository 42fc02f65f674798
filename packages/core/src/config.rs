//! Configuration for the job system and the model backend.

use serde::{Deserialize, Serialize};

use crate::{AdmissionGate, ConfigError};

/// Default cap on stored job records.
pub const DEFAULT_MAX_JOBS: usize = 100;

/// Default cap on the admission backlog.
pub const DEFAULT_MAX_QUEUE: usize = 10;

/// Environment variable naming the model location.
pub const MODEL_PATH_ENV: &str = "MODEL_PATH";

/// Model location used when `MODEL_PATH` is unset.
pub const DEFAULT_MODEL_PATH: &str = "./models/qwen2.5-3b";

/// Capacity settings for admission and storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum number of job records kept for polling.
    pub max_jobs: usize,
    /// Maximum backlog before submissions are rejected.
    pub max_queue: usize,
    /// How the backlog is measured.
    pub admission_gate: AdmissionGate,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_jobs: DEFAULT_MAX_JOBS,
            max_queue: DEFAULT_MAX_QUEUE,
            admission_gate: AdmissionGate::default(),
        }
    }
}

impl QueueConfig {
    pub const MAX_JOBS_ENV: &'static str = "NIMBUS_MAX_JOBS";
    pub const MAX_QUEUE_ENV: &'static str = "NIMBUS_MAX_QUEUE";
    pub const ADMISSION_GATE_ENV: &'static str = "NIMBUS_ADMISSION_GATE";

    pub fn new(max_jobs: usize, max_queue: usize) -> Self {
        Self {
            max_jobs,
            max_queue,
            ..Default::default()
        }
    }

    /// Set the admission gate.
    pub fn with_admission_gate(mut self, gate: AdmissionGate) -> Self {
        self.admission_gate = gate;
        self
    }

    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from a key lookup, falling back to defaults for
    /// missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(Self::MAX_JOBS_ENV) {
            config.max_jobs = parse_count(Self::MAX_JOBS_ENV, &value)?;
        }
        if let Some(value) = lookup(Self::MAX_QUEUE_ENV) {
            config.max_queue = parse_count(Self::MAX_QUEUE_ENV, &value)?;
        }
        if let Some(value) = lookup(Self::ADMISSION_GATE_ENV) {
            config.admission_gate =
                AdmissionGate::parse(&value).ok_or_else(|| ConfigError::InvalidGate {
                    key: Self::ADMISSION_GATE_ENV.to_string(),
                    value,
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject caps that would make the system unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_jobs == 0 {
            return Err(ConfigError::Zero {
                key: "max_jobs".into(),
            });
        }
        if self.max_queue == 0 {
            return Err(ConfigError::Zero {
                key: "max_queue".into(),
            });
        }
        Ok(())
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize, ConfigError> {
    let parsed: usize = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
        })?;
    if parsed == 0 {
        return Err(ConfigError::Zero {
            key: key.to_string(),
        });
    }
    Ok(parsed)
}

/// Where the model backend lives.
///
/// The path is resolved on every call so a changed environment is picked up
/// by the next job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Environment variable consulted for the path.
    pub env_var: String,
    /// Path used when the variable is unset or empty.
    pub default_path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            env_var: MODEL_PATH_ENV.to_string(),
            default_path: DEFAULT_MODEL_PATH.to_string(),
        }
    }
}

impl ModelConfig {
    /// Resolve the model path from the environment.
    pub fn model_path(&self) -> String {
        std::env::var(&self.env_var)
            .ok()
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| self.default_path.clone())
    }
}

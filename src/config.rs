//! Runtime configuration for los-explain.

use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{LosError, Result};

/// Application settings resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Root folder for analytic outputs.
    pub outputs_dir: PathBuf,
    /// Base URL of an OpenAI-compatible chat completion API.
    pub llm_api_base: String,
    /// Optional bearer token for the chat API.
    pub llm_api_key: Option<String>,
    /// Model used to write reasoning traces.
    pub reasoning_model: String,
    /// Model used to judge reasoning traces.
    pub judge_model: String,
    /// Per-request timeout for chat calls.
    pub llm_timeout_secs: u64,
    /// Default seed for every stochastic step.
    pub seed: u64,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let outputs_dir = env::var("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./outputs"));
        let llm_api_base = env::var("LLM_API_BASE")
            .unwrap_or_else(|_| "http://localhost:8000/v1".to_string());
        let llm_api_key = env::var("LLM_API_KEY").ok().filter(|k| !k.trim().is_empty());
        let reasoning_model =
            env::var("REASONING_MODEL").unwrap_or_else(|_| "meta-llama/Llama-3.1-8B-Instruct".to_string());
        let judge_model =
            env::var("JUDGE_MODEL").unwrap_or_else(|_| "mistralai/Mistral-7B-Instruct-v0.3".to_string());
        let llm_timeout_secs = env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);
        let seed = env::var("SEED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(42);

        std::fs::create_dir_all(&outputs_dir).context("creating outputs dir")?;

        Ok(Self {
            outputs_dir,
            llm_api_base,
            llm_api_key,
            reasoning_model,
            judge_model,
            llm_timeout_secs,
            seed,
        })
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}

/// How explained instances are picked from the scored pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Lowest predictive variance first.
    Confident,
    /// Highest predictive variance first.
    Uncertain,
}

/// Every tunable of one experiment run, passed explicitly to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub seed: u64,
    pub test_fraction: f64,
    pub mc_samples: usize,
    pub dropout_rate: f64,
    pub lime_samples: usize,
    pub num_features: usize,
    pub fractions: Vec<f64>,
    pub instances: usize,
    pub selection: SelectionPolicy,
    pub max_vocabulary: usize,
    pub l2_penalty: f64,
    pub max_iterations: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
            mc_samples: 20,
            dropout_rate: 0.1,
            lime_samples: 1000,
            num_features: 10,
            fractions: vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0],
            instances: 10,
            selection: SelectionPolicy::Confident,
            max_vocabulary: 5000,
            l2_penalty: 1.0,
            max_iterations: 150,
        }
    }
}

impl ExperimentConfig {
    /// Reject tunables that would make the run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.mc_samples == 0 {
            return Err(LosError::InvalidConfig(
                "mc_samples must be at least 1".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.dropout_rate) {
            return Err(LosError::InvalidConfig(format!(
                "dropout_rate {} outside [0, 1)",
                self.dropout_rate
            )));
        }
        if !(0.0..1.0).contains(&self.test_fraction) || self.test_fraction == 0.0 {
            return Err(LosError::InvalidConfig(format!(
                "test_fraction {} outside (0, 1)",
                self.test_fraction
            )));
        }
        if self.lime_samples < 2 {
            return Err(LosError::InvalidConfig(
                "lime_samples must be at least 2".into(),
            ));
        }
        if self.num_features == 0 || self.instances == 0 || self.max_vocabulary == 0 {
            return Err(LosError::InvalidConfig(
                "num_features, instances and max_vocabulary must be positive".into(),
            ));
        }
        crate::explain::deletion::validate_fractions(&self.fractions)
    }

    /// Evenly spaced fractions `0, 1/steps, ..., 1`.
    pub fn even_fractions(steps: usize) -> Vec<f64> {
        let steps = steps.max(1);
        (0..=steps).map(|i| i as f64 / steps as f64).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        ExperimentConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_samples_rejected() {
        let config = ExperimentConfig {
            mc_samples: 0,
            ..ExperimentConfig::default()
        };
        assert!(matches!(config.validate(), Err(LosError::InvalidConfig(_))));
    }

    #[test]
    fn even_fractions_span_unit_interval() {
        assert_eq!(ExperimentConfig::even_fractions(4), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }
}

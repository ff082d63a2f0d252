use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::explicit::{SearchConfig, SearchStrategy};
use crate::net::{EnablingRule, MarkingPolicy};
use crate::symbolic::FixpointOptions;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ReachConfig {
    #[serde(default)]
    pub marking_policy: MarkingPolicy,
    #[serde(default)]
    pub enabling_rule: EnablingRule,
    #[serde(default)]
    pub max_iterations: Option<usize>,
    #[serde(default)]
    pub state_limit: Option<usize>,
    #[serde(default = "default_strategies")]
    pub strategies: Vec<SearchStrategy>,
}

impl Default for ReachConfig {
    fn default() -> Self {
        Self {
            marking_policy: MarkingPolicy::default(),
            enabling_rule: EnablingRule::default(),
            max_iterations: None,
            state_limit: None,
            strategies: default_strategies(),
        }
    }
}

impl ReachConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn fixpoint_options(&self) -> FixpointOptions {
        FixpointOptions {
            max_iterations: self.max_iterations,
        }
    }

    pub fn search_config(&self, strategy: SearchStrategy) -> SearchConfig {
        SearchConfig {
            strategy,
            rule: self.enabling_rule,
            state_limit: self.state_limit,
        }
    }
}

fn default_strategies() -> Vec<SearchStrategy> {
    vec![SearchStrategy::BreadthFirst, SearchStrategy::DepthFirst]
}

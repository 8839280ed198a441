//! Agent configurator — resolves an interview agent category to the LiveKit
//! connection descriptor the front-end needs to open a session.
//!
//! Built once from `LiveKitSettings` at startup; never mutated afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LiveKitSettings;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AgentError {
    #[error("Unknown agent type: {0}")]
    UnknownAgentType(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    Technical,
    Behavioral,
}

impl AgentType {
    pub const ALL: [AgentType; 2] = [AgentType::Technical, AgentType::Behavioral];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::Technical => "technical",
            AgentType::Behavioral => "behavioral",
        }
    }

    fn room(&self) -> &'static str {
        match self {
            AgentType::Technical => "te",
            AgentType::Behavioral => "be",
        }
    }

    fn agent_name(&self) -> &'static str {
        match self {
            AgentType::Technical => "Technical Expert",
            AgentType::Behavioral => "HR Specialist",
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentType {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "technical" => Ok(AgentType::Technical),
            "behavioral" => Ok(AgentType::Behavioral),
            other => Err(AgentError::UnknownAgentType(other.to_string())),
        }
    }
}

/// Everything needed to join an agent's LiveKit room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    #[serde(rename = "type")]
    pub agent_type: AgentType,
    pub token: String,
    pub room: String,
    pub url: String,
    pub agent_name: String,
    pub description: String,
}

/// Whether an agent can be connected to, and if not, why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AgentReadiness {
    Configured,
    Misconfigured { token_missing: bool, url_missing: bool },
    UnknownAgent { requested: String },
}

impl AgentReadiness {
    pub fn is_configured(&self) -> bool {
        matches!(self, AgentReadiness::Configured)
    }
}

#[derive(Debug, Clone)]
pub struct AgentConfigurator {
    settings: LiveKitSettings,
}

impl AgentConfigurator {
    pub fn new(settings: LiveKitSettings) -> Self {
        Self { settings }
    }

    pub fn agent_config(&self, agent_type: AgentType) -> AgentConfig {
        let (token, url) = match agent_type {
            AgentType::Technical => (&self.settings.technical_token, &self.settings.technical_url),
            AgentType::Behavioral => (
                &self.settings.behavioural_token,
                &self.settings.behavioural_url,
            ),
        };

        AgentConfig {
            agent_type,
            token: token.clone(),
            room: agent_type.room().to_string(),
            url: url.clone(),
            agent_name: agent_type.agent_name().to_string(),
            description: "AI Agent".to_string(),
        }
    }

    /// Looks up an agent from untrusted input such as a path segment.
    pub fn agent_config_for(&self, agent_type: &str) -> Result<AgentConfig, AgentError> {
        let agent_type: AgentType = agent_type.parse()?;
        Ok(self.agent_config(agent_type))
    }

    /// Never fails: unknown agent types report `UnknownAgent`.
    pub fn readiness(&self, agent_type: &str) -> AgentReadiness {
        let config = match self.agent_config_for(agent_type) {
            Ok(config) => config,
            Err(AgentError::UnknownAgentType(requested)) => {
                return AgentReadiness::UnknownAgent { requested }
            }
        };

        let token_missing = config.token.is_empty();
        let url_missing = config.url.is_empty();
        if token_missing || url_missing {
            AgentReadiness::Misconfigured {
                token_missing,
                url_missing,
            }
        } else {
            AgentReadiness::Configured
        }
    }

    pub fn is_agent_configured(&self, agent_type: &str) -> bool {
        self.readiness(agent_type).is_configured()
    }

    pub fn livekit_url(&self, agent_type: AgentType) -> String {
        self.agent_config(agent_type).url
    }
}

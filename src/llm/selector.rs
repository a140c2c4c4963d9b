//! Provider selection policy.
//!
//! Chooses between the two chat-completion backends from the request
//! context. JoyBuilder is only reachable from the internal network; GLM is
//! public and has a free fast-model tier. The branch ordering below is
//! deliberate business policy and every branch is pinned by a test.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two configured chat-completion backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Glm,
    JoyBuilder,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Glm => "glm",
            ProviderId::JoyBuilder => "joybuilder",
        }
    }

    pub fn other(&self) -> ProviderId {
        match self {
            ProviderId::Glm => ProviderId::JoyBuilder,
            ProviderId::JoyBuilder => ProviderId::Glm,
        }
    }
}

/// How demanding the task is expected to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    #[default]
    Medium,
    Complex,
}

/// What the caller wants to optimize for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Speed,
    Quality,
    Cost,
}

/// Context for one selection decision.
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext {
    /// Whether the process is running inside the corporate network, where
    /// the JoyBuilder gateway is reachable.
    pub is_internal_network: bool,
    pub complexity: Complexity,
    pub priority: Option<Priority>,
}

#[derive(Debug, Error)]
#[error("no LLM provider is configured and available")]
pub struct NoProviderAvailable;

/// Pick a provider. Deterministic, no I/O.
///
/// Availability short-circuits everything: with exactly one provider
/// available that provider wins regardless of context, and with none the
/// call fails. With both available:
/// - cost priority always takes GLM (free fast tier)
/// - speed priority takes JoyBuilder on the internal network, GLM outside
/// - complex tasks take JoyBuilder on the internal network, GLM outside
/// - otherwise the internal network takes JoyBuilder, external takes GLM
pub fn select_provider(
    ctx: &SelectionContext,
    glm_available: bool,
    joybuilder_available: bool,
) -> Result<ProviderId, NoProviderAvailable> {
    match (glm_available, joybuilder_available) {
        (true, false) => return Ok(ProviderId::Glm),
        (false, true) => return Ok(ProviderId::JoyBuilder),
        (false, false) => return Err(NoProviderAvailable),
        (true, true) => {}
    }

    let network_pick = if ctx.is_internal_network {
        ProviderId::JoyBuilder
    } else {
        ProviderId::Glm
    };

    match ctx.priority {
        Some(Priority::Cost) => Ok(ProviderId::Glm),
        Some(Priority::Speed) => Ok(network_pick),
        _ if ctx.complexity == Complexity::Complex => Ok(network_pick),
        _ => Ok(network_pick),
    }
}

//! Per-clip effect plans.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::effect::EffectId;

/// How a clip's content is acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipKind {
    /// Copied verbatim from the transition pool
    Transition,
    /// Extracted from a registered source
    Snippet,
}

impl fmt::Display for ClipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipKind::Transition => write!(f, "transition"),
            ClipKind::Snippet => write!(f, "snippet"),
        }
    }
}

/// Decided once per clip before it runs; never mutated afterwards.
///
/// `effects` is applied strictly in order and never repeats an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectPlan {
    pub kind: ClipKind,
    pub effects: Vec<EffectId>,
}

impl EffectPlan {
    pub fn new(kind: ClipKind, effects: Vec<EffectId>) -> Self {
        Self { kind, effects }
    }

    /// A snippet with no effects.
    pub fn plain_snippet() -> Self {
        Self::new(ClipKind::Snippet, Vec::new())
    }

    pub fn is_transition(&self) -> bool {
        self.kind == ClipKind::Transition
    }

    pub fn has_effects(&self) -> bool {
        !self.effects.is_empty()
    }

    pub fn stack_depth(&self) -> usize {
        self.effects.len()
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// The six stages of the hiring pipeline.
///
/// Candidates flow through: APPLIED → SCREEN → TECH → OFFER → HIRED.
/// REJECTED is a terminal side-branch reachable only by an explicit override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Applied,
    Screen,
    Tech,
    Offer,
    Hired,
    Rejected,
}

impl Stage {
    /// Forward ordering walked by [`StageMachine::next`]. `Rejected` is not part of it.
    pub const FORWARD: [Stage; 5] = [
        Stage::Applied,
        Stage::Screen,
        Stage::Tech,
        Stage::Offer,
        Stage::Hired,
    ];

    /// Every stage, in board order.
    pub const ALL: [Stage; 6] = [
        Stage::Applied,
        Stage::Screen,
        Stage::Tech,
        Stage::Offer,
        Stage::Hired,
        Stage::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Applied => "applied",
            Stage::Screen => "screen",
            Stage::Tech => "tech",
            Stage::Offer => "offer",
            Stage::Hired => "hired",
            Stage::Rejected => "rejected",
        }
    }

    /// `Hired` and `Rejected` end the pipeline; nothing advances out of them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Hired | Stage::Rejected)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PipelineError::InvalidStage(s.to_string()))
    }
}

/// The result of evaluating a forward transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Advance to the given stage.
    Next(Stage),
    /// The stage is terminal; there is nowhere to advance to.
    Terminal(Stage),
}

/// Computes forward transitions over [`Stage::FORWARD`].
pub struct StageMachine;

impl StageMachine {
    /// Compute the forward transition for a candidate currently at `current`.
    ///
    /// - `Hired` and `Rejected` always return `Terminal`.
    /// - Any other stage returns `Next` with the following entry of the ordering.
    pub fn next(current: Stage) -> Transition {
        if current.is_terminal() {
            return Transition::Terminal(current);
        }

        Stage::FORWARD
            .iter()
            .position(|stage| *stage == current)
            .and_then(|idx| Stage::FORWARD.get(idx + 1))
            .map_or(Transition::Terminal(current), |next| Transition::Next(*next))
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The seven states of the stagegate ticket lifecycle.
///
/// Each ticket flows through:
/// intake → extract_requirements → scope_context → gather_evidence →
/// propose_plan → act → finalize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Intake,
    ExtractRequirements,
    ScopeContext,
    GatherEvidence,
    ProposePlan,
    Act,
    Finalize,
}

/// All states in lifecycle order. The wire token of each entry is the
/// canonical spelling used in ticket documents and event records.
pub const ALL_STATES: [State; 7] = [
    State::Intake,
    State::ExtractRequirements,
    State::ScopeContext,
    State::GatherEvidence,
    State::ProposePlan,
    State::Act,
    State::Finalize,
];

impl State {
    /// The snake_case wire token for this state.
    pub fn as_str(self) -> &'static str {
        match self {
            State::Intake => "intake",
            State::ExtractRequirements => "extract_requirements",
            State::ScopeContext => "scope_context",
            State::GatherEvidence => "gather_evidence",
            State::ProposePlan => "propose_plan",
            State::Act => "act",
            State::Finalize => "finalize",
        }
    }

    /// Terminal states have no outgoing transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Finalize)
    }

    /// The single successor for non-terminal states.
    pub fn successor(self) -> Option<State> {
        match self {
            State::Intake => Some(State::ExtractRequirements),
            State::ExtractRequirements => Some(State::ScopeContext),
            State::ScopeContext => Some(State::GatherEvidence),
            State::GatherEvidence => Some(State::ProposePlan),
            State::ProposePlan => Some(State::Act),
            State::Act => Some(State::Finalize),
            State::Finalize => None,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized state token: '{0}'")]
pub struct ParseStateError(pub String);

impl FromStr for State {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_STATES
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| ParseStateError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_non_terminal_state_has_exactly_one_successor() {
        for state in ALL_STATES {
            if state.is_terminal() {
                assert_eq!(state.successor(), None);
            } else {
                assert!(state.successor().is_some());
            }
        }
    }

    #[test]
    fn successor_chain_is_acyclic_and_reaches_finalize() {
        let mut current = State::Intake;
        let mut visited = vec![current];
        while let Some(next) = current.successor() {
            assert!(!visited.contains(&next), "cycle at {next}");
            visited.push(next);
            current = next;
        }
        assert_eq!(current, State::Finalize);
        assert_eq!(visited.len(), ALL_STATES.len());
    }

    #[test]
    fn state_display_matches_wire_token() {
        assert_eq!(State::Intake.to_string(), "intake");
        assert_eq!(State::ExtractRequirements.to_string(), "extract_requirements");
        assert_eq!(State::Finalize.to_string(), "finalize");
    }

    #[test]
    fn state_from_str_roundtrip() {
        for state in ALL_STATES {
            assert_eq!(state.as_str().parse::<State>().unwrap(), state);
        }
    }

    #[test]
    fn state_from_str_rejects_unknown_token() {
        let err = "deploy".parse::<State>().unwrap_err();
        assert_eq!(err, ParseStateError("deploy".to_string()));
    }

    #[test]
    fn state_serde_uses_snake_case_tokens() {
        let json = serde_json::to_string(&State::ProposePlan).unwrap();
        assert_eq!(json, "\"propose_plan\"");
        let state: State = serde_json::from_str("\"gather_evidence\"").unwrap();
        assert_eq!(state, State::GatherEvidence);
    }

    #[test]
    fn state_serde_rejects_unknown_token() {
        assert!(serde_json::from_str::<State>("\"deploy\"").is_err());
    }
}

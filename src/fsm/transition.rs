use serde::{Deserialize, Serialize};
use tracing::info;

use super::registry::{role_for, ROLE_INVALID_STATE, ROLE_RUN_COMPLETE};
use super::state::State;

/// Outcome of a transition evaluation.
///
/// The transition function never asks for a retry; "retry" is exclusively a
/// gate outcome. Gates decide whether a stage's output is good enough, the
/// transition function decides what comes next given a good stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStatus {
    Pass,
    Stop,
}

/// Result of evaluating the transition out of a state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionResult {
    pub status: TransitionStatus,
    pub reason: String,
    pub next_state: Option<State>,
    pub role: String,
}

/// Compute the deterministic successor of `state`.
///
/// - Terminal states stop with the run-complete role.
/// - Non-terminal states pass to their single successor, carrying the
///   successor's canonical role instruction.
pub fn transition(state: State) -> TransitionResult {
    if state.is_terminal() {
        return TransitionResult {
            status: TransitionStatus::Stop,
            reason: "Already in final state".to_string(),
            next_state: None,
            role: ROLE_RUN_COMPLETE.to_string(),
        };
    }

    match state.successor() {
        Some(next) => {
            info!(from = %state, to = %next, "transition approved");
            TransitionResult {
                status: TransitionStatus::Pass,
                reason: format!("Valid transition from {state} to {next}"),
                next_state: Some(next),
                role: role_for(next).to_string(),
            }
        }
        // A non-terminal state without a successor means the transition
        // table lost an entry; surface it as a stop rather than panicking.
        None => TransitionResult {
            status: TransitionStatus::Stop,
            reason: format!("Invalid state: {state}"),
            next_state: None,
            role: ROLE_INVALID_STATE.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsm::state::ALL_STATES;

    #[test]
    fn non_terminal_states_pass_to_their_successor() {
        let result = transition(State::Intake);
        assert_eq!(result.status, TransitionStatus::Pass);
        assert_eq!(result.next_state, Some(State::ExtractRequirements));
        assert_eq!(result.role, role_for(State::ExtractRequirements));

        let result = transition(State::Act);
        assert_eq!(result.status, TransitionStatus::Pass);
        assert_eq!(result.next_state, Some(State::Finalize));
        assert_eq!(result.role, role_for(State::Finalize));
    }

    #[test]
    fn terminal_state_always_stops() {
        for _ in 0..3 {
            let result = transition(State::Finalize);
            assert_eq!(result.status, TransitionStatus::Stop);
            assert_eq!(result.next_state, None);
            assert_eq!(result.role, ROLE_RUN_COMPLETE);
            assert_eq!(result.reason, "Already in final state");
        }
    }

    #[test]
    fn transition_is_pure_and_deterministic() {
        for state in ALL_STATES {
            let first = transition(state);
            let second = transition(state);
            assert_eq!(first, second, "transition({state}) not deterministic");
        }
    }

    #[test]
    fn pass_results_carry_the_successor_role() {
        for state in ALL_STATES.into_iter().filter(|s| !s.is_terminal()) {
            let result = transition(state);
            let next = result.next_state.expect("pass must carry next_state");
            assert_eq!(result.role, role_for(next));
            assert!(!result.role.is_empty());
        }
    }

    #[test]
    fn transition_result_serializes_tokens() {
        let result = transition(State::Intake);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "pass");
        assert_eq!(json["next_state"], "extract_requirements");
    }
}

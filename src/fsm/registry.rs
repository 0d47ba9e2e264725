//! Stage registry: the single source of truth for agent-facing role
//! instructions and the fields each stage requires.
//!
//! Gates and responses must never hand-roll role text; they read it from
//! here. `role_for` is total over [`State`], and the sentinel roles cover
//! the conditions outside the normal stage sequence (run already complete,
//! unparsable input, corrupt state).

use super::state::State;

/// Role attached when a ticket is resubmitted after the run has ended.
pub const ROLE_RUN_COMPLETE: &str = "Run complete - no further action required";

/// Role attached when a state value cannot be mapped to a stage.
pub const ROLE_INVALID_STATE: &str = "Invalid state - cannot proceed";

/// Role attached when the submitted document fails to parse or validate.
pub const ROLE_FIX_INPUT: &str = "Fix the ticket document and resubmit";

/// Canonical role instruction for a stage.
pub fn role_for(state: State) -> &'static str {
    match state {
        State::Intake => {
            "Parse the ticket and extract basic information (ticket_id, title, description)"
        }
        State::ExtractRequirements => {
            "Extract acceptance criteria, constraints, and unknowns from the ticket"
        }
        State::ScopeContext => {
            "Determine what context to retrieve based on requirements and unknowns"
        }
        State::GatherEvidence => "Collect minimal supporting snippets with source pointers",
        State::ProposePlan => {
            "Generate a step-by-step plan tied to requirements and grounded in evidence"
        }
        State::Act => "Execute the plan using tools, producing candidate outputs with checkpoints",
        State::Finalize => "Store canonical artifacts and post milestone summary",
    }
}

/// Field paths a ticket must populate to satisfy the given stage's gate.
pub fn required_fields_for(state: State) -> &'static [&'static str] {
    match state {
        State::Intake => &["ticket_id", "title", "run_id"],
        State::ExtractRequirements => &[
            "requirements.acceptance_criteria",
            "requirements.constraints",
            "requirements.unknowns",
        ],
        State::ScopeContext => &["scope.targets"],
        State::GatherEvidence => &["evidence.items"],
        State::ProposePlan => &["plan.steps"],
        State::Act => &["execution.checkpoints", "execution.outputs"],
        State::Finalize => &["finalization.outcome", "finalization.milestone_summary"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsm::state::ALL_STATES;

    #[test]
    fn every_state_has_a_role() {
        for state in ALL_STATES {
            assert!(!role_for(state).is_empty(), "no role for {state}");
        }
    }

    #[test]
    fn every_state_lists_required_fields() {
        for state in ALL_STATES {
            assert!(
                !required_fields_for(state).is_empty(),
                "no required fields for {state}"
            );
        }
    }

    #[test]
    fn sentinel_roles_are_distinct() {
        assert_ne!(ROLE_RUN_COMPLETE, ROLE_INVALID_STATE);
        assert_ne!(ROLE_RUN_COMPLETE, ROLE_FIX_INPUT);
        assert_ne!(ROLE_INVALID_STATE, ROLE_FIX_INPUT);
    }

    #[test]
    fn finalize_role_is_a_stage_role_not_a_sentinel() {
        assert_ne!(role_for(State::Finalize), ROLE_RUN_COMPLETE);
    }
}

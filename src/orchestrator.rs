use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::StagegateError;
use crate::fsm::{role_for, transition, State, TransitionStatus, ROLE_FIX_INPUT};
use crate::gates::{gate_for, GateResult, GateStatus};
use crate::storage::ArtifactStore;
use crate::ticket::{ParseErrorKind, ParseFailure, Ticket};

/// Response returned by every [`WorkflowOrchestrator::next_step`] call.
///
/// The shape is identical across branches; `continue` is the only field a
/// caller strictly needs to decide whether to call again, everything else
/// is explanatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextStepResponse {
    pub updated_ticket: Option<Ticket>,
    #[serde(rename = "continue")]
    pub continue_: bool,
    pub reason: String,
    pub next_role: String,
    pub next_state: Option<State>,
    pub gate_result: GateResult,
}

/// Drives one ticket document through a single validate-and-advance cycle.
///
/// The orchestrator is stateless between calls; the persistence handle is
/// injected and owned by the caller. Persistence runs alongside the decision
/// path and never changes the outcome of a call.
pub struct WorkflowOrchestrator {
    store: ArtifactStore,
    config: EngineConfig,
}

impl WorkflowOrchestrator {
    pub fn new(store: ArtifactStore, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Validate the submitted ticket against its declared stage's gate and,
    /// if the gate passes, advance it to the next stage.
    ///
    /// Never panics and never returns an error: every failure mode is
    /// converted into a structured response.
    pub fn next_step(&self, raw_ticket: &str) -> NextStepResponse {
        let ticket = match Ticket::parse(raw_ticket) {
            Ok(ticket) => ticket,
            Err(failure) => return self.reject_input(failure),
        };
        info!(ticket_id = %ticket.ticket_id, state = %ticket.state, "ticket parsed");

        self.persist("ticket snapshot", self.store.save_ticket(&ticket));
        self.persist(
            "call_received event",
            self.store.save_event(
                &ticket.run_id,
                "call_received",
                ticket.state,
                json!({"tool": "next_step", "ticket_id": ticket.ticket_id}),
            ),
        );

        let gate_result = gate_for(ticket.state)(&ticket);
        if gate_result.status != GateStatus::Pass {
            return self.hold_at_current_stage(ticket, gate_result);
        }

        self.persist(
            "gate_passed event",
            self.store.save_event(
                &ticket.run_id,
                "gate_passed",
                ticket.state,
                json!({"gate_status": "pass", "reasons": gate_result.reasons}),
            ),
        );

        let transition_result = transition(ticket.state);
        self.persist(
            "transition event",
            self.store.save_event(
                &ticket.run_id,
                "transition",
                ticket.state,
                json!({
                    "transition_status": transition_result.status,
                    "next_state": transition_result.next_state,
                }),
            ),
        );

        match (transition_result.status, transition_result.next_state) {
            (TransitionStatus::Pass, Some(next_state)) => {
                self.advance(ticket, next_state, transition_result.role, gate_result)
            }
            // Terminal or corrupt state: the run ends here.
            _ => {
                let mut unchanged = ticket;
                unchanged.agent_role = Some(transition_result.role.clone());
                NextStepResponse {
                    updated_ticket: Some(unchanged),
                    continue_: false,
                    reason: transition_result.reason,
                    next_role: transition_result.role,
                    next_state: None,
                    gate_result,
                }
            }
        }
    }

    /// Latest stored snapshot for a ticket id.
    pub fn ticket(&self, ticket_id: &str) -> Result<Option<Ticket>, StagegateError> {
        self.store.get_ticket(ticket_id)
    }

    fn advance(
        &self,
        ticket: Ticket,
        next_state: State,
        role: String,
        gate_result: GateResult,
    ) -> NextStepResponse {
        let mut updated = ticket;
        let previous_state = updated.state;
        updated.state = next_state;
        updated.agent_role = Some(role.clone());
        updated.updated_at = Utc::now();

        self.persist("advanced ticket snapshot", self.store.save_ticket(&updated));
        info!(
            ticket_id = %updated.ticket_id,
            from = %previous_state,
            to = %next_state,
            "ticket advanced"
        );

        NextStepResponse {
            updated_ticket: Some(updated),
            continue_: true,
            reason: format!("Valid transition from {previous_state} to {next_state}"),
            next_role: role,
            next_state: Some(next_state),
            gate_result,
        }
    }

    /// Gate said retry or stop: hand the ticket back unchanged, re-labelled
    /// with its current stage's canonical role.
    fn hold_at_current_stage(&self, ticket: Ticket, gate_result: GateResult) -> NextStepResponse {
        let role = role_for(ticket.state).to_string();
        let reason = match gate_result.status {
            GateStatus::Stop => {
                format!("Gate validation failed: {}", gate_result.reasons.join(", "))
            }
            _ => format!(
                "Gate validation requires fixes: {}",
                gate_result.reasons.join(", ")
            ),
        };
        info!(ticket_id = %ticket.ticket_id, state = %ticket.state, status = ?gate_result.status, "gate held ticket");

        let mut unchanged = ticket;
        unchanged.agent_role = Some(role.clone());
        NextStepResponse {
            updated_ticket: Some(unchanged),
            continue_: false,
            reason,
            next_role: role,
            next_state: None,
            gate_result,
        }
    }

    /// Malformed input short-circuit: no gate or transition runs, nothing is
    /// persisted, and the caller gets the fix-input role.
    fn reject_input(&self, failure: ParseFailure) -> NextStepResponse {
        let status = match failure.kind {
            ParseErrorKind::VersionMismatch if self.config.strict_schema => GateStatus::Stop,
            _ => GateStatus::Retry,
        };
        let fix = match failure.kind {
            ParseErrorKind::Syntax => "Ensure the submitted document is valid JSON",
            ParseErrorKind::Schema => {
                "Check the ticket schema: ticket_id, title, state, run_id are required"
            }
            ParseErrorKind::VersionMismatch => {
                "Re-emit the ticket with the supported schema_version"
            }
        };
        warn!(kind = ?failure.kind, "rejected ticket document");

        NextStepResponse {
            updated_ticket: None,
            continue_: false,
            reason: format!("Ticket validation failed: {failure}"),
            next_role: ROLE_FIX_INPUT.to_string(),
            next_state: None,
            gate_result: GateResult {
                status,
                reasons: failure.reasons,
                fixes: Some(vec![fix.to_string()]),
                missing_or_invalid_fields: failure.missing_or_invalid_fields,
            },
        }
    }

    // Persistence runs alongside the decision path; failures are logged and
    // swallowed so a full disk cannot change a gate verdict.
    fn persist(&self, what: &str, result: Result<(), StagegateError>) {
        if let Err(error) = result {
            warn!(%error, "{what} persistence failed");
        }
    }
}

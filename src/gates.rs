//! Validation gates for the ticket workflow.
//!
//! One pure validator per state, dispatched through a data-driven table.
//! Gates decide whether the stage's accumulated artifacts are good enough;
//! what comes next is the transition function's job. A gate never mutates
//! the ticket and calling it twice on the same document yields the same
//! result.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::fsm::{required_fields_for, State};
use crate::ticket::artifacts::{Outcome, StepType};
use crate::ticket::Ticket;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    Pass,
    Retry,
    Stop,
}

/// Result of running a gate over a ticket.
///
/// `pass` never carries fixes; `retry`/`stop` always carry at least one
/// reason and at least one suggested fix. `missing_or_invalid_fields` is
/// populated only by the parse short-circuit in the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateResult {
    pub status: GateStatus,
    pub reasons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_or_invalid_fields: Vec<String>,
}

impl GateResult {
    pub fn pass(reason: impl Into<String>) -> Self {
        Self {
            status: GateStatus::Pass,
            reasons: vec![reason.into()],
            fixes: None,
            missing_or_invalid_fields: Vec::new(),
        }
    }

    pub fn retry(reason: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            status: GateStatus::Retry,
            reasons: vec![reason.into()],
            fixes: Some(vec![fix.into()]),
            missing_or_invalid_fields: Vec::new(),
        }
    }

    pub fn stop(reason: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            status: GateStatus::Stop,
            reasons: vec![reason.into()],
            fixes: Some(vec![fix.into()]),
            missing_or_invalid_fields: Vec::new(),
        }
    }

}

/// A gate is a pure function of the ticket.
pub type GateFn = fn(&Ticket) -> GateResult;

/// Dispatch table from state to its validator.
const GATE_TABLE: &[(State, GateFn)] = &[
    (State::Intake, intake_gate),
    (State::ExtractRequirements, extract_requirements_gate),
    (State::ScopeContext, scope_context_gate),
    (State::GatherEvidence, gather_evidence_gate),
    (State::ProposePlan, propose_plan_gate),
    (State::Act, act_gate),
    (State::Finalize, finalize_gate),
];

/// Look up the validator for a state, falling back to [`generic_gate`] for
/// states without a table entry.
pub fn gate_for(state: State) -> GateFn {
    debug!(state = %state, "dispatching gate");
    GATE_TABLE
        .iter()
        .find(|(gate_state, _)| *gate_state == state)
        .map(|(_, gate)| *gate)
        .unwrap_or(generic_gate)
}

/// Fallback for states with no configured gate.
pub fn generic_gate(ticket: &Ticket) -> GateResult {
    warn!(state = %ticket.state, "generic gate used");
    GateResult::retry(
        format!("No specific gate configured for state '{}'", ticket.state),
        "Use one of the known workflow states and corresponding artifacts",
    )
}

/// All requirement ids declared across acceptance criteria and constraints.
fn requirement_ids(ticket: &Ticket) -> BTreeSet<&str> {
    let Some(requirements) = &ticket.requirements else {
        return BTreeSet::new();
    };
    requirements
        .acceptance_criteria
        .iter()
        .chain(&requirements.constraints)
        .map(|item| item.id.as_str())
        .collect()
}

/// All declared evidence ids.
fn evidence_ids(ticket: &Ticket) -> BTreeSet<&str> {
    match &ticket.evidence {
        Some(evidence) => evidence.items.iter().map(|item| item.id.as_str()).collect(),
        None => BTreeSet::new(),
    }
}

/// Sorted, comma-separated rendering of an id set for reason strings.
fn format_ids(ids: &BTreeSet<&str>) -> String {
    ids.iter().copied().collect::<Vec<_>>().join(", ")
}

/// Ids in `referenced` that were never declared. BTreeSet difference keeps
/// the output sorted.
fn undeclared<'a>(referenced: &'a [String], declared: &BTreeSet<&str>) -> BTreeSet<&'a str> {
    referenced
        .iter()
        .map(String::as_str)
        .filter(|id| !declared.contains(id))
        .collect()
}

/// Shared stage-mismatch guard: a caller skipping or mislabeling stages gets
/// a retry pointing at the declared state.
fn ensure_state(ticket: &Ticket, expected: State) -> Option<GateResult> {
    if ticket.state != expected {
        return Some(GateResult::retry(
            format!(
                "Ticket state must be '{expected}', got '{}'",
                ticket.state
            ),
            format!("Set ticket state to '{expected}' before resubmitting"),
        ));
    }
    None
}

fn missing_artifact(state: State, artifact: &str) -> GateResult {
    GateResult::retry(
        format!("{artifact} artifact is missing"),
        format!("Populate {}", required_fields_for(state).join(", ")),
    )
}

fn intake_gate(ticket: &Ticket) -> GateResult {
    if let Some(result) = ensure_state(ticket, State::Intake) {
        return result;
    }

    let well_formed = ticket
        .ticket_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !well_formed {
        return GateResult::retry(
            "ticket_id must be alphanumeric with optional dashes/underscores",
            "Provide ticket_id in a format like PROJ-123",
        );
    }

    GateResult::pass("Ticket intake validation passed")
}

fn extract_requirements_gate(ticket: &Ticket) -> GateResult {
    if let Some(result) = ensure_state(ticket, State::ExtractRequirements) {
        return result;
    }

    let Some(requirements) = &ticket.requirements else {
        return missing_artifact(State::ExtractRequirements, "requirements");
    };

    if requirements.acceptance_criteria.is_empty() {
        return GateResult::retry(
            "requirements.acceptance_criteria must include at least one item",
            "Extract at least one concrete acceptance criterion",
        );
    }

    let all_items = requirements
        .acceptance_criteria
        .iter()
        .chain(&requirements.constraints);
    let mut seen = BTreeSet::new();
    for item in all_items {
        if item.id.trim().is_empty() || item.text.trim().is_empty() {
            return GateResult::retry(
                "Requirement items must have a non-empty id and text",
                "Fill in id and text for every acceptance criterion and constraint",
            );
        }
        if !seen.insert(item.id.as_str()) {
            return GateResult::retry(
                "Requirement IDs must be unique across acceptance_criteria and constraints",
                "Use unique IDs such as AC-1, AC-2, C-1",
            );
        }
    }

    GateResult::pass("Requirements are pinned and usable")
}

fn scope_context_gate(ticket: &Ticket) -> GateResult {
    if let Some(result) = ensure_state(ticket, State::ScopeContext) {
        return result;
    }

    let targets = match &ticket.scope {
        Some(scope) if !scope.targets.is_empty() => &scope.targets,
        _ => {
            return GateResult::retry(
                "scope.targets must include at least one retrieval target",
                "Add scoped targets with source, query, rationale, and requirement/unknown links",
            );
        }
    };

    let req_ids = requirement_ids(ticket);
    for target in targets {
        if target.related_requirement_ids.is_empty() && target.related_unknowns.is_empty() {
            return GateResult::retry(
                format!(
                    "Scope target '{}' must link to at least one requirement or unknown",
                    target.id
                ),
                "Populate related_requirement_ids or related_unknowns for each target",
            );
        }
        let unknown_refs = undeclared(&target.related_requirement_ids, &req_ids);
        if !req_ids.is_empty() && !unknown_refs.is_empty() {
            return GateResult::retry(
                format!(
                    "Scope target '{}' references unknown requirement ids: {}",
                    target.id,
                    format_ids(&unknown_refs)
                ),
                "Use requirement ids defined in requirements.acceptance_criteria/constraints",
            );
        }
    }

    GateResult::pass("Scoped retrieval targets are explicit and linked")
}

fn gather_evidence_gate(ticket: &Ticket) -> GateResult {
    if let Some(result) = ensure_state(ticket, State::GatherEvidence) {
        return result;
    }

    let items = match &ticket.evidence {
        Some(evidence) if !evidence.items.is_empty() => &evidence.items,
        _ => {
            return GateResult::retry(
                "evidence.items must include at least one evidence snippet",
                "Add evidence items with source_ref, locator, snippet, and supports",
            );
        }
    };

    let req_ids = requirement_ids(ticket);
    for item in items {
        if item.supports.is_empty() {
            return GateResult::retry(
                format!(
                    "Evidence item '{}' must support at least one requirement or claim",
                    item.id
                ),
                "Populate evidence.supports with requirement IDs or claim IDs",
            );
        }
        let unknown_support = undeclared(&item.supports, &req_ids);
        if !req_ids.is_empty() && !unknown_support.is_empty() {
            return GateResult::retry(
                format!(
                    "Evidence item '{}' supports unknown requirement ids: {}",
                    item.id,
                    format_ids(&unknown_support)
                ),
                "Link evidence.supports to known requirement IDs",
            );
        }
    }

    GateResult::pass("Evidence items are traceable and linked")
}

fn propose_plan_gate(ticket: &Ticket) -> GateResult {
    if let Some(result) = ensure_state(ticket, State::ProposePlan) {
        return result;
    }

    let steps = match &ticket.plan {
        Some(plan) if !plan.steps.is_empty() => &plan.steps,
        _ => {
            return GateResult::retry(
                "plan.steps must include at least one actionable step",
                "Add plan steps tied to requirements and evidence",
            );
        }
    };

    let req_ids = requirement_ids(ticket);
    let ev_ids = evidence_ids(ticket);
    let mut covered: BTreeSet<&str> = BTreeSet::new();

    for step in steps {
        if step.step_type == StepType::Delivery && step.requirement_ids.is_empty() {
            return GateResult::retry(
                format!("Delivery step '{}' must map to at least one requirement", step.id),
                "Populate step.requirement_ids or mark step_type as 'investigation'",
            );
        }
        if step.evidence_ids.is_empty() {
            return GateResult::retry(
                format!("Plan step '{}' must cite evidence ids", step.id),
                "Populate step.evidence_ids using evidence item IDs",
            );
        }

        let unknown_reqs = undeclared(&step.requirement_ids, &req_ids);
        if !req_ids.is_empty() && !unknown_reqs.is_empty() {
            return GateResult::retry(
                format!(
                    "Plan step '{}' references unknown requirements: {}",
                    step.id,
                    format_ids(&unknown_reqs)
                ),
                "Use requirement ids declared in the requirements artifact",
            );
        }

        let unknown_evidence = undeclared(&step.evidence_ids, &ev_ids);
        if !ev_ids.is_empty() && !unknown_evidence.is_empty() {
            return GateResult::retry(
                format!(
                    "Plan step '{}' references unknown evidence ids: {}",
                    step.id,
                    format_ids(&unknown_evidence)
                ),
                "Use evidence ids declared in the evidence artifact",
            );
        }

        covered.extend(step.requirement_ids.iter().map(String::as_str));
    }

    let missing: BTreeSet<&str> = req_ids.difference(&covered).copied().collect();
    if !req_ids.is_empty() && !missing.is_empty() {
        return GateResult::retry(
            format!(
                "Plan does not cover all requirements; missing: {}",
                format_ids(&missing)
            ),
            "Add or adjust plan steps so every requirement is covered",
        );
    }

    GateResult::pass("Plan is actionable and requirement-linked")
}

fn act_gate(ticket: &Ticket) -> GateResult {
    if let Some(result) = ensure_state(ticket, State::Act) {
        return result;
    }

    let Some(execution) = &ticket.execution else {
        return missing_artifact(State::Act, "execution");
    };

    if execution.outputs.is_empty() {
        return GateResult::retry(
            "execution.outputs must include at least one candidate output",
            "Add candidate outputs with covered requirements and evidence links",
        );
    }

    if execution.checkpoints.is_empty() {
        return GateResult::retry(
            "execution.checkpoints is empty",
            "Record at least one checkpoint before progressing",
        );
    }

    let req_ids = requirement_ids(ticket);
    let ev_ids = evidence_ids(ticket);
    let mut covered: BTreeSet<&str> = BTreeSet::new();

    for output in &execution.outputs {
        covered.extend(output.covered_requirement_ids.iter().map(String::as_str));

        let unknown_reqs = undeclared(&output.covered_requirement_ids, &req_ids);
        if !req_ids.is_empty() && !unknown_reqs.is_empty() {
            return GateResult::retry(
                format!(
                    "Output '{}' covers unknown requirements: {}",
                    output.id,
                    format_ids(&unknown_reqs)
                ),
                "Use requirement ids declared in the requirements artifact",
            );
        }

        let unknown_evidence = undeclared(&output.evidence_ids, &ev_ids);
        if !ev_ids.is_empty() && !unknown_evidence.is_empty() {
            return GateResult::retry(
                format!(
                    "Output '{}' cites unknown evidence ids: {}",
                    output.id,
                    format_ids(&unknown_evidence)
                ),
                "Use evidence ids declared in the evidence artifact",
            );
        }
    }

    let missing: BTreeSet<&str> = req_ids.difference(&covered).copied().collect();
    if !req_ids.is_empty() && !missing.is_empty() {
        return GateResult::retry(
            format!(
                "Execution outputs do not cover all requirements; missing: {}",
                format_ids(&missing)
            ),
            "Add outputs or updates that cover the missing requirements",
        );
    }

    GateResult::pass("Execution outputs are grounded and coverage-complete")
}

fn finalize_gate(ticket: &Ticket) -> GateResult {
    if let Some(result) = ensure_state(ticket, State::Finalize) {
        return result;
    }

    let Some(finalization) = &ticket.finalization else {
        return missing_artifact(State::Finalize, "finalization");
    };

    if finalization.milestone_summary.trim().is_empty() {
        return GateResult::retry(
            "finalization.milestone_summary must not be empty",
            "Summarize the milestone outcome for ticket updates",
        );
    }

    // "done" is a terminal claim: an uncovered requirement here is an
    // integrity violation, not a fixable omission, so the failure is a hard
    // stop. A missing execution artifact counts as zero coverage.
    if finalization.outcome == Outcome::Done {
        let req_ids = requirement_ids(ticket);
        let covered: BTreeSet<&str> = ticket
            .execution
            .iter()
            .flat_map(|execution| &execution.outputs)
            .flat_map(|output| &output.covered_requirement_ids)
            .map(String::as_str)
            .collect();
        let missing: BTreeSet<&str> = req_ids.difference(&covered).copied().collect();
        if !req_ids.is_empty() && !missing.is_empty() {
            return GateResult::stop(
                format!(
                    "Cannot finalize as done; requirements remain uncovered: {}",
                    format_ids(&missing)
                ),
                "Set outcome to blocked/invalidated or provide the missing execution coverage",
            );
        }
    }

    GateResult::pass("Finalization summary is present")
}

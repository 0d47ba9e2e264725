//! Embedded end-to-end demo of the governed workflow.
//!
//! Drives one ticket from intake to finalize, attaching the minimally
//! sufficient artifact at each stage and printing every engine response.
//! Useful as a smoke check that the full gate chain accepts a well-formed
//! run without touching any external system.

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::orchestrator::{NextStepResponse, WorkflowOrchestrator};
use crate::fsm::State;
use crate::ticket::artifacts::{
    CandidateOutput, EvidenceArtifact, EvidenceItem, ExecutionArtifact, FinalizationArtifact,
    Outcome, OutputStatus, PlanArtifact, PlanStep, Priority, RequirementItem,
    RequirementsArtifact, RetrievalTarget, ScopeArtifact, SourceKind, StepType,
};
use crate::ticket::Ticket;
use crate::ui::ResponsePrinter;

/// Run the demo dialog, returning the final engine response.
pub fn run(orchestrator: &WorkflowOrchestrator) -> Result<NextStepResponse> {
    let printer = ResponsePrinter::new();
    let run_id = format!("run-{}", Uuid::new_v4());
    let mut ticket = Ticket::new("DEMO-1", "Demonstrate the governed handshake", run_id);

    loop {
        let response = orchestrator.next_step(&ticket.to_json()?);
        printer.print(&response);

        if !response.continue_ {
            return Ok(response);
        }

        ticket = response
            .updated_ticket
            .context("an advancing response carries the updated ticket")?;
        attach_stage_artifact(&mut ticket);
    }
}

// Attach the artifact the newly entered stage will be gated on.
fn attach_stage_artifact(ticket: &mut Ticket) {
    match ticket.state {
        State::Intake => {}
        State::ExtractRequirements => {
            ticket.requirements = Some(RequirementsArtifact {
                acceptance_criteria: vec![RequirementItem {
                    id: "AC-1".into(),
                    text: "Engine returns a clean ticket document on the first call".into(),
                    priority: Priority::Must,
                }],
                constraints: vec![RequirementItem {
                    id: "C-1".into(),
                    text: "Use deterministic transitions only".into(),
                    priority: Priority::Must,
                }],
                unknowns: vec![],
            });
        }
        State::ScopeContext => {
            ticket.scope = Some(ScopeArtifact {
                targets: vec![RetrievalTarget {
                    id: "T-1".into(),
                    source: SourceKind::Repo,
                    query: "src/orchestrator.rs".into(),
                    rationale: "Engine dialog implementation".into(),
                    related_requirement_ids: vec!["AC-1".into(), "C-1".into()],
                    related_unknowns: vec![],
                }],
            });
        }
        State::GatherEvidence => {
            ticket.evidence = Some(EvidenceArtifact {
                items: vec![EvidenceItem {
                    id: "E-1".into(),
                    source: SourceKind::Repo,
                    source_ref: "src/orchestrator.rs".into(),
                    locator: "next_step".into(),
                    snippet: "parse -> gate -> transition -> response".into(),
                    supports: vec!["AC-1".into(), "C-1".into()],
                }],
            });
        }
        State::ProposePlan => {
            ticket.plan = Some(PlanArtifact {
                steps: vec![PlanStep {
                    id: "S-1".into(),
                    title: "Walk the gate chain".into(),
                    description: "Submit the ticket once per stage with its artifact".into(),
                    requirement_ids: vec!["AC-1".into(), "C-1".into()],
                    evidence_ids: vec!["E-1".into()],
                    step_type: StepType::Delivery,
                }],
            });
        }
        State::Act => {
            ticket.execution = Some(ExecutionArtifact {
                checkpoints: vec!["checkpoint-1".into()],
                outputs: vec![CandidateOutput {
                    id: "O-1".into(),
                    summary: "Governed dialog executed across all stages".into(),
                    covered_requirement_ids: vec!["AC-1".into(), "C-1".into()],
                    evidence_ids: vec!["E-1".into()],
                    status: OutputStatus::Validated,
                }],
            });
        }
        State::Finalize => {
            ticket.finalization = Some(FinalizationArtifact {
                outcome: Outcome::Done,
                milestone_summary: "Completed the deterministic ticket handshake".into(),
                unresolved_items: vec![],
            });
        }
    }
}

//! Stage artifact types accumulated on a ticket as it advances.
//!
//! Each stage's gate inspects one of these structures. They are plain data:
//! all semantic checks (cardinality, cross-references, coverage) live in the
//! gate engine, not here.

use serde::{Deserialize, Serialize};

/// Requirement priority, MoSCoW-style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Must,
    Should,
    Could,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Must
    }
}

/// Single acceptance criterion or constraint item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub priority: Priority,
}

/// Pinned requirements extracted from the ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementsArtifact {
    #[serde(default)]
    pub acceptance_criteria: Vec<RequirementItem>,
    #[serde(default)]
    pub constraints: Vec<RequirementItem>,
    #[serde(default)]
    pub unknowns: Vec<String>,
}

/// Where a retrieval target or evidence item points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Repo,
    Jira,
    Confluence,
    Github,
    ToolOutput,
    Other,
}

/// Single scoped target to retrieve context from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalTarget {
    pub id: String,
    pub source: SourceKind,
    /// Path/query/filter used for retrieval.
    pub query: String,
    pub rationale: String,
    #[serde(default)]
    pub related_requirement_ids: Vec<String>,
    #[serde(default)]
    pub related_unknowns: Vec<String>,
}

/// Context scope definition for retrieval.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeArtifact {
    #[serde(default)]
    pub targets: Vec<RetrievalTarget>,
}

/// Evidence snippet with provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub id: String,
    pub source: SourceKind,
    /// File/path/url/reference id.
    pub source_ref: String,
    /// Line range or location hint.
    pub locator: String,
    pub snippet: String,
    /// Requirement ids or claim ids this evidence supports.
    #[serde(default)]
    pub supports: Vec<String>,
}

/// Evidence collection for the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceArtifact {
    #[serde(default)]
    pub items: Vec<EvidenceItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Delivery,
    Investigation,
}

impl Default for StepType {
    fn default() -> Self {
        StepType::Delivery
    }
}

/// Single step in a proposed plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirement_ids: Vec<String>,
    #[serde(default)]
    pub evidence_ids: Vec<String>,
    #[serde(default)]
    pub step_type: StepType,
}

/// Structured plan tied to requirements and evidence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanArtifact {
    #[serde(default)]
    pub steps: Vec<PlanStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStatus {
    Candidate,
    Validated,
    Blocked,
}

impl Default for OutputStatus {
    fn default() -> Self {
        OutputStatus::Candidate
    }
}

/// Output produced during execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateOutput {
    pub id: String,
    pub summary: String,
    #[serde(default)]
    pub covered_requirement_ids: Vec<String>,
    #[serde(default)]
    pub evidence_ids: Vec<String>,
    #[serde(default)]
    pub status: OutputStatus,
}

/// Execution phase artifact with checkpointing support.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionArtifact {
    /// Checkpoint identifiers, non-empty once the act stage is entered.
    #[serde(default)]
    pub checkpoints: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<CandidateOutput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Done,
    Blocked,
    Invalidated,
}

/// Final milestone summary posted at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizationArtifact {
    pub outcome: Outcome,
    /// High-signal summary for ticket updates.
    pub milestone_summary: String,
    #[serde(default)]
    pub unresolved_items: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_item_defaults_priority_to_must() {
        let item: RequirementItem =
            serde_json::from_str(r#"{"id": "AC-1", "text": "User can log in"}"#).unwrap();
        assert_eq!(item.priority, Priority::Must);
    }

    #[test]
    fn plan_step_defaults_to_delivery() {
        let step: PlanStep = serde_json::from_str(
            r#"{"id": "S-1", "title": "Patch auth", "description": "Wire the new flow"}"#,
        )
        .unwrap();
        assert_eq!(step.step_type, StepType::Delivery);
        assert!(step.requirement_ids.is_empty());
        assert!(step.evidence_ids.is_empty());
    }

    #[test]
    fn candidate_output_defaults_to_candidate_status() {
        let output: CandidateOutput =
            serde_json::from_str(r#"{"id": "O-1", "summary": "Patched module"}"#).unwrap();
        assert_eq!(output.status, OutputStatus::Candidate);
    }

    #[test]
    fn source_kind_uses_snake_case_tokens() {
        let kind: SourceKind = serde_json::from_str("\"tool_output\"").unwrap();
        assert_eq!(kind, SourceKind::ToolOutput);
        assert_eq!(serde_json::to_string(&SourceKind::Repo).unwrap(), "\"repo\"");
    }

    #[test]
    fn unknown_enum_tokens_are_rejected() {
        assert!(serde_json::from_str::<Outcome>("\"abandoned\"").is_err());
        assert!(serde_json::from_str::<StepType>("\"cleanup\"").is_err());
    }

    #[test]
    fn finalization_requires_outcome() {
        let err = serde_json::from_str::<FinalizationArtifact>(
            r#"{"milestone_summary": "All done"}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn requirements_artifact_roundtrip() {
        let artifact = RequirementsArtifact {
            acceptance_criteria: vec![RequirementItem {
                id: "AC-1".into(),
                text: "User can log in".into(),
                priority: Priority::Must,
            }],
            constraints: vec![RequirementItem {
                id: "C-1".into(),
                text: "Must use existing auth service".into(),
                priority: Priority::Should,
            }],
            unknowns: vec!["Should MFA be mandatory?".into()],
        };
        let json = serde_json::to_string(&artifact).unwrap();
        let back: RequirementsArtifact = serde_json::from_str(&json).unwrap();
        assert_eq!(back, artifact);
    }
}

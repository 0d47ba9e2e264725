//! The ticket document: the long-lived unit of work passed back and forth
//! between the agent and the engine.
//!
//! A ticket carries its identity, its current FSM state, and the stage
//! artifacts accumulated so far. The engine never mutates a caller's ticket
//! in place; [`crate::orchestrator::WorkflowOrchestrator::next_step`] returns
//! a new version whose only changes are `state`, `agent_role`, and
//! `updated_at`.

pub mod artifacts;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fsm::State;
use artifacts::{
    EvidenceArtifact, ExecutionArtifact, FinalizationArtifact, PlanArtifact, RequirementsArtifact,
    ScopeArtifact,
};

/// Version of the ticket document schema this engine accepts.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Structured ticket representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub state: State,
    pub run_id: String,
    /// Role instruction for the current/next step, set by the engine on
    /// response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_role: Option<String>,
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<RequirementsArtifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<ScopeArtifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<EvidenceArtifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanArtifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionArtifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalization: Option<FinalizationArtifact>,
}

/// How a ticket document failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Unparsable JSON. Always user-correctable.
    Syntax,
    /// Structurally valid JSON that violates the ticket schema.
    Schema,
    /// `schema_version` differs from [`SCHEMA_VERSION`]. Retry or stop
    /// depending on engine strictness.
    VersionMismatch,
}

/// Structured parse failure, never raised as a panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub kind: ParseErrorKind,
    pub reasons: Vec<String>,
    /// Offending field names, sorted for deterministic reporting.
    pub missing_or_invalid_fields: Vec<String>,
}

impl ParseFailure {
    fn schema(reasons: Vec<String>, mut fields: Vec<String>) -> Self {
        fields.sort();
        fields.dedup();
        Self {
            kind: ParseErrorKind::Schema,
            reasons,
            missing_or_invalid_fields: fields,
        }
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reasons.join("; "))
    }
}

impl std::error::Error for ParseFailure {}

/// Required string fields audited before typed deserialization.
const REQUIRED_STRING_FIELDS: [&str; 3] = ["ticket_id", "title", "run_id"];

impl Ticket {
    /// Create a fresh intake ticket with empty artifacts.
    pub fn new(ticket_id: impl Into<String>, title: impl Into<String>, run_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            ticket_id: ticket_id.into(),
            title: title.into(),
            description: None,
            state: State::Intake,
            run_id: run_id.into(),
            agent_role: None,
            schema_version: SCHEMA_VERSION,
            created_at: now,
            updated_at: now,
            requirements: None,
            scope: None,
            evidence: None,
            plan: None,
            execution: None,
            finalization: None,
        }
    }

    /// Parse and validate a raw ticket document.
    ///
    /// Performs a field-level audit over the raw JSON first so that every
    /// missing or blank required field is reported in one pass (sorted), then
    /// deserializes the typed model. String fields are trimmed on ingest and
    /// blank `unknowns` entries dropped.
    pub fn parse(raw: &str) -> Result<Ticket, ParseFailure> {
        let value: Value = serde_json::from_str(raw).map_err(|e| ParseFailure {
            kind: ParseErrorKind::Syntax,
            reasons: vec![format!("JSON decode error: {e}")],
            missing_or_invalid_fields: Vec::new(),
        })?;

        let Some(obj) = value.as_object() else {
            return Err(ParseFailure::schema(
                vec!["Ticket document must be a JSON object".to_string()],
                Vec::new(),
            ));
        };

        match obj.get("schema_version") {
            None => {}
            Some(v) => match v.as_u64() {
                Some(version) if version == u64::from(SCHEMA_VERSION) => {}
                Some(version) => {
                    return Err(ParseFailure {
                        kind: ParseErrorKind::VersionMismatch,
                        reasons: vec![format!(
                            "Unsupported schema_version {version}; this engine accepts {SCHEMA_VERSION}"
                        )],
                        missing_or_invalid_fields: vec!["schema_version".to_string()],
                    });
                }
                None => {
                    return Err(ParseFailure::schema(
                        vec!["schema_version must be an integer".to_string()],
                        vec!["schema_version".to_string()],
                    ));
                }
            },
        }

        let mut reasons = Vec::new();
        let mut fields = Vec::new();

        for field in REQUIRED_STRING_FIELDS {
            match obj.get(field).and_then(Value::as_str) {
                Some(s) if !s.trim().is_empty() => {}
                _ => {
                    reasons.push(format!("{field} must be a non-empty string"));
                    fields.push(field.to_string());
                }
            }
        }

        match obj.get("state").and_then(Value::as_str) {
            Some(token) => {
                if token.parse::<State>().is_err() {
                    reasons.push(format!("Unrecognized state token: '{token}'"));
                    fields.push("state".to_string());
                }
            }
            None => {
                reasons.push("state must be one of the workflow state tokens".to_string());
                fields.push("state".to_string());
            }
        }

        if !reasons.is_empty() {
            return Err(ParseFailure::schema(reasons, fields));
        }

        let ticket: Ticket = serde_json::from_value(value).map_err(|e| {
            ParseFailure::schema(vec![format!("Ticket validation failed: {e}")], Vec::new())
        })?;

        Ok(ticket.normalized())
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    fn normalized(mut self) -> Self {
        self.ticket_id = self.ticket_id.trim().to_string();
        self.title = self.title.trim().to_string();
        self.run_id = self.run_id.trim().to_string();
        if let Some(requirements) = &mut self.requirements {
            requirements.unknowns = requirements
                .unknowns
                .iter()
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .collect();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn raw_minimal(state: &str) -> String {
        format!(
            r#"{{"ticket_id": "T-1", "title": "x", "state": "{state}", "run_id": "r-1"}}"#
        )
    }

    #[test]
    fn new_ticket_starts_at_intake_with_empty_artifacts() {
        let ticket = Ticket::new("PROJ-123", "Add login flow", Uuid::new_v4().to_string());
        assert_eq!(ticket.state, State::Intake);
        assert_eq!(ticket.schema_version, SCHEMA_VERSION);
        assert!(ticket.requirements.is_none());
        assert!(ticket.finalization.is_none());
        assert!(ticket.agent_role.is_none());
    }

    #[test]
    fn parse_minimal_ticket() {
        let ticket = Ticket::parse(&raw_minimal("intake")).unwrap();
        assert_eq!(ticket.ticket_id, "T-1");
        assert_eq!(ticket.state, State::Intake);
        assert_eq!(ticket.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn parse_defaults_timestamps_to_call_time() {
        let before = Utc::now();
        let ticket = Ticket::parse(&raw_minimal("intake")).unwrap();
        let after = Utc::now();
        assert!(ticket.created_at >= before && ticket.created_at <= after);
        assert!(ticket.updated_at >= before && ticket.updated_at <= after);
    }

    #[test]
    fn parse_rejects_bad_syntax() {
        let failure = Ticket::parse("{not json").unwrap_err();
        assert_eq!(failure.kind, ParseErrorKind::Syntax);
        assert!(failure.reasons[0].contains("JSON decode error"));
    }

    #[test]
    fn parse_rejects_non_object_document() {
        let failure = Ticket::parse("[1, 2, 3]").unwrap_err();
        assert_eq!(failure.kind, ParseErrorKind::Schema);
    }

    #[test]
    fn parse_lists_all_missing_fields_sorted() {
        let failure = Ticket::parse(r#"{"title": "x"}"#).unwrap_err();
        assert_eq!(failure.kind, ParseErrorKind::Schema);
        assert_eq!(
            failure.missing_or_invalid_fields,
            vec!["run_id", "state", "ticket_id"]
        );
    }

    #[test]
    fn parse_rejects_whitespace_only_required_fields() {
        let failure = Ticket::parse(
            r#"{"ticket_id": "  ", "title": "x", "state": "intake", "run_id": "r-1"}"#,
        )
        .unwrap_err();
        assert_eq!(failure.missing_or_invalid_fields, vec!["ticket_id"]);
    }

    #[test]
    fn parse_rejects_unknown_state_token() {
        let failure = Ticket::parse(&raw_minimal("deploy")).unwrap_err();
        assert_eq!(failure.kind, ParseErrorKind::Schema);
        assert_eq!(failure.missing_or_invalid_fields, vec!["state"]);
        assert!(failure.reasons[0].contains("deploy"));
    }

    #[test]
    fn parse_flags_version_mismatch() {
        let failure = Ticket::parse(
            r#"{"ticket_id": "T-1", "title": "x", "state": "intake", "run_id": "r-1", "schema_version": 2}"#,
        )
        .unwrap_err();
        assert_eq!(failure.kind, ParseErrorKind::VersionMismatch);
        assert_eq!(failure.missing_or_invalid_fields, vec!["schema_version"]);
    }

    #[test]
    fn parse_accepts_current_schema_version() {
        let ticket = Ticket::parse(
            r#"{"ticket_id": "T-1", "title": "x", "state": "intake", "run_id": "r-1", "schema_version": 1}"#,
        )
        .unwrap();
        assert_eq!(ticket.schema_version, 1);
    }

    #[test]
    fn parse_rejects_malformed_artifact_shape() {
        let failure = Ticket::parse(
            r#"{"ticket_id": "T-1", "title": "x", "state": "propose_plan", "run_id": "r-1",
                "plan": {"steps": [{"id": "S-1"}]}}"#,
        )
        .unwrap_err();
        assert_eq!(failure.kind, ParseErrorKind::Schema);
        assert!(failure.reasons[0].contains("Ticket validation failed"));
    }

    #[test]
    fn parse_trims_strings_and_drops_blank_unknowns() {
        let ticket = Ticket::parse(
            r#"{"ticket_id": " T-1 ", "title": " x ", "state": "extract_requirements",
                "run_id": " r-1 ",
                "requirements": {"acceptance_criteria": [{"id": "AC-1", "text": "works"}],
                                 "unknowns": ["  ", "Is MFA needed? ", ""]}}"#,
        )
        .unwrap();
        assert_eq!(ticket.ticket_id, "T-1");
        assert_eq!(ticket.title, "x");
        assert_eq!(ticket.run_id, "r-1");
        assert_eq!(
            ticket.requirements.unwrap().unknowns,
            vec!["Is MFA needed?"]
        );
    }

    #[test]
    fn ticket_json_roundtrip() {
        let ticket = Ticket::new("T-42", "Roundtrip", "run-7");
        let json = ticket.to_json().unwrap();
        let back = Ticket::parse(&json).unwrap();
        assert_eq!(back, ticket);
    }

    #[test]
    fn serialization_omits_absent_artifacts() {
        let json = Ticket::new("T-1", "x", "r-1").to_json().unwrap();
        assert!(!json.contains("requirements"));
        assert!(!json.contains("finalization"));
        assert!(!json.contains("agent_role"));
    }
}

//! stagegate — deterministic stage-gate governor for AI ticket workflows.
//!
//! An external agent repeatedly submits a ticket document; the engine
//! validates it against the gate for its declared state and, only if the
//! gate passes, advances the ticket to the next state with a canonical role
//! instruction attached. Gates own "is this stage's output good enough";
//! the transition function owns "what comes next given a good stage".

pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod fsm;
pub mod gates;
pub mod logging;
pub mod orchestrator;
pub mod storage;
pub mod ticket;
pub mod ui;

pub use config::EngineConfig;
pub use error::StagegateError;
pub use orchestrator::{NextStepResponse, WorkflowOrchestrator};
pub use storage::ArtifactStore;
pub use ticket::Ticket;

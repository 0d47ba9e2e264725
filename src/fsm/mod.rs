pub mod registry;
pub mod state;
pub mod transition;

pub use registry::{
    required_fields_for, role_for, ROLE_FIX_INPUT, ROLE_INVALID_STATE, ROLE_RUN_COMPLETE,
};
pub use state::{ParseStateError, State, ALL_STATES};
pub use transition::{transition, TransitionResult, TransitionStatus};

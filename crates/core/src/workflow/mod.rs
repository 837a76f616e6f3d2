pub mod authority;
pub mod engine;
pub mod table;
pub mod visibility;

pub use authority::{
    can_user_perform_action, check_action, get_allowed_actions, ActionDecision, ActionPermission,
};
pub use engine::{CaseWorkflow, TransitionOutcome, WorkflowError};
pub use table::{
    find_transition, get_available_actions, is_valid_transition, StateTransition, TRANSITIONS,
};
pub use visibility::{visible_statuses_for_code, visible_statuses_for_role, RoleVisibility};

pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod simulation;
pub mod workflow;

pub use audit::{AuditContext, AuditEvent, AuditSink, InMemoryAuditSink};
pub use domain::case::{Case, CaseId, CaseStatus, ParseCodeError, Role};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use simulation::{
    price_coefficient, simulate, simulate_single_bank, ConsultingFee, SimulationInput,
    SimulationRequest, SimulationTotals,
};
pub use workflow::{
    can_user_perform_action, get_allowed_actions, get_available_actions, is_valid_transition,
    visible_statuses_for_role, ActionPermission, CaseWorkflow, StateTransition, WorkflowError,
};

pub fn is_final_status(status: CaseStatus) -> bool {
    status.is_final()
}

pub fn should_release_lock(status: CaseStatus) -> bool {
    status.should_release_lock()
}

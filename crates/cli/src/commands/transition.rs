use refin_core::workflow::{CaseWorkflow, WorkflowError};
use refin_core::{ApplicationError, Case, CaseId, DomainError};
use serde::Serialize;

use crate::commands::{
    failure_from, parse_status_and_role, to_data, CommandResult, EXIT_DENIED, EXIT_INPUT,
};

#[derive(Debug, Clone)]
pub struct TransitionArgs {
    pub status: String,
    pub role: String,
    pub action: String,
    pub case_id: String,
    pub assigned_user: Option<String>,
}

#[derive(Debug, Serialize)]
struct TransitionReport {
    outcome: refin_core::workflow::TransitionOutcome,
    case: Case,
}

pub fn run(args: TransitionArgs) -> CommandResult {
    let (status, role) = match parse_status_and_role(&args.status, &args.role) {
        Ok(parsed) => parsed,
        Err(error) => {
            return CommandResult::failure("transition", "unknown_code", error.to_string(), EXIT_INPUT)
        }
    };

    let correlation_id = args.case_id.clone();
    let mut case = Case { id: CaseId(args.case_id), status, assigned_user_id: args.assigned_user };

    match CaseWorkflow::new().apply(&mut case, role, &args.action) {
        Ok(outcome) => {
            let message = format!("{} -> {} via {}", outcome.from, outcome.to, outcome.action);
            CommandResult::success_with_data(
                "transition",
                message,
                to_data(&TransitionReport { outcome, case }),
            )
        }
        Err(error) => {
            let error_class = match error {
                WorkflowError::InvalidTransition { .. } => "invalid_transition",
                WorkflowError::UnauthorizedRole { .. } => "unauthorized_role",
            };
            failure_from(
                "transition",
                error_class,
                ApplicationError::from(DomainError::from(error)),
                &correlation_id,
                EXIT_DENIED,
            )
        }
    }
}

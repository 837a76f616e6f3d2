use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audit::{AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::domain::case::{Case, CaseStatus, Role};
use crate::workflow::authority::required_roles_reason;
use crate::workflow::table::{find_transition, is_valid_transition};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: CaseStatus,
    pub to: CaseStatus,
    pub action: String,
    pub lock_released: bool,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("invalid transition from {from} using action `{action}`")]
    InvalidTransition { from: CaseStatus, action: String },
    #[error("role {role} cannot perform `{action}` from {from}: {reason}")]
    UnauthorizedRole { from: CaseStatus, role: Role, action: String, reason: String },
}

impl WorkflowError {
    /// Text the caller shows to the operator unchanged.
    pub fn reason(&self) -> String {
        match self {
            Self::InvalidTransition { from, action } => {
                format!("Action `{action}` is not available from status {from}")
            }
            Self::UnauthorizedRole { reason, .. } => reason.clone(),
        }
    }
}

/// Applies validated transitions to a [`Case`]. The case is left untouched on any error.
///
/// Validation runs against the status held by the `Case` value passed in; callers sharing
/// a case between writers must make check-and-apply atomic on their side.
#[derive(Clone, Debug, Default)]
pub struct CaseWorkflow;

impl CaseWorkflow {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(
        &self,
        case: &mut Case,
        role: Role,
        action: &str,
    ) -> Result<TransitionOutcome, WorkflowError> {
        let from = case.status;
        let Some(entry) = find_transition(from, action) else {
            tracing::warn!(
                event_name = "case.transition_rejected",
                case_id = %case.id.0,
                from = %from,
                role = %role,
                action,
                "action not available from current status"
            );
            return Err(WorkflowError::InvalidTransition { from, action: action.to_string() });
        };

        if !entry.permits(role) {
            tracing::warn!(
                event_name = "case.transition_rejected",
                case_id = %case.id.0,
                from = %from,
                role = %role,
                action,
                "role not authorized for action"
            );
            return Err(WorkflowError::UnauthorizedRole {
                from,
                role,
                action: action.to_string(),
                reason: required_roles_reason(entry),
            });
        }

        case.status = entry.to;
        let lock_released = entry.to.should_release_lock() && case.assigned_user_id.take().is_some();

        tracing::info!(
            event_name = "case.transition_applied",
            case_id = %case.id.0,
            from = %from,
            to = %entry.to,
            role = %role,
            action,
            lock_released,
            "case transition applied"
        );

        Ok(TransitionOutcome { from, to: entry.to, action: action.to_string(), lock_released })
    }

    /// Like [`CaseWorkflow::apply`], but the caller names the expected target status too.
    pub fn transition_to(
        &self,
        case: &mut Case,
        role: Role,
        to: CaseStatus,
        action: &str,
    ) -> Result<TransitionOutcome, WorkflowError> {
        if !is_valid_transition(case.status, to, action) {
            return Err(WorkflowError::InvalidTransition {
                from: case.status,
                action: action.to_string(),
            });
        }
        self.apply(case, role, action)
    }

    /// Assigns the case to `user_id` through the `assign` action.
    pub fn assign(
        &self,
        case: &mut Case,
        role: Role,
        user_id: impl Into<String>,
    ) -> Result<TransitionOutcome, WorkflowError> {
        let outcome = self.apply(case, role, "assign")?;
        case.assigned_user_id = Some(user_id.into());
        Ok(outcome)
    }

    pub fn apply_with_audit<S>(
        &self,
        case: &mut Case,
        action: &str,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, WorkflowError>
    where
        S: AuditSink,
    {
        let result = self.apply(case, audit.actor_role, action);
        match &result {
            Ok(outcome) => {
                sink.emit(
                    AuditEvent::new(
                        Some(case.id.clone()),
                        audit,
                        "case.transition_applied",
                        AuditOutcome::Success,
                    )
                    .with_metadata("from", outcome.from.code())
                    .with_metadata("to", outcome.to.code())
                    .with_metadata("action", outcome.action.clone())
                    .with_metadata("lock_released", outcome.lock_released.to_string()),
                );
            }
            Err(error) => {
                sink.emit(
                    AuditEvent::new(
                        Some(case.id.clone()),
                        audit,
                        "case.transition_rejected",
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("action", action)
                    .with_metadata("reason", error.reason()),
                );
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use crate::audit::{AuditContext, AuditOutcome, InMemoryAuditSink};
    use crate::domain::case::{Case, CaseId, CaseStatus, Role};
    use crate::workflow::engine::{CaseWorkflow, WorkflowError};

    fn case_in(status: CaseStatus) -> Case {
        Case {
            id: CaseId("C-2026-0100".to_owned()),
            status,
            assigned_user_id: Some("user-1".to_owned()),
        }
    }

    #[test]
    fn happy_path_reaches_archive_and_releases_lock_on_activation() {
        let workflow = CaseWorkflow::new();
        let mut case = Case::new(CaseId("C-2026-0001".to_owned()));

        workflow.assign(&mut case, Role::Atendente, "user-1").expect("assign");
        assert_eq!(case.assigned_user_id.as_deref(), Some("user-1"));

        let steps = [
            (Role::Atendente, "sendToCalc", CaseStatus::PendenteCalculo),
            (Role::Calculista, "calcApprove", CaseStatus::SimulacaoAprovada),
            (Role::Atendente, "sendToClosing", CaseStatus::EmFechamento),
            (Role::GerenteFechamento, "closingApprove", CaseStatus::ContratoConfirmado),
            (Role::Atendente, "sendToFinance", CaseStatus::EnviadoFinanceiro),
        ];
        for (role, action, expected) in steps {
            let outcome = workflow.apply(&mut case, role, action).expect(action);
            assert_eq!(outcome.to, expected);
            assert!(!outcome.lock_released);
            assert!(case.assigned_user_id.is_some());
        }

        let activated = workflow.apply(&mut case, Role::Financeiro, "financeConfirm").expect("activate");
        assert_eq!(activated.to, CaseStatus::ContratoAtivado);
        assert!(activated.lock_released);
        assert!(case.assigned_user_id.is_none());

        let archived = workflow.apply(&mut case, Role::Atendente, "archive").expect("archive");
        assert_eq!(archived.to, CaseStatus::EncerradoAtivado);
        assert!(!archived.lock_released);
        assert!(case.is_archived());
    }

    #[test]
    fn unauthorized_role_is_rejected_without_mutation() {
        let workflow = CaseWorkflow::new();
        let mut case = case_in(CaseStatus::PendenteCalculo);

        let error = workflow
            .apply(&mut case, Role::Atendente, "calcApprove")
            .expect_err("atendente cannot approve a calculation");

        assert_eq!(error.reason(), "Requires role: calculista");
        assert!(matches!(error, WorkflowError::UnauthorizedRole { role: Role::Atendente, .. }));
        assert_eq!(case, case_in(CaseStatus::PendenteCalculo));
    }

    #[test]
    fn unknown_action_is_an_invalid_transition() {
        let workflow = CaseWorkflow::new();
        let mut case = case_in(CaseStatus::EncerradoReprovado);

        let error = workflow.apply(&mut case, Role::Superadmin, "archive").expect_err("terminal");
        assert_eq!(
            error,
            WorkflowError::InvalidTransition {
                from: CaseStatus::EncerradoReprovado,
                action: "archive".to_owned()
            }
        );
        assert_eq!(case.status, CaseStatus::EncerradoReprovado);
    }

    #[test]
    fn rejection_path_releases_lock_at_terminal_status() {
        let workflow = CaseWorkflow::new();
        let mut case = case_in(CaseStatus::PendenteCalculo);

        workflow.apply(&mut case, Role::Calculista, "calcReject").expect("reject");
        let closed = workflow.apply(&mut case, Role::Atendente, "closeRejected").expect("close");

        assert_eq!(closed.to, CaseStatus::EncerradoReprovado);
        assert!(closed.lock_released);
        assert!(case.assigned_user_id.is_none());
    }

    #[test]
    fn superadmin_bypasses_listed_roles() {
        let workflow = CaseWorkflow::new();
        let mut case = case_in(CaseStatus::EmFechamento);

        let outcome = workflow.apply(&mut case, Role::Superadmin, "closingApprove").expect("bypass");
        assert_eq!(outcome.to, CaseStatus::ContratoConfirmado);
    }

    #[test]
    fn transition_to_checks_the_exact_triple() {
        let workflow = CaseWorkflow::new();
        let mut case = case_in(CaseStatus::PendenteCalculo);

        let error = workflow
            .transition_to(&mut case, Role::Calculista, CaseStatus::SimulacaoReprovada, "calcApprove")
            .expect_err("calcApprove leads to SIMULACAO_APROVADA");
        assert!(matches!(error, WorkflowError::InvalidTransition { .. }));
        assert_eq!(case.status, CaseStatus::PendenteCalculo);

        workflow
            .transition_to(&mut case, Role::Calculista, CaseStatus::SimulacaoReprovada, "calcReject")
            .expect("exact triple");
        assert_eq!(case.status, CaseStatus::SimulacaoReprovada);
    }

    #[test]
    fn audit_events_record_applied_and_rejected_transitions() {
        let workflow = CaseWorkflow::new();
        let sink = InMemoryAuditSink::default();
        let audit = AuditContext::new("req-42", "user-9", Role::Atendente);
        let mut case = case_in(CaseStatus::PendenteCalculo);

        let _ = workflow.apply_with_audit(&mut case, "calcApprove", &sink, &audit);
        case.status = CaseStatus::SimulacaoAprovada;
        workflow.apply_with_audit(&mut case, "sendToClosing", &sink, &audit).expect("allowed");

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "case.transition_rejected");
        assert_eq!(events[0].outcome, AuditOutcome::Rejected);
        assert_eq!(events[0].metadata.get("reason").map(String::as_str), Some("Requires role: calculista"));
        assert_eq!(events[1].event_type, "case.transition_applied");
        assert_eq!(events[1].metadata.get("to").map(String::as_str), Some("EM_FECHAMENTO"));
        assert_eq!(events[1].correlation_id, "req-42");
    }
}

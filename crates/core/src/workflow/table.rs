use serde::Serialize;

use crate::domain::case::{CaseStatus, Role};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StateTransition {
    pub from: CaseStatus,
    pub to: CaseStatus,
    pub action: &'static str,
    pub requires_role: &'static [Role],
}

impl StateTransition {
    const fn new(
        from: CaseStatus,
        to: CaseStatus,
        action: &'static str,
        requires_role: &'static [Role],
    ) -> Self {
        Self { from, to, action, requires_role }
    }

    /// Superadmin passes every row regardless of `requires_role`.
    pub fn permits(&self, role: Role) -> bool {
        role.is_superadmin() || self.requires_role.contains(&role)
    }
}

/// Every legal case transition, in display order.
pub static TRANSITIONS: [StateTransition; 11] = [
    StateTransition::new(
        CaseStatus::Disponivel,
        CaseStatus::Atribuido,
        "assign",
        &[Role::Atendente],
    ),
    StateTransition::new(
        CaseStatus::Atribuido,
        CaseStatus::PendenteCalculo,
        "sendToCalc",
        &[Role::Atendente],
    ),
    StateTransition::new(
        CaseStatus::PendenteCalculo,
        CaseStatus::SimulacaoAprovada,
        "calcApprove",
        &[Role::Calculista],
    ),
    StateTransition::new(
        CaseStatus::PendenteCalculo,
        CaseStatus::SimulacaoReprovada,
        "calcReject",
        &[Role::Calculista],
    ),
    StateTransition::new(
        CaseStatus::SimulacaoAprovada,
        CaseStatus::EmFechamento,
        "sendToClosing",
        &[Role::Atendente],
    ),
    StateTransition::new(
        CaseStatus::EmFechamento,
        CaseStatus::ContratoConfirmado,
        "closingApprove",
        &[Role::GerenteFechamento],
    ),
    StateTransition::new(
        CaseStatus::ContratoConfirmado,
        CaseStatus::EnviadoFinanceiro,
        "sendToFinance",
        &[Role::Atendente],
    ),
    StateTransition::new(
        CaseStatus::EnviadoFinanceiro,
        CaseStatus::ContratoAtivado,
        "financeConfirm",
        &[Role::Financeiro],
    ),
    StateTransition::new(
        CaseStatus::SimulacaoReprovada,
        CaseStatus::EncerradoReprovado,
        "closeRejected",
        &[Role::Atendente],
    ),
    StateTransition::new(
        CaseStatus::SimulacaoAprovada,
        CaseStatus::EncerradoNaoAprovado,
        "closeClientDeclined",
        &[Role::Atendente],
    ),
    StateTransition::new(
        CaseStatus::ContratoAtivado,
        CaseStatus::EncerradoAtivado,
        "archive",
        &[Role::Atendente, Role::Superadmin],
    ),
];

pub fn is_valid_transition(from: CaseStatus, to: CaseStatus, action: &str) -> bool {
    TRANSITIONS.iter().any(|entry| entry.from == from && entry.to == to && entry.action == action)
}

pub fn get_available_actions(status: CaseStatus) -> Vec<StateTransition> {
    TRANSITIONS.iter().filter(|entry| entry.from == status).copied().collect()
}

pub fn find_transition(status: CaseStatus, action: &str) -> Option<&'static StateTransition> {
    TRANSITIONS.iter().find(|entry| entry.from == status && entry.action == action)
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    Disponivel,
    Atribuido,
    PendenteCalculo,
    SimulacaoAprovada,
    SimulacaoReprovada,
    EmFechamento,
    ContratoConfirmado,
    EnviadoFinanceiro,
    ContratoAtivado,
    EncerradoReprovado,
    EncerradoNaoAprovado,
    EncerradoAtivado,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 12] = [
        CaseStatus::Disponivel,
        CaseStatus::Atribuido,
        CaseStatus::PendenteCalculo,
        CaseStatus::SimulacaoAprovada,
        CaseStatus::SimulacaoReprovada,
        CaseStatus::EmFechamento,
        CaseStatus::ContratoConfirmado,
        CaseStatus::EnviadoFinanceiro,
        CaseStatus::ContratoAtivado,
        CaseStatus::EncerradoReprovado,
        CaseStatus::EncerradoNaoAprovado,
        CaseStatus::EncerradoAtivado,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Disponivel => "DISPONIVEL",
            Self::Atribuido => "ATRIBUIDO",
            Self::PendenteCalculo => "PENDENTE_CALCULO",
            Self::SimulacaoAprovada => "SIMULACAO_APROVADA",
            Self::SimulacaoReprovada => "SIMULACAO_REPROVADA",
            Self::EmFechamento => "EM_FECHAMENTO",
            Self::ContratoConfirmado => "CONTRATO_CONFIRMADO",
            Self::EnviadoFinanceiro => "ENVIADO_FINANCEIRO",
            Self::ContratoAtivado => "CONTRATO_ATIVADO",
            Self::EncerradoReprovado => "ENCERRADO_REPROVADO",
            Self::EncerradoNaoAprovado => "ENCERRADO_NAO_APROVADO",
            Self::EncerradoAtivado => "ENCERRADO_ATIVADO",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Disponivel => "Disponível",
            Self::Atribuido => "Atribuído",
            Self::PendenteCalculo => "Pendente de cálculo",
            Self::SimulacaoAprovada => "Simulação aprovada",
            Self::SimulacaoReprovada => "Simulação reprovada",
            Self::EmFechamento => "Em fechamento",
            Self::ContratoConfirmado => "Contrato confirmado",
            Self::EnviadoFinanceiro => "Enviado ao financeiro",
            Self::ContratoAtivado => "Contrato ativado",
            Self::EncerradoReprovado => "Encerrado (reprovado)",
            Self::EncerradoNaoAprovado => "Encerrado (não aprovado pelo cliente)",
            Self::EncerradoAtivado => "Encerrado (ativado)",
        }
    }

    /// Terminal statuses: the three `ENCERRADO_*` values.
    pub fn is_final(self) -> bool {
        matches!(self, Self::EncerradoReprovado | Self::EncerradoNaoAprovado | Self::EncerradoAtivado)
    }

    /// Whether the caller must clear the case's `assigned_user_id` once the case reaches
    /// this status.
    pub fn should_release_lock(self) -> bool {
        self == Self::ContratoAtivado || self.is_final()
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CaseStatus {
    type Err = ParseCodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|status| status.code() == normalized).ok_or_else(|| {
            ParseCodeError::UnknownStatus(value.to_string())
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Atendente,
    Calculista,
    GerenteFechamento,
    Financeiro,
    Superadmin,
}

impl Role {
    pub const ALL: [Role; 5] =
        [Role::Atendente, Role::Calculista, Role::GerenteFechamento, Role::Financeiro, Role::Superadmin];

    pub fn code(self) -> &'static str {
        match self {
            Self::Atendente => "atendente",
            Self::Calculista => "calculista",
            Self::GerenteFechamento => "gerente_fechamento",
            Self::Financeiro => "financeiro",
            Self::Superadmin => "superadmin",
        }
    }

    /// Display label, never consulted by authorization.
    pub fn label(self) -> &'static str {
        match self {
            Self::Atendente => "Atendente",
            Self::Calculista => "Calculista",
            Self::GerenteFechamento => "Gerente de Fechamento",
            Self::Financeiro => "Financeiro",
            Self::Superadmin => "Super Admin",
        }
    }

    pub fn is_superadmin(self) -> bool {
        self == Self::Superadmin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Role {
    type Err = ParseCodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|role| role.code() == normalized)
            .ok_or_else(|| ParseCodeError::UnknownRole(value.to_string()))
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseCodeError {
    #[error("unknown case status `{0}`")]
    UnknownStatus(String),
    #[error("unknown role `{0}`")]
    UnknownRole(String),
}

/// A refinancing case as seen by the workflow. Storage of the lock is the caller's concern;
/// only its value travels here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub status: CaseStatus,
    pub assigned_user_id: Option<String>,
}

impl Case {
    pub fn new(id: CaseId) -> Self {
        Self { id, status: CaseStatus::Disponivel, assigned_user_id: None }
    }

    pub fn is_archived(&self) -> bool {
        self.status.is_final()
    }
}

#[cfg(test)]
mod tests {
    use super::{Case, CaseId, CaseStatus, ParseCodeError, Role};

    #[test]
    fn exactly_three_statuses_are_final() {
        let finals: Vec<_> = CaseStatus::ALL.into_iter().filter(|status| status.is_final()).collect();
        assert_eq!(
            finals,
            vec![
                CaseStatus::EncerradoReprovado,
                CaseStatus::EncerradoNaoAprovado,
                CaseStatus::EncerradoAtivado
            ]
        );
        assert!(finals.iter().all(|status| status.code().starts_with("ENCERRADO_")));
    }

    #[test]
    fn lock_is_released_on_activation_and_terminal_statuses_only() {
        for status in CaseStatus::ALL {
            let expected = status == CaseStatus::ContratoAtivado || status.is_final();
            assert_eq!(status.should_release_lock(), expected, "{status}");
        }

        let held = CaseStatus::ALL.into_iter().filter(|status| !status.should_release_lock()).count();
        assert_eq!(held, 8);
    }

    #[test]
    fn status_codes_round_trip_through_from_str() {
        for status in CaseStatus::ALL {
            assert_eq!(status.code().parse::<CaseStatus>(), Ok(status));
        }
        assert_eq!("pendente_calculo".parse::<CaseStatus>(), Ok(CaseStatus::PendenteCalculo));
        assert_eq!(
            "ARQUIVADO".parse::<CaseStatus>(),
            Err(ParseCodeError::UnknownStatus("ARQUIVADO".to_string()))
        );
    }

    #[test]
    fn serde_uses_wire_codes() {
        let encoded = serde_json::to_string(&CaseStatus::EncerradoNaoAprovado).expect("serialize");
        assert_eq!(encoded, "\"ENCERRADO_NAO_APROVADO\"");

        let role: Role = serde_json::from_str("\"gerente_fechamento\"").expect("deserialize");
        assert_eq!(role, Role::GerenteFechamento);
        assert_eq!(role.to_string(), "gerente_fechamento");
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert_eq!("Gerente".parse::<Role>(), Err(ParseCodeError::UnknownRole("Gerente".to_string())));
        assert_eq!(" Financeiro ".parse::<Role>(), Ok(Role::Financeiro));
    }

    #[test]
    fn new_cases_start_available_and_unassigned() {
        let case = Case::new(CaseId("C-2026-0001".to_string()));
        assert_eq!(case.status, CaseStatus::Disponivel);
        assert!(case.assigned_user_id.is_none());
        assert!(!case.is_archived());
    }
}

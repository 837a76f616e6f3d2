use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::simulation::engine::{resolve_coefficient, BankLine, ConsultingFee, SimulationInput};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SimulationInputError {
    #[error("malformed numeric value for `{field}`: `{value}`")]
    MalformedNumber { field: String, value: String },
    #[error("simulation requires at least one bank line")]
    EmptyBankList,
    #[error("coefficient `{coefficient}` is too small to finance `{bank}`")]
    CoefficientOutOfRange { coefficient: Decimal, bank: String },
}

/// Turns operator-typed numbers into decimals. A comma is read as the decimal separator.
pub fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, SimulationInputError> {
    let normalized = raw.trim().replace(',', ".");
    Decimal::from_str(&normalized).map_err(|_| SimulationInputError::MalformedNumber {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

/// A number as it arrives from a form or file: either already numeric or free text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(Decimal),
    Text(String),
}

impl RawNumber {
    pub fn to_decimal(&self, field: &str) -> Result<Decimal, SimulationInputError> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Text(raw) => parse_decimal(field, raw),
        }
    }
}

impl From<Decimal> for RawNumber {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeScale {
    #[default]
    Percent,
    Fraction,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBankLine {
    pub bank: String,
    pub parcela: RawNumber,
    #[serde(default)]
    pub saldo_devedor: Option<RawNumber>,
    #[serde(default)]
    pub valor_liberado: Option<RawNumber>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    pub banks: Vec<RawBankLine>,
    #[serde(default)]
    pub prazo: Option<i64>,
    #[serde(default)]
    pub coeficiente: Option<RawNumber>,
    #[serde(default)]
    pub coeficiente_manual: Option<RawNumber>,
    #[serde(default)]
    pub taxa_mensal: Option<RawNumber>,
    #[serde(default)]
    pub seguro: Option<RawNumber>,
    #[serde(default)]
    pub percentual_consultoria: Option<RawNumber>,
    #[serde(default)]
    pub consultoria_scale: FeeScale,
}

fn optional_decimal(
    field: &str,
    value: Option<&RawNumber>,
) -> Result<Option<Decimal>, SimulationInputError> {
    value.map(|raw| raw.to_decimal(field)).transpose()
}

impl SimulationRequest {
    pub fn into_input(self, default_prazo: i64) -> Result<SimulationInput, SimulationInputError> {
        if self.banks.is_empty() {
            return Err(SimulationInputError::EmptyBankList);
        }

        let banks = self
            .banks
            .iter()
            .enumerate()
            .map(|(index, line)| -> Result<BankLine, SimulationInputError> {
                Ok(BankLine {
                    bank: line.bank.trim().to_string(),
                    parcela: line.parcela.to_decimal(&format!("banks[{index}].parcela"))?,
                    saldo_devedor: optional_decimal(
                        &format!("banks[{index}].saldoDevedor"),
                        line.saldo_devedor.as_ref(),
                    )?
                    .unwrap_or(Decimal::ZERO),
                    valor_liberado: optional_decimal(
                        &format!("banks[{index}].valorLiberado"),
                        line.valor_liberado.as_ref(),
                    )?
                    .unwrap_or(Decimal::ZERO),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let fee = optional_decimal("percentualConsultoria", self.percentual_consultoria.as_ref())?
            .unwrap_or(Decimal::ZERO);
        let percentual_consultoria = match self.consultoria_scale {
            FeeScale::Percent => ConsultingFee::from_percent(fee),
            FeeScale::Fraction => ConsultingFee::from_fraction(fee),
        };

        let input = SimulationInput {
            banks,
            prazo: self.prazo.unwrap_or(default_prazo),
            coeficiente: optional_decimal("coeficiente", self.coeficiente.as_ref())?
                .unwrap_or(Decimal::ZERO),
            coeficiente_manual: optional_decimal(
                "coeficienteManual",
                self.coeficiente_manual.as_ref(),
            )?,
            taxa_mensal: optional_decimal("taxaMensal", self.taxa_mensal.as_ref())?,
            seguro: optional_decimal("seguro", self.seguro.as_ref())?.unwrap_or(Decimal::ZERO),
            percentual_consultoria,
        };
        check_coefficient_range(&input)?;
        Ok(input)
    }
}

// every parcela / coefficient quotient must fit in a Decimal
fn check_coefficient_range(input: &SimulationInput) -> Result<(), SimulationInputError> {
    let coefficient = resolve_coefficient(input);
    if coefficient <= Decimal::ZERO {
        return Ok(());
    }
    match input.banks.iter().find(|line| line.parcela.abs().checked_div(coefficient).is_none()) {
        Some(line) => {
            Err(SimulationInputError::CoefficientOutOfRange { coefficient, bank: line.bank.clone() })
        }
        None => Ok(()),
    }
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::simulation::rounding::{divide_or_zero, round_currency};

pub const DEFAULT_MARGIN_TOKEN: &str = "margem";

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Advisory fee, always held on the 0–100 scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsultingFee(Decimal);

impl ConsultingFee {
    pub fn from_percent(percent: Decimal) -> Self {
        Self(percent)
    }

    pub fn from_fraction(fraction: Decimal) -> Self {
        Self(fraction * HUNDRED)
    }

    pub fn percent(self) -> Decimal {
        self.0
    }

    pub fn fraction(self) -> Decimal {
        self.0 / HUNDRED
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankLine {
    pub bank: String,
    pub parcela: Decimal,
    pub saldo_devedor: Decimal,
    /// Figure captured by the operator; the engine recomputes its own.
    #[serde(default)]
    pub valor_liberado: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationInput {
    pub banks: Vec<BankLine>,
    pub prazo: i64,
    pub coeficiente: Decimal,
    #[serde(default)]
    pub coeficiente_manual: Option<Decimal>,
    /// Monthly rate in percent, used only when no coefficient is supplied.
    #[serde(default)]
    pub taxa_mensal: Option<Decimal>,
    pub seguro: Decimal,
    pub percentual_consultoria: ConsultingFee,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankBreakdown {
    pub bank: String,
    pub is_margin: bool,
    pub financiado: Decimal,
    pub liberado: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationTotals {
    pub coeficiente: Decimal,
    pub valor_parcela_total: Decimal,
    pub saldo_total: Decimal,
    pub liberado_total: Decimal,
    pub total_financiado: Decimal,
    pub valor_liquido: Decimal,
    pub custo_consultoria: Decimal,
    pub valor_a_subtrair: Decimal,
    pub liberado_cliente: Decimal,
    pub banks: Vec<BankBreakdown>,
}

/// PRICE annuity coefficient `i / (1 - (1 + i)^-n)`; zero when either input is non-positive.
/// Tends to `i` as `n` grows, so it stays positive even when `(1 + i)^n` leaves `Decimal` range.
pub fn price_coefficient(monthly_rate_fraction: Decimal, installments: i64) -> Decimal {
    if monthly_rate_fraction <= Decimal::ZERO || installments <= 0 {
        return Decimal::ZERO;
    }
    let installments = installments as u64;

    compounded_price_coefficient(monthly_rate_fraction, installments)
        .or_else(|| discounted_price_coefficient(monthly_rate_fraction, installments))
        .unwrap_or(monthly_rate_fraction)
}

// i * (1+i)^n / ((1+i)^n - 1): exact for short terms, overflows on long ones
fn compounded_price_coefficient(rate: Decimal, installments: u64) -> Option<Decimal> {
    let growth = checked_powi(Decimal::ONE.checked_add(rate)?, installments)?;
    let numerator = rate.checked_mul(growth)?;
    numerator.checked_div(growth - Decimal::ONE)
}

// i / (1 - (1+i)^-n): the discount power shrinks toward zero instead of overflowing
fn discounted_price_coefficient(rate: Decimal, installments: u64) -> Option<Decimal> {
    let discount = Decimal::ONE.checked_div(Decimal::ONE.checked_add(rate)?)?;
    let remaining = checked_powi(discount, installments)?;
    let denominator = Decimal::ONE - remaining;
    if denominator <= Decimal::ZERO {
        return None;
    }
    rate.checked_div(denominator)
}

fn checked_powi(base: Decimal, mut exponent: u64) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    let mut square = base;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = result.checked_mul(square)?;
        }
        exponent >>= 1;
        if exponent > 0 {
            square = square.checked_mul(square)?;
        }
    }
    Some(result)
}

pub fn resolve_coefficient(input: &SimulationInput) -> Decimal {
    if let Some(manual) = input.coeficiente_manual.filter(|value| *value > Decimal::ZERO) {
        return manual;
    }
    if input.coeficiente > Decimal::ZERO {
        return input.coeficiente;
    }
    input
        .taxa_mensal
        .map(|rate| price_coefficient(rate / HUNDRED, input.prazo))
        .unwrap_or(Decimal::ZERO)
}

pub trait RefinancingSimulator: Send + Sync {
    fn simulate(&self, input: &SimulationInput) -> SimulationTotals;
}

/// Multi-bank pipeline that reproduces the reference spreadsheet.
#[derive(Clone, Debug)]
pub struct SpreadsheetSimulator {
    margin_token: String,
}

impl SpreadsheetSimulator {
    pub fn new(margin_token: impl AsRef<str>) -> Self {
        Self { margin_token: margin_token.as_ref().to_lowercase() }
    }

    pub fn is_margin_line(&self, bank: &str) -> bool {
        bank.to_lowercase().contains(&self.margin_token)
    }
}

impl Default for SpreadsheetSimulator {
    fn default() -> Self {
        Self::new(DEFAULT_MARGIN_TOKEN)
    }
}

impl RefinancingSimulator for SpreadsheetSimulator {
    fn simulate(&self, input: &SimulationInput) -> SimulationTotals {
        let coeficiente = resolve_coefficient(input);
        let degenerate = coeficiente <= Decimal::ZERO;

        let mut valor_parcela_total = Decimal::ZERO;
        let mut saldo_total = Decimal::ZERO;
        let mut liberado_total = Decimal::ZERO;
        let mut total_financiado = Decimal::ZERO;
        let mut valor_a_subtrair = Decimal::ZERO;
        let mut banks = Vec::with_capacity(input.banks.len());

        for line in &input.banks {
            // signed parcela, margin lines included
            valor_parcela_total += line.parcela;

            if self.is_margin_line(&line.bank) {
                let subtracted = divide_or_zero(line.parcela.abs(), coeficiente);
                valor_a_subtrair += subtracted;
                banks.push(BankBreakdown {
                    bank: line.bank.clone(),
                    is_margin: true,
                    financiado: round_currency(subtracted),
                    liberado: Decimal::ZERO,
                });
                continue;
            }

            let financiado = divide_or_zero(line.parcela, coeficiente);
            let liberado = if degenerate { Decimal::ZERO } else { financiado - line.saldo_devedor };
            total_financiado += financiado;
            saldo_total += line.saldo_devedor;
            liberado_total += liberado;
            banks.push(BankBreakdown {
                bank: line.bank.clone(),
                is_margin: false,
                financiado: round_currency(financiado),
                liberado: round_currency(liberado),
            });
        }

        let valor_liquido = liberado_total - input.seguro;
        let custo_consultoria = total_financiado * input.percentual_consultoria.fraction();
        let liberado_cliente = valor_liquido - custo_consultoria - valor_a_subtrair;

        tracing::debug!(
            event_name = "simulation.completed",
            bank_count = input.banks.len(),
            coeficiente = %coeficiente,
            degenerate,
            liberado_cliente = %round_currency(liberado_cliente),
            "refinancing simulation computed"
        );

        SimulationTotals {
            coeficiente,
            valor_parcela_total: round_currency(valor_parcela_total),
            saldo_total: round_currency(saldo_total),
            liberado_total: round_currency(liberado_total),
            total_financiado: round_currency(total_financiado),
            valor_liquido: round_currency(valor_liquido),
            custo_consultoria: round_currency(custo_consultoria),
            valor_a_subtrair: round_currency(valor_a_subtrair),
            liberado_cliente: round_currency(liberado_cliente),
            banks,
        }
    }
}

pub fn simulate(input: &SimulationInput) -> SimulationTotals {
    SpreadsheetSimulator::default().simulate(input)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleBankInput {
    pub parcela: Decimal,
    pub saldo_devedor: Decimal,
    pub coeficiente: Decimal,
    pub seguro: Decimal,
    pub percentual_consultoria: ConsultingFee,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleBankTotals {
    pub coeficiente: Decimal,
    pub valor_liberado: Decimal,
    pub valor_total_financiado: Decimal,
    pub valor_liquido: Decimal,
    pub custo_consultoria: Decimal,
    pub liberado_cliente: Decimal,
}

/// The older one-debt calculator. Financed value is rebuilt as balance plus released amount,
/// so a degenerate coefficient still finances the outstanding balance here.
pub fn simulate_single_bank(input: &SingleBankInput) -> SingleBankTotals {
    let valor_liberado = if input.coeficiente > Decimal::ZERO {
        divide_or_zero(input.parcela, input.coeficiente) - input.saldo_devedor
    } else {
        Decimal::ZERO
    };
    let valor_total_financiado = input.saldo_devedor + valor_liberado;
    let valor_liquido = valor_liberado - input.seguro;
    let custo_consultoria = valor_total_financiado * input.percentual_consultoria.fraction();
    let liberado_cliente = valor_liquido - custo_consultoria;

    SingleBankTotals {
        coeficiente: input.coeficiente,
        valor_liberado: round_currency(valor_liberado),
        valor_total_financiado: round_currency(valor_total_financiado),
        valor_liquido: round_currency(valor_liquido),
        custo_consultoria: round_currency(custo_consultoria),
        liberado_cliente: round_currency(liberado_cliente),
    }
}

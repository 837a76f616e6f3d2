pub mod engine;
pub mod input;
pub mod rounding;

pub use engine::{
    price_coefficient, resolve_coefficient, simulate, simulate_single_bank, BankBreakdown,
    BankLine, ConsultingFee, RefinancingSimulator, SimulationInput, SimulationTotals,
    SingleBankInput, SingleBankTotals, SpreadsheetSimulator, DEFAULT_MARGIN_TOKEN,
};
pub use input::{parse_decimal, FeeScale, RawBankLine, RawNumber, SimulationInputError, SimulationRequest};
pub use rounding::round_currency;

pub mod amortization;
pub mod error;
pub mod types;

#[cfg(feature = "tracking")]
pub mod tracking;

pub use amortization::{
    build_schedule, compute_installment, InstallmentPlan, LoanDefinition, PeriodRecord, YearRecord,
};
pub use error::EmiError;
pub use types::*;

/// Standard result type for all EMI planner operations
pub type EmiResult<T> = Result<T, EmiError>;

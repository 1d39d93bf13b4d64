//! Reducing-balance amortization (EMI) engine.
//!
//! Covers:
//! 1. **Installment** -- fixed monthly payment for a principal, annual rate and tenure.
//! 2. **Schedule** -- per-month principal / interest / remaining balance.
//! 3. **Yearly summary** -- the schedule grouped into 12-month buckets.
//!
//! Iteration runs in full `Decimal` precision. Rounding to whole currency
//! units only happens in the report types (`InstallmentReport`,
//! `PeriodRecord::rounded`, `YearRecord::rounded`).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::EmiError;
use crate::types::*;
use crate::EmiResult;

pub const MONTHS_PER_YEAR: u32 = 12;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Financial terms of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanDefinition {
    pub principal: Money,
    /// Annual rate in percent (8.5 = 8.5% p.a.). Zero means interest-free.
    pub annual_rate_percent: Percent,
    pub tenure_months: u32,
}

/// One month of the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRecord {
    /// 1-based installment number.
    pub index: u32,
    pub principal_component: Money,
    pub interest_component: Money,
    /// Balance after this installment, floored at zero.
    pub remaining_balance: Money,
}

/// Up to twelve consecutive periods aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: u32,
    pub year_label: String,
    /// Number of installments in this bucket (12 except possibly the last).
    pub months: u32,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub balance_at_year_end: Money,
}

/// Full-precision result of `build_schedule`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    pub definition: LoanDefinition,
    pub installment_amount: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    pub periods: Vec<PeriodRecord>,
    pub yearly_summary: Vec<YearRecord>,
}

/// Headline figures rounded to whole currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentReport {
    pub installment_amount: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    /// Unrounded installment, kept for reconciliation against `total_payment`.
    pub exact_installment_amount: Money,
}

/// Display-ready schedule: rounded headline, periods and yearly buckets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleReport {
    pub summary: InstallmentReport,
    pub periods: Vec<PeriodRecord>,
    pub yearly_summary: Vec<YearRecord>,
}

// ---------------------------------------------------------------------------
// LoanDefinition
// ---------------------------------------------------------------------------

impl LoanDefinition {
    /// Build a validated definition.
    pub fn new(principal: Money, annual_rate_percent: Percent, tenure_months: u32) -> EmiResult<Self> {
        let definition = LoanDefinition {
            principal,
            annual_rate_percent,
            tenure_months,
        };
        definition.validate()?;
        Ok(definition)
    }

    pub fn validate(&self) -> EmiResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(EmiError::invalid("principal", "Principal must be positive"));
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(EmiError::invalid(
                "annual_rate_percent",
                "Annual rate cannot be negative",
            ));
        }
        if self.tenure_months == 0 {
            return Err(EmiError::invalid(
                "tenure_months",
                "Tenure must be at least 1 month",
            ));
        }
        Ok(())
    }

    /// Monthly rate as a decimal fraction: annual% / 12 / 100.
    pub fn monthly_rate(&self) -> Rate {
        monthly_rate(self.annual_rate_percent)
    }

    pub fn is_interest_free(&self) -> bool {
        self.annual_rate_percent.is_zero()
    }
}

fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / dec!(12) / dec!(100)
}

/// Convert a tenure in (possibly fractional) years into whole months.
///
/// 2.5 years is 30 months; 1.04 years rounds to 12 months.
pub fn tenure_months_from_years(years: Decimal) -> EmiResult<u32> {
    if years <= Decimal::ZERO {
        return Err(EmiError::invalid("tenure_years", "Tenure must be positive"));
    }
    let months = round_to_unit(years * Decimal::from(MONTHS_PER_YEAR));
    let months = months.to_u32().ok_or_else(|| {
        EmiError::invalid("tenure_years", "Tenure is too long to express in months")
    })?;
    if months == 0 {
        return Err(EmiError::invalid(
            "tenure_years",
            "Tenure rounds to zero months",
        ));
    }
    Ok(months)
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Fixed monthly installment, unrounded.
///
/// `EMI = P * r * (1+r)^n / ((1+r)^n - 1)` with `r` the monthly rate, or
/// `P / n` when the loan is interest-free.
pub fn compute_installment(
    principal: Money,
    annual_rate_percent: Percent,
    tenure_months: u32,
) -> EmiResult<Money> {
    let definition = LoanDefinition::new(principal, annual_rate_percent, tenure_months)?;
    installment_for(&definition)
}

fn installment_for(definition: &LoanDefinition) -> EmiResult<Money> {
    let n = Decimal::from(definition.tenure_months);
    if definition.is_interest_free() {
        return Ok(definition.principal / n);
    }

    let r = definition.monthly_rate();
    let factor = (Decimal::ONE + r)
        .checked_powu(u64::from(definition.tenure_months))
        .ok_or_else(|| {
            EmiError::FinancialImpossibility(format!(
                "Compounding factor overflows for {}% over {} months",
                definition.annual_rate_percent, definition.tenure_months
            ))
        })?;
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Err(EmiError::FinancialImpossibility(
            "Monthly rate too small to compound; use a zero rate instead".into(),
        ));
    }

    definition
        .principal
        .checked_mul(r)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| {
            EmiError::FinancialImpossibility("Installment exceeds representable range".into())
        })
}

/// Build the month-by-month and year-by-year amortization schedule.
pub fn build_schedule(
    principal: Money,
    annual_rate_percent: Percent,
    tenure_months: u32,
) -> EmiResult<InstallmentPlan> {
    let definition = LoanDefinition::new(principal, annual_rate_percent, tenure_months)?;
    schedule_for(&definition)
}

/// Same as `build_schedule`, taking a definition.
pub fn schedule_for(definition: &LoanDefinition) -> EmiResult<InstallmentPlan> {
    definition.validate()?;

    let installment = installment_for(definition)?;
    let r = definition.monthly_rate();
    let n = definition.tenure_months;

    let mut periods = Vec::with_capacity(n as usize);
    let mut yearly_summary = Vec::with_capacity(n.div_ceil(MONTHS_PER_YEAR) as usize);

    let mut balance = definition.principal;
    let mut year_principal = Decimal::ZERO;
    let mut year_interest = Decimal::ZERO;
    let mut year_months = 0u32;

    for index in 1..=n {
        let (interest_component, principal_component) = if r.is_zero() {
            (Decimal::ZERO, installment)
        } else {
            let interest = balance * r;
            (interest, installment - interest)
        };
        balance -= principal_component;

        year_principal += principal_component;
        year_interest += interest_component;
        year_months += 1;

        periods.push(PeriodRecord {
            index,
            principal_component,
            interest_component,
            remaining_balance: balance.max(Decimal::ZERO),
        });

        if index % MONTHS_PER_YEAR == 0 || index == n {
            let year = index.div_ceil(MONTHS_PER_YEAR);
            yearly_summary.push(YearRecord {
                year,
                year_label: format!("Year {year}"),
                months: year_months,
                principal_paid: year_principal,
                interest_paid: year_interest,
                balance_at_year_end: balance.max(Decimal::ZERO),
            });
            year_principal = Decimal::ZERO;
            year_interest = Decimal::ZERO;
            year_months = 0;
        }
    }

    let total_payment = installment * Decimal::from(n);
    // Division drift on interest-free loans can leave a dust-sized negative.
    let total_interest = (total_payment - definition.principal).max(Decimal::ZERO);

    log::debug!(
        "built schedule: principal={} rate={}% months={} emi={}",
        definition.principal,
        definition.annual_rate_percent,
        n,
        installment
    );

    Ok(InstallmentPlan {
        definition: *definition,
        installment_amount: installment,
        total_payment,
        total_interest,
        periods,
        yearly_summary,
    })
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

impl InstallmentPlan {
    pub fn report(&self) -> InstallmentReport {
        InstallmentReport {
            installment_amount: round_to_unit(self.installment_amount),
            total_payment: round_to_unit(self.total_payment),
            total_interest: round_to_unit(self.total_interest),
            exact_installment_amount: self.installment_amount,
        }
    }

    /// Outstanding balance after `installments_paid` installments.
    ///
    /// Zero paid returns the principal; anything past the tenure returns zero.
    pub fn balance_after(&self, installments_paid: u32) -> Money {
        if installments_paid == 0 {
            return self.definition.principal;
        }
        self.periods
            .get(installments_paid as usize - 1)
            .map(|p| p.remaining_balance)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn principal_repaid(&self) -> Money {
        self.periods.iter().map(|p| p.principal_component).sum()
    }

    pub fn to_report(&self) -> ScheduleReport {
        ScheduleReport {
            summary: self.report(),
            periods: self.periods.iter().map(PeriodRecord::rounded).collect(),
            yearly_summary: self.yearly_summary.iter().map(YearRecord::rounded).collect(),
        }
    }
}

impl PeriodRecord {
    pub fn rounded(&self) -> PeriodRecord {
        PeriodRecord {
            index: self.index,
            principal_component: round_to_unit(self.principal_component),
            interest_component: round_to_unit(self.interest_component),
            remaining_balance: round_to_unit(self.remaining_balance),
        }
    }
}

impl YearRecord {
    pub fn rounded(&self) -> YearRecord {
        YearRecord {
            year: self.year,
            year_label: self.year_label.clone(),
            months: self.months,
            principal_paid: round_to_unit(self.principal_paid),
            interest_paid: round_to_unit(self.interest_paid),
            balance_at_year_end: round_to_unit(self.balance_at_year_end),
        }
    }
}

fn plan_warnings(plan: &InstallmentPlan) -> Vec<String> {
    let mut warnings = Vec::new();
    if plan.definition.is_interest_free() {
        warnings.push("Zero interest rate: installment is principal divided by tenure".into());
    }
    if plan.total_interest > plan.definition.principal {
        warnings.push(format!(
            "Total interest ({}) exceeds the principal",
            round_to_unit(plan.total_interest)
        ));
    }
    warnings
}

fn assumptions(definition: &LoanDefinition) -> serde_json::Value {
    serde_json::json!({
        "principal": definition.principal.to_string(),
        "annual_rate_percent": definition.annual_rate_percent.to_string(),
        "monthly_rate": definition.monthly_rate().to_string(),
        "tenure_months": definition.tenure_months,
    })
}

/// Rounded installment, total payment and total interest.
pub fn report_installment(
    definition: &LoanDefinition,
) -> EmiResult<ComputationOutput<InstallmentReport>> {
    let start = Instant::now();
    let plan = schedule_for(definition)?;
    let warnings = plan_warnings(&plan);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Reducing-balance EMI",
        &assumptions(definition),
        warnings,
        elapsed,
        plan.report(),
    ))
}

/// Rounded schedule with monthly periods and yearly buckets.
pub fn report_schedule(definition: &LoanDefinition) -> EmiResult<ComputationOutput<ScheduleReport>> {
    let start = Instant::now();
    let plan = schedule_for(definition)?;
    let warnings = plan_warnings(&plan);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Reducing-balance amortization schedule",
        &assumptions(definition),
        warnings,
        elapsed,
        plan.to_report(),
    ))
}

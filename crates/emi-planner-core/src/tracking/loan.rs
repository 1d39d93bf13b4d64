use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::amortization::{self, InstallmentPlan, LoanDefinition};
use crate::error::EmiError;
use crate::tracking::reminder::installment_due_date;
use crate::types::*;
use crate::EmiResult;

/// Loan category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanType {
    Personal,
    Home,
    Vehicle,
    Education,
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoanType::Personal => "Personal",
            LoanType::Home => "Home",
            LoanType::Vehicle => "Vehicle",
            LoanType::Education => "Education",
        };
        f.write_str(s)
    }
}

impl FromStr for LoanType {
    type Err = EmiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "personal" => Ok(LoanType::Personal),
            "home" => Ok(LoanType::Home),
            "vehicle" | "car" => Ok(LoanType::Vehicle),
            "education" => Ok(LoanType::Education),
            other => Err(EmiError::invalid(
                "loan_type",
                format!("Unknown loan type '{other}' (expected personal, home, vehicle or education)"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    #[default]
    Active,
    Closed,
}

/// Terms entered for a loan before it is saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLoan {
    pub name: String,
    pub loan_type: LoanType,
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub tenure_months: u32,
    pub start_date: NaiveDate,
}

/// A saved loan. Its financial terms and `emi` never change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub name: String,
    pub loan_type: LoanType,
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub tenure_months: u32,
    pub start_date: NaiveDate,
    /// Installment rounded to whole units, fixed at creation.
    pub emi: Money,
    #[serde(default)]
    pub status: LoanStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_date: Option<DateTime<Utc>>,
}

impl Loan {
    /// Validate the terms and freeze the installment.
    pub fn create(id: impl Into<String>, new_loan: NewLoan) -> EmiResult<Loan> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(EmiError::invalid("id", "Loan id cannot be empty"));
        }
        let name = new_loan.name.trim().to_string();
        if name.is_empty() {
            return Err(EmiError::invalid("name", "Loan name cannot be empty"));
        }

        let installment = amortization::compute_installment(
            new_loan.principal,
            new_loan.annual_rate_percent,
            new_loan.tenure_months,
        )?;

        Ok(Loan {
            id,
            name,
            loan_type: new_loan.loan_type,
            principal: new_loan.principal,
            annual_rate_percent: new_loan.annual_rate_percent,
            tenure_months: new_loan.tenure_months,
            start_date: new_loan.start_date,
            emi: round_to_unit(installment),
            status: LoanStatus::Active,
            closed_date: None,
        })
    }

    pub fn definition(&self) -> LoanDefinition {
        LoanDefinition {
            principal: self.principal,
            annual_rate_percent: self.annual_rate_percent,
            tenure_months: self.tenure_months,
        }
    }

    /// Recompute the full schedule from the saved terms.
    pub fn schedule(&self) -> EmiResult<InstallmentPlan> {
        amortization::schedule_for(&self.definition())
    }

    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    /// Due date of the last installment.
    pub fn maturity_date(&self) -> EmiResult<NaiveDate> {
        installment_due_date(self.start_date, self.tenure_months)
    }

    /// Total of all frozen installments.
    pub fn total_repayable(&self) -> Money {
        self.emi * Decimal::from(self.tenure_months)
    }

    pub fn close(&mut self, at: DateTime<Utc>) -> EmiResult<()> {
        if self.status == LoanStatus::Closed {
            return Err(EmiError::Conflict(format!("Loan '{}' is already closed", self.id)));
        }
        self.status = LoanStatus::Closed;
        self.closed_date = Some(at);
        Ok(())
    }

    pub fn restore(&mut self) -> EmiResult<()> {
        if self.status == LoanStatus::Active {
            return Err(EmiError::Conflict(format!("Loan '{}' is already active", self.id)));
        }
        self.status = LoanStatus::Active;
        self.closed_date = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn home_loan() -> NewLoan {
        NewLoan {
            name: "  HDFC Home Loan ".into(),
            loan_type: LoanType::Home,
            principal: dec!(1_000_000),
            annual_rate_percent: dec!(8.5),
            tenure_months: 240,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    #[test]
    fn test_create_freezes_rounded_emi() {
        let loan = Loan::create("L1", home_loan()).unwrap();
        assert_eq!(loan.emi, dec!(8678));
        assert_eq!(loan.name, "HDFC Home Loan");
        assert!(loan.is_active());
        assert_eq!(loan.closed_date, None);
    }

    #[test]
    fn test_create_rejects_bad_terms() {
        let mut input = home_loan();
        input.principal = Decimal::ZERO;
        assert!(Loan::create("L1", input).is_err());

        let mut input = home_loan();
        input.name = "   ".into();
        assert!(Loan::create("L1", input).is_err());

        assert!(Loan::create("", home_loan()).is_err());
    }

    #[test]
    fn test_close_and_restore() {
        let mut loan = Loan::create("L1", home_loan()).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();

        loan.close(at).unwrap();
        assert_eq!(loan.status, LoanStatus::Closed);
        assert_eq!(loan.closed_date, Some(at));
        assert!(loan.close(at).is_err());

        loan.restore().unwrap();
        assert!(loan.is_active());
        assert_eq!(loan.closed_date, None);
        assert!(loan.restore().is_err());
    }

    #[test]
    fn test_maturity_date() {
        let loan = Loan::create("L1", home_loan()).unwrap();
        assert_eq!(
            loan.maturity_date().unwrap(),
            NaiveDate::from_ymd_opt(2044, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_loan_type_parsing() {
        assert_eq!("Home".parse::<LoanType>().unwrap(), LoanType::Home);
        assert_eq!("car".parse::<LoanType>().unwrap(), LoanType::Vehicle);
        assert!("boat".parse::<LoanType>().is_err());
        assert_eq!(LoanType::Education.to_string(), "Education");
    }

    #[test]
    fn test_status_defaults_when_missing() {
        let json = serde_json::json!({
            "id": "L9",
            "name": "Old",
            "loan_type": "Personal",
            "principal": "50000",
            "annual_rate_percent": "11",
            "tenure_months": 12,
            "start_date": "2023-05-01",
            "emi": "4419"
        });
        let loan: Loan = serde_json::from_value(json).unwrap();
        assert_eq!(loan.status, LoanStatus::Active);
    }
}

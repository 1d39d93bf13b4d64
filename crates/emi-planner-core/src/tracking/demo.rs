use chrono::{Months, NaiveDate, NaiveTime};
use rust_decimal_macros::dec;

use crate::error::EmiError;
use crate::tracking::loan::{Loan, LoanType, NewLoan};
use crate::tracking::reminder::{generate_payment_reminders, Reminder};
use crate::tracking::store::LoanStore;
use crate::EmiResult;

/// Two sample loans with their payment history up to `today`.
///
/// Installments due before `today` are marked paid on their due date.
pub fn demo_loans(today: NaiveDate, id_suffix: &str) -> EmiResult<Vec<(Loan, Vec<Reminder>)>> {
    let home_start = months_before(today, 12)?;
    let car_start = months_before(today, 6)?;

    let home = Loan::create(
        format!("demo_home_{id_suffix}"),
        NewLoan {
            name: "Dream Home Loan".into(),
            loan_type: LoanType::Home,
            principal: dec!(5_000_000),
            annual_rate_percent: dec!(8.5),
            tenure_months: 240,
            start_date: home_start,
        },
    )?;
    let car = Loan::create(
        format!("demo_car_{id_suffix}"),
        NewLoan {
            name: "Tesla Model 3".into(),
            loan_type: LoanType::Vehicle,
            principal: dec!(3_500_000),
            annual_rate_percent: dec!(9.0),
            tenure_months: 60,
            start_date: car_start,
        },
    )?;

    [home, car]
        .into_iter()
        .map(|loan| -> EmiResult<(Loan, Vec<Reminder>)> {
            let mut reminders = generate_payment_reminders(&loan)?;
            for reminder in reminders.iter_mut().filter(|r| r.due_date < today) {
                let paid_at = reminder.due_date.and_time(NaiveTime::MIN).and_utc();
                reminder.mark_paid(paid_at);
            }
            Ok((loan, reminders))
        })
        .collect()
}

/// Import the demo loans into `store`, returning their ids.
pub fn seed_demo_data<S: LoanStore + ?Sized>(
    store: &mut S,
    today: NaiveDate,
    id_suffix: &str,
) -> EmiResult<Vec<String>> {
    let mut ids = Vec::new();
    for (loan, reminders) in demo_loans(today, id_suffix)? {
        ids.push(loan.id.clone());
        store.import_loan(loan, reminders)?;
    }
    Ok(ids)
}

fn months_before(today: NaiveDate, months: u32) -> EmiResult<NaiveDate> {
    today
        .checked_sub_months(Months::new(months))
        .ok_or_else(|| EmiError::DateError(format!("{months} months before {today} is out of range")))
}

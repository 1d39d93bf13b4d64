use emi_planner_core::amortization::{self, tenure_months_from_years, LoanDefinition};
use emi_planner_core::{build_schedule, compute_installment, EmiError};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{msg}: expected ~{expected}, got {actual} (tol {tol})"
    );
}

/// A spread of realistic loans: personal, car, home, interest-free.
fn scenarios() -> Vec<(Decimal, Decimal, u32)> {
    vec![
        (dec!(1_000_000), dec!(8.5), 240),
        (dec!(5_000_000), dec!(8.5), 240),
        (dec!(3_500_000), dec!(9), 60),
        (dec!(250_000), dec!(14.25), 36),
        (dec!(75_000), dec!(0), 7),
        (dec!(999_999), dec!(0.1), 360),
        (dec!(10_000), dec!(36), 13),
    ]
}

// ===========================================================================
// Installment
// ===========================================================================

#[test]
fn test_known_home_loan_installment() {
    let emi = compute_installment(dec!(1_000_000), dec!(8.5), 240).unwrap();
    assert_eq!(emi.round_dp(0), dec!(8678));
    assert_close(emi, dec!(8678.2323), dec!(0.001), "EMI vs closed form");
}

#[test]
fn test_zero_rate_installment_times_tenure_is_principal() {
    for (principal, months) in [(dec!(1000), 3u32), (dec!(75_000), 7), (dec!(1), 12)] {
        let emi = compute_installment(principal, Decimal::ZERO, months).unwrap();
        assert_close(
            emi * Decimal::from(months),
            principal,
            dec!(0.000000001),
            "zero-rate EMI * n",
        );
    }
}

#[test]
fn test_single_month_loan() {
    let principal = dec!(250_000);
    let rate = dec!(9.6);
    let r = rate / dec!(12) / dec!(100);

    let plan = build_schedule(principal, rate, 1).unwrap();
    assert_close(plan.installment_amount, principal * (Decimal::ONE + r), dec!(0.000001), "EMI");
    assert_close(plan.total_interest, principal * r, dec!(0.000001), "interest");
}

#[test]
fn test_installment_grows_with_rate_and_shrinks_with_tenure() {
    let low = compute_installment(dec!(500_000), dec!(7), 120).unwrap();
    let high = compute_installment(dec!(500_000), dec!(11), 120).unwrap();
    let longer = compute_installment(dec!(500_000), dec!(7), 180).unwrap();
    assert!(high > low);
    assert!(longer < low);
}

// ===========================================================================
// Schedule invariants
// ===========================================================================

#[test]
fn test_principal_components_sum_to_principal() {
    for (principal, rate, months) in scenarios() {
        let plan = build_schedule(principal, rate, months).unwrap();
        assert_eq!(plan.periods.len(), months as usize);
        assert_close(
            plan.principal_repaid(),
            principal,
            dec!(0.0001),
            &format!("conservation for {principal} @ {rate}% x {months}"),
        );
        let last = plan.periods.last().unwrap();
        assert_close(last.remaining_balance, Decimal::ZERO, dec!(0.0001), "final balance");
    }
}

#[test]
fn test_payment_identity_per_period() {
    let plan = build_schedule(dec!(250_000), dec!(14.25), 36).unwrap();
    for p in &plan.periods {
        assert_close(
            p.principal_component + p.interest_component,
            plan.installment_amount,
            dec!(0.0000001),
            "principal + interest = EMI",
        );
    }
}

#[test]
fn test_balance_strictly_decreasing_for_positive_rate() {
    for (principal, rate, months) in scenarios().into_iter().filter(|s| s.1 > Decimal::ZERO) {
        let plan = build_schedule(principal, rate, months).unwrap();
        let mut previous = principal;
        for p in &plan.periods[..plan.periods.len() - 1] {
            assert!(p.remaining_balance < previous, "balance rose at period {}", p.index);
            assert!(p.remaining_balance > Decimal::ZERO, "balance hit zero early at {}", p.index);
            previous = p.remaining_balance;
        }
    }
}

#[test]
fn test_interest_share_declines_over_time() {
    let plan = build_schedule(dec!(1_000_000), dec!(8.5), 240).unwrap();
    let first = &plan.periods[0];
    let last = plan.periods.last().unwrap();
    assert!(first.interest_component > first.principal_component);
    assert!(last.interest_component < last.principal_component);
}

#[test]
fn test_totals_use_unrounded_installment() {
    let plan = build_schedule(dec!(1_000_000), dec!(8.5), 240).unwrap();
    assert_eq!(plan.total_payment, plan.installment_amount * dec!(240));
    assert_eq!(plan.total_interest, plan.total_payment - dec!(1_000_000));
}

#[test]
fn test_schedule_is_deterministic() {
    for (principal, rate, months) in scenarios() {
        let a = build_schedule(principal, rate, months).unwrap();
        let b = build_schedule(principal, rate, months).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_schedule_for_matches_build_schedule() {
    let def = LoanDefinition::new(dec!(3_500_000), dec!(9), 60).unwrap();
    assert_eq!(
        amortization::schedule_for(&def).unwrap(),
        build_schedule(dec!(3_500_000), dec!(9), 60).unwrap()
    );
}

// ===========================================================================
// Yearly summary
// ===========================================================================

#[test]
fn test_thirty_months_gives_three_buckets() {
    let plan = build_schedule(dec!(400_000), dec!(10.5), 30).unwrap();
    let months: Vec<u32> = plan.yearly_summary.iter().map(|y| y.months).collect();
    assert_eq!(months, vec![12, 12, 6]);
    let labels: Vec<&str> = plan.yearly_summary.iter().map(|y| y.year_label.as_str()).collect();
    assert_eq!(labels, vec!["Year 1", "Year 2", "Year 3"]);
}

#[test]
fn test_twenty_four_months_gives_two_full_buckets() {
    let plan = build_schedule(dec!(400_000), dec!(10.5), 24).unwrap();
    let months: Vec<u32> = plan.yearly_summary.iter().map(|y| y.months).collect();
    assert_eq!(months, vec![12, 12]);
}

#[test]
fn test_yearly_totals_reconcile_with_periods() {
    let plan = build_schedule(dec!(5_000_000), dec!(8.5), 240).unwrap();
    assert_eq!(plan.yearly_summary.len(), 20);

    let yearly_interest: Decimal = plan.yearly_summary.iter().map(|y| y.interest_paid).sum();
    let period_interest: Decimal = plan.periods.iter().map(|p| p.interest_component).sum();
    assert_close(yearly_interest, period_interest, dec!(0.0000001), "interest");
    assert_close(yearly_interest, plan.total_interest, dec!(0.001), "interest vs totals");
}

#[test]
fn test_rounded_yearly_summary_is_whole_units() {
    let plan = build_schedule(dec!(1_000_000), dec!(8.5), 240).unwrap();
    let report = plan.to_report();
    for y in &report.yearly_summary {
        assert_eq!(y.principal_paid.fract(), Decimal::ZERO);
        assert_eq!(y.interest_paid.fract(), Decimal::ZERO);
        assert_eq!(y.balance_at_year_end.fract(), Decimal::ZERO);
    }
    // Full-precision plan is untouched
    assert_ne!(plan.yearly_summary[0].interest_paid.fract(), Decimal::ZERO);
}

// ===========================================================================
// Validation
// ===========================================================================

#[test]
fn test_invalid_parameters() {
    let cases = [
        (dec!(0), dec!(8), 12u32, "principal"),
        (dec!(-5), dec!(8), 12, "principal"),
        (dec!(1000), dec!(-0.5), 12, "annual_rate_percent"),
        (dec!(1000), dec!(8), 0, "tenure_months"),
    ];
    for (principal, rate, months, expected_field) in cases {
        match build_schedule(principal, rate, months) {
            Err(EmiError::InvalidInput { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected InvalidInput for {expected_field}, got {other:?}"),
        }
    }
}

#[test]
fn test_fractional_years_round_to_months() {
    assert_eq!(tenure_months_from_years(dec!(2.5)).unwrap(), 30);
    assert_eq!(tenure_months_from_years(dec!(0.5)).unwrap(), 6);
    assert_eq!(tenure_months_from_years(dec!(1.0417)).unwrap(), 13);
}

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%), e.g. the monthly rate.
pub type Rate = Decimal;

/// Rates as entered by a borrower (8.5 = 8.5% per annum).
pub type Percent = Decimal;

/// Round a monetary amount to the nearest whole unit for display.
///
/// Midpoints round away from zero, so 0.5 becomes 1.
pub fn round_to_unit(amount: Money) -> Money {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_to_unit_midpoint() {
        assert_eq!(round_to_unit(dec!(8678.5)), dec!(8679));
        assert_eq!(round_to_unit(dec!(8678.49)), dec!(8678));
        assert_eq!(round_to_unit(dec!(0.4999)), dec!(0));
    }

    #[test]
    fn test_with_metadata_envelope() {
        let out = with_metadata(
            "Test",
            &serde_json::json!({ "principal": "1000" }),
            vec!["note".into()],
            7,
            dec!(42),
        );
        assert_eq!(out.result, dec!(42));
        assert_eq!(out.methodology, "Test");
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.metadata.computation_time_us, 7);
        assert_eq!(out.assumptions["principal"], "1000");
    }
}

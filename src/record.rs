// 🏦 Bank Records - rows flowing through the pipeline

use serde::{Deserialize, Serialize};

/// Column names shared by the CSV sink and the database table
pub const NAME_COLUMN: &str = "Name";
pub const USD_COLUMN: &str = "MC_USD_Billion";
pub const GBP_COLUMN: &str = "MC_GBP_Billion";
pub const EUR_COLUMN: &str = "MC_EUR_Billion";
pub const INR_COLUMN: &str = "MC_INR_Billion";

/// Output column order (CSV header and table DDL)
pub const COLUMNS: [&str; 5] = [NAME_COLUMN, USD_COLUMN, GBP_COLUMN, EUR_COLUMN, INR_COLUMN];

/// One extracted table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRecord {
    #[serde(rename = "Name")]
    pub name: String,

    /// Rounded to 2 decimals, never negative
    #[serde(rename = "MC_USD_Billion")]
    pub market_cap_usd_billion: f64,
}

/// BankRecord plus the converted market caps
///
/// Field order here is the column order of both sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedBankRecord {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "MC_USD_Billion")]
    pub market_cap_usd_billion: f64,

    #[serde(rename = "MC_GBP_Billion")]
    pub market_cap_gbp_billion: f64,

    #[serde(rename = "MC_EUR_Billion")]
    pub market_cap_eur_billion: f64,

    #[serde(rename = "MC_INR_Billion")]
    pub market_cap_inr_billion: f64,
}

/// Ordered as the source table; "top N" queries rely on it
pub type Dataset = Vec<EnrichedBankRecord>;

/// Round to 2 decimal places
///
/// Rounds the exact binary value (2.675 is stored as 2.67499… so it becomes
/// 2.67); exact ties go to even. Same results as Python's `round(x, 2)`.
/// Used for the extracted USD value and every conversion.
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(432.9249), 432.92);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(-0.125), -0.12);
        assert_eq!(round2(93.00000000000001), 93.0);
        assert_eq!(round2(100.0), 100.0);
    }

    #[test]
    fn test_round2_decimal_ties_follow_binary_value() {
        // None of these is exactly representable; the stored value decides
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(1.015), 1.01);
        assert_eq!(round2(346.335), 346.33);
        assert_eq!(round2(0.8 * 432.91875), 346.34);
    }

    #[test]
    fn test_columns_follow_field_order() {
        assert_eq!(
            COLUMNS,
            ["Name", "MC_USD_Billion", "MC_GBP_Billion", "MC_EUR_Billion", "MC_INR_Billion"]
        );
    }
}

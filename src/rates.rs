// 💱 Exchange Rate Table
// USD-relative multipliers keyed by currency code, loaded once per run

use crate::error::{EtlError, EtlResult};
use crate::fetcher::{load_document, Fetcher};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Deserialize)]
struct RateRow {
    #[serde(rename = "Currency")]
    currency: String,

    #[serde(rename = "Rate")]
    rate: f64,
}

/// Read-only after construction
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExchangeRateTable {
    rates: BTreeMap<String, f64>,
}

impl ExchangeRateTable {
    /// Build from (code, rate) pairs; codes are trimmed and upper-cased
    pub fn from_pairs<I, S>(pairs: I) -> EtlResult<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut rates = BTreeMap::new();

        for (code, rate) in pairs {
            let code = code.as_ref().trim().to_uppercase();
            if code.is_empty() {
                return Err(EtlError::Config("exchange rate with empty currency code".to_string()));
            }
            if !rate.is_finite() || rate <= 0.0 {
                return Err(EtlError::Config(format!("invalid rate {} for {}", rate, code)));
            }
            if rates.insert(code.clone(), rate).is_some() {
                return Err(EtlError::Config(format!("duplicate rate for {}", code)));
            }
        }

        Ok(ExchangeRateTable { rates })
    }

    /// Parse a `Currency,Rate` CSV document
    ///
    /// Rows are keyed by their currency column, so row order does not matter.
    pub fn from_csv_str(content: &str) -> EtlResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut pairs = Vec::new();
        for (line_num, result) in reader.deserialize::<RateRow>().enumerate() {
            let row = result.map_err(|e| {
                EtlError::Config(format!("exchange rate line {}: {}", line_num + 2, e))
            })?;
            pairs.push((row.currency, row.rate));
        }

        Self::from_pairs(pairs)
    }

    /// Load from a URL or local file
    pub fn load(fetcher: &dyn Fetcher, location: &str) -> EtlResult<Self> {
        let content = load_document(fetcher, location)?;
        Self::from_csv_str(&content)
    }

    /// Rate for `code`, `Config` error if absent
    pub fn rate(&self, code: &str) -> EtlResult<f64> {
        self.rates
            .get(&code.to_uppercase())
            .copied()
            .ok_or_else(|| EtlError::Config(format!("missing exchange rate for {}", code)))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rates.iter().map(|(code, rate)| (code.as_str(), *rate))
    }
}

impl fmt::Display for ExchangeRateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Currency  Rate")?;
        for (code, rate) in self.iter() {
            writeln!(f, "{:<8}  {}", code, rate)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATES_CSV: &str = "Currency,Rate\nEUR,0.93\nGBP,0.8\nINR,82.95\n";

    #[test]
    fn test_from_csv_str() {
        let table = ExchangeRateTable::from_csv_str(RATES_CSV).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.rate("EUR").unwrap(), 0.93);
        assert_eq!(table.rate("GBP").unwrap(), 0.8);
        assert_eq!(table.rate("inr").unwrap(), 82.95);
    }

    #[test]
    fn test_row_order_does_not_matter() {
        let shuffled = "Currency,Rate\nINR,82.95\nGBP,0.8\nEUR,0.93\n";

        assert_eq!(
            ExchangeRateTable::from_csv_str(shuffled).unwrap(),
            ExchangeRateTable::from_csv_str(RATES_CSV).unwrap()
        );
    }

    #[test]
    fn test_missing_rate_is_config_error() {
        let table = ExchangeRateTable::from_csv_str("Currency,Rate\nEUR,0.93\n").unwrap();
        let err = table.rate("GBP").unwrap_err();

        assert!(matches!(err, EtlError::Config(_)));
        assert!(err.to_string().contains("GBP"));
    }

    #[test]
    fn test_bad_rows_rejected() {
        assert!(ExchangeRateTable::from_csv_str("Currency,Rate\nEUR,abc\n").is_err());
        assert!(ExchangeRateTable::from_csv_str("Currency,Rate\nEUR,-1\n").is_err());
        assert!(ExchangeRateTable::from_csv_str("Currency,Rate\nEUR,0.9\neur,0.91\n").is_err());
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let table = ExchangeRateTable::from_csv_str("Currency, Rate\n gbp , 0.8 \n").unwrap();
        assert_eq!(table.rate("GBP").unwrap(), 0.8);
    }

    #[test]
    fn test_display_lists_codes() {
        let table = ExchangeRateTable::from_csv_str(RATES_CSV).unwrap();
        let text = table.to_string();

        assert!(text.starts_with("Currency"));
        assert!(text.contains("GBP"));
        assert!(text.contains("82.95"));
    }
}

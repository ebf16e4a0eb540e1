// 🔁 Transformer - USD market caps → GBP / EUR / INR
// Pure function of (records, rates); same input always gives the same output

use crate::error::EtlResult;
use crate::rates::ExchangeRateTable;
use crate::record::{round2, BankRecord, Dataset, EnrichedBankRecord};

/// Rates resolved once by currency code at construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformer {
    gbp: f64,
    eur: f64,
    inr: f64,
}

impl Transformer {
    /// # Errors
    /// `Config` if GBP, EUR or INR is missing from `rates`
    pub fn new(rates: &ExchangeRateTable) -> EtlResult<Self> {
        Ok(Transformer {
            gbp: rates.rate("GBP")?,
            eur: rates.rate("EUR")?,
            inr: rates.rate("INR")?,
        })
    }

    pub fn enrich(&self, record: &BankRecord) -> EnrichedBankRecord {
        let usd = record.market_cap_usd_billion;

        EnrichedBankRecord {
            name: record.name.clone(),
            market_cap_usd_billion: usd,
            market_cap_gbp_billion: round2(self.gbp * usd),
            market_cap_eur_billion: round2(self.eur * usd),
            market_cap_inr_billion: round2(self.inr * usd),
        }
    }

    /// Row order is preserved
    pub fn transform(&self, records: &[BankRecord]) -> Dataset {
        records.iter().map(|record| self.enrich(record)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;

    fn rates() -> ExchangeRateTable {
        ExchangeRateTable::from_pairs([("EUR", 0.93), ("GBP", 0.8), ("INR", 82.95)]).unwrap()
    }

    fn record(name: &str, usd: f64) -> BankRecord {
        BankRecord {
            name: name.to_string(),
            market_cap_usd_billion: usd,
        }
    }

    #[test]
    fn test_transform_bank_a() {
        let transformer = Transformer::new(&rates()).unwrap();
        let dataset = transformer.transform(&[record("Bank A", 100.0)]);

        assert_eq!(
            dataset[0],
            EnrichedBankRecord {
                name: "Bank A".to_string(),
                market_cap_usd_billion: 100.0,
                market_cap_gbp_billion: 80.0,
                market_cap_eur_billion: 93.0,
                market_cap_inr_billion: 8295.0,
            }
        );
    }

    #[test]
    fn test_transform_rounds_half_away_from_zero() {
        let transformer = Transformer::new(&rates()).unwrap();
        let dataset = transformer.transform(&[record("JPMorgan Chase", 432.92)]);

        // 0.8 * 432.92 = 346.336, 0.93 * 432.92 = 402.6156, 82.95 * 432.92 = 35910.714
        assert_eq!(dataset[0].market_cap_gbp_billion, 346.34);
        assert_eq!(dataset[0].market_cap_eur_billion, 402.62);
        assert_eq!(dataset[0].market_cap_inr_billion, 35910.71);
    }

    #[test]
    fn test_transform_is_idempotent() {
        let transformer = Transformer::new(&rates()).unwrap();
        let records = vec![record("Bank A", 100.0), record("Bank B", 231.52), record("Bank C", 0.0)];

        let first = transformer.transform(&records);
        let second = transformer.transform(&records);

        assert_eq!(first, second);
        let names: Vec<&str> = first.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Bank A", "Bank B", "Bank C"]);
    }

    #[test]
    fn test_missing_currency_is_config_error() {
        let rates = ExchangeRateTable::from_pairs([("EUR", 0.93), ("GBP", 0.8)]).unwrap();
        let err = Transformer::new(&rates).unwrap_err();

        assert!(matches!(err, EtlError::Config(_)));
        assert!(err.to_string().contains("INR"));
    }
}

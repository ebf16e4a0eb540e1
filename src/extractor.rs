// 🔎 Extractor - HTML table → BankRecord rows
//
// Data rows are recognised by a heuristic: enough <td> cells AND a hyperlink
// somewhere in the name cell. Header rows (<th> only), repeated headers and
// footers fail one of the two checks and are skipped without error.
//
// The bank name is positional. The name cell on the source page looks like
//   <td><span class="flagicon">…</span> <a href="…">Bank</a></td>
// so the substantive node is the third child (index 2), after the decorative
// flag markup and a separator node. If the markup shifts and that node is
// missing or blank, the text of the last anchor in the cell is used instead.
// This is a fragility point of the source page, not a stable contract.

use crate::error::{EtlError, EtlResult};
use crate::record::{round2, BankRecord, NAME_COLUMN, USD_COLUMN};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Cell positions inside a data row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Zero-based <td> index of the linked name cell
    pub name_column: usize,

    /// Zero-based <td> index of the market-cap cell
    pub value_column: usize,

    /// Child node inside the name cell that carries the bank name
    pub name_node_index: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            name_column: 1,
            value_column: 2,
            name_node_index: 2,
        }
    }
}

impl ExtractorConfig {
    /// Rows with fewer <td> cells than this are not data rows
    pub fn min_cells(&self) -> usize {
        self.name_column.max(self.value_column) + 1
    }
}

// ============================================================================
// TABLE EXTRACTOR
// ============================================================================

pub struct TableExtractor {
    config: ExtractorConfig,
}

impl TableExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        TableExtractor { config }
    }

    /// Parse the first table body of `html` into records, in row order
    ///
    /// # Errors
    /// * `Schema` - `table_attribs` is not `[Name, MC_USD_Billion]`, or a data
    ///   row carries a blank name or a non-numeric / negative market cap
    /// * `Parse` - the document has no table body
    pub fn extract(&self, html: &str, table_attribs: &[String]) -> EtlResult<Vec<BankRecord>> {
        check_attribs(table_attribs)?;

        let document = Html::parse_document(html);
        let tbody_selector = selector("tbody")?;
        let anchor_selector = selector("a")?;

        let tbody = document
            .select(&tbody_selector)
            .next()
            .ok_or_else(|| EtlError::Parse("no table body found in document".to_string()))?;

        let mut records = Vec::new();
        let mut skipped = 0;

        let rows = tbody
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "tr");

        for (row_index, row) in rows.enumerate() {
            let cells: Vec<ElementRef> = row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|el| el.value().name() == "td")
                .collect();

            if cells.len() < self.config.min_cells() {
                skipped += 1;
                continue;
            }

            let name_cell = cells[self.config.name_column];
            if name_cell.select(&anchor_selector).next().is_none() {
                skipped += 1;
                continue;
            }

            let name = self.bank_name(name_cell, &anchor_selector);
            if name.is_empty() {
                return Err(EtlError::Schema(format!(
                    "row {}: linked name cell has no text",
                    row_index
                )));
            }

            let raw_value: String = cells[self.config.value_column].text().collect();
            let value = parse_market_cap(&raw_value).map_err(|reason| {
                EtlError::Schema(format!("row {} ({}): {}", row_index, name, reason))
            })?;

            records.push(BankRecord {
                name,
                market_cap_usd_billion: value,
            });
        }

        debug!(records = records.len(), skipped, "table extracted");
        Ok(records)
    }

    fn bank_name(&self, cell: ElementRef, anchor_selector: &Selector) -> String {
        let positional = cell
            .children()
            .nth(self.config.name_node_index)
            .map(|node| match ElementRef::wrap(node) {
                Some(element) => element.text().collect::<String>(),
                None => node
                    .value()
                    .as_text()
                    .map(|text| text.to_string())
                    .unwrap_or_default(),
            })
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        if !positional.is_empty() {
            return positional;
        }

        cell.select(anchor_selector)
            .last()
            .map(|anchor| anchor.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }
}

impl Default for TableExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn selector(css: &str) -> EtlResult<Selector> {
    Selector::parse(css).map_err(|e| EtlError::Parse(format!("bad selector '{}': {}", css, e)))
}

fn check_attribs(table_attribs: &[String]) -> EtlResult<()> {
    let expected = [NAME_COLUMN, USD_COLUMN];
    if table_attribs.len() != expected.len()
        || table_attribs.iter().zip(expected).any(|(got, want)| got != want)
    {
        return Err(EtlError::Schema(format!(
            "unsupported attribute schema {:?}, expected {:?}",
            table_attribs, expected
        )));
    }
    Ok(())
}

/// "1,234.567\n" → 1234.57
pub fn parse_market_cap(raw: &str) -> Result<f64, String> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();

    let value: f64 = cleaned
        .parse()
        .map_err(|_| format!("market cap '{}' is not a number", raw.trim()))?;

    if !value.is_finite() {
        return Err(format!("market cap '{}' is not finite", raw.trim()));
    }
    if value < 0.0 {
        return Err(format!("market cap '{}' is negative", raw.trim()));
    }

    Ok(round2(value))
}

// 🚚 ETL Pipeline - one straight-line batch run
//
// rates → extract → transform → CSV → table → verification queries
//
// Each stage runs only after the previous one succeeded, so the CSV is never
// written from a failed transform and the table never from a failed CSV write.
// A failing stage is recorded in the progress log before the error is returned.

use crate::config::EtlConfig;
use crate::error::{EtlError, EtlResult};
use crate::extractor::TableExtractor;
use crate::fetcher::{load_document, Fetcher, HttpFetcher};
use crate::loader::{open_database, run_query, verify_count, write_csv, write_table, QueryResult};
use crate::logging::{
    ProgressLog, MSG_COMPLETE, MSG_CSV_SAVED, MSG_DB_CONNECTED, MSG_DB_LOADED, MSG_EXTRACTED,
    MSG_PRELIMINARIES, MSG_TRANSFORMED,
};
use crate::rates::ExchangeRateTable;
use crate::record::Dataset;
use crate::transformer::Transformer;
use std::time::Duration;
use tracing::{info, warn};

// ============================================================================
// STAGES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preliminaries,
    Extract,
    Transform,
    LoadCsv,
    Connect,
    LoadTable,
    Query,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Preliminaries => "Preliminaries",
            Stage::Extract => "Data extraction",
            Stage::Transform => "Data transformation",
            Stage::LoadCsv => "CSV load",
            Stage::Connect => "SQL connection",
            Stage::LoadTable => "Database load",
            Stage::Query => "Verification query",
        }
    }
}

/// The three checks run after every load
///
/// The table name is quoted like in the DDL, so keyword names still work.
pub fn verification_queries(table_name: &str) -> Vec<String> {
    vec![
        format!("SELECT * FROM \"{}\"", table_name),
        format!("SELECT AVG(MC_GBP_Billion) FROM \"{}\"", table_name),
        format!("SELECT Name FROM \"{}\" LIMIT 5", table_name),
    ]
}

// ============================================================================
// RUN SUMMARY
// ============================================================================

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub dataset: Dataset,
    pub rows_in_table: i64,
    /// (query text, result) in execution order
    pub queries: Vec<(String, QueryResult)>,
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct EtlPipeline {
    config: EtlConfig,
    fetcher: Box<dyn Fetcher>,
    log: ProgressLog,
    run_queries: bool,
}

impl EtlPipeline {
    /// Pipeline with the HTTP fetcher, using the configured timeout
    pub fn new(config: EtlConfig) -> EtlResult<Self> {
        let fetcher = HttpFetcher::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self::with_fetcher(config, Box::new(fetcher)))
    }

    pub fn with_fetcher(config: EtlConfig, fetcher: Box<dyn Fetcher>) -> Self {
        let log = ProgressLog::new(config.log_path.clone());
        EtlPipeline {
            config,
            fetcher,
            log,
            run_queries: true,
        }
    }

    /// Skip the verification queries after loading
    pub fn without_queries(mut self) -> Self {
        self.run_queries = false;
        self
    }

    pub fn config(&self) -> &EtlConfig {
        &self.config
    }

    pub fn run(&self) -> EtlResult<RunSummary> {
        // Process-scoped setup: config check and the one rate table load
        let transformer = self.stage(Stage::Preliminaries, || {
            self.config.validate()?;
            let rates = ExchangeRateTable::load(self.fetcher.as_ref(), &self.config.rates_source)?;
            info!(currencies = rates.len(), "exchange rates loaded");
            Transformer::new(&rates)
        })?;
        self.milestone(MSG_PRELIMINARIES)?;

        let records = self.stage(Stage::Extract, || {
            let html = load_document(self.fetcher.as_ref(), &self.config.source_url)?;
            TableExtractor::new(self.config.extractor.clone())
                .extract(&html, &self.config.table_attribs)
        })?;
        info!(records = records.len(), "banks extracted");
        self.milestone(MSG_EXTRACTED)?;

        let dataset = transformer.transform(&records);
        self.milestone(MSG_TRANSFORMED)?;

        self.stage(Stage::LoadCsv, || write_csv(&dataset, &self.config.csv_path))?;
        self.milestone(MSG_CSV_SAVED)?;

        let conn = self.stage(Stage::Connect, || open_database(&self.config.db_path))?;
        self.milestone(MSG_DB_CONNECTED)?;

        let table = &self.config.table_name;
        self.stage(Stage::LoadTable, || write_table(&conn, table, &dataset))?;
        let rows_in_table = self.stage(Stage::LoadTable, || verify_count(&conn, table))?;
        if rows_in_table != dataset.len() as i64 {
            warn!(rows_in_table, expected = dataset.len(), "table row count differs from dataset");
        }
        self.milestone(MSG_DB_LOADED)?;

        let mut queries = Vec::new();
        if self.run_queries {
            for query in verification_queries(table) {
                let result = self.stage(Stage::Query, || run_query(&conn, &query))?;
                queries.push((query, result));
            }
        }

        self.milestone(MSG_COMPLETE)?;

        Ok(RunSummary {
            dataset,
            rows_in_table,
            queries,
        })
    }

    fn milestone(&self, message: &str) -> EtlResult<()> {
        self.log.log(message)
    }

    /// Run one stage, recording the failure point in the progress log
    fn stage<T>(&self, stage: Stage, f: impl FnOnce() -> EtlResult<T>) -> EtlResult<T> {
        f().map_err(|err| {
            self.record_failure(stage, &err);
            err
        })
    }

    fn record_failure(&self, stage: Stage, err: &EtlError) {
        let message = format!("{} failed: {}: {}", stage.name(), err.kind(), err);
        if let Err(log_err) = self.log.log(&message) {
            warn!(error = %log_err, "could not record failure in progress log");
        }
    }
}

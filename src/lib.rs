// Largest Banks ETL - Core Library
// Exposes the pipeline stages for the CLI and tests

pub mod error;
pub mod config;
pub mod record;
pub mod fetcher;
pub mod extractor;
pub mod rates;
pub mod transformer;
pub mod loader;
pub mod logging;
pub mod pipeline;

// Re-export commonly used types
pub use error::{EtlError, EtlResult};
pub use config::EtlConfig;
pub use record::{BankRecord, Dataset, EnrichedBankRecord, COLUMNS};
pub use fetcher::{Fetcher, HttpFetcher, load_document};
pub use extractor::{ExtractorConfig, TableExtractor};
pub use rates::ExchangeRateTable;
pub use transformer::Transformer;
pub use loader::{
    QueryResult,
    write_csv, read_csv, open_database, write_table, verify_count, run_query,
};
pub use logging::{ProgressLog, init_tracing};
pub use pipeline::{EtlPipeline, RunSummary, Stage, verification_queries};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

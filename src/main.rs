use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use bank_etl::{
    init_tracing, open_database, run_query, EtlConfig, EtlPipeline, ExchangeRateTable,
    HttpFetcher,
};

#[derive(Parser)]
#[command(name = "bank-etl", version, about = "Largest banks ETL: HTML table → CSV + SQLite")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline and print the verification queries (default)
    Run {
        #[command(flatten)]
        config: ConfigArgs,

        /// Load only, skip the verification queries
        #[arg(long)]
        skip_queries: bool,
    },

    /// Run one read-only query against the database
    Query {
        sql: String,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Load and print the exchange-rate table
    Rates {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

/// Overrides on top of the defaults / `--config` file
#[derive(Args, Default)]
struct ConfigArgs {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Page holding the bank table (URL or file)
    #[arg(long)]
    url: Option<String>,

    /// Exchange-rate CSV (URL or file)
    #[arg(long)]
    rates: Option<String>,

    #[arg(long)]
    csv: Option<PathBuf>,

    #[arg(long)]
    db: Option<PathBuf>,

    #[arg(long)]
    table: Option<String>,

    #[arg(long)]
    log_file: Option<PathBuf>,

    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl ConfigArgs {
    fn resolve(self) -> Result<EtlConfig> {
        let mut config = match &self.config {
            Some(path) => EtlConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => EtlConfig::default(),
        };

        if let Some(url) = self.url {
            config.source_url = url;
        }
        if let Some(rates) = self.rates {
            config.rates_source = rates;
        }
        if let Some(csv) = self.csv {
            config.csv_path = csv;
        }
        if let Some(db) = self.db {
            config.db_path = db;
        }
        if let Some(table) = self.table {
            config.table_name = table;
        }
        if let Some(log_file) = self.log_file {
            config.log_path = log_file;
        }
        if let Some(timeout) = self.timeout_secs {
            config.timeout_secs = timeout;
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Run { config, skip_queries }) => run_pipeline(config.resolve()?, skip_queries),
        Some(Command::Query { sql, config }) => run_adhoc_query(config.resolve()?, &sql),
        Some(Command::Rates { config }) => show_rates(config.resolve()?),
        None => run_pipeline(ConfigArgs::default().resolve()?, false),
    }
}

fn run_pipeline(config: EtlConfig, skip_queries: bool) -> Result<()> {
    println!("🏦 Largest Banks ETL");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Source: {}", config.source_url);

    let mut pipeline = EtlPipeline::new(config).context("Failed to set up pipeline")?;
    if skip_queries {
        pipeline = pipeline.without_queries();
    }

    let summary = pipeline.run().context("ETL run failed")?;
    let config = pipeline.config();

    println!("✓ Extracted and transformed {} banks", summary.dataset.len());
    println!("✓ CSV written to {}", config.csv_path.display());
    println!(
        "✓ Table {} in {} holds {} rows",
        config.table_name,
        config.db_path.display(),
        summary.rows_in_table
    );

    for (query, result) in &summary.queries {
        println!("\n{}", query);
        print!("{}", result);
    }

    println!("\n✅ Process complete (log: {})", config.log_path.display());
    Ok(())
}

fn run_adhoc_query(config: EtlConfig, sql: &str) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    if !config.db_path.exists() {
        eprintln!("❌ Database not found: {}", config.db_path.display());
        eprintln!("   Run: bank-etl run");
        eprintln!("   to load the table first.");
        std::process::exit(1);
    }

    let conn = open_database(&config.db_path)?;
    let result = run_query(&conn, sql)?;

    println!("{}", sql);
    print!("{}", result);
    Ok(())
}

fn show_rates(config: EtlConfig) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let fetcher = HttpFetcher::new(Duration::from_secs(config.timeout_secs))?;
    let rates = ExchangeRateTable::load(&fetcher, &config.rates_source)
        .with_context(|| format!("Failed to load rates from {}", config.rates_source))?;

    print!("{}", rates);
    Ok(())
}

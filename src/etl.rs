mod config_reader;
mod io_fetch;
mod io_sqlite;

use log::{debug, error, info};

use legislatives::*;
use snafu::{prelude::*, Snafu};

use std::fs;

use serde_json::json;
use serde_json::Value as JSValue;

use crate::args::Args;
use crate::etl::config_reader::*;
use crate::etl::io_fetch::WorkbookSource;
use crate::etl::io_sqlite::SqliteStore;

pub const CIRCO_TABLE: &str = "CircoTable";
pub const CIRCO_DATA: &str = "CircoData";
pub const CIRCO_CANDIDATE_DATA: &str = "CircoCandidateData";

#[derive(Debug, Snafu)]
pub enum EtlError {
    #[snafu(display("Error opening file {path}: {source}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the configuration: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error building the HTTP client: {source}"))]
    HttpClient { source: reqwest::Error },
    #[snafu(display("Error downloading {url}: {source}"))]
    Download { source: reqwest::Error, url: String },
    #[snafu(display("Error reading workbook {path}: {source}"))]
    ReadingWorkbook {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening the {year} workbook: {source}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        year: u16,
    },
    #[snafu(display("The {year} workbook has no worksheet"))]
    EmptyExcel { year: u16 },
    #[snafu(display("Error opening database {path}: {source}"))]
    OpeningDatabase {
        source: rusqlite::Error,
        path: String,
    },
    #[snafu(display("Error creating table {table} with {sql}: {source}"))]
    CreatingTable {
        source: rusqlite::Error,
        table: String,
        sql: String,
    },
    #[snafu(display("Error querying table {table}: {source}"))]
    QueryingTable {
        source: rusqlite::Error,
        table: String,
    },
    #[snafu(display("Table {table} was not found after its creation"))]
    MissingTable { table: String },
    #[snafu(display("Error inserting batch {batch} into table {table}: {source}"))]
    InsertingBatch {
        source: rusqlite::Error,
        table: String,
        batch: usize,
    },
    #[snafu(display("Error assembling the tables: {source}"))]
    Assembly { source: LegisError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type EtlResult<T> = Result<T, EtlError>;

#[derive(Debug)]
pub struct RunOutcome {
    pub summary: DatasetSummary,
    /// The tables that could not be written. Empty on success.
    pub failed_tables: Vec<String>,
}

fn summary_to_json(summary: &DatasetSummary) -> JSValue {
    json!({
        CIRCO_TABLE: summary.districts,
        CIRCO_DATA: summary.district_results,
        CIRCO_CANDIDATE_DATA: summary.candidate_results,
    })
}

/// Runs the whole pipeline: reads the settings, fetches and assembles the
/// results, then writes the three tables.
///
/// Failures before the writing stage are returned as errors. A table that
/// cannot be written is logged and reported in the outcome; the remaining
/// tables are still attempted.
pub fn run_pipeline(args: &Args) -> EtlResult<RunOutcome> {
    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => PipelineConfig::default(),
    };
    debug!("run_pipeline: config: {:?}", config);
    let settings = Settings::resolve(&config, args)?;
    info!("run_pipeline: settings: {:?}", settings);

    let mut source = WorkbookSource::new(&settings)?;
    let dataset = assemble(&mut source, &settings.assembly_options()).context(AssemblySnafu {})?;
    let summary = dataset.summary();

    if args.dry_run {
        let pretty_js = serde_json::to_string_pretty(&summary_to_json(&summary))
            .whatever_context::<_, EtlError>("Error formatting the summary")?;
        println!("{}", pretty_js);
        return Ok(RunOutcome {
            summary,
            failed_tables: Vec::new(),
        });
    }

    let mut store = SqliteStore::open(&settings.database_path, settings.batch_size)?;
    let failed_tables = persist_dataset(&mut store, &dataset, settings.replace_tables);
    Ok(RunOutcome {
        summary,
        failed_tables,
    })
}

fn persist_table<R: Record>(
    store: &mut SqliteStore,
    table: &str,
    rows: &[R],
    replace: bool,
    failed: &mut Vec<String>,
) {
    match store.create_and_populate(table, rows, replace) {
        Ok(count) => info!("persist_table: {}: {} rows", table, count),
        Err(e) => {
            error!("An error occurred while loading table {}: {}", table, e);
            failed.push(table.to_string());
        }
    }
}

/// Writes the tables in order. Returns the names of the tables that failed.
pub fn persist_dataset(store: &mut SqliteStore, dataset: &Dataset, replace: bool) -> Vec<String> {
    let mut failed: Vec<String> = Vec::new();
    persist_table(store, CIRCO_TABLE, &dataset.districts, replace, &mut failed);
    persist_table(
        store,
        CIRCO_DATA,
        &dataset.district_results,
        replace,
        &mut failed,
    );
    persist_table(
        store,
        CIRCO_CANDIDATE_DATA,
        &dataset.candidate_results,
        replace,
        &mut failed,
    );
    failed
}

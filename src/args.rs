use clap::Parser;

/// Loads the results of the 2022 and 2024 French legislative elections into a database.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file with the pipeline settings. See the manual of the
    /// `legislatives` crate for the format. The other flags override its content.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The SQLite database to write the tables to. It is created if it does
    /// not exist. Defaults to legislatives.sqlite.
    #[clap(short, long, value_parser)]
    pub database: Option<String>,

    /// (file path, optional) A local copy of the 2024 results workbook (.xlsx). If not
    /// provided, the workbook is downloaded.
    #[clap(long = "input-2024", value_parser)]
    pub input_2024: Option<String>,

    /// (file path, optional) A local copy of the 2022 results workbook (.xlsx). If not
    /// provided, the workbook is downloaded.
    #[clap(long = "input-2022", value_parser)]
    pub input_2022: Option<String>,

    /// (number, default 1000) The number of rows inserted per transaction.
    #[clap(long, value_parser)]
    pub batch_size: Option<usize>,

    /// If passed as an argument, the tables are assembled but not written. A summary of the
    /// number of rows of each table is printed in JSON format instead.
    #[clap(long, takes_value = false)]
    pub dry_run: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}

// Fetching the result workbooks and turning their first worksheet into sheets.

use std::error::Error;
use std::io::Cursor;

use calamine::{DataType, Range, Reader, Xlsx};
use reqwest::blocking::Client;

use crate::etl::*;

/// Reads the workbooks from a local copy when one is configured, and
/// downloads them otherwise.
pub struct WorkbookSource {
    client: Client,
    settings: Settings,
}

impl WorkbookSource {
    pub fn new(settings: &Settings) -> EtlResult<WorkbookSource> {
        let client = Client::builder()
            .timeout(settings.fetch_timeout)
            .user_agent(concat!("legiscrape/", env!("CARGO_PKG_VERSION")))
            .build()
            .context(HttpClientSnafu {})?;
        Ok(WorkbookSource {
            client,
            settings: settings.clone(),
        })
    }

    fn workbook_bytes(&self, year: ElectionYear) -> EtlResult<Vec<u8>> {
        let (url, path) = match year {
            ElectionYear::Y2024 => (&self.settings.url_2024, &self.settings.path_2024),
            ElectionYear::Y2022 => (&self.settings.url_2022, &self.settings.path_2022),
        };
        match path {
            Some(p) => {
                info!("Reading the {} results from {}", year, p);
                fs::read(p).context(ReadingWorkbookSnafu { path: p })
            }
            None => {
                info!("Downloading the {} results from {}", year, url);
                download(&self.client, url)
            }
        }
    }

    fn read_sheet(&self, year: ElectionYear) -> EtlResult<Sheet> {
        let bytes = self.workbook_bytes(year)?;
        info!("Fetched the {} results: {} bytes", year, bytes.len());
        let sheet = read_workbook(bytes, year)?;
        info!(
            "The {} sheet has {} rows and {} columns",
            year,
            sheet.rows.len(),
            sheet.columns.len()
        );
        Ok(sheet)
    }
}

impl SheetSource for WorkbookSource {
    fn fetch_sheet(&mut self, year: ElectionYear) -> Result<Sheet, Box<dyn Error>> {
        Ok(self.read_sheet(year)?)
    }
}

fn download(client: &Client, url: &str) -> EtlResult<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .context(DownloadSnafu { url })?;
    let bytes = response.bytes().context(DownloadSnafu { url })?;
    Ok(bytes.to_vec())
}

/// Reads the first worksheet of an xlsx workbook held in memory.
pub fn read_workbook(bytes: Vec<u8>, year: ElectionYear) -> EtlResult<Sheet> {
    let year = year.year();
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).context(OpeningExcelSnafu { year })?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu { year })?
        .context(OpeningExcelSnafu { year })?;
    Ok(range_to_sheet(&wrange))
}

/// The first row of the range is the header. Columns without a header are
/// named after their position.
pub fn range_to_sheet(wrange: &Range<DataType>) -> Sheet {
    let mut rows = wrange.rows();
    let header = match rows.next() {
        Some(header) => header,
        None => return Sheet::new(Vec::new(), Vec::new()),
    };
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| match convert_cell(cell) {
            Cell::Empty => format!("Unnamed: {}", idx),
            c => c.to_text(),
        })
        .collect();
    let data: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();
    Sheet::new(columns, data)
}

fn convert_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Int(i) => Cell::Int(*i),
        DataType::Float(f) => Cell::Float(*f),
        DataType::String(s) if s.is_empty() => Cell::Empty,
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Bool(b) => Cell::Bool(*b),
        DataType::DateTime(f) => Cell::Float(*f),
        // Empty cells and spreadsheet errors (#N/A, ...)
        _ => Cell::Empty,
    }
}

mod config;
pub mod loaders;
pub mod manual;
mod records;
pub mod sheet;
pub mod text;

use log::{debug, info};

use std::collections::HashSet;

pub use crate::config::*;
pub use crate::records::*;
use crate::loaders::*;
use crate::sheet::{LongColumn, LongTable};
use crate::text::normalize_gender;

/// Builds the three tables from the 2024 and 2022 result sheets.
///
/// The 2024 sheet is read first: it defines the districts and their codes.
/// The 2022 sheet is then aligned on these districts; 2022 districts that
/// cannot be matched by label are left out. District and candidate rows of
/// both years are concatenated, 2022 first.
///
/// Arguments:
/// * `source` provides the raw sheets
/// * `options` controls how candidate rows are tagged with their year
pub fn assemble<S: SheetSource + ?Sized>(
    source: &mut S,
    options: &AssemblyOptions,
) -> LegisResult<Dataset> {
    let long_2024 = load_2024(source)?;

    let districts = extract_districts(&long_2024)?;
    info!("assemble: {} districts in the 2024 results", districts.len());
    let results_2024 = extract_district_results(&long_2024, ElectionYear::Y2024)?;
    let candidates_2024 =
        extract_candidate_results(&long_2024, options.candidate_year(ElectionYear::Y2024))?;

    let labels: Vec<DistrictLabel> = districts.iter().map(DistrictLabel::from).collect();
    let long_2022 = load_2022(source, &labels)?;
    let results_2022 = extract_district_results(&long_2022, ElectionYear::Y2022)?;
    let candidates_2022 =
        extract_candidate_results(&long_2022, options.candidate_year(ElectionYear::Y2022))?;

    let mut district_results = results_2022;
    district_results.extend(results_2024);
    let mut candidate_results = candidates_2022;
    candidate_results.extend(candidates_2024);

    let dataset = Dataset {
        districts,
        district_results,
        candidate_results,
    };
    info!("assemble: {:?}", dataset.summary());
    Ok(dataset)
}

// Column positions inside a long table, resolved once per table.
struct Columns<const N: usize>([LongColumn; N]);

impl<const N: usize> Columns<N> {
    fn resolve(long: &LongTable, names: [&str; N]) -> LegisResult<Columns<N>> {
        let mut res = [LongColumn::Slot; N];
        for (idx, name) in names.iter().enumerate() {
            res[idx] = long.column(name)?;
        }
        Ok(Columns(res))
    }
}

fn extract_districts(long: &LongTable) -> LegisResult<Vec<District>> {
    let Columns([dep_code, dep_label, code, label]) = Columns::resolve(
        long,
        [DEPARTMENT_CODE, DEPARTMENT_LABEL, DISTRICT_CODE, DISTRICT_LABEL],
    )?;
    let mut seen: HashSet<District> = HashSet::new();
    let mut res: Vec<District> = Vec::new();
    for row in long.rows.iter() {
        let d = District {
            department_code: row.cell(dep_code).to_text(),
            department_label: row.cell(dep_label).to_text(),
            district_code: row.cell(code).to_text(),
            district_label: row.cell(label).to_text(),
        };
        if seen.insert(d.clone()) {
            res.push(d);
        }
    }
    Ok(res)
}

/// One row per district code; the aggregate columns repeat on every
/// candidate row of a district.
fn extract_district_results(
    long: &LongTable,
    year: ElectionYear,
) -> LegisResult<Vec<DistrictResult>> {
    const NAMES: [&str; 15] = [
        DISTRICT_CODE,
        "Inscrits",
        "Votants",
        "% Votants",
        "Abstentions",
        "% Abstentions",
        "Exprimés",
        "% Exprimés/inscrits",
        "% Exprimés/votants",
        "Blancs",
        "% Blancs/inscrits",
        "% Blancs/votants",
        "Nuls",
        "% Nuls/inscrits",
        "% Nuls/votants",
    ];
    let Columns(cols) = Columns::resolve(long, NAMES)?;
    let count = |row: &sheet::LongRow, idx: usize| row.cell(cols[idx]).to_count(NAMES[idx]);
    let ratio = |row: &sheet::LongRow, idx: usize| row.cell(cols[idx]).to_ratio(NAMES[idx]);

    let mut seen: HashSet<String> = HashSet::new();
    let mut res: Vec<DistrictResult> = Vec::new();
    for row in long.rows.iter() {
        let district_code = row.cell(cols[0]).to_text();
        if seen.contains(&district_code) {
            continue;
        }
        res.push(DistrictResult {
            district_code: district_code.clone(),
            registered: count(row, 1)?,
            voters: count(row, 2)?,
            voters_pct: ratio(row, 3)?,
            abstentions: count(row, 4)?,
            abstentions_pct: ratio(row, 5)?,
            expressed: count(row, 6)?,
            expressed_registered_pct: ratio(row, 7)?,
            expressed_voters_pct: ratio(row, 8)?,
            blank: count(row, 9)?,
            blank_registered_pct: ratio(row, 10)?,
            blank_voters_pct: ratio(row, 11)?,
            null: count(row, 12)?,
            null_registered_pct: ratio(row, 13)?,
            null_voters_pct: ratio(row, 14)?,
            year: year.year(),
        });
        seen.insert(district_code);
    }
    debug!(
        "extract_district_results: {}: {} districts",
        year,
        res.len()
    );
    Ok(res)
}

fn extract_candidate_results(
    long: &LongTable,
    year: ElectionYear,
) -> LegisResult<Vec<CandidateResult>> {
    const NAMES: [&str; 11] = [
        DISTRICT_CODE,
        SLOT_COLUMN,
        "Numéro de panneau",
        "Nuance candidat",
        "Nom candidat",
        "Prénom candidat",
        "Sexe candidat",
        "Voix",
        "% Voix/inscrits",
        "% Voix/exprimés",
        ELECTED,
    ];
    let Columns(cols) = Columns::resolve(long, NAMES)?;

    let mut res: Vec<CandidateResult> = Vec::with_capacity(long.rows.len());
    for row in long.rows.iter() {
        let cell = |idx: usize| row.cell(cols[idx]);
        res.push(CandidateResult {
            district_code: cell(0).to_text(),
            slot: row.slot,
            panel: cell(2).to_count(NAMES[2])?,
            nuance: cell(3).to_text(),
            surname: cell(4).to_text(),
            given_name: cell(5).to_text(),
            gender: normalize_gender(&cell(6).to_text()),
            votes: cell(7).to_count(NAMES[7])?,
            votes_registered_pct: cell(8).to_ratio(NAMES[8])?,
            votes_expressed_pct: cell(9).to_ratio(NAMES[9])?,
            elected: text::parse_elected(&cell(10)),
            year: year.year(),
        });
    }
    Ok(res)
}

//! Readers for the two yearly exports.
//!
//! Both produce a `LongTable` with the same key, slot and stub columns, so
//! that the assembler does not need to know which year it is looking at.

use log::{debug, info};

use std::collections::{HashMap, HashSet};

use crate::config::*;
use crate::records::DistrictLabel;
use crate::sheet::{cell_at, wide_to_long, LongTable};
use crate::text::normalize_district_label;

pub const DEPARTMENT_CODE: &str = "Code département";
pub const DEPARTMENT_LABEL: &str = "Libellé département";
pub const DISTRICT_CODE: &str = "Code circonscription législative";
pub const DISTRICT_LABEL: &str = "Libellé circonscription législative";
pub const SLOT_COLUMN: &str = "Candidate Number";
pub const ELECTED: &str = "Elu";

/// The columns shared by every candidate slot of a district row.
pub const FIXED_COLUMNS: [&str; 18] = [
    DEPARTMENT_CODE,
    DEPARTMENT_LABEL,
    DISTRICT_CODE,
    DISTRICT_LABEL,
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

/// The attributes repeated for each candidate slot.
pub const CANDIDATE_ATTRIBUTES: [&str; 9] = [
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

/// Order of the attributes inside one slot of the 2022 export.
pub const SLOT_LAYOUT_2022: [&str; 9] = [
    "Numéro de panneau",
    "Sexe candidat",
    "Nom candidat",
    "Prénom candidat",
    "Nuance candidat",
    "Voix",
    "% Voix/inscrits",
    "% Voix/exprimés",
    ELECTED,
];

/// Number of candidate slots of the 2022 export.
pub const MAX_SLOTS_2022: usize = 22;

const DEPARTMENT_LABEL_2022: &str = "Libellé du département";
const DISTRICT_LABEL_2022: &str = "Libellé de la circonscription";
const DROPPED_2022: [&str; 2] = ["Etat saisie", "Code de la circonscription"];
// The 2022 export ends one column short of a full last slot.
const PLACEHOLDER_2022: &str = "Unnamed: 216";

const RENAMES_2022: [(&str, &str); 20] = [
    ("Code du département", DEPARTMENT_CODE),
    (DEPARTMENT_LABEL_2022, DEPARTMENT_LABEL),
    (DISTRICT_LABEL_2022, DISTRICT_LABEL),
    ("% Vot/Ins", "% Votants"),
    ("% Abs/Ins", "% Abstentions"),
    ("% Exp/Ins", "% Exprimés/inscrits"),
    ("% Exp/Vot", "% Exprimés/votants"),
    ("% Blancs/Ins", "% Blancs/inscrits"),
    ("% Blancs/Vot", "% Blancs/votants"),
    ("% Nuls/Ins", "% Nuls/inscrits"),
    ("% Nuls/Vot", "% Nuls/votants"),
    ("Candidate", SLOT_COLUMN),
    ("N°Panneau", "Numéro de panneau"),
    ("Nuance", "Nuance candidat"),
    ("Nom", "Nom candidat"),
    ("Prénom", "Prénom candidat"),
    ("Sexe", "Sexe candidat"),
    ("% Voix/Ins", "% Voix/inscrits"),
    ("% Voix/Exp", "% Voix/exprimés"),
    ("Sièges", ELECTED),
];

fn fetch<S: SheetSource + ?Sized>(source: &mut S, year: ElectionYear) -> LegisResult<Sheet> {
    let sheet = source
        .fetch_sheet(year)
        .map_err(|e| LegisError::Fetch {
            year,
            message: e.to_string(),
        })?;
    info!(
        "fetch: {} results: {} rows, {} columns",
        year,
        sheet.rows.len(),
        sheet.width()
    );
    Ok(sheet)
}

/// Fetches and reshapes the 2024 results.
pub fn load_2024<S: SheetSource + ?Sized>(source: &mut S) -> LegisResult<LongTable> {
    let sheet = fetch(source, ElectionYear::Y2024)?;
    reshape_2024(sheet)
}

pub fn reshape_2024(mut sheet: Sheet) -> LegisResult<LongTable> {
    sheet.map_text_column(DISTRICT_LABEL, normalize_district_label)?;
    let long = wide_to_long(&sheet, &FIXED_COLUMNS, &CANDIDATE_ATTRIBUTES, " ", SLOT_COLUMN)?;
    finish(long, ElectionYear::Y2024)
}

/// Fetches and reshapes the 2022 results, keeping only the districts that
/// also appear in the given 2024 district list.
pub fn load_2022<S: SheetSource + ?Sized>(
    source: &mut S,
    districts: &[DistrictLabel],
) -> LegisResult<LongTable> {
    let sheet = fetch(source, ElectionYear::Y2022)?;
    reshape_2022(sheet, districts)
}

pub fn reshape_2022(mut sheet: Sheet, districts: &[DistrictLabel]) -> LegisResult<LongTable> {
    sheet.drop_columns(&DROPPED_2022)?;
    sheet.map_text_column(DISTRICT_LABEL_2022, normalize_district_label)?;

    let mut joined = join_districts(&sheet, districts)?;
    joined.rename_columns(&RENAMES_2022);
    joined.push_empty_column(PLACEHOLDER_2022);
    relabel_slots_2022(&mut joined)?;

    let long = wide_to_long(&joined, &FIXED_COLUMNS, &CANDIDATE_ATTRIBUTES, " ", SLOT_COLUMN)?;
    finish(long, ElectionYear::Y2022)
}

/// Inner join of the 2022 rows with the 2024 districts on the pair
/// (department label, district label).
///
/// The output starts with the three district columns of the 2024 list,
/// followed by the 2022 columns except the two join labels. Rows follow the
/// order of the district list.
fn join_districts(sheet: &Sheet, districts: &[DistrictLabel]) -> LegisResult<Sheet> {
    let dep_idx = sheet.require_column(DEPARTMENT_LABEL_2022)?;
    let label_idx = sheet.require_column(DISTRICT_LABEL_2022)?;

    let mut by_label: HashMap<(String, String), Vec<usize>> = HashMap::new();
    for (row_idx, row) in sheet.rows.iter().enumerate() {
        let (dep, label) = (cell_at(row, dep_idx), cell_at(row, label_idx));
        if dep.is_empty() || label.is_empty() {
            continue;
        }
        by_label
            .entry((dep.to_text(), label.to_text()))
            .or_default()
            .push(row_idx);
    }

    let kept_idxs: Vec<usize> = (0..sheet.width())
        .filter(|idx| *idx != dep_idx && *idx != label_idx)
        .collect();
    let mut columns: Vec<String> = vec![
        DEPARTMENT_LABEL.to_string(),
        DISTRICT_CODE.to_string(),
        DISTRICT_LABEL.to_string(),
    ];
    columns.extend(kept_idxs.iter().map(|idx| sheet.columns[*idx].clone()));

    let mut matched = vec![false; sheet.rows.len()];
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for d in districts {
        let key = (d.department_label.clone(), d.district_label.clone());
        for row_idx in by_label.get(&key).into_iter().flatten() {
            matched[*row_idx] = true;
            let source = &sheet.rows[*row_idx];
            let mut row = vec![
                Cell::Text(d.department_label.clone()),
                Cell::Text(d.district_code.clone()),
                Cell::Text(d.district_label.clone()),
            ];
            row.extend(kept_idxs.iter().map(|idx| cell_at(source, *idx)));
            rows.push(row);
        }
    }

    let dropped = matched.iter().filter(|m| !**m).count();
    info!(
        "join_districts: {} rows aligned on the 2024 districts, {} rows without a match dropped",
        rows.len(),
        dropped
    );
    Ok(Sheet { columns, rows })
}

/// The 2022 export does not number its candidate groups: the columns after
/// the fixed ones are renamed by position, slot after slot.
fn relabel_slots_2022(sheet: &mut Sheet) -> LegisResult<()> {
    let fixed = FIXED_COLUMNS.len();
    let expected = fixed + MAX_SLOTS_2022 * SLOT_LAYOUT_2022.len();
    if sheet.width() != expected {
        return Err(LegisError::LayoutMismatch {
            expected,
            found: sheet.width(),
        });
    }
    // The fixed columns must all be there, each one once.
    let mut seen: HashSet<&str> = HashSet::new();
    for (position, name) in sheet.columns[..fixed].iter().enumerate() {
        if !FIXED_COLUMNS.contains(&name.as_str()) || !seen.insert(name.as_str()) {
            return Err(LegisError::UnexpectedFixedColumn {
                position,
                column: name.clone(),
            });
        }
    }
    let mut columns: Vec<String> = sheet.columns[..fixed].to_vec();
    for slot in 1..=MAX_SLOTS_2022 {
        for attribute in SLOT_LAYOUT_2022.iter() {
            columns.push(format!("{} {}", attribute, slot));
        }
    }
    sheet.columns = columns;
    Ok(())
}

fn finish(mut long: LongTable, year: ElectionYear) -> LegisResult<LongTable> {
    // Slots without a candidate have no outcome.
    long.fill_missing(ELECTED, Cell::Bool(false))?;
    let total = long.rows.len();
    let dropped = long.drop_incomplete();
    debug!(
        "finish: {}: {} candidate slots, {} incomplete slots dropped",
        year, total, dropped
    );
    info!("finish: {}: {} candidate rows", year, long.rows.len());
    Ok(long)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sheet::LongColumn;

    pub fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    /// A district of the test fixtures: (department code, department label,
    /// district code, district label, candidates as (surname, votes, elected)).
    pub struct Fixture {
        pub dep_code: &'static str,
        pub dep_label: &'static str,
        pub code: &'static str,
        pub label: &'static str,
        pub candidates: Vec<(&'static str, i64, &'static str)>,
    }

    pub fn fixtures() -> Vec<Fixture> {
        vec![
            Fixture {
                dep_code: "01",
                dep_label: "Ain",
                code: "0101",
                label: "1ère circonscription",
                candidates: vec![("DUPONT", 300, "élu"), ("MARTIN", 200, "")],
            },
            Fixture {
                dep_code: "01",
                dep_label: "Ain",
                code: "0102",
                label: "2ème circonscription",
                candidates: vec![("DURAND", 150, "QUALIF T2"), ("PETIT", 140, ""), ("ROUX", 10, "")],
            },
            Fixture {
                dep_code: "02",
                dep_label: "Aisne",
                code: "0201",
                label: "1ère circonscription",
                candidates: vec![("LEROY", 500, "élu")],
            },
        ]
    }

    fn stats_2024(candidates: usize) -> Vec<Cell> {
        vec![
            Cell::Int(1000),
            Cell::Int(600),
            text("60,00%"),
            Cell::Int(400),
            text("40,00%"),
            Cell::Int(550),
            text("55,00%"),
            text("91,67%"),
            Cell::Int(30),
            text("3,00%"),
            text("5,00%"),
            Cell::Int(20 + candidates as i64),
            text("2,00%"),
            text("3,33%"),
        ]
    }

    /// A 2024-shaped sheet with `slots` candidate groups.
    pub fn sheet_2024(districts: &[Fixture], slots: usize) -> Sheet {
        let mut columns: Vec<String> = FIXED_COLUMNS.iter().map(|s| s.to_string()).collect();
        for slot in 1..=slots {
            for attribute in CANDIDATE_ATTRIBUTES.iter() {
                columns.push(format!("{} {}", attribute, slot));
            }
        }
        let rows = districts
            .iter()
            .map(|d| {
                let mut row = vec![text(d.dep_code), text(d.dep_label), text(d.code), text(d.label)];
                row.extend(stats_2024(d.candidates.len()));
                for (idx, (name, votes, elected)) in d.candidates.iter().enumerate() {
                    row.extend(vec![
                        Cell::Int(idx as i64 + 1),
                        text("DIV"),
                        text(name),
                        text("Camille"),
                        text(if idx % 2 == 0 { "MASCULIN" } else { "FEMININ" }),
                        Cell::Int(*votes),
                        text("10,00%"),
                        text("20,50%"),
                        if elected.is_empty() { Cell::Empty } else { text(elected) },
                    ]);
                }
                row
            })
            .collect();
        Sheet::new(columns, rows)
    }

    /// A 2022-shaped sheet: unnumbered candidate groups, 22 slots, last
    /// column missing.
    pub fn sheet_2022(districts: &[Fixture]) -> Sheet {
        let mut columns: Vec<String> = vec![
            "Code du département",
            DEPARTMENT_LABEL_2022,
            "Code de la circonscription",
            DISTRICT_LABEL_2022,
            "Etat saisie",
            "Inscrits",
            "Abstentions",
            "% Abs/Ins",
            "Votants",
            "% Vot/Ins",
            "Blancs",
            "% Blancs/Ins",
            "% Blancs/Vot",
            "Nuls",
            "% Nuls/Ins",
            "% Nuls/Vot",
            "Exprimés",
            "% Exp/Ins",
            "% Exp/Vot",
        ]
        .into_iter()
        .map(|s| s.to_string())
        .collect();
        let group = [
            "N°Panneau",
            "Sexe",
            "Nom",
            "Prénom",
            "Nuance",
            "Voix",
            "% Voix/Ins",
            "% Voix/Exp",
            "Sièges",
        ];
        for _ in 0..MAX_SLOTS_2022 {
            columns.extend(group.iter().map(|s| s.to_string()));
        }
        columns.pop();

        let rows = districts
            .iter()
            .map(|d| {
                let mut row = vec![
                    text(d.dep_code),
                    text(d.dep_label),
                    // The 2022 district codes are local to the department.
                    Cell::Int(d.code[2..].parse().unwrap()),
                    text(d.label),
                    text("Complet"),
                    Cell::Int(900),
                    Cell::Int(450),
                    Cell::Float(50.0),
                    Cell::Int(450),
                    Cell::Float(50.0),
                    Cell::Int(10),
                    Cell::Float(1.11),
                    Cell::Float(2.22),
                    Cell::Int(5),
                    Cell::Float(0.56),
                    Cell::Float(1.11),
                    Cell::Int(435),
                    Cell::Float(48.33),
                    Cell::Float(96.67),
                ];
                for (idx, (name, votes, elected)) in d.candidates.iter().enumerate() {
                    row.extend(vec![
                        Cell::Int(idx as i64 + 1),
                        text("F"),
                        text(name),
                        text("Dominique"),
                        text("ENS"),
                        Cell::Int(*votes),
                        Cell::Float(5.5),
                        Cell::Float(11.0),
                        if elected.is_empty() { Cell::Empty } else { text("Elu") },
                    ]);
                }
                row
            })
            .collect();
        Sheet::new(columns, rows)
    }

    pub fn district_labels(districts: &[Fixture]) -> Vec<DistrictLabel> {
        districts
            .iter()
            .map(|d| DistrictLabel {
                department_label: d.dep_label.to_string(),
                district_code: d.code.to_string(),
                district_label: normalize_district_label(d.label),
            })
            .collect()
    }

    fn slots_of(long: &LongTable, code: &str) -> Vec<u32> {
        let col = long.column(DISTRICT_CODE).unwrap();
        long.rows
            .iter()
            .filter(|r| r.cell(col) == text(code))
            .map(|r| r.slot)
            .collect()
    }

    #[test]
    fn reshape_2024_emits_one_row_per_candidate() {
        let long = reshape_2024(sheet_2024(&fixtures(), 4)).unwrap();
        assert_eq!(long.rows.len(), 6);
        assert_eq!(slots_of(&long, "0101"), vec![1, 2]);
        assert_eq!(slots_of(&long, "0102"), vec![1, 2, 3]);
        assert_eq!(slots_of(&long, "0201"), vec![1]);
    }

    #[test]
    fn reshape_2024_normalizes_labels_and_fills_elected() {
        let long = reshape_2024(sheet_2024(&fixtures(), 3)).unwrap();
        let label = long.column(DISTRICT_LABEL).unwrap();
        let elected = long.column(ELECTED).unwrap();
        assert_eq!(long.rows[0].cell(label), text("1ere circonscription"));
        assert_eq!(long.rows[0].cell(elected), text("élu"));
        assert_eq!(long.rows[1].cell(elected), Cell::Bool(false));
    }

    #[test]
    fn reshape_2024_requires_fixed_columns() {
        let mut sheet = sheet_2024(&fixtures(), 3);
        sheet.drop_columns(&["Votants"]).unwrap();
        assert_eq!(
            reshape_2024(sheet),
            Err(LegisError::MissingColumn {
                column: "Votants".to_string()
            })
        );
    }

    #[test]
    fn reshape_2022_aligns_on_2024_codes() {
        let all = fixtures();
        let long = reshape_2022(sheet_2022(&all), &district_labels(&all)).unwrap();
        assert_eq!(long.key_columns, FIXED_COLUMNS.to_vec());
        assert_eq!(slots_of(&long, "0101"), vec![1, 2]);
        assert_eq!(slots_of(&long, "0102"), vec![1, 2, 3]);
        assert_eq!(slots_of(&long, "0201"), vec![1]);
        let dep = long.column(DEPARTMENT_CODE).unwrap();
        assert_eq!(long.rows[0].cell(dep), text("01"));
        let surname = long.column("Nom candidat").unwrap();
        assert_eq!(long.rows[0].cell(surname), text("DUPONT"));
    }

    #[test]
    fn reshape_2022_drops_unmatched_districts() {
        let all = fixtures();
        // The 2024 list does not know the Aisne district.
        let labels = district_labels(&all[..2]);
        let long = reshape_2022(sheet_2022(&all), &labels).unwrap();
        assert!(slots_of(&long, "0201").is_empty());
        assert_eq!(long.rows.len(), 5);
    }

    #[test]
    fn reshape_2022_checks_layout_width() {
        let all = fixtures();
        let mut sheet = sheet_2022(&all);
        sheet.push_empty_column("Sièges");
        let res = reshape_2022(sheet, &district_labels(&all));
        assert_eq!(
            res,
            Err(LegisError::LayoutMismatch {
                expected: 216,
                found: 217
            })
        );
    }

    #[test]
    fn reshape_2022_checks_fixed_columns() {
        let all = fixtures();
        let mut sheet = sheet_2022(&all);
        sheet.rename_columns(&[("Inscrits", "Inscrits au 1er tour")]);
        let res = reshape_2022(sheet, &district_labels(&all));
        assert_eq!(
            res,
            Err(LegisError::UnexpectedFixedColumn {
                position: 4,
                column: "Inscrits au 1er tour".to_string()
            })
        );
    }

    #[test]
    fn reshape_2022_rejects_repeated_fixed_columns() {
        let all = fixtures();
        let mut sheet = sheet_2022(&all);
        sheet.rename_columns(&[("Abstentions", "Inscrits")]);
        let res = reshape_2022(sheet, &district_labels(&all));
        assert_eq!(
            res,
            Err(LegisError::UnexpectedFixedColumn {
                position: 5,
                column: "Inscrits".to_string()
            })
        );
    }

    #[test]
    fn reshape_2022_keeps_a_full_last_slot() {
        let mut candidates = vec![("CANDIDAT", 10, ""); MAX_SLOTS_2022];
        // The export cuts the `Sièges` cell of the last slot.
        candidates[MAX_SLOTS_2022 - 1] = ("DERNIER", 25, "élu");
        let all = vec![Fixture {
            dep_code: "75",
            dep_label: "Paris",
            code: "7501",
            label: "1ère circonscription",
            candidates,
        }];
        let long = reshape_2022(sheet_2022(&all), &district_labels(&all)).unwrap();
        let expected: Vec<u32> = (1..=MAX_SLOTS_2022 as u32).collect();
        assert_eq!(slots_of(&long, "7501"), expected);
        let last = long.rows.last().unwrap();
        assert_eq!(last.slot, 22);
        assert_eq!(last.cell(long.column("Nom candidat").unwrap()), text("DERNIER"));
        assert_eq!(last.cell(long.column(ELECTED).unwrap()), Cell::Bool(false));
    }

    #[test]
    fn reshape_2024_reads_short_rows_as_empty() {
        let mut sheet = sheet_2024(&fixtures(), 3);
        // The second candidate of 0101 loses its votes and everything after.
        sheet.rows[0].truncate(FIXED_COLUMNS.len() + CANDIDATE_ATTRIBUTES.len() + 5);
        let long = reshape_2024(sheet).unwrap();
        assert_eq!(slots_of(&long, "0101"), vec![1]);
        assert_eq!(slots_of(&long, "0102"), vec![1, 2, 3]);
    }

    #[test]
    fn reshape_2022_reads_short_rows_as_empty() {
        let all = fixtures();
        let mut sheet = sheet_2022(&all);
        // No district label left to join on.
        sheet.rows[0].truncate(3);
        let long = reshape_2022(sheet, &district_labels(&all)).unwrap();
        assert!(slots_of(&long, "0101").is_empty());
        assert_eq!(slots_of(&long, "0102"), vec![1, 2, 3]);
    }

    #[test]
    fn slot_column_is_numbered() {
        let long = reshape_2024(sheet_2024(&fixtures(), 3)).unwrap();
        assert_eq!(long.column(SLOT_COLUMN), Ok(LongColumn::Slot));
    }
}

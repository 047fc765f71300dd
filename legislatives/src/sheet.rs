use log::debug;

use std::collections::{BTreeMap, HashSet};

use crate::config::*;
use crate::text::convert_percentage;

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Text rendering used for codes and labels. Integral floats lose their
    /// decimal part ("1.0" becomes "1").
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => "".to_string(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Bool(b) => b.to_string(),
        }
    }

    /// Reads a head count (registered voters, votes, panel number, ...).
    pub fn to_count(&self, column: &str) -> LegisResult<i64> {
        match self {
            Cell::Int(i) => Ok(*i),
            Cell::Float(f) if f.fract() == 0.0 => Ok(*f as i64),
            Cell::Text(s) => {
                let digits: String = s.chars().filter(|c| !c.is_whitespace()).collect();
                digits
                    .parse::<i64>()
                    .map_err(|_| invalid_cell(column, self))
            }
            _ => Err(invalid_cell(column, self)),
        }
    }

    /// Reads a percentage column. Text percentages ("45,3%") are parsed, a
    /// malformed one is an error.
    pub fn to_ratio(&self, column: &str) -> LegisResult<f64> {
        match convert_percentage(self)? {
            Cell::Int(i) => Ok(i as f64),
            Cell::Float(f) => Ok(f),
            Cell::Text(s) => s
                .trim()
                .replace(',', ".")
                .parse::<f64>()
                .map_err(|_| invalid_cell(column, self)),
            _ => Err(invalid_cell(column, self)),
        }
    }
}

/// The cell at a position of a row. Rows shorter than the header read as
/// empty past their end.
pub(crate) fn cell_at(row: &[Cell], idx: usize) -> Cell {
    row.get(idx).cloned().unwrap_or(Cell::Empty)
}

fn invalid_cell(column: &str, cell: &Cell) -> LegisError {
    LegisError::InvalidCell {
        column: column.to_string(),
        content: format!("{:?}", cell),
    }
}

impl Sheet {
    /// Builds a sheet, padding short rows with empty cells and cutting long
    /// ones to the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Sheet {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Sheet { columns, rows }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Position of the first column with this name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> LegisResult<usize> {
        self.column_index(name)
            .ok_or_else(|| LegisError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Removes the given columns. All of them must be present.
    pub fn drop_columns(&mut self, names: &[&str]) -> LegisResult<()> {
        let mut to_drop: HashSet<usize> = HashSet::new();
        for name in names {
            to_drop.insert(self.require_column(name)?);
        }
        let keep = |idx: &usize| !to_drop.contains(idx);
        self.columns = self
            .columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| keep(idx))
            .map(|(_, c)| c.clone())
            .collect();
        for row in self.rows.iter_mut() {
            let old = std::mem::take(row);
            *row = old
                .into_iter()
                .enumerate()
                .filter(|(idx, _)| keep(idx))
                .map(|(_, c)| c)
                .collect();
        }
        Ok(())
    }

    /// Applies `f` to every text cell of a column.
    pub fn map_text_column<F>(&mut self, name: &str, f: F) -> LegisResult<()>
    where
        F: Fn(&str) -> String,
    {
        let idx = self.require_column(name)?;
        for row in self.rows.iter_mut() {
            if let Some(Cell::Text(s)) = row.get_mut(idx) {
                *s = f(s);
            }
        }
        Ok(())
    }

    /// Renames every column whose name appears on the left side of the
    /// mapping. Unknown names are left untouched.
    pub fn rename_columns(&mut self, mapping: &[(&str, &str)]) {
        for col in self.columns.iter_mut() {
            if let Some((_, to)) = mapping.iter().find(|(from, _)| *from == col.as_str()) {
                *col = to.to_string();
            }
        }
    }

    pub fn push_empty_column(&mut self, name: &str) {
        self.columns.push(name.to_string());
        let width = self.columns.len();
        for row in self.rows.iter_mut() {
            row.resize(width, Cell::Empty);
        }
    }
}

/// The result of unpivoting a sheet: one row per (source row, slot).
#[derive(PartialEq, Debug, Clone)]
pub struct LongTable {
    pub key_columns: Vec<String>,
    pub slot_column: String,
    pub stub_columns: Vec<String>,
    pub rows: Vec<LongRow>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct LongRow {
    pub keys: Vec<Cell>,
    pub slot: u32,
    pub stubs: Vec<Cell>,
}

/// Where a named column lives inside a `LongRow`.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum LongColumn {
    Key(usize),
    Slot,
    Stub(usize),
}

impl LongRow {
    pub fn cell(&self, column: LongColumn) -> Cell {
        match column {
            LongColumn::Key(idx) => cell_at(&self.keys, idx),
            LongColumn::Slot => Cell::Int(self.slot as i64),
            LongColumn::Stub(idx) => cell_at(&self.stubs, idx),
        }
    }

    fn has_missing(&self) -> bool {
        self.keys.iter().chain(self.stubs.iter()).any(Cell::is_empty)
    }
}

impl LongTable {
    pub fn column(&self, name: &str) -> LegisResult<LongColumn> {
        if name == self.slot_column {
            return Ok(LongColumn::Slot);
        }
        if let Some(idx) = self.key_columns.iter().position(|c| c == name) {
            return Ok(LongColumn::Key(idx));
        }
        if let Some(idx) = self.stub_columns.iter().position(|c| c == name) {
            return Ok(LongColumn::Stub(idx));
        }
        Err(LegisError::MissingColumn {
            column: name.to_string(),
        })
    }

    /// Replaces the empty cells of a stub column.
    pub fn fill_missing(&mut self, stub: &str, value: Cell) -> LegisResult<()> {
        let idx = match self.column(stub)? {
            LongColumn::Stub(idx) => idx,
            _ => {
                return Err(LegisError::MissingColumn {
                    column: stub.to_string(),
                })
            }
        };
        for row in self.rows.iter_mut() {
            if row.stubs.len() <= idx {
                row.stubs.resize(idx + 1, Cell::Empty);
            }
            if row.stubs[idx].is_empty() {
                row.stubs[idx] = value.clone();
            }
        }
        Ok(())
    }

    /// Removes every row holding an empty cell. Returns the number of removed rows.
    pub fn drop_incomplete(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|r| !r.has_missing());
        before - self.rows.len()
    }
}

/// Unpivots the repeated column groups of a sheet.
///
/// Every column named `<stub><sep><n>` belongs to slot `n`. Each input row
/// produces one output row per slot found in the header, in increasing slot
/// order; a stub with no column for a given slot yields an empty cell.
/// Columns that are neither keys nor slot columns are ignored.
pub fn wide_to_long(
    sheet: &Sheet,
    keys: &[&str],
    stubs: &[&str],
    sep: &str,
    slot_column: &str,
) -> LegisResult<LongTable> {
    let key_idxs: Vec<usize> = keys
        .iter()
        .map(|k| sheet.require_column(k))
        .collect::<LegisResult<Vec<usize>>>()?;

    // slot -> column index for each stub
    let mut slots: BTreeMap<u32, Vec<Option<usize>>> = BTreeMap::new();
    for (col_idx, name) in sheet.columns.iter().enumerate() {
        if key_idxs.contains(&col_idx) {
            continue;
        }
        let found = stubs.iter().enumerate().find_map(|(stub_idx, stub)| {
            let suffix = name.strip_prefix(stub)?.strip_prefix(sep)?;
            if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            suffix.parse::<u32>().ok().map(|slot| (stub_idx, slot))
        });
        match found {
            Some((stub_idx, slot)) => {
                let entry = slots.entry(slot).or_insert_with(|| vec![None; stubs.len()]);
                entry[stub_idx] = Some(col_idx);
            }
            None => {
                debug!("wide_to_long: ignoring column {:?}", name);
            }
        }
    }
    debug!(
        "wide_to_long: {} rows, {} slots found",
        sheet.rows.len(),
        slots.len()
    );

    let mut rows: Vec<LongRow> = Vec::with_capacity(sheet.rows.len() * slots.len());
    for row in sheet.rows.iter() {
        let key_cells: Vec<Cell> = key_idxs.iter().map(|idx| cell_at(row, *idx)).collect();
        for (slot, cols) in slots.iter() {
            let stub_cells: Vec<Cell> = cols
                .iter()
                .map(|c| match c {
                    Some(idx) => cell_at(row, *idx),
                    None => Cell::Empty,
                })
                .collect();
            rows.push(LongRow {
                keys: key_cells.clone(),
                slot: *slot,
                stubs: stub_cells,
            });
        }
    }

    Ok(LongTable {
        key_columns: keys.iter().map(|s| s.to_string()).collect(),
        slot_column: slot_column.to_string(),
        stub_columns: stubs.iter().map(|s| s.to_string()).collect(),
        rows,
    })
}

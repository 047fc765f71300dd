// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The two elections handled by the pipeline.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum ElectionYear {
    Y2022,
    Y2024,
}

impl ElectionYear {
    pub fn year(self) -> u16 {
        match self {
            ElectionYear::Y2022 => 2022,
            ElectionYear::Y2024 => 2024,
        }
    }

    /// The other election of the pair.
    pub fn other(self) -> ElectionYear {
        match self {
            ElectionYear::Y2022 => ElectionYear::Y2024,
            ElectionYear::Y2024 => ElectionYear::Y2022,
        }
    }
}

impl Display for ElectionYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.year())
    }
}

/// A single spreadsheet cell, as read from the source workbooks.
///
/// `Empty` plays the role of a missing value: rows that still hold an
/// `Empty` after unpivoting are dropped.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

/// A rectangular table: one header row and the data rows below it.
///
/// Column names are not required to be unique (the 2022 export repeats the
/// same per-candidate labels for every slot).
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Sheet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Provides the raw results sheet of a given election.
///
/// The pipeline asks for the 2024 sheet first, then for the 2022 sheet once
/// the 2024 district list is known.
pub trait SheetSource {
    fn fetch_sheet(&mut self, year: ElectionYear) -> Result<Sheet, Box<dyn Error>>;
}

// ******** Errors *********

#[derive(PartialEq, Debug, Clone)]
pub enum LegisError {
    /// A column required by the reshaping is absent from the sheet.
    MissingColumn { column: String },
    /// The 2022 sheet does not have the width its positional layout requires.
    LayoutMismatch { expected: usize, found: usize },
    /// One of the leading positional columns of the 2022 sheet is not a fixed key.
    UnexpectedFixedColumn { position: usize, column: String },
    /// A text cell holding a percentage could not be read as a number.
    PercentParse { value: String },
    /// A cell could not be converted to the type declared for its column.
    InvalidCell { column: String, content: String },
    /// The source sheet could not be retrieved.
    Fetch { year: ElectionYear, message: String },
}

pub type LegisResult<T> = Result<T, LegisError>;

impl Error for LegisError {}

impl Display for LegisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LegisError::MissingColumn { column } => {
                write!(f, "column {:?} is missing from the sheet", column)
            }
            LegisError::LayoutMismatch { expected, found } => write!(
                f,
                "expected {} columns after alignment, found {}",
                expected, found
            ),
            LegisError::UnexpectedFixedColumn { position, column } => write!(
                f,
                "column {:?} at position {} is not one of the fixed district columns",
                column, position
            ),
            LegisError::PercentParse { value } => {
                write!(f, "could not parse percentage {:?}", value)
            }
            LegisError::InvalidCell { column, content } => {
                write!(f, "invalid value {} in column {:?}", content, column)
            }
            LegisError::Fetch { year, message } => {
                write!(f, "could not fetch the {} results: {}", year, message)
            }
        }
    }
}

// ********* Configuration **********

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AssemblyOptions {
    /// Tags the 2024 candidate rows with 2022 and the 2022 candidate rows
    /// with 2024. The district rows are always tagged with their own year.
    pub swap_candidate_year_tags: bool,
}

impl AssemblyOptions {
    pub const DEFAULT: AssemblyOptions = AssemblyOptions {
        swap_candidate_year_tags: false,
    };

    pub(crate) fn candidate_year(&self, source: ElectionYear) -> ElectionYear {
        if self.swap_candidate_year_tags {
            source.other()
        } else {
            source
        }
    }
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        AssemblyOptions::DEFAULT
    }
}

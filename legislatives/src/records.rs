// ******** Output data structures *********
//
// The three tables handed to the persistence layer. The column labels are
// the French labels of the 2024 export; the persisted names are their
// sanitized form.

use crate::text::sanitize_column_names;

/// Storage type declared for a column.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Text,
}

/// A typed value, ready to be bound to an insert statement.
#[derive(PartialEq, Debug, Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

/// A row of one of the output tables.
pub trait Record {
    /// The source labels of the columns, in order.
    const LABELS: &'static [&'static str];
    /// The storage type of each column, aligned with `LABELS`.
    const TYPES: &'static [ColumnType];

    fn values(&self) -> Vec<Value>;

    /// The persisted column names.
    fn column_names() -> Vec<String> {
        sanitize_column_names(Self::LABELS)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct District {
    pub department_code: String,
    pub department_label: String,
    pub district_code: String,
    pub district_label: String,
}

impl Record for District {
    const LABELS: &'static [&'static str] = &[
        "Code département",
        "Libellé département",
        "Code circonscription législative",
        "Libellé circonscription législative",
    ];
    const TYPES: &'static [ColumnType] = &[
        ColumnType::Text,
        ColumnType::Text,
        ColumnType::Text,
        ColumnType::Text,
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.department_code.clone()),
            Value::Text(self.department_label.clone()),
            Value::Text(self.district_code.clone()),
            Value::Text(self.district_label.clone()),
        ]
    }
}

/// The part of a district used to align the 2022 export on the 2024 codes.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct DistrictLabel {
    pub department_label: String,
    pub district_code: String,
    pub district_label: String,
}

impl From<&District> for DistrictLabel {
    fn from(d: &District) -> Self {
        DistrictLabel {
            department_label: d.department_label.clone(),
            district_code: d.district_code.clone(),
            district_label: d.district_label.clone(),
        }
    }
}

/// Turnout and ballot statistics of a district for one election.
#[derive(PartialEq, Debug, Clone)]
pub struct DistrictResult {
    pub district_code: String,
    pub registered: i64,
    pub voters: i64,
    pub voters_pct: f64,
    pub abstentions: i64,
    pub abstentions_pct: f64,
    pub expressed: i64,
    pub expressed_registered_pct: f64,
    pub expressed_voters_pct: f64,
    pub blank: i64,
    pub blank_registered_pct: f64,
    pub blank_voters_pct: f64,
    pub null: i64,
    pub null_registered_pct: f64,
    pub null_voters_pct: f64,
    pub year: u16,
}

impl Record for DistrictResult {
    const LABELS: &'static [&'static str] = &[
        "Code circonscription législative",
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
        "year",
    ];
    const TYPES: &'static [ColumnType] = &[
        ColumnType::Text,
        ColumnType::Integer,
        ColumnType::Integer,
        ColumnType::Float,
        ColumnType::Integer,
        ColumnType::Float,
        ColumnType::Integer,
        ColumnType::Float,
        ColumnType::Float,
        ColumnType::Integer,
        ColumnType::Float,
        ColumnType::Float,
        ColumnType::Integer,
        ColumnType::Float,
        ColumnType::Float,
        ColumnType::Integer,
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.district_code.clone()),
            Value::Integer(self.registered),
            Value::Integer(self.voters),
            Value::Float(self.voters_pct),
            Value::Integer(self.abstentions),
            Value::Float(self.abstentions_pct),
            Value::Integer(self.expressed),
            Value::Float(self.expressed_registered_pct),
            Value::Float(self.expressed_voters_pct),
            Value::Integer(self.blank),
            Value::Float(self.blank_registered_pct),
            Value::Float(self.blank_voters_pct),
            Value::Integer(self.null),
            Value::Float(self.null_registered_pct),
            Value::Float(self.null_voters_pct),
            Value::Integer(self.year as i64),
        ]
    }
}

/// The result of one candidate slot of a district for one election.
///
/// `slot` is the position of the candidate in the source row. It is not a
/// stable identity: the same person may hold different slots across years.
#[derive(PartialEq, Debug, Clone)]
pub struct CandidateResult {
    pub district_code: String,
    pub slot: u32,
    pub panel: i64,
    pub nuance: String,
    pub surname: String,
    pub given_name: String,
    pub gender: String,
    pub votes: i64,
    pub votes_registered_pct: f64,
    pub votes_expressed_pct: f64,
    pub elected: bool,
    pub year: u16,
}

impl Record for CandidateResult {
    const LABELS: &'static [&'static str] = &[
        "Code circonscription législative",
        "Candidate Number",
        "Numéro de panneau",
        "Nuance candidat",
        "Nom candidat",
        "Prénom candidat",
        "Sexe candidat",
        "Voix",
        "% Voix/inscrits",
        "% Voix/exprimés",
        "Elu",
        "year",
    ];
    const TYPES: &'static [ColumnType] = &[
        ColumnType::Text,
        ColumnType::Integer,
        ColumnType::Integer,
        ColumnType::Text,
        ColumnType::Text,
        ColumnType::Text,
        ColumnType::Text,
        ColumnType::Integer,
        ColumnType::Float,
        ColumnType::Float,
        ColumnType::Boolean,
        ColumnType::Integer,
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.district_code.clone()),
            Value::Integer(self.slot as i64),
            Value::Integer(self.panel),
            Value::Text(self.nuance.clone()),
            Value::Text(self.surname.clone()),
            Value::Text(self.given_name.clone()),
            Value::Text(self.gender.clone()),
            Value::Integer(self.votes),
            Value::Float(self.votes_registered_pct),
            Value::Float(self.votes_expressed_pct),
            Value::Boolean(self.elected),
            Value::Integer(self.year as i64),
        ]
    }
}

/// The three assembled tables.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Dataset {
    pub districts: Vec<District>,
    pub district_results: Vec<DistrictResult>,
    pub candidate_results: Vec<CandidateResult>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct DatasetSummary {
    pub districts: usize,
    pub district_results: usize,
    pub candidate_results: usize,
}

impl Dataset {
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            districts: self.districts.len(),
            district_results: self.district_results.len(),
            candidate_results: self.candidate_results.len(),
        }
    }
}

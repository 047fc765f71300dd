use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::config::*;

/// Closest unaccented ASCII rendering of a string.
///
/// Accented letters lose their marks, the few French letters that do not
/// decompose get their usual spelling and anything else outside ASCII is
/// dropped.
pub fn transliterate(s: &str) -> String {
    let mut res = String::with_capacity(s.len());
    for c in s.nfd() {
        if c.is_ascii() {
            res.push(c);
            continue;
        }
        if is_combining_mark(c) {
            continue;
        }
        match c {
            'œ' => res.push_str("oe"),
            'Œ' => res.push_str("OE"),
            'æ' => res.push_str("ae"),
            'Æ' => res.push_str("AE"),
            'ß' => res.push_str("ss"),
            'ø' => res.push('o'),
            'Ø' => res.push('O'),
            '’' | '‘' | '‚' | '′' => res.push('\''),
            '“' | '”' | '«' | '»' | '„' => res.push('"'),
            '–' | '—' | '‐' | '‑' | '−' => res.push('-'),
            '°' => res.push_str("deg"),
            'º' => res.push('o'),
            '\u{a0}' | '\u{202f}' | '\u{2009}' => res.push(' '),
            _ => {}
        }
    }
    res
}

/// Turns a column label into an identifier-like name usable as a SQL column.
pub fn sanitize_column_name(label: &str) -> String {
    transliterate(label)
        .replace(' ', "_")
        .replace('%', "Percent")
        .replace('/', "_")
}

pub fn sanitize_column_names<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    labels
        .iter()
        .map(|l| sanitize_column_name(l.as_ref()))
        .collect()
}

/// Converts a percentage written with a French decimal comma ("45,3%") to a
/// number. Anything that is not a text containing `%` is returned as is.
pub fn convert_percentage(cell: &Cell) -> LegisResult<Cell> {
    match cell {
        Cell::Text(s) if s.contains('%') => {
            let cleaned = s.replace('%', "").replace(',', ".");
            let x = cleaned
                .trim()
                .parse::<f64>()
                .map_err(|_| LegisError::PercentParse { value: s.clone() })?;
            Ok(Cell::Float(x))
        }
        _ => Ok(cell.clone()),
    }
}

/// Both exports write the district labels with and without the grave accent.
pub fn normalize_district_label(label: &str) -> String {
    label.replace('è', "e")
}

pub fn normalize_gender(gender: &str) -> String {
    match gender {
        "MASCULIN" => "M".to_string(),
        "FEMININ" => "F".to_string(),
        x => x.to_string(),
    }
}

/// Reads the content of an "Elu" cell.
///
/// The 2024 export writes "élu" or a qualification note ("QUALIF T2"), the
/// 2022 export a seat count.
pub fn parse_elected(cell: &Cell) -> bool {
    match cell {
        Cell::Empty => false,
        Cell::Bool(b) => *b,
        Cell::Int(i) => *i != 0,
        Cell::Float(f) => *f != 0.0,
        Cell::Text(s) => {
            let t = transliterate(s.trim()).to_lowercase();
            t.starts_with("elu") || matches!(t.as_str(), "oui" | "true" | "1")
        }
    }
}

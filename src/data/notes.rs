//! Discharge-note loading and splitting.

use std::path::Path;

use indexmap::IndexMap;
use rand::{seq::SliceRandom, RngCore};
use tracing::info;

use crate::error::{LosError, Result};

/// One clinical note with its binary outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: String,
    pub text: String,
    pub label: u8,
    /// Columns other than text and label, in header order.
    pub extra: IndexMap<String, String>,
}

/// Column names used to interpret the input table.
#[derive(Debug, Clone)]
pub struct NoteColumns {
    pub text: String,
    pub label: String,
    /// Optional identifier column; falls back to the row index.
    pub id: Option<String>,
}

impl Default for NoteColumns {
    fn default() -> Self {
        Self {
            text: "text".into(),
            label: "long_los".into(),
            id: Some("hadm_id".into()),
        }
    }
}

/// Read notes from a CSV file with headers.
pub fn load_notes(path: &Path, columns: &NoteColumns) -> Result<Vec<Note>> {
    let reader = csv::Reader::from_path(path)?;
    let notes = read_notes(reader, columns)?;
    info!(path = %path.display(), rows = notes.len(), "loaded notes");
    Ok(notes)
}

/// Parse notes from any CSV reader. Missing columns fail before any row is read.
pub fn read_notes<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    columns: &NoteColumns,
) -> Result<Vec<Note>> {
    let headers = reader.headers()?.clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LosError::MissingColumn {
                column: name.to_string(),
            })
    };
    let text_idx = position(&columns.text)?;
    let label_idx = position(&columns.label)?;
    let id_idx = columns
        .id
        .as_deref()
        .and_then(|name| headers.iter().position(|h| h == name));

    let mut notes = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let raw_label = record.get(label_idx).unwrap_or_default();
        let label = parse_label(raw_label).ok_or_else(|| LosError::InvalidLabel {
            row,
            value: raw_label.to_string(),
        })?;
        let id = id_idx
            .and_then(|idx| record.get(idx))
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| row.to_string());
        let extra = headers
            .iter()
            .zip(record.iter())
            .enumerate()
            .filter(|(idx, _)| *idx != text_idx && *idx != label_idx)
            .map(|(_, (h, v))| (h.to_string(), v.to_string()))
            .collect();
        notes.push(Note {
            id,
            text: record.get(text_idx).unwrap_or_default().to_string(),
            label,
            extra,
        });
    }
    Ok(notes)
}

/// Interpret common spellings of a binary outcome.
pub fn parse_label(value: &str) -> Option<u8> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" => Some(1),
        "0" | "0.0" | "false" | "no" => Some(0),
        _ => None,
    }
}

/// Shuffle and split into `(train, test)`; each side keeps at least one note when possible.
pub fn train_test_split(
    notes: &[Note],
    test_fraction: f64,
    rng: &mut dyn RngCore,
) -> (Vec<Note>, Vec<Note>) {
    let mut shuffled = notes.to_vec();
    shuffled.shuffle(rng);
    let n = shuffled.len();
    let mut n_test = (n as f64 * test_fraction).round() as usize;
    if n >= 2 {
        n_test = n_test.clamp(1, n - 1);
    } else {
        n_test = 0;
    }
    let test = shuffled.split_off(n - n_test);
    (shuffled, test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn reader(data: &str) -> csv::Reader<&[u8]> {
        csv::Reader::from_reader(data.as_bytes())
    }

    #[test]
    fn passes_through_extra_columns() {
        let data = "hadm_id,text,long_los,age\n17,Admitted for sepsis,1,70\n";
        let notes = read_notes(reader(data), &NoteColumns::default()).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, "17");
        assert_eq!(notes[0].label, 1);
        assert_eq!(
            notes[0].extra.keys().collect::<Vec<_>>(),
            vec!["hadm_id", "age"]
        );
    }

    #[test]
    fn missing_label_column_fails_fast() {
        let data = "text,outcome\nfoo,1\n";
        let err = read_notes(reader(data), &NoteColumns::default()).unwrap_err();
        assert!(matches!(err, LosError::MissingColumn { column } if column == "long_los"));
    }

    #[test]
    fn row_index_used_without_id_column() {
        let data = "text,long_los\na,0\nb,true\n";
        let notes = read_notes(reader(data), &NoteColumns::default()).unwrap();
        assert_eq!(notes[1].id, "1");
        assert_eq!(notes[1].label, 1);
    }

    #[test]
    fn bad_label_reports_row() {
        let data = "text,long_los\na,0\nb,2\n";
        let err = read_notes(reader(data), &NoteColumns::default()).unwrap_err();
        assert!(matches!(err, LosError::InvalidLabel { row: 1, .. }));
    }

    #[test]
    fn split_keeps_both_sides() {
        let notes: Vec<Note> = (0..5)
            .map(|i| Note {
                id: i.to_string(),
                text: format!("note {i}"),
                label: (i % 2) as u8,
                extra: IndexMap::new(),
            })
            .collect();
        let mut rng = StdRng::seed_from_u64(7);
        let (train, test) = train_test_split(&notes, 0.01, &mut rng);
        assert_eq!(train.len(), 4);
        assert_eq!(test.len(), 1);
    }
}

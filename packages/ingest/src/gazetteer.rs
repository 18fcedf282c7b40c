//! Loader for the IBGE municipality gazetteer.
//!
//! One row per municipality: display name, state code, and the
//! coordinates the map layer plots. Name deduplication is not done here;
//! that is the joiner's job, after canonicalization.

use fuel_map_survey_models::PlaceRecord;

use crate::text::{decode_cp1252, parse_decimal_comma};
use crate::{IngestError, cell, column_index};

const NAME: &str = "NOME MUNICIPIO";
const UF: &str = "UF";
const LATITUDE: &str = "LATITUDE";
const LONGITUDE: &str = "LONGITUDE";

/// Parses a coordinate cell, warning when a non-empty cell fails
/// coercion.
fn coordinate_cell(
    record: &csv::StringRecord,
    index: usize,
    line: usize,
    header: &str,
) -> Option<f64> {
    let raw = cell(record, index);
    if raw.is_empty() {
        return None;
    }
    let parsed = parse_decimal_comma(raw);
    if parsed.is_none() {
        log::warn!("Gazetteer row {line}: non-numeric '{header}' value '{raw}', treated as missing");
    }
    parsed
}

/// Loads gazetteer rows from raw cp1252 CSV bytes.
///
/// # Errors
///
/// Returns [`IngestError`] if a required column is missing or the CSV
/// framing is invalid.
pub fn load_place_records(bytes: &[u8]) -> Result<Vec<PlaceRecord>, IngestError> {
    let decoded = decode_cp1252(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(decoded.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_owned()).collect();
    let name = column_index(&headers, NAME)?;
    let uf = column_index(&headers, UF)?;
    let latitude = column_index(&headers, LATITUDE)?;
    let longitude = column_index(&headers, LONGITUDE)?;

    let mut records = Vec::new();

    for (line, result) in reader.records().enumerate() {
        let record = result?;

        records.push(PlaceRecord {
            name: cell(&record, name).to_owned(),
            uf: cell(&record, uf).to_owned(),
            latitude: coordinate_cell(&record, latitude, line, LATITUDE),
            longitude: coordinate_cell(&record, longitude, line, LONGITUDE),
        });
    }

    log::info!("Loaded {} gazetteer rows", records.len());

    Ok(records)
}

/// Loads gazetteer rows from a file on disk.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be read or parsed.
pub fn load_place_records_from_path(path: &std::path::Path) -> Result<Vec<PlaceRecord>, IngestError> {
    let bytes = std::fs::read(path)?;
    load_place_records(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&str]) -> Vec<u8> {
        let mut text = "NOME MUNICIPIO;UF;LATITUDE;LONGITUDE".to_owned();
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text.chars().map(|c| c as u32 as u8).collect()
    }

    #[test]
    fn loads_rows_with_coordinates() {
        let bytes = table(&["São Paulo;SP;-23,55;-46,63", "Manaus;AM;-3,10;-60,02"]);

        let records = load_place_records(&bytes).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "São Paulo");
        assert_eq!(records[0].uf, "SP");
        assert_eq!(records[0].latitude, Some(-23.55));
        assert_eq!(records[1].longitude, Some(-60.02));
    }

    #[test]
    fn malformed_coordinates_become_missing() {
        let bytes = table(&["Atlântida;XX;perto do mar;-46,63"]);

        let records = load_place_records(&bytes).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].latitude, None);
        assert_eq!(records[0].longitude, Some(-46.63));
    }

    #[test]
    fn missing_column_fails_the_load() {
        let bytes = b"NOME MUNICIPIO;UF\nManaus;AM".to_vec();
        let err = load_place_records(&bytes).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { .. }));
    }
}

//! Loader for the ANP fuel price survey table.
//!
//! One row per surveyed place x month x product. Month labels are
//! abbreviated Portuguese month names with a two-digit year ("mai/13"),
//! resolved through an explicit lookup table — the process locale is
//! never consulted or mutated, so loading is safe under concurrent calls.

use chrono::NaiveDate;
use fuel_map_survey_models::{PriceMetrics, PriceRecord};

use crate::text::{decode_cp1252, parse_decimal_comma};
use crate::{IngestError, cell, column_index};

const MONTH: &str = "MÊS";
const PRODUCT: &str = "PRODUTO";
const CITY: &str = "MUNICÍPIO";
const REGION: &str = "REGIÃO";
const STATE: &str = "ESTADO";
const GAS_STATION_COUNT: &str = "NÚMERO DE POSTOS PESQUISADOS";
const UNIT: &str = "UNIDADE DE MEDIDA";

const MARKET_PRICE_MEAN: &str = "PREÇO MÉDIO REVENDA";
const MARKET_PRICE_STD: &str = "DESVIO PADRÃO REVENDA";
const MARKET_PRICE_MIN: &str = "PREÇO MÍNIMO REVENDA";
const MARKET_PRICE_MAX: &str = "PREÇO MÁXIMO REVENDA";
const MARKET_PRICE_VAR_COEF: &str = "COEF DE VARIAÇÃO REVENDA";
const MARKET_MARGIN: &str = "MARGEM MÉDIA REVENDA";
const DIST_PRICE_MEAN: &str = "PREÇO MÉDIO DISTRIBUIÇÃO";
const DIST_PRICE_STD: &str = "DESVIO PADRÃO DISTRIBUIÇÃO";
const DIST_PRICE_MIN: &str = "PREÇO MÍNIMO DISTRIBUIÇÃO";
const DIST_PRICE_MAX: &str = "PREÇO MÁXIMO DISTRIBUIÇÃO";
const DIST_PRICE_VAR_COEF: &str = "COEF DE VARIAÇÃO DISTRIBUIÇÃO";

/// Abbreviated Portuguese month names as they appear in the survey.
const MONTH_NAMES: [(&str, u32); 12] = [
    ("jan", 1),
    ("fev", 2),
    ("mar", 3),
    ("abr", 4),
    ("mai", 5),
    ("jun", 6),
    ("jul", 7),
    ("ago", 8),
    ("set", 9),
    ("out", 10),
    ("nov", 11),
    ("dez", 12),
];

/// Parses a survey month label ("mai/13") into the first day of that
/// month. Two-digit years are pivoted into the 2000s.
fn parse_month_label(label: &str) -> Option<NaiveDate> {
    let (name, year) = label.trim().split_once('/')?;
    let name = name.trim().to_lowercase();
    let month = MONTH_NAMES
        .iter()
        .find(|(abbr, _)| *abbr == name)
        .map(|(_, number)| *number)?;
    let year: i32 = year.trim().parse().ok()?;
    let year = if year < 100 { 2000 + year } else { year };
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Resolved column positions for the survey header row.
struct SurveyColumns {
    month: usize,
    product: usize,
    city: usize,
    region: usize,
    state: usize,
    gas_station_count: usize,
    unit: usize,
    market_price_mean: usize,
    market_price_std: usize,
    market_price_min: usize,
    market_price_max: usize,
    market_price_var_coef: usize,
    market_margin: usize,
    dist_price_mean: usize,
    dist_price_std: usize,
    dist_price_min: usize,
    dist_price_max: usize,
    dist_price_var_coef: usize,
}

impl SurveyColumns {
    fn resolve(headers: &[String]) -> Result<Self, IngestError> {
        Ok(Self {
            month: column_index(headers, MONTH)?,
            product: column_index(headers, PRODUCT)?,
            city: column_index(headers, CITY)?,
            region: column_index(headers, REGION)?,
            state: column_index(headers, STATE)?,
            gas_station_count: column_index(headers, GAS_STATION_COUNT)?,
            unit: column_index(headers, UNIT)?,
            market_price_mean: column_index(headers, MARKET_PRICE_MEAN)?,
            market_price_std: column_index(headers, MARKET_PRICE_STD)?,
            market_price_min: column_index(headers, MARKET_PRICE_MIN)?,
            market_price_max: column_index(headers, MARKET_PRICE_MAX)?,
            market_price_var_coef: column_index(headers, MARKET_PRICE_VAR_COEF)?,
            market_margin: column_index(headers, MARKET_MARGIN)?,
            dist_price_mean: column_index(headers, DIST_PRICE_MEAN)?,
            dist_price_std: column_index(headers, DIST_PRICE_STD)?,
            dist_price_min: column_index(headers, DIST_PRICE_MIN)?,
            dist_price_max: column_index(headers, DIST_PRICE_MAX)?,
            dist_price_var_coef: column_index(headers, DIST_PRICE_VAR_COEF)?,
        })
    }
}

/// Parses a numeric cell, warning when a non-empty cell fails coercion.
/// Both the malformed and the empty case become a missing value.
fn numeric_cell(record: &csv::StringRecord, index: usize, line: usize, header: &str) -> Option<f64> {
    let raw = cell(record, index);
    if raw.is_empty() {
        return None;
    }
    let parsed = parse_decimal_comma(raw);
    if parsed.is_none() {
        log::warn!("Survey row {line}: non-numeric '{header}' value '{raw}', treated as missing");
    }
    parsed
}

/// Loads survey rows from raw cp1252 CSV bytes.
///
/// Rows whose month label cannot be parsed are skipped with a warning —
/// a row without a month cannot participate in any time grouping. All
/// other cell-level problems degrade to missing values.
///
/// # Errors
///
/// Returns [`IngestError`] if a required column is missing or the CSV
/// framing is invalid.
pub fn load_price_records(bytes: &[u8]) -> Result<Vec<PriceRecord>, IngestError> {
    let decoded = decode_cp1252(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(decoded.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_owned()).collect();
    let columns = SurveyColumns::resolve(&headers)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (line, result) in reader.records().enumerate() {
        let record = result?;

        let month_label = cell(&record, columns.month);
        let Some(month) = parse_month_label(month_label) else {
            log::warn!("Survey row {line}: unparseable month '{month_label}', skipping row");
            skipped += 1;
            continue;
        };

        let count_raw = cell(&record, columns.gas_station_count);
        let gas_station_count = count_raw.parse::<u32>().ok();
        if gas_station_count.is_none() && !count_raw.is_empty() {
            log::warn!(
                "Survey row {line}: non-numeric '{GAS_STATION_COUNT}' value '{count_raw}', \
                 treated as missing"
            );
        }

        records.push(PriceRecord {
            month,
            product: cell(&record, columns.product).to_owned(),
            city: cell(&record, columns.city).to_owned(),
            region: cell(&record, columns.region).to_owned(),
            state: cell(&record, columns.state).to_owned(),
            gas_station_count,
            unit: cell(&record, columns.unit).to_owned(),
            metrics: PriceMetrics {
                market_price_mean: numeric_cell(&record, columns.market_price_mean, line, MARKET_PRICE_MEAN),
                market_price_std: numeric_cell(&record, columns.market_price_std, line, MARKET_PRICE_STD),
                market_price_min: numeric_cell(&record, columns.market_price_min, line, MARKET_PRICE_MIN),
                market_price_max: numeric_cell(&record, columns.market_price_max, line, MARKET_PRICE_MAX),
                market_price_var_coef: numeric_cell(
                    &record,
                    columns.market_price_var_coef,
                    line,
                    MARKET_PRICE_VAR_COEF,
                ),
                market_margin: numeric_cell(&record, columns.market_margin, line, MARKET_MARGIN),
                dist_price_mean: numeric_cell(&record, columns.dist_price_mean, line, DIST_PRICE_MEAN),
                dist_price_std: numeric_cell(&record, columns.dist_price_std, line, DIST_PRICE_STD),
                dist_price_min: numeric_cell(&record, columns.dist_price_min, line, DIST_PRICE_MIN),
                dist_price_max: numeric_cell(&record, columns.dist_price_max, line, DIST_PRICE_MAX),
                dist_price_var_coef: numeric_cell(
                    &record,
                    columns.dist_price_var_coef,
                    line,
                    DIST_PRICE_VAR_COEF,
                ),
            },
        });
    }

    log::info!(
        "Loaded {} survey rows ({skipped} skipped for unparseable months)",
        records.len(),
    );

    Ok(records)
}

/// Loads survey rows from a file on disk.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be read or parsed.
pub fn load_price_records_from_path(path: &std::path::Path) -> Result<Vec<PriceRecord>, IngestError> {
    let bytes = std::fs::read(path)?;
    load_price_records(&bytes)
}

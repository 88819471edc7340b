//! CSV ingest and normalization.
//!
//! This module turns the three dashboard inputs into typed, immutable rows:
//!
//! - transactions (`Order Date`, `Sales`, `Profit`, `Category`), Latin-1 encoded
//! - daily actual sales (`ds`, `y`)
//! - daily forecast (`ds`, `yhat`, `yhat_lower`, `yhat_upper`)
//!
//! Unlike a best-effort importer, every malformed value is fatal: the error
//! names the file, line and column, and no partial dataset is returned.
//! Forecast rows whose bounds are out of order are kept exactly as read and
//! reported through [`Datasets::band_violations`].

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{DataFiles, ForecastPoint, SalesPoint, Transaction};
use crate::error::AppError;

/// Everything loaded for one run.
#[derive(Debug, Clone, Serialize)]
pub struct Datasets {
    pub transactions: Vec<Transaction>,
    pub actuals: Vec<SalesPoint>,
    pub forecast: Vec<ForecastPoint>,
    /// Dates of forecast rows violating `yhat_lower <= yhat <= yhat_upper`.
    pub band_violations: Vec<NaiveDate>,
}

/// Load all three files.
pub fn load_datasets(files: &DataFiles) -> Result<Datasets, AppError> {
    let transactions = load_transactions(&files.transactions)?;
    let actuals = load_daily_sales(&files.daily)?;
    let forecast = load_forecast(&files.forecast)?;

    let band_violations = band_violations(&forecast);
    if !band_violations.is_empty() {
        warn!(
            rows = band_violations.len(),
            first = %band_violations[0],
            "forecast rows violate yhat_lower <= yhat <= yhat_upper"
        );
    }

    Ok(Datasets {
        transactions,
        actuals,
        forecast,
        band_violations,
    })
}

/// Load the transactional file, decoding it as Latin-1.
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>, AppError> {
    let bytes = read_file(path)?;
    let text = decode_latin1(&bytes);
    let rows = load_transactions_from_reader(text.as_bytes(), &path.display().to_string())?;
    info!(path = %path.display(), rows = rows.len(), "loaded transactions");
    Ok(rows)
}

/// Load the daily actual-sales file.
pub fn load_daily_sales(path: &Path) -> Result<Vec<SalesPoint>, AppError> {
    let file = open_file(path)?;
    let rows = load_daily_sales_from_reader(file, &path.display().to_string())?;
    info!(path = %path.display(), rows = rows.len(), "loaded daily sales");
    Ok(rows)
}

/// Load the forecast file.
pub fn load_forecast(path: &Path) -> Result<Vec<ForecastPoint>, AppError> {
    let file = open_file(path)?;
    let rows = load_forecast_from_reader(file, &path.display().to_string())?;
    info!(path = %path.display(), rows = rows.len(), "loaded forecast");
    Ok(rows)
}

pub fn load_transactions_from_reader<R: Read>(reader: R, source: &str) -> Result<Vec<Transaction>, AppError> {
    let mut table = Table::new(reader, source)?;
    let order_date = table.column("order date")?;
    let sales = table.column("sales")?;
    let profit = table.column("profit")?;
    let category = table.column("category")?;

    let mut out = Vec::new();
    while let Some(row) = table.next_row()? {
        out.push(Transaction {
            order_date: row.date(order_date)?,
            sales: row.number(sales)?,
            profit: row.number(profit)?,
            category: row.text(category)?.to_string(),
        });
    }
    Ok(out)
}

pub fn load_daily_sales_from_reader<R: Read>(reader: R, source: &str) -> Result<Vec<SalesPoint>, AppError> {
    let mut table = Table::new(reader, source)?;
    let ds = table.column("ds")?;
    let y = table.column("y")?;

    let mut out = Vec::new();
    while let Some(row) = table.next_row()? {
        out.push(SalesPoint {
            date: row.date(ds)?,
            sales: row.number(y)?,
        });
    }
    Ok(out)
}

pub fn load_forecast_from_reader<R: Read>(reader: R, source: &str) -> Result<Vec<ForecastPoint>, AppError> {
    let mut table = Table::new(reader, source)?;
    let ds = table.column("ds")?;
    let yhat = table.column("yhat")?;
    let lower = table.column("yhat_lower")?;
    let upper = table.column("yhat_upper")?;

    let mut out = Vec::new();
    while let Some(row) = table.next_row()? {
        out.push(ForecastPoint {
            date: row.date(ds)?,
            yhat: row.number(yhat)?,
            yhat_lower: row.number(lower)?,
            yhat_upper: row.number(upper)?,
        });
    }
    Ok(out)
}

/// Dates of forecast rows whose bounds are out of order.
pub fn band_violations(forecast: &[ForecastPoint]) -> Vec<NaiveDate> {
    forecast
        .iter()
        .filter(|p| !p.band_is_ordered())
        .map(|p| p.date)
        .collect()
}

/// Decode ISO-8859-1 bytes. Every byte maps to the code point of the same value.
///
/// Files that carry a UTF-8 BOM were clearly re-saved as UTF-8, so they are
/// decoded as such instead.
pub fn decode_latin1(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        if let Ok(text) = std::str::from_utf8(rest) {
            return text.to_string();
        }
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn open_file(path: &Path) -> Result<File, AppError> {
    File::open(path).map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))
}

fn read_file(path: &Path) -> Result<Vec<u8>, AppError> {
    std::fs::read(path).map_err(|e| AppError::input(format!("Failed to read CSV '{}': {e}", path.display())))
}

/// A CSV reader with a resolved header map and line tracking.
struct Table<'s, R: Read> {
    reader: csv::Reader<R>,
    header_map: HashMap<String, usize>,
    headers: StringRecord,
    record: StringRecord,
    line: usize,
    source: &'s str,
}

impl<'s, R: Read> Table<'s, R> {
    fn new(reader: R, source: &'s str) -> Result<Self, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| AppError::input(format!("{source}: failed to read CSV headers: {e}")))?
            .clone();

        let header_map = build_header_map(&headers);
        debug!(source, columns = headers.len(), "read CSV headers");

        Ok(Self {
            reader,
            header_map,
            headers,
            record: StringRecord::new(),
            line: 1,
            source,
        })
    }

    fn column(&self, name: &str) -> Result<usize, AppError> {
        self.header_map.get(name).copied().ok_or_else(|| {
            AppError::input(format!(
                "{}: missing required column `{name}` (found: {}).",
                self.source,
                self.headers.iter().collect::<Vec<_>>().join(", ")
            ))
        })
    }

    fn next_row(&mut self) -> Result<Option<Row<'_>>, AppError> {
        let more = self
            .reader
            .read_record(&mut self.record)
            .map_err(|e| AppError::input(format!("{}: CSV parse error: {e}", self.source)))?;
        if !more {
            return Ok(None);
        }
        self.line = self
            .record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(self.line + 1);
        Ok(Some(Row {
            record: &self.record,
            headers: &self.headers,
            line: self.line,
            source: self.source,
        }))
    }
}

struct Row<'a> {
    record: &'a StringRecord,
    headers: &'a StringRecord,
    line: usize,
    source: &'a str,
}

impl<'a> Row<'a> {
    fn text(&self, idx: usize) -> Result<&'a str, AppError> {
        self.record
            .get(idx)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| self.error(idx, "missing value".to_string()))
    }

    fn date(&self, idx: usize) -> Result<NaiveDate, AppError> {
        let raw = self.text(idx)?;
        parse_date(raw).map_err(|e| self.error(idx, e))
    }

    fn number(&self, idx: usize) -> Result<f64, AppError> {
        let raw = self.text(idx)?;
        parse_f64(raw).map_err(|e| self.error(idx, e))
    }

    fn error(&self, idx: usize, message: String) -> AppError {
        let column = self.headers.get(idx).unwrap_or("?");
        AppError::input(format!("{}:{}: column `{column}`: {message}", self.source, self.line))
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, the first column never matches.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // Forecast exports write ISO dates, sometimes with a midnight timestamp.
    // Transaction exports use US month-first dates (`11/8/2016`).
    const DATE_FMTS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
    const DATETIME_FMTS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%m/%d/%Y %H:%M",
    ];
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(format!(
        "invalid date '{s}'. Expected one of: YYYY-MM-DD, MM/DD/YYYY, YYYY/MM/DD (optionally with a time)."
    ))
}

fn parse_f64(s: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("invalid number '{s}'"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("non-finite number '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn daily_sales_parses_iso_dates() {
        let csv = "ds,y\n2024-01-01,100\n2024-01-02,150.5\n2024-02-01,200\n";
        let rows = load_daily_sales_from_reader(csv.as_bytes(), "daily.csv").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, d(2024, 1, 1));
        assert!((rows[1].sales - 150.5).abs() < 1e-12);
    }

    #[test]
    fn forecast_accepts_midnight_timestamps() {
        let csv = "ds,yhat,yhat_lower,yhat_upper\n2024-01-01 00:00:00,120,100,140\n";
        let rows = load_forecast_from_reader(csv.as_bytes(), "forecast.csv").unwrap();
        assert_eq!(rows[0].date, d(2024, 1, 1));
        assert!(rows[0].band_is_ordered());
    }

    #[test]
    fn forecast_keeps_out_of_order_bounds_unmodified() {
        let csv = "ds,yhat,yhat_lower,yhat_upper\n2024-01-01,120,150,140\n";
        let rows = load_forecast_from_reader(csv.as_bytes(), "forecast.csv").unwrap();
        assert!((rows[0].yhat_lower - 150.0).abs() < 1e-12);
        assert!((rows[0].yhat - 120.0).abs() < 1e-12);
        assert_eq!(band_violations(&rows), vec![d(2024, 1, 1)]);
    }

    #[test]
    fn transactions_use_named_columns_in_any_order() {
        let csv = concat!(
            "Row ID,Category,Order Date,Product Name,Sales,Profit\n",
            "1,Furniture,11/8/2016,\"Bush Somerset Collection Bookcase, Fully Assembled\",261.96,41.9136\n",
            "2,Office Supplies,6/12/2016,Labels,14.62,-6.87\n",
        );
        let rows = load_transactions_from_reader(csv.as_bytes(), "sales.csv").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].order_date, d(2016, 11, 8));
        assert_eq!(rows[0].category, "Furniture");
        assert!((rows[1].profit + 6.87).abs() < 1e-12);
    }

    #[test]
    fn headers_match_case_insensitively_and_strip_bom() {
        let csv = "\u{feff}DS , Y\n2024-01-01,1\n";
        let rows = load_daily_sales_from_reader(csv.as_bytes(), "daily.csv").unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn missing_column_is_fatal() {
        let csv = "ds,value\n2024-01-01,1\n";
        let err = load_daily_sales_from_reader(csv.as_bytes(), "daily.csv").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
        assert!(err.message().contains("`y`"));
    }

    #[test]
    fn malformed_date_names_file_line_and_column() {
        let csv = "ds,y\n2024-01-01,1\n2024-13-45,2\n";
        let err = load_daily_sales_from_reader(csv.as_bytes(), "daily.csv").unwrap_err();
        assert!(err.message().starts_with("daily.csv:3: column `ds`"), "{}", err.message());
    }

    #[test]
    fn malformed_number_is_fatal() {
        let csv = "ds,y\n2024-01-01,abc\n";
        let err = load_daily_sales_from_reader(csv.as_bytes(), "daily.csv").unwrap_err();
        assert!(err.message().contains("invalid number 'abc'"));
    }

    #[test]
    fn empty_file_with_headers_yields_no_rows() {
        let rows = load_daily_sales_from_reader("ds,y\n".as_bytes(), "daily.csv").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn latin1_bytes_decode_to_matching_code_points() {
        // "Café" with é = 0xE9 in ISO-8859-1.
        let bytes = [b'C', b'a', b'f', 0xE9];
        assert_eq!(decode_latin1(&bytes), "Café");
    }

    #[test]
    fn utf8_bom_files_decode_as_utf8() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("Café".as_bytes());
        assert_eq!(decode_latin1(&bytes), "Café");
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = load_daily_sales(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
    }
}

//! CSV trade import.
//!
//! The caller picks an [`ImportFormat`]; each format has its own column set
//! and mapping onto [`NewTrade`]. Every row is validated before anything is
//! returned, and a single bad row rejects the whole file.

pub mod service;
pub mod timestamp;

use chrono::{DateTime, Utc};
use kelly_journal_core::NewTrade;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::str::FromStr;
use thiserror::Error;

pub use service::{import_csv, ImportFailure, ImportSummary};
pub use timestamp::{parse_metatrader_timestamp, parse_timestamp};

/// Data rows are reported 1-based with the header counted as row 1.
const HEADER_ROWS: usize = 1;

/// Supported CSV layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    /// `Asset, EntryTimestamp, ExitTimestamp, PositionSize, Pnl`
    Generic,
    /// MetaTrader history export: `Symbol, Open Time, Close Time, Profit, Lots, Commission, Swap`
    #[serde(alias = "mt4", alias = "mt5")]
    MetaTrader,
}

impl ImportFormat {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::MetaTrader => "metatrader",
        }
    }

    /// Column names this format reads.
    #[must_use]
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::Generic => &["Asset", "EntryTimestamp", "ExitTimestamp", "PositionSize", "Pnl"],
            Self::MetaTrader => &[
                "Symbol",
                "Open Time",
                "Close Time",
                "Profit",
                "Lots",
                "Commission",
                "Swap",
            ],
        }
    }
}

impl fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generic" => Ok(Self::Generic),
            "metatrader" | "mt4" | "mt5" => Ok(Self::MetaTrader),
            other => Err(format!(
                "unknown import format '{other}' (expected 'generic' or 'metatrader')"
            )),
        }
    }
}

/// Validation problems for one CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// Line number in the file, header included
    pub row: usize,
    /// `"<Field>: <problem>"` messages
    pub errors: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("No file was uploaded.")]
    NoFile,

    #[error("Found {} errors in your CSV file. No trades were imported.", .0.len())]
    Validation(Vec<RowError>),

    #[error("CSV file was empty or contained no valid trades.")]
    Empty,

    #[error("Could not read CSV header: {0}")]
    Csv(#[from] csv::Error),
}

impl ImportError {
    /// Row reports, if this is a validation failure.
    #[must_use]
    pub fn row_errors(&self) -> &[RowError] {
        match self {
            Self::Validation(rows) => rows,
            _ => &[],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenericRow {
    #[serde(rename = "Asset", default)]
    asset: Option<String>,
    #[serde(rename = "EntryTimestamp", default)]
    entry_timestamp: Option<String>,
    #[serde(rename = "ExitTimestamp", default)]
    exit_timestamp: Option<String>,
    #[serde(rename = "PositionSize", default)]
    position_size: Option<String>,
    #[serde(rename = "Pnl", default)]
    pnl: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MetaTraderRow {
    #[serde(rename = "Symbol", default)]
    symbol: Option<String>,
    #[serde(rename = "Open Time", default)]
    open_time: Option<String>,
    #[serde(rename = "Close Time", default)]
    close_time: Option<String>,
    #[serde(rename = "Profit", default)]
    profit: Option<String>,
    #[serde(rename = "Lots", default)]
    lots: Option<String>,
    #[serde(rename = "Commission", default)]
    commission: Option<String>,
    #[serde(rename = "Swap", default)]
    swap: Option<String>,
}

/// Collects field-level messages for one row.
#[derive(Debug, Default)]
struct FieldCheck {
    errors: Vec<String>,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl FieldCheck {
    fn text(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match present(value) {
            Some(v) => Some(v.to_string()),
            None => {
                self.errors.push(format!("{field}: Required"));
                None
            }
        }
    }

    /// `blank` is used for an empty cell; `None` makes the cell required.
    fn decimal(&mut self, field: &str, value: Option<&str>, blank: Option<Decimal>) -> Option<Decimal> {
        let Some(raw) = present(value) else {
            if blank.is_none() {
                self.errors.push(format!("{field}: Required"));
            }
            return blank;
        };

        match Decimal::from_str(raw).or_else(|_| Decimal::from_scientific(raw)) {
            Ok(v) => Some(v),
            Err(_) => {
                self.errors
                    .push(format!("{field}: Expected number, received \"{raw}\""));
                None
            }
        }
    }

    fn non_negative(&mut self, field: &str, value: Option<Decimal>) -> Option<Decimal> {
        match value {
            Some(v) if v < Decimal::ZERO => {
                self.errors.push(format!("{field}: Must not be negative"));
                None
            }
            other => other,
        }
    }

    fn timestamp(
        &mut self,
        field: &str,
        value: Option<&str>,
        required: bool,
        parse: fn(&str) -> Option<DateTime<Utc>>,
    ) -> Option<DateTime<Utc>> {
        let Some(raw) = present(value) else {
            if required {
                self.errors.push(format!("{field}: Required"));
            }
            return None;
        };

        let parsed = parse(raw);
        if parsed.is_none() {
            self.errors.push(format!("{field}: Invalid date format"));
        }
        parsed
    }

    fn ordered(&mut self, field: &str, entry: DateTime<Utc>, exit: Option<DateTime<Utc>>, entry_field: &str) {
        if matches!(exit, Some(exit) if exit < entry) {
            self.errors
                .push(format!("{field}: Must not be before {entry_field}"));
        }
    }
}

impl GenericRow {
    fn validate(&self) -> Result<NewTrade, Vec<String>> {
        let mut check = FieldCheck::default();

        let asset = check.text("Asset", self.asset.as_deref());
        let entry = check.timestamp("EntryTimestamp", self.entry_timestamp.as_deref(), true, parse_timestamp);
        let exit = check.timestamp("ExitTimestamp", self.exit_timestamp.as_deref(), false, parse_timestamp);
        let size = check.decimal("PositionSize", self.position_size.as_deref(), None);
        let size = check.non_negative("PositionSize", size);
        let pnl = check.decimal("Pnl", self.pnl.as_deref(), None);
        if let Some(entry) = entry {
            check.ordered("ExitTimestamp", entry, exit, "EntryTimestamp");
        }

        match (asset, entry, size, pnl) {
            (Some(asset), Some(entry_timestamp), Some(position_size), Some(pnl))
                if check.errors.is_empty() =>
            {
                Ok(NewTrade {
                    asset,
                    entry_timestamp,
                    exit_timestamp: exit,
                    position_size,
                    pnl,
                })
            }
            _ => Err(check.errors),
        }
    }
}

impl MetaTraderRow {
    fn validate(&self) -> Result<NewTrade, Vec<String>> {
        let mut check = FieldCheck::default();

        let symbol = check.text("Symbol", self.symbol.as_deref());
        let open = check.timestamp("Open Time", self.open_time.as_deref(), true, parse_metatrader_timestamp);
        let close = check.timestamp("Close Time", self.close_time.as_deref(), true, parse_metatrader_timestamp);
        let profit = check.decimal("Profit", self.profit.as_deref(), None);
        let lots = check.decimal("Lots", self.lots.as_deref(), None);
        let lots = check.non_negative("Lots", lots);
        let commission = check.decimal("Commission", self.commission.as_deref(), Some(Decimal::ZERO));
        let swap = check.decimal("Swap", self.swap.as_deref(), Some(Decimal::ZERO));
        if let Some(open) = open {
            check.ordered("Close Time", open, close, "Open Time");
        }

        match (symbol, open, close, profit, lots, commission, swap) {
            (
                Some(asset),
                Some(entry_timestamp),
                Some(exit_timestamp),
                Some(profit),
                Some(position_size),
                Some(commission),
                Some(swap),
            ) if check.errors.is_empty() => Ok(NewTrade {
                asset,
                entry_timestamp,
                exit_timestamp: Some(exit_timestamp),
                position_size,
                pnl: profit + commission + swap,
            }),
            _ => Err(check.errors),
        }
    }
}

fn collect_rows<R, T>(
    reader: &mut csv::Reader<R>,
    validate: impl Fn(&T) -> Result<NewTrade, Vec<String>>,
) -> Result<Vec<NewTrade>, ImportError>
where
    R: Read,
    T: serde::de::DeserializeOwned,
{
    reader.headers()?;

    let mut trades = Vec::new();
    let mut row_errors = Vec::new();

    for (index, result) in reader.deserialize::<T>().enumerate() {
        let row = index + 1 + HEADER_ROWS;
        match result {
            Ok(record) => match validate(&record) {
                Ok(trade) => trades.push(trade),
                Err(errors) => row_errors.push(RowError { row, errors }),
            },
            Err(e) => row_errors.push(RowError {
                row,
                errors: vec![format!("Row: Could not be parsed ({e})")],
            }),
        }
    }

    if !row_errors.is_empty() {
        return Err(ImportError::Validation(row_errors));
    }
    if trades.is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(trades)
}

/// Parses and validates a whole CSV document.
///
/// # Errors
/// `Validation` with one entry per failing row, `Empty` when there are no
/// data rows, or `Csv` when the header cannot be read.
pub fn parse_trades<R: Read>(format: ImportFormat, input: R) -> Result<Vec<NewTrade>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    match format {
        ImportFormat::Generic => collect_rows(&mut reader, GenericRow::validate),
        ImportFormat::MetaTrader => collect_rows(&mut reader, MetaTraderRow::validate),
    }
}

/// [`parse_trades`] for text already in memory. Blank input is [`ImportError::NoFile`].
///
/// # Errors
/// See [`parse_trades`].
pub fn parse_trades_str(format: ImportFormat, text: &str) -> Result<Vec<NewTrade>, ImportError> {
    if text.trim().is_empty() {
        return Err(ImportError::NoFile);
    }
    parse_trades(format, text.as_bytes())
}

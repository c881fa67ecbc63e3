//! CSV price history: one `<SYMBOL>.csv` per ticker in a directory.
//!
//! Expected header: `date,open,high,low,close,volume`. Rows may be in any
//! order; they are sorted by date before the series is validated.

use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use scout_core::{Bar, PriceSeries};

use crate::provider::{DataError, PriceHistoryProvider};

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl From<CsvRow> for Bar {
    fn from(row: CsvRow) -> Self {
        Bar {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: if row.volume.is_finite() && row.volume > 0.0 {
                row.volume as u64
            } else {
                0
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct CsvPriceProvider {
    dir: PathBuf,
}

impl CsvPriceProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    fn read_bars(&self, symbol: &str, path: &Path) -> Result<Vec<Bar>, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| DataError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        let mut bars = Vec::new();
        for (line, record) in reader.deserialize::<CsvRow>().enumerate() {
            let row = record.map_err(|e| DataError::Malformed {
                symbol: symbol.to_string(),
                message: format!("row {}: {e}", line + 1),
            })?;
            bars.push(Bar::from(row));
        }
        Ok(bars)
    }
}

impl PriceHistoryProvider for CsvPriceProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn history(&self, symbol: &str, lookback: usize) -> Result<PriceSeries, DataError> {
        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let mut bars = self.read_bars(symbol, &path)?;
        if bars.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        }

        bars.sort_by_key(|b| b.date);
        if bars.len() > lookback {
            bars.drain(..bars.len() - lookback);
        }

        PriceSeries::new(symbol, bars).map_err(|source| DataError::Series {
            symbol: symbol.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_csv(dir: &Path, symbol: &str, body: &str) {
        fs::write(dir.join(format!("{symbol}.csv")), body).unwrap();
    }

    #[test]
    fn reads_and_trims_to_lookback() {
        let tmp = tempfile::tempdir().unwrap();
        write_csv(
            tmp.path(),
            "SPY",
            "date,open,high,low,close,volume\n\
             2024-01-03,101,102,100,101.5,2000\n\
             2024-01-02,100,101,99,100.5,1000\n\
             2024-01-04,102,103,101,102.5,3000.0\n",
        );

        let provider = CsvPriceProvider::new(tmp.path());
        let series = provider.history("SPY", 2).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![101.5, 102.5]);
        assert_eq!(series.last().unwrap().volume, 3000);
    }

    #[test]
    fn missing_file_is_no_data() {
        let tmp = tempfile::tempdir().unwrap();
        let err = CsvPriceProvider::new(tmp.path()).history("NOPE", 10).unwrap_err();
        assert!(matches!(err, DataError::NoData { .. }));
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        write_csv(
            tmp.path(),
            "DUP",
            "date,open,high,low,close,volume\n\
             2024-01-02,100,101,99,100,1\n\
             2024-01-02,100,101,99,100,1\n",
        );
        let err = CsvPriceProvider::new(tmp.path()).history("DUP", 10).unwrap_err();
        assert!(matches!(err, DataError::Series { .. }));
    }

    #[test]
    fn bad_row_is_malformed() {
        let tmp = tempfile::tempdir().unwrap();
        write_csv(
            tmp.path(),
            "BAD",
            "date,open,high,low,close,volume\n2024-01-02,abc,101,99,100,1\n",
        );
        let err = CsvPriceProvider::new(tmp.path()).history("BAD", 10).unwrap_err();
        assert!(matches!(err, DataError::Malformed { .. }));
    }
}

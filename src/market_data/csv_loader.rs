// src/market_data/csv_loader.rs
// CSV candle loader (time_ms,open,high,low,close,volume). Used for test
// fixtures and the CLI demo; live feeds are out of scope for the engine.

use std::fs::File;

use csv::ReaderBuilder;
use log::warn;

use crate::error::EngineError;
use crate::market_data::candles::{validate_series, Candle};

/// Load candles from a CSV file. Short or unparseable rows are skipped with
/// a warning; an empty result or a malformed series is an error.
pub fn load_candles(filename: &str) -> Result<Vec<Candle>, EngineError> {
    let file = File::open(filename)?;
    let mut rdr = ReaderBuilder::new()
        .flexible(true) // Handles varying column counts
        .trim(csv::Trim::All)
        .has_headers(true)
        .from_reader(file);

    let mut candles = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.len() < 6 {
            continue; // Skip short rows
        }

        let parsed = (
            record[0].parse::<i64>(),
            record[1].parse::<f64>(),
            record[2].parse::<f64>(),
            record[3].parse::<f64>(),
            record[4].parse::<f64>(),
            record[5].parse::<f64>(),
        );
        match parsed {
            (Ok(time_ms), Ok(open), Ok(high), Ok(low), Ok(close), Ok(volume)) => {
                candles.push(Candle {
                    time_ms,
                    open,
                    high,
                    low,
                    close,
                    volume,
                });
            }
            _ => {
                warn!("skipping unparseable candle row '{:?}'", record);
            }
        }
    }

    if candles.is_empty() {
        return Err(EngineError::invalid(
            "no valid candles parsed; check CSV format",
        ));
    }
    validate_series(&candles)?;
    Ok(candles)
}

//! The flight table: rows of `[start_lat, start_lng, end_lat, end_lng]` in degrees.

use std::ops::Range;
use std::str::FromStr;

use foundation::math::LatLng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub start: LatLng,
    pub end: LatLng,
}

#[derive(Debug, Error, PartialEq)]
pub enum FlightsError {
    #[error("flight table is not valid JSON: {0}")]
    Json(String),
    #[error("flight table must be an array of rows")]
    NotAnArray,
    #[error("no '[ ... ]' array found in flight script")]
    MissingArray,
    #[error("row {row}: expected 4 numbers, found {found}")]
    RowLength { row: usize, found: usize },
    #[error("row {row}: expected an array of 4 numbers, found {found}")]
    RowNotArray { row: usize, found: &'static str },
    #[error("row {row}: column {column} is not a finite number")]
    NonFinite { row: usize, column: usize },
    #[error("row {row}: latitude {value} outside [-90, 90]")]
    LatitudeOutOfRange { row: usize, value: f64 },
    #[error("row {row}: longitude {value} outside [-180, 360]")]
    LongitudeOutOfRange { row: usize, value: f64 },
    #[error("invalid flight range '{0}', expected START..END")]
    Range(String),
}

impl FlightRecord {
    pub fn new(start: LatLng, end: LatLng) -> Self {
        Self { start, end }
    }

    /// Validate one `[start_lat, start_lng, end_lat, end_lng]` row.
    pub fn from_row(row: usize, values: &[f64]) -> Result<Self, FlightsError> {
        let [start_lat, start_lng, end_lat, end_lng] = values else {
            return Err(FlightsError::RowLength {
                row,
                found: values.len(),
            });
        };

        for (column, v) in values.iter().enumerate() {
            if !v.is_finite() {
                return Err(FlightsError::NonFinite { row, column });
            }
        }
        for lat in [start_lat, end_lat] {
            if !(-90.0..=90.0).contains(lat) {
                return Err(FlightsError::LatitudeOutOfRange { row, value: *lat });
            }
        }
        for lng in [start_lng, end_lng] {
            if !(-180.0..=360.0).contains(lng) {
                return Err(FlightsError::LongitudeOutOfRange { row, value: *lng });
            }
        }

        Ok(Self::new(
            LatLng::new(*start_lat, *start_lng),
            LatLng::new(*end_lat, *end_lng),
        ))
    }

    pub fn to_row(self) -> [f64; 4] {
        [
            self.start.lat_deg,
            self.start.lng_deg,
            self.end.lat_deg,
            self.end.lng_deg,
        ]
    }
}

/// Parse a JSON array of 4-number rows.
pub fn parse_flights_json(text: &str) -> Result<Vec<FlightRecord>, FlightsError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| FlightsError::Json(e.to_string()))?;
    let rows = value.as_array().ok_or(FlightsError::NotAnArray)?;

    let mut flights = Vec::with_capacity(rows.len());
    for (row, entry) in rows.iter().enumerate() {
        let cells = entry.as_array().ok_or(FlightsError::RowNotArray {
            row,
            found: json_type(entry),
        })?;
        let mut values = Vec::with_capacity(cells.len());
        for (column, cell) in cells.iter().enumerate() {
            let v = cell
                .as_f64()
                .ok_or(FlightsError::NonFinite { row, column })?;
            values.push(v);
        }
        flights.push(FlightRecord::from_row(row, &values)?);
    }

    debug!(count = flights.len(), "parsed flight table");
    Ok(flights)
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Parse the script form `var flights = [ ... ];`.
///
/// Everything outside the outermost brackets is ignored and trailing commas
/// inside the array are tolerated.
pub fn parse_flights_script(text: &str) -> Result<Vec<FlightRecord>, FlightsError> {
    let start = text.find('[').ok_or(FlightsError::MissingArray)?;
    let end = text.rfind(']').ok_or(FlightsError::MissingArray)?;
    if end < start {
        return Err(FlightsError::MissingArray);
    }
    parse_flights_json(&strip_trailing_commas(&text[start..=end]))
}

/// Accept either JSON or the script form.
pub fn parse_flights(text: &str) -> Result<Vec<FlightRecord>, FlightsError> {
    if text.trim_start().starts_with('[') {
        parse_flights_json(text)
    } else {
        parse_flights_script(text)
    }
}

fn strip_trailing_commas(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut pending_comma = false;
    for c in src.chars() {
        match c {
            ',' => {
                if pending_comma {
                    out.push(',');
                }
                pending_comma = true;
            }
            c if c.is_whitespace() => {
                if !pending_comma {
                    out.push(c);
                }
            }
            ']' => {
                pending_comma = false;
                out.push(c);
            }
            c => {
                if pending_comma {
                    out.push(',');
                    pending_comma = false;
                }
                out.push(c);
            }
        }
    }
    out
}

/// Half-open slice of the flight table to display. `None` means "to the end".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlightRange {
    pub start: usize,
    pub end: Option<usize>,
}

impl FlightRange {
    pub fn all() -> Self {
        Self::default()
    }

    /// Concrete index range for a table of `len` rows, clamped to the table.
    pub fn resolve(&self, len: usize) -> Range<usize> {
        let end = self.end.unwrap_or(len).min(len);
        let start = self.start.min(end);
        start..end
    }

    pub fn apply<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.resolve(items.len())]
    }
}

impl FromStr for FlightRange {
    type Err = FlightsError;

    /// `START..END`, `START..`, or `..END`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || FlightsError::Range(s.to_string());
        let (a, b) = s.split_once("..").ok_or_else(bad)?;
        let start = if a.trim().is_empty() {
            0
        } else {
            a.trim().parse().map_err(|_| bad())?
        };
        let end = if b.trim().is_empty() {
            None
        } else {
            Some(b.trim().parse().map_err(|_| bad())?)
        };
        if matches!(end, Some(e) if e < start) {
            return Err(bad());
        }
        Ok(Self { start, end })
    }
}

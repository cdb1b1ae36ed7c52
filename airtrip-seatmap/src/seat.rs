use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a single seat, stored as one character inside a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeatStatus {
    Available,
    Ordered,
    #[serde(rename = "Not available")]
    NotAvailable,
    #[serde(rename = "Not exist")]
    NotExist,
}

impl SeatStatus {
    pub const ALL: [SeatStatus; 4] = [
        SeatStatus::Available,
        SeatStatus::Ordered,
        SeatStatus::NotAvailable,
        SeatStatus::NotExist,
    ];

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'O' => Some(SeatStatus::Available),
            '$' => Some(SeatStatus::Ordered),
            'X' => Some(SeatStatus::NotAvailable),
            '_' => Some(SeatStatus::NotExist),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            SeatStatus::Available => 'O',
            SeatStatus::Ordered => '$',
            SeatStatus::NotAvailable => 'X',
            SeatStatus::NotExist => '_',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SeatStatus::Available => "Available",
            SeatStatus::Ordered => "Ordered",
            SeatStatus::NotAvailable => "Not available",
            SeatStatus::NotExist => "Not exist",
        }
    }

    /// Hidden seats keep their slot in the row encoding but never show up in listings.
    pub fn is_visible(self) -> bool {
        matches!(self, SeatStatus::Available | SeatStatus::Ordered)
    }
}

impl fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Seat identifier in `<column-letter><row-number>` form, e.g. `A21`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeatId {
    pub column: char,
    pub row: u32,
}

impl SeatId {
    pub fn new(column: char, row: u32) -> Self {
        Self { column, row }
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid seat identifier: {0:?}")]
pub struct ParseSeatIdError(pub String);

impl FromStr for SeatId {
    type Err = ParseSeatIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseSeatIdError(s.to_string());

        let mut chars = s.chars();
        let column = chars.next().filter(|c| c.is_ascii_uppercase()).ok_or_else(invalid)?;
        let digits = chars.as_str();

        // u32::from_str accepts a leading '+', which is not part of the format
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        // Only the canonical spelling names a seat, so `A021` is not `A21`
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(invalid());
        }
        let row = digits.parse::<u32>().map_err(|_| invalid())?;

        Ok(SeatId { column, row })
    }
}

impl Serialize for SeatId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SeatId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

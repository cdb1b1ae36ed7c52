use crate::seat::{SeatId, SeatStatus};
use serde::Serialize;
use std::fmt;

/// One cabin row. `seats` holds one status code per column of the owning block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub num: u32,
    seats: String,
}

impl Row {
    pub fn new(num: u32, seats: impl Into<String>) -> Self {
        Self { num, seats: seats.into() }
    }

    /// Raw status encoding, one character per column.
    pub fn seats(&self) -> &str {
        &self.seats
    }

    pub fn status_at(&self, column_index: usize) -> Option<SeatStatus> {
        self.seats
            .as_bytes()
            .get(column_index)
            .and_then(|b| SeatStatus::from_code(*b as char))
    }

    /// Rewrites the code at `column_index`. Only called on validated rows,
    /// which are guaranteed to be ASCII.
    pub(crate) fn set_status(&mut self, column_index: usize, status: SeatStatus) {
        let mut code = [0u8; 4];
        self.seats
            .replace_range(column_index..column_index + 1, status.code().encode_utf8(&mut code));
    }
}

/// Inclusive row bound of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowRange {
    pub low: u32,
    pub high: u32,
}

impl RowRange {
    pub fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, row: u32) -> bool {
        self.low <= row && row <= self.high
    }

    fn overlaps(&self, other: &RowRange) -> bool {
        self.low <= other.high && other.low <= self.high
    }
}

/// A contiguous range of rows sharing one column layout and cabin class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatMapBlock {
    label: String,
    column_order: Vec<char>,
    row_range: RowRange,
    rows: Vec<Row>,
}

impl SeatMapBlock {
    pub fn new(
        label: impl Into<String>,
        column_order: &str,
        row_range: RowRange,
        rows: Vec<Row>,
    ) -> Result<Self, SeatMapError> {
        let label = label.into();
        let column_order: Vec<char> = column_order.chars().collect();

        if row_range.low > row_range.high {
            return Err(SeatMapError::InvertedRange {
                label,
                low: row_range.low,
                high: row_range.high,
            });
        }

        for (i, column) in column_order.iter().enumerate() {
            // Every column must be reachable through a parsed `SeatId`
            if !column.is_ascii_uppercase() || column_order[..i].contains(column) {
                return Err(SeatMapError::InvalidColumn { label, column: *column });
            }
        }

        let mut previous: Option<u32> = None;
        for row in &rows {
            if !row_range.contains(row.num) {
                return Err(SeatMapError::RowOutOfRange { label, row: row.num });
            }
            if previous.is_some_and(|p| p >= row.num) {
                return Err(SeatMapError::RowsNotAscending { label, row: row.num });
            }
            if let Some(code) = row.seats.chars().find(|c| SeatStatus::from_code(*c).is_none()) {
                return Err(SeatMapError::UnknownStatus { row: row.num, code });
            }
            if row.seats.len() != column_order.len() {
                return Err(SeatMapError::RowWidth {
                    row: row.num,
                    expected: column_order.len(),
                    actual: row.seats.chars().count(),
                });
            }
            previous = Some(row.num);
        }

        Ok(Self { label, column_order, row_range, rows })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn column_order(&self) -> &[char] {
        &self.column_order
    }

    pub fn row_range(&self) -> RowRange {
        self.row_range
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    fn column_index(&self, column: char) -> Option<usize> {
        self.column_order.iter().position(|c| *c == column)
    }

    fn row_index(&self, num: u32) -> Option<usize> {
        self.rows.binary_search_by_key(&num, |row| row.num).ok()
    }

    fn seats(&self) -> impl Iterator<Item = (SeatId, SeatStatus)> + '_ {
        self.rows.iter().flat_map(move |row| {
            self.column_order
                .iter()
                .enumerate()
                .filter_map(move |(i, column)| {
                    row.status_at(i).map(|status| (SeatId::new(*column, row.num), status))
                })
        })
    }
}

/// Index triple of a resolved seat: (block, row within block, column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SeatPosition {
    pub block: usize,
    pub row: usize,
    pub column: usize,
}

/// Full cabin layout of a single trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatMap {
    blocks: Vec<SeatMapBlock>,
}

impl SeatMap {
    pub fn new(blocks: Vec<SeatMapBlock>) -> Result<Self, SeatMapError> {
        for (i, a) in blocks.iter().enumerate() {
            for b in &blocks[i + 1..] {
                if a.row_range.overlaps(&b.row_range) {
                    return Err(SeatMapError::OverlappingBlocks {
                        first: a.label.clone(),
                        second: b.label.clone(),
                    });
                }
            }
        }
        Ok(Self { blocks })
    }

    pub fn blocks(&self) -> &[SeatMapBlock] {
        &self.blocks
    }

    /// Column letters across all blocks, in first-seen order.
    pub fn literas(&self) -> Vec<char> {
        let mut literas = Vec::new();
        for column in self.blocks.iter().flat_map(|b| b.column_order.iter()) {
            if !literas.contains(column) {
                literas.push(*column);
            }
        }
        literas
    }

    pub fn block_for_row(&self, row: u32) -> Option<&SeatMapBlock> {
        self.blocks.iter().find(|b| b.row_range.contains(row))
    }

    pub(crate) fn locate(&self, seat: SeatId) -> Option<SeatPosition> {
        let block = self.blocks.iter().position(|b| b.row_range.contains(seat.row))?;
        let column = self.blocks[block].column_index(seat.column)?;
        let row = self.blocks[block].row_index(seat.row)?;
        Some(SeatPosition { block, row, column })
    }

    pub(crate) fn status_at(&self, pos: SeatPosition) -> Option<SeatStatus> {
        self.blocks[pos.block].rows[pos.row].status_at(pos.column)
    }

    pub(crate) fn set_status_at(&mut self, pos: SeatPosition, status: SeatStatus) {
        self.blocks[pos.block].rows[pos.row].set_status(pos.column, status);
    }

    /// Raw status of any seat present in the encoding, hidden ones included.
    pub fn status(&self, seat: SeatId) -> Option<SeatStatus> {
        self.locate(seat).and_then(|pos| self.status_at(pos))
    }

    /// Every encoded position, hidden seats included, in block → row → column order.
    pub fn statuses(&self) -> Vec<(SeatId, SeatStatus)> {
        self.blocks.iter().flat_map(|b| b.seats()).collect()
    }

    pub fn count(&self, status: SeatStatus) -> usize {
        self.blocks
            .iter()
            .flat_map(|b| b.seats())
            .filter(|(_, s)| *s == status)
            .count()
    }

    /// Externally visible seats only.
    pub fn listing(&self) -> Vec<SeatView> {
        self.blocks
            .iter()
            .flat_map(|b| {
                b.seats()
                    .filter(|(_, status)| status.is_visible())
                    .map(move |(id, status)| SeatView { id, rank: b.label.clone(), status })
            })
            .collect()
    }

    /// Row-aligned view for rendering; hidden seats become `None` cells.
    pub fn grid(&self) -> SeatMapView {
        let blocks = self
            .blocks
            .iter()
            .map(|b| BlockView {
                label: b.label.clone(),
                literas: b.column_order.clone(),
                rows: b
                    .rows
                    .iter()
                    .map(|row| RowView {
                        num: row.num,
                        seats: b
                            .column_order
                            .iter()
                            .enumerate()
                            .map(|(i, column)| {
                                row.status_at(i).filter(|s| s.is_visible()).map(|status| SeatView {
                                    id: SeatId::new(*column, row.num),
                                    rank: b.label.clone(),
                                    status,
                                })
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        SeatMapView { literas: self.literas(), blocks }
    }
}

impl fmt::Display for SeatMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.literas().iter().collect::<String>())?;
        for block in &self.blocks {
            writeln!(f, "{}", block.label)?;
            for row in &block.rows {
                writeln!(f, "{} {}", row.num, row.seats)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatView {
    pub id: SeatId,
    pub rank: String,
    pub status: SeatStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    pub num: u32,
    pub seats: Vec<Option<SeatView>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockView {
    pub label: String,
    pub literas: Vec<char>,
    pub rows: Vec<RowView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatMapView {
    pub literas: Vec<char>,
    pub blocks: Vec<BlockView>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeatMapError {
    #[error("Row {row} has {actual} seats, block expects {expected}")]
    RowWidth { row: u32, expected: usize, actual: usize },

    #[error("Row {row} lies outside the range of block {label}")]
    RowOutOfRange { label: String, row: u32 },

    #[error("Rows of block {label} are not ascending at row {row}")]
    RowsNotAscending { label: String, row: u32 },

    #[error("Block {label} has an inverted row range {low}..={high}")]
    InvertedRange { label: String, low: u32, high: u32 },

    #[error("Blocks {first} and {second} have overlapping row ranges")]
    OverlappingBlocks { first: String, second: String },

    #[error("Unknown seat status code {code:?} in row {row}")]
    UnknownStatus { row: u32, code: char },

    #[error("Block {label} has an unusable or repeated column letter {column:?}")]
    InvalidColumn { label: String, column: char },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_block() -> SeatMapBlock {
        SeatMapBlock::new(
            "first",
            "ABC",
            RowRange::new(1, 3),
            vec![Row::new(1, "O_X"), Row::new(3, "$OO")],
        )
        .unwrap()
    }

    #[test]
    fn test_block_validation() {
        let width = SeatMapBlock::new("b", "AB", RowRange::new(1, 2), vec![Row::new(1, "OOO")]);
        assert!(matches!(width, Err(SeatMapError::RowWidth { row: 1, expected: 2, actual: 3 })));

        let outside = SeatMapBlock::new("b", "AB", RowRange::new(1, 2), vec![Row::new(5, "OO")]);
        assert!(matches!(outside, Err(SeatMapError::RowOutOfRange { row: 5, .. })));

        let unordered = SeatMapBlock::new(
            "b",
            "AB",
            RowRange::new(1, 5),
            vec![Row::new(2, "OO"), Row::new(2, "OO")],
        );
        assert!(matches!(unordered, Err(SeatMapError::RowsNotAscending { row: 2, .. })));

        let inverted = SeatMapBlock::new("b", "AB", RowRange::new(4, 2), vec![]);
        assert!(matches!(inverted, Err(SeatMapError::InvertedRange { .. })));

        let unknown = SeatMapBlock::new("b", "AB", RowRange::new(1, 2), vec![Row::new(1, "O?")]);
        assert!(matches!(unknown, Err(SeatMapError::UnknownStatus { row: 1, code: '?' })));
    }

    #[test]
    fn test_column_letters_validated() {
        let repeated = SeatMapBlock::new("b", "ABA", RowRange::new(1, 2), vec![Row::new(1, "OOO")]);
        assert!(matches!(repeated, Err(SeatMapError::InvalidColumn { column: 'A', .. })));

        let lowercase = SeatMapBlock::new("b", "Ab", RowRange::new(1, 2), vec![Row::new(1, "OO")]);
        assert!(matches!(lowercase, Err(SeatMapError::InvalidColumn { column: 'b', .. })));

        let non_ascii = SeatMapBlock::new("b", "AÉ", RowRange::new(1, 2), vec![]);
        assert!(matches!(non_ascii, Err(SeatMapError::InvalidColumn { column: 'É', .. })));
    }

    #[test]
    fn test_overlapping_blocks_rejected() {
        let second = SeatMapBlock::new("second", "AB", RowRange::new(3, 6), vec![]).unwrap();
        let result = SeatMap::new(vec![small_block(), second]);
        assert!(matches!(result, Err(SeatMapError::OverlappingBlocks { .. })));
    }

    #[test]
    fn test_lookup_and_views() {
        let map = SeatMap::new(vec![small_block()]).unwrap();

        assert_eq!(map.status(SeatId::new('A', 1)), Some(SeatStatus::Available));
        assert_eq!(map.status(SeatId::new('B', 1)), Some(SeatStatus::NotExist));
        assert_eq!(map.status(SeatId::new('A', 3)), Some(SeatStatus::Ordered));
        // Row 2 is inside the range but has no encoding
        assert_eq!(map.status(SeatId::new('A', 2)), None);
        assert_eq!(map.status(SeatId::new('D', 1)), None);

        let listing: Vec<String> = map.listing().iter().map(|s| s.id.to_string()).collect();
        assert_eq!(listing, vec!["A1", "A3", "B3", "C3"]);

        let grid = map.grid();
        assert_eq!(grid.literas, vec!['A', 'B', 'C']);
        let first_row = &grid.blocks[0].rows[0].seats;
        assert_eq!(first_row.len(), 3);
        assert!(first_row[0].is_some());
        assert!(first_row[1].is_none());
        assert!(first_row[2].is_none());
    }

    #[test]
    fn test_display() {
        let map = SeatMap::new(vec![small_block()]).unwrap();
        assert_eq!(map.to_string(), "ABC\nfirst\n1 O_X\n3 $OO\n");
    }
}

use crate::layout::{Row, RowRange, SeatMap, SeatMapBlock};

/// Column letters of the cabin; `I` is skipped as on the real aircraft.
pub const LITERAS: &str = "ABCDEFGHJK";

pub const BUSINESS_CLASS: &str = "business_class";
pub const PREMIUM_ECONOMY: &str = "premium_economy";
pub const ECONOMY_CLASS: &str = "economy_class";

/// Builds the fixed B787-10 cabin layout.
///
/// Every call returns a fresh map; nothing is shared between instances.
pub fn generate_seat_map() -> SeatMap {
    let business = {
        let mut rows = vec![Row::new(1, "O_X____O_X")];
        rows.extend((2..=9).map(|num| {
            let seats = if num % 2 == 0 { "X_OXOXOX_O" } else { "O_XOXOXO_X" };
            Row::new(num, seats)
        }));
        rows.push(Row::new(10, "X_OXOXOX_O"));
        rows
    };

    let premium: Vec<Row> = (15..=17).map(|num| Row::new(num, "O_OO_OOO_O")).collect();

    let economy = {
        let mut rows = vec![Row::new(20, "___O_OO___")];
        rows.extend((21..=30).map(|num| Row::new(num, "OOOO_OOOOO")));
        rows.extend((31..=33).map(|num| Row::new(num, "OOO____OOO")));
        rows.extend((34..=46).map(|num| Row::new(num, "OOOO_OOOOO")));
        rows.push(Row::new(47, "O_OO_OOO_O"));
        rows
    };

    let blocks = [
        (BUSINESS_CLASS, RowRange::new(1, 10), business),
        (PREMIUM_ECONOMY, RowRange::new(15, 17), premium),
        (ECONOMY_CLASS, RowRange::new(20, 47), economy),
    ];

    let blocks = blocks
        .into_iter()
        .map(|(label, range, rows)| {
            SeatMapBlock::new(label, LITERAS, range, rows)
                .unwrap_or_else(|e| unreachable!("static cabin template is invalid: {e}"))
        })
        .collect();

    SeatMap::new(blocks).unwrap_or_else(|e| unreachable!("static cabin template is invalid: {e}"))
}

use std::cmp::Ordering;

use crate::frame::FrameTable;

/// Slot order that puts persons left to right by mean x-position.
///
/// The sort is stable; persons without any x-position go last.
pub fn x_position_order(table: &FrameTable) -> Vec<usize> {
    let mut order: Vec<(usize, Option<f32>)> = (0..table.num_persons())
        .map(|p| (p, table.mean_x(p)))
        .collect();

    order.sort_by(|(_, a), (_, b)| match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    order.into_iter().map(|(p, _)| p).collect()
}

/// Relabels persons so that slot 0 is the leftmost figure.
pub fn sort_by_x_position(table: FrameTable) -> FrameTable {
    let order = x_position_order(&table);

    if order.iter().enumerate().all(|(i, &p)| i == p) {
        return table;
    }

    table.select_persons(&order)
}

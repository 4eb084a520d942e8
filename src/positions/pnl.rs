use crate::models::position::Direction;

/// Linear unrealized P&L at `current` for a position entered at `entry`.
///
/// Longs profit as price rises, shorts as it falls; leverage scales the
/// result linearly. Zero exactly at the entry price.
pub fn unrealized_pnl(
    direction: Direction,
    entry: f64,
    current: f64,
    quantity: f64,
    leverage: f64,
) -> f64 {
    let delta = match direction {
        Direction::Long => current - entry,
        Direction::Short => entry - current,
    };
    delta * quantity * leverage
}

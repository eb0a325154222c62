/// Interaction rules: pickup, trap detection/springing, decoy, scan.
///
/// Pure over the entity collections they are handed. Each rule mutates at
/// most one entity's active state and returns the score delta; the session
/// is the only place a delta is applied.
///
/// Pickup and decoy landing test the player's own position. Trap rules test
/// an adjacent offset ("look before you leap"). Scan tests the four
/// one-cell neighbours for the decoy only.

use super::entity::{Decoy, Direction, Token};
use super::geometry::Point;

/// Consume the first active prize under `pos`.
/// Returns `+prize_val` on success, `-prize_val` if nothing is there.
pub fn pickup_prize(prizes: &mut [Token], pos: Point, prize_val: i32) -> i32 {
    match prizes.iter_mut().find(|p| p.covers(pos)) {
        Some(prize) => {
            prize.consume();
            prize_val
        }
        None => -prize_val,
    }
}

/// Is there an active trap at `pos + offset`?
pub fn is_trap(traps: &[Token], pos: Point, (dx, dy): (i32, i32)) -> bool {
    let target = pos.offset(dx, dy);
    traps.iter().any(|t| t.covers(target))
}

/// Spring the first active trap at `pos + offset`.
/// Returns `+trap_val` when a trap is sprung, `-trap_val` otherwise
/// (including when the only trap there was already sprung).
pub fn spring_trap(traps: &mut [Token], pos: Point, (dx, dy): (i32, i32), trap_val: i32) -> i32 {
    let target = pos.offset(dx, dy);
    match traps.iter_mut().find(|t| t.covers(target)) {
        Some(trap) => {
            trap.consume();
            trap_val
        }
        None => -trap_val,
    }
}

/// Is the player standing on the active decoy?
pub fn is_on_decoy(decoy: &Decoy, pos: Point) -> bool {
    decoy.covers(pos)
}

/// Disarm the decoy. Only allowed while standing on it; no score change.
pub fn disarm_decoy(decoy: &mut Decoy, pos: Point) -> bool {
    if !is_on_decoy(decoy, pos) {
        return false;
    }
    decoy.active = false;
    true
}

/// Does the active decoy occupy any of the four cells next to `pos`?
pub fn decoy_ahead(decoy: &Decoy, pos: Point, space_size: i32) -> bool {
    Direction::ALL.iter().any(|d| {
        let (ux, uy) = d.unit();
        decoy.covers(pos.offset(ux * space_size, uy * space_size))
    })
}

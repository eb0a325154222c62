/// Intents the front-end submits, and the typed outcomes it gets back.
///
/// Rejections are outcomes, not errors: every intent returns a `Reason`
/// and the score delta that was applied.

use serde::Serialize;

use crate::config::GridSpec;
use crate::domain::entity::{Direction, Stride};
use crate::domain::geometry::Point;

use super::event::GameEvent;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intent {
    Move { dir: Direction, stride: Stride },
    Pickup,
    /// Spring a trap in the adjacent cell.
    SpringTrap(Direction),
    Disarm,
    Scan,
    /// One real-time countdown unit elapsed.
    Tick,
    Replay,
    End,
    /// Replay plus fresh resources and phase.
    Restart,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Reason {
    Moved,
    HitWall,
    OffGrid,
    PrizeCollected,
    NoPrize,
    DecoyCollected,
    TrapSprung,
    NoTrap,
    Disarmed,
    NotOnDecoy,
    Scanned { decoy_ahead: bool },
    NoScansLeft,
    Ticked,
    Replayed(Verdict),
    Ended(Verdict),
    Restarted,
    /// The session is over; the intent had no effect.
    Ignored,
}

impl Reason {
    /// Human-readable text for the front-end's message line.
    pub fn message(&self) -> &'static str {
        match self {
            Reason::Moved => "",
            Reason::HitWall => "A wall is in the way!",
            Reason::OffGrid => "Off the grid!",
            Reason::PrizeCollected => "You picked up a coin!",
            Reason::NoPrize => "No coin here!",
            Reason::DecoyCollected => "It's a trap! That coin is fake.",
            Reason::TrapSprung => "Trap sprung!",
            Reason::NoTrap => "There is no trap there to spring.",
            Reason::Disarmed => "Trap disarmed and fake coin removed!",
            Reason::NotOnDecoy => "Nothing to disarm here.",
            Reason::Scanned { decoy_ahead: true } => "Scan: FAKE COIN detected ahead!",
            Reason::Scanned { decoy_ahead: false } => "Scan: no fake coin ahead.",
            Reason::NoScansLeft => "No scans left!",
            Reason::Ticked => "",
            Reason::Replayed(Verdict::Escaped) => "Board reset. You made it to the far wall!",
            Reason::Replayed(Verdict::Trapped) => "Board reset. You never reached the far wall.",
            Reason::Ended(Verdict::Escaped) => "You made it out!",
            Reason::Ended(Verdict::Trapped) => "Game ended short of the far wall.",
            Reason::Restarted => "New round: same board, fresh resources.",
            Reason::Ignored => "",
        }
    }
}

/// Result of the far-wall goal test performed by Replay and End.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Escaped,
    Trapped,
}

impl Verdict {
    /// Escaped iff `x` is strictly past `W − 2·space_size`.
    pub fn at(pos: Point, grid: &GridSpec) -> Self {
        if pos.x > grid.goal_x() {
            Verdict::Escaped
        } else {
            Verdict::Trapped
        }
    }

    pub fn is_win(self) -> bool {
        self == Verdict::Escaped
    }

    /// Signed end value: `+end_val` for escaping, `-end_val` otherwise.
    pub fn score(self, end_val: i32) -> i32 {
        match self {
            Verdict::Escaped => end_val,
            Verdict::Trapped => -end_val,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub reason: Reason,
    pub score_delta: i32,
    pub events: Vec<GameEvent>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MoveReport {
    pub penalty: i32,
    pub accepted: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PickupReport {
    pub score_delta: i32,
    pub found: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScanResult {
    Detected { decoy_ahead: bool },
    /// No scan charges left.
    Refused,
    /// The session is over; nothing was spent.
    Ignored,
}

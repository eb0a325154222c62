/// Events emitted while processing an intent.
/// The presentation layer consumes these for messages and sound.

use crate::domain::geometry::Point;

use super::session::Phase;
use super::intent::Verdict;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PlayerMoved { to: Point },
    HitWall,
    WentOffGrid,
    PrizePicked { at: Point },
    EmptyPickup,
    TrapSprung { at: Point },
    DecoyTriggered,
    DecoyDisarmed,
    Scanned { decoy_ahead: bool },
    ScanRefused,
    TimeExpired,
    AllPrizesCollected,
    BoardReset { verdict: Verdict },
    SessionEnded { verdict: Verdict },
    PhaseChanged { phase: Phase },
}

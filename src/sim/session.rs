/// GameSession: the authoritative state of one game.
///
/// Owns the board, the player and the four resources. The front-end never
/// touches any of them directly: it submits an `Intent` through `apply`
/// (or one of the typed wrappers below) and reads back a snapshot.
///
/// Processing order for every intent:
///   1. Replay / End / Restart are always honoured
///   2. Anything else is ignored once the session is over
///   3. Rule resolution (movement or interaction) → reason + score delta
///   4. Score delta applied
///   5. Phase transition check
///
/// ## Phase transitions (checked in priority order, from Playing only)
/// ┌──────────────────────────────┬──────────────┐
/// │ Condition                     │ New phase    │
/// ├──────────────────────────────┼──────────────┤
/// │ score ≤ 0                     │ LostScore    │
/// │ moves_left ≤ 0                │ LostMoves    │
/// │ time expired                  │ LostTime     │
/// │ every prize consumed          │ Won          │
/// │ otherwise                     │ Playing      │
/// └──────────────────────────────┴──────────────┘

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{GameConfig, GridSpec, ResourceConfig, ScoringConfig};
use crate::domain::board::{self, Board};
use crate::domain::entity::{Direction, Player, Stride};
use crate::domain::interaction;
use crate::domain::movement::{self, MoveResolution};
use crate::error::ConfigError;

use super::event::GameEvent;
use super::intent::{Intent, MoveReport, Outcome, PickupReport, Reason, ScanResult, Verdict};
use super::snapshot::SessionSnapshot;

/// Driven by resources and prizes only. End leaves the phase alone: an ended
/// session can still read `Playing`, with `is_ended()` set and the far-wall
/// verdict as its result.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Playing,
    Won,
    LostScore,
    LostMoves,
    LostTime,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        self != Phase::Playing
    }
}

/// Depleting / counting quantities of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resources {
    pub score: i32,
    pub moves_left: i32,
    pub time_left: i32,
    pub scans_left: u32,
    pub time_expired: bool,
}

impl From<&ResourceConfig> for Resources {
    fn from(cfg: &ResourceConfig) -> Self {
        Resources {
            score: cfg.score,
            moves_left: cfg.moves,
            time_left: cfg.time,
            scans_left: cfg.scans,
            time_expired: false,
        }
    }
}

pub struct GameSession {
    grid: GridSpec,
    scoring: ScoringConfig,
    initial: ResourceConfig,
    board: Board,
    player: Player,
    resources: Resources,
    phase: Phase,
    ended: bool,
}

// ── Construction ──

impl GameSession {
    /// Generate a board from `config` using the given random source.
    pub fn new<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Result<Self, ConfigError> {
        let board = board::generate(&config.board, &config.grid, rng)?;
        Ok(GameSession::from_board(board, config))
    }

    /// Seeded when `config.seed` is set, OS entropy otherwise.
    pub fn from_config(config: &GameConfig) -> Result<Self, ConfigError> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        GameSession::new(config, &mut rng)
    }

    /// Start a session on an existing board.
    pub fn from_board(board: Board, config: &GameConfig) -> Self {
        GameSession {
            grid: config.grid.clone(),
            scoring: config.scoring.clone(),
            initial: config.resources.clone(),
            board,
            player: Player::new(config.grid.start()),
            resources: Resources::from(&config.resources),
            phase: Phase::Playing,
            ended: false,
        }
    }
}

// ── Read-only queries ──

impl GameSession {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Terminal phase reached, or End was requested.
    pub fn is_over(&self) -> bool {
        self.phase.is_terminal() || self.ended
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    pub fn is_on_decoy(&self) -> bool {
        interaction::is_on_decoy(&self.board.decoy, self.player.pos)
    }

    /// Is there an active trap one cell away in `dir`?
    pub fn is_trap_ahead(&self, dir: Direction) -> bool {
        interaction::is_trap(&self.board.traps, self.player.pos, self.cell_offset(dir))
    }

    /// Far-wall verdict for the current position.
    pub fn verdict(&self) -> Verdict {
        Verdict::at(self.player.pos, &self.grid)
    }

    /// One-line result for the closing summary.
    pub fn summary(&self) -> String {
        match self.phase {
            Phase::Playing if self.ended => format!("ended, {:?}", self.verdict()),
            phase => format!("{phase:?}"),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }

    fn cell_offset(&self, dir: Direction) -> (i32, i32) {
        let (ux, uy) = dir.unit();
        (ux * self.grid.space_size, uy * self.grid.space_size)
    }
}

// ── Typed intent wrappers ──

impl GameSession {
    pub fn move_player(&mut self, dir: Direction, stride: Stride) -> MoveReport {
        let out = self.apply(Intent::Move { dir, stride });
        MoveReport {
            penalty: out.score_delta,
            accepted: out.reason == Reason::Moved,
        }
    }

    pub fn pickup(&mut self) -> PickupReport {
        let out = self.apply(Intent::Pickup);
        PickupReport {
            score_delta: out.score_delta,
            found: out.reason == Reason::PrizeCollected,
        }
    }

    /// Returns the score delta of the spring attempt.
    pub fn spring_trap(&mut self, dir: Direction) -> i32 {
        self.apply(Intent::SpringTrap(dir)).score_delta
    }

    pub fn disarm_decoy(&mut self) -> bool {
        self.apply(Intent::Disarm).reason == Reason::Disarmed
    }

    pub fn scan(&mut self) -> ScanResult {
        match self.apply(Intent::Scan).reason {
            Reason::Scanned { decoy_ahead } => ScanResult::Detected { decoy_ahead },
            Reason::NoScansLeft => ScanResult::Refused,
            _ => ScanResult::Ignored,
        }
    }

    pub fn tick(&mut self) {
        self.apply(Intent::Tick);
    }

    pub fn replay(&mut self) -> Verdict {
        match self.apply(Intent::Replay).reason {
            Reason::Replayed(v) => v,
            _ => self.verdict(),
        }
    }

    pub fn end(&mut self) -> Verdict {
        match self.apply(Intent::End).reason {
            Reason::Ended(v) => v,
            _ => self.verdict(),
        }
    }

    pub fn restart(&mut self) {
        self.apply(Intent::Restart);
    }
}

// ── Intent processing ──

impl GameSession {
    /// Process one intent to completion.
    pub fn apply(&mut self, intent: Intent) -> Outcome {
        let mut events = Vec::new();

        let (reason, score_delta) = match intent {
            Intent::Replay => (Reason::Replayed(self.reset_board(&mut events)), 0),
            Intent::End => (Reason::Ended(self.finish(&mut events)), 0),
            Intent::Restart => {
                self.restart_round(&mut events);
                (Reason::Restarted, 0)
            }
            _ if self.is_over() => (Reason::Ignored, 0),
            Intent::Move { dir, stride } => self.resolve_move(dir, stride, &mut events),
            Intent::Pickup => self.resolve_pickup(&mut events),
            Intent::SpringTrap(dir) => self.resolve_spring(dir, &mut events),
            Intent::Disarm => self.resolve_disarm(&mut events),
            Intent::Scan => self.resolve_scan(&mut events),
            Intent::Tick => self.resolve_tick(&mut events),
        };

        self.resources.score += score_delta;
        self.check_phase(&mut events);

        debug!(
            ?intent,
            ?reason,
            score_delta,
            score = self.resources.score,
            moves_left = self.resources.moves_left,
            time_left = self.resources.time_left,
            x = self.player.pos.x,
            y = self.player.pos.y,
            "intent processed"
        );

        Outcome { reason, score_delta, events }
    }

    fn resolve_move(&mut self, dir: Direction, stride: Stride, events: &mut Vec<GameEvent>) -> (Reason, i32) {
        // Every attempt counts, whatever the outcome.
        self.player.steps += 1;
        self.player.facing = dir;
        self.resources.moves_left -= 1;

        let (ux, uy) = self.cell_offset(dir);
        let n = stride.cells();
        let resolution = movement::resolve_move(
            self.player.pos,
            (ux * n, uy * n),
            &self.board.walls,
            &self.grid,
            &self.scoring,
        );

        match resolution {
            MoveResolution::Accepted(to) => {
                self.player.pos = to;
                events.push(GameEvent::PlayerMoved { to });
                (Reason::Moved, 0)
            }
            MoveResolution::Blocked { penalty } => {
                events.push(GameEvent::HitWall);
                (Reason::HitWall, penalty)
            }
            MoveResolution::OffGrid { penalty } => {
                events.push(GameEvent::WentOffGrid);
                (Reason::OffGrid, penalty)
            }
        }
    }

    fn resolve_pickup(&mut self, events: &mut Vec<GameEvent>) -> (Reason, i32) {
        // The decoy is checked first: grabbing it is always a penalty.
        if self.is_on_decoy() {
            events.push(GameEvent::DecoyTriggered);
            return (Reason::DecoyCollected, -self.scoring.decoy_val);
        }

        let at = self.player.pos;
        let delta = interaction::pickup_prize(&mut self.board.prizes, at, self.scoring.prize_val);
        if delta > 0 {
            events.push(GameEvent::PrizePicked { at });
            (Reason::PrizeCollected, delta)
        } else {
            events.push(GameEvent::EmptyPickup);
            (Reason::NoPrize, delta)
        }
    }

    fn resolve_spring(&mut self, dir: Direction, events: &mut Vec<GameEvent>) -> (Reason, i32) {
        let offset = self.cell_offset(dir);
        let delta = interaction::spring_trap(
            &mut self.board.traps,
            self.player.pos,
            offset,
            self.scoring.trap_val,
        );
        if delta > 0 {
            events.push(GameEvent::TrapSprung { at: self.player.pos.offset(offset.0, offset.1) });
            (Reason::TrapSprung, delta)
        } else {
            (Reason::NoTrap, delta)
        }
    }

    fn resolve_disarm(&mut self, events: &mut Vec<GameEvent>) -> (Reason, i32) {
        if interaction::disarm_decoy(&mut self.board.decoy, self.player.pos) {
            events.push(GameEvent::DecoyDisarmed);
            (Reason::Disarmed, 0)
        } else {
            (Reason::NotOnDecoy, 0)
        }
    }

    fn resolve_scan(&mut self, events: &mut Vec<GameEvent>) -> (Reason, i32) {
        if self.resources.scans_left == 0 {
            events.push(GameEvent::ScanRefused);
            return (Reason::NoScansLeft, 0);
        }
        self.resources.scans_left -= 1;
        let decoy_ahead = interaction::decoy_ahead(&self.board.decoy, self.player.pos, self.grid.space_size);
        events.push(GameEvent::Scanned { decoy_ahead });
        (Reason::Scanned { decoy_ahead }, 0)
    }

    fn resolve_tick(&mut self, events: &mut Vec<GameEvent>) -> (Reason, i32) {
        self.resources.time_left -= 1;
        if self.resources.time_left <= 0 && !self.resources.time_expired {
            self.resources.time_expired = true;
            events.push(GameEvent::TimeExpired);
        }
        (Reason::Ticked, 0)
    }

    fn check_phase(&mut self, events: &mut Vec<GameEvent>) {
        if self.is_over() {
            return;
        }
        let r = &self.resources;
        let next = if r.score <= 0 {
            Phase::LostScore
        } else if r.moves_left <= 0 {
            Phase::LostMoves
        } else if r.time_expired {
            Phase::LostTime
        } else if self.board.all_prizes_collected() {
            events.push(GameEvent::AllPrizesCollected);
            Phase::Won
        } else {
            return;
        };

        info!(phase = ?next, score = r.score, steps = self.player.steps, "session over");
        self.phase = next;
        events.push(GameEvent::PhaseChanged { phase: next });
    }
}

// ── Lifecycle ──

impl GameSession {
    /// Judge the far-wall goal, then put every prize and trap back and the
    /// player on the start cell. Resources, decoy and phase are untouched.
    fn reset_board(&mut self, events: &mut Vec<GameEvent>) -> Verdict {
        let verdict = self.verdict();
        self.board.restore_tokens(self.grid.token_size);
        self.player.pos = self.grid.start();
        self.player.steps = 0;
        info!(?verdict, "board reset");
        events.push(GameEvent::BoardReset { verdict });
        verdict
    }

    fn finish(&mut self, events: &mut Vec<GameEvent>) -> Verdict {
        let verdict = self.verdict();
        self.ended = true;
        info!(?verdict, score = self.resources.score, "session ended");
        events.push(GameEvent::SessionEnded { verdict });
        verdict
    }

    fn restart_round(&mut self, events: &mut Vec<GameEvent>) {
        self.reset_board(events);
        self.resources = Resources::from(&self.initial);
        self.phase = Phase::Playing;
        self.ended = false;
        events.push(GameEvent::PhaseChanged { phase: Phase::Playing });
    }
}

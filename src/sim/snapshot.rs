/// Read-only, serializable view of a session.
///
/// Scalars are declared before the nested views so the whole thing can be
/// written out as TOML (`--dump-board`).

use serde::Serialize;

use crate::config::GridSpec;
use crate::domain::entity::{Decoy, Direction, Token, TokenState, Wall, WallOrientation};

use super::intent::Verdict;
use super::session::{GameSession, Phase};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub ended: bool,
    pub score: i32,
    pub moves_left: i32,
    pub time_left: i32,
    pub scans_left: u32,
    pub time_expired: bool,
    pub prizes_remaining: u32,
    pub verdict: Verdict,
    pub verdict_score: i32,
    pub player: PlayerView,
    pub grid: GridSpec,
    pub decoy: DecoyView,
    pub prizes: Vec<TokenView>,
    pub traps: Vec<TokenView>,
    pub walls: Vec<WallView>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    pub x: i32,
    pub y: i32,
    pub steps: u32,
    pub facing: Direction,
}

/// A consumed token reports size 0 at its anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TokenView {
    pub x: i32,
    pub y: i32,
    pub size: i32,
    pub active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DecoyView {
    pub x: i32,
    pub y: i32,
    pub size: i32,
    pub active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct WallView {
    pub col: i32,
    pub row: i32,
    pub orientation: WallOrientation,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl From<&Token> for TokenView {
    fn from(t: &Token) -> Self {
        match t.state {
            TokenState::Active(r) => TokenView { x: r.x, y: r.y, size: r.w, active: true },
            TokenState::Consumed { anchor } => TokenView { x: anchor.x, y: anchor.y, size: 0, active: false },
        }
    }
}

impl From<&Decoy> for DecoyView {
    fn from(d: &Decoy) -> Self {
        DecoyView { x: d.rect.x, y: d.rect.y, size: d.rect.w, active: d.active }
    }
}

impl From<&Wall> for WallView {
    fn from(w: &Wall) -> Self {
        WallView {
            col: w.col,
            row: w.row,
            orientation: w.orientation,
            x: w.rect.x,
            y: w.rect.y,
            w: w.rect.w,
            h: w.rect.h,
        }
    }
}

impl SessionSnapshot {
    pub fn capture(session: &GameSession) -> Self {
        let board = session.board();
        let res = session.resources();
        let player = session.player();
        let verdict = session.verdict();

        SessionSnapshot {
            phase: session.phase(),
            ended: session.is_ended(),
            score: res.score,
            moves_left: res.moves_left,
            time_left: res.time_left,
            scans_left: res.scans_left,
            time_expired: res.time_expired,
            prizes_remaining: u32::try_from(board.prizes_remaining()).unwrap_or(u32::MAX),
            verdict,
            verdict_score: verdict.score(session.scoring().end_val),
            player: PlayerView {
                x: player.pos.x,
                y: player.pos.y,
                steps: player.steps,
                facing: player.facing,
            },
            grid: session.grid().clone(),
            decoy: DecoyView::from(&board.decoy),
            prizes: board.prizes.iter().map(TokenView::from).collect(),
            traps: board.traps.iter().map(TokenView::from).collect(),
            walls: board.walls.iter().map(WallView::from).collect(),
        }
    }

    /// Pretty TOML rendering of the snapshot.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::entity::Stride;

    fn session() -> GameSession {
        let cfg = GameConfig { seed: Some(11), ..GameConfig::default() };
        GameSession::from_config(&cfg).unwrap()
    }

    #[test]
    fn fresh_snapshot_matches_config() {
        let snap = session().snapshot();
        assert_eq!(snap.phase, Phase::Playing);
        assert_eq!(snap.score, 10);
        assert_eq!(snap.moves_left, 20);
        assert_eq!(snap.time_left, 15);
        assert_eq!(snap.scans_left, 3);
        assert_eq!(snap.prizes_remaining, 3);
        assert_eq!(snap.verdict, Verdict::Trapped);
        assert_eq!(snap.verdict_score, -10);
        assert_eq!((snap.player.x, snap.player.y, snap.player.steps), (15, 15, 0));
        assert_eq!(snap.walls.len(), 20);
        assert_eq!(snap.traps.len(), 5);
        assert_eq!(snap.decoy, DecoyView { x: 195, y: 135, size: 15, active: true });
    }

    #[test]
    fn snapshot_is_detached_from_session() {
        let mut s = session();
        let before = s.snapshot();
        s.scan();
        s.move_player(Direction::Down, Stride::Single);
        assert_eq!(before.scans_left, 3);
        assert_ne!(s.snapshot(), before);
    }

    #[test]
    fn consumed_token_reports_zero_size() {
        let mut t = Token::new(crate::domain::geometry::Rect::new(75, 15, 15, 15));
        t.consume();
        assert_eq!(TokenView::from(&t), TokenView { x: 75, y: 15, size: 0, active: false });
    }

    #[test]
    fn renders_as_toml() {
        let text = session().snapshot().to_toml().unwrap();
        assert!(text.contains("phase = \"playing\""));
        assert!(text.contains("[player]"));
        assert!(text.contains("[[walls]]"));
        assert!(text.contains("[[prizes]]"));
        assert!(text.contains("orientation = "));
    }
}

/// Board entity set and its random generator.
///
/// The generator draws every prize, trap and wall independently from the
/// injected random source. Nothing is de-duplicated: two prizes may share a
/// cell, a trap may hide under a prize, walls may overlap anything.

use rand::Rng;
use tracing::info;

use crate::config::{BoardConfig, GridSpec};
use crate::error::ConfigError;

use super::entity::{Decoy, Token, Wall, WallOrientation};
use super::geometry::{Point, Rect};

#[derive(Clone, Debug)]
pub struct Board {
    pub walls: Vec<Wall>,
    pub prizes: Vec<Token>,
    pub traps: Vec<Token>,
    pub decoy: Decoy,
}

impl Board {
    pub fn all_prizes_collected(&self) -> bool {
        self.prizes.iter().all(|p| !p.is_active())
    }

    pub fn prizes_remaining(&self) -> usize {
        self.prizes.iter().filter(|p| p.is_active()).count()
    }

    /// Reactivate every prize and trap at full size. Layout is unchanged.
    pub fn restore_tokens(&mut self, token_size: i32) {
        for t in self.prizes.iter_mut().chain(self.traps.iter_mut()) {
            t.restore(token_size);
        }
    }
}

/// Entity counts after validation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Counts {
    pub walls: usize,
    pub prizes: usize,
    pub traps: usize,
}

impl TryFrom<&BoardConfig> for Counts {
    type Error = ConfigError;

    fn try_from(cfg: &BoardConfig) -> Result<Self, Self::Error> {
        Ok(Counts {
            walls: positive("wall", cfg.walls)?,
            prizes: positive("prize", cfg.prizes)?,
            traps: positive("trap", cfg.traps)?,
        })
    }
}

fn positive(entity: &'static str, value: i64) -> Result<usize, ConfigError> {
    if value <= 0 {
        return Err(ConfigError::NonPositiveCount { entity, value });
    }
    usize::try_from(value).map_err(|_| ConfigError::NonPositiveCount { entity, value })
}

/// Build a fresh board.
pub fn generate<R: Rng + ?Sized>(
    cfg: &BoardConfig,
    grid: &GridSpec,
    rng: &mut R,
) -> Result<Board, ConfigError> {
    let counts = Counts::try_from(cfg)?;
    grid.validate()?;

    let traps = (0..counts.traps).map(|_| random_token(grid, rng)).collect();
    let prizes = (0..counts.prizes).map(|_| random_token(grid, rng)).collect();
    let walls = (0..counts.walls).map(|_| random_wall(grid, rng)).collect();
    let decoy = Decoy::new(decoy_rect(grid));

    info!(
        walls = counts.walls,
        prizes = counts.prizes,
        traps = counts.traps,
        "board generated"
    );

    Ok(Board { walls, prizes, traps, decoy })
}

fn random_cell<R: Rng + ?Sized>(grid: &GridSpec, rng: &mut R) -> (i32, i32) {
    let h = rng.random_range(0..grid.rows);
    let w = rng.random_range(0..grid.cols);
    (w, h)
}

fn random_token<R: Rng + ?Sized>(grid: &GridSpec, rng: &mut R) -> Token {
    let (w, h) = random_cell(grid, rng);
    Token::new(token_rect(grid, w, h))
}

fn random_wall<R: Rng + ?Sized>(grid: &GridSpec, rng: &mut R) -> Wall {
    let (w, h) = random_cell(grid, rng);
    let orientation = if rng.random_bool(0.5) {
        WallOrientation::Vertical
    } else {
        WallOrientation::Horizontal
    };
    wall_at(grid, w, h, orientation)
}

/// Token rectangle for cell (w, h).
pub fn token_rect(grid: &GridSpec, w: i32, h: i32) -> Rect {
    let s = grid.space_size;
    Rect::square(
        Point::new(w * s + grid.token_inset, h * s + grid.token_inset),
        grid.token_size,
    )
}

/// Wall on the right (vertical) or bottom (horizontal) edge of cell (w, h).
pub fn wall_at(grid: &GridSpec, w: i32, h: i32, orientation: WallOrientation) -> Wall {
    let s = grid.space_size;
    let rect = match orientation {
        WallOrientation::Vertical => Rect::new(w * s + s - grid.wall_inset, h * s, grid.wall_thickness, s),
        WallOrientation::Horizontal => Rect::new(w * s, h * s + s - grid.wall_inset, s, grid.wall_thickness),
    };
    Wall { rect, orientation, col: w, row: h }
}

fn decoy_rect(grid: &GridSpec) -> Rect {
    let s = grid.space_size;
    Rect::square(
        grid.start().offset(grid.decoy_cols * s, grid.decoy_rows * s),
        grid.token_size,
    )
}

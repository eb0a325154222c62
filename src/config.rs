/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD), or from an
/// explicit path given on the command line.
/// Falls back to sensible defaults if the searched file is missing or incomplete.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::geometry::Point;
use crate::error::ConfigError;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub board: BoardConfig,
    pub grid: GridSpec,
    pub scoring: ScoringConfig,
    pub resources: ResourceConfig,
    pub timing: TimingConfig,
    pub gamepad: GamepadConfig,
    pub seed: Option<u64>,
    pub log_file: PathBuf,
}

/// Entity counts. Kept signed so that a non-positive value in the file
/// survives parsing and is rejected by the board generator.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct BoardConfig {
    #[serde(default = "default_walls")]
    pub walls: i64,
    #[serde(default = "default_prizes")]
    pub prizes: i64,
    #[serde(default = "default_traps")]
    pub traps: i64,
}

/// World geometry. All values are world units except `cols`/`rows`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct GridSpec {
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
    #[serde(default = "default_space_size")]
    pub space_size: i32,
    #[serde(default = "default_cols")]
    pub cols: i32,
    #[serde(default = "default_rows")]
    pub rows: i32,
    #[serde(default = "default_start")]
    pub start_x: i32,
    #[serde(default = "default_start")]
    pub start_y: i32,
    #[serde(default = "default_token_size")]
    pub token_size: i32,    // prizes, traps, decoy
    #[serde(default = "default_token_inset")]
    pub token_inset: i32,   // offset of a token from its cell corner
    #[serde(default = "default_wall_thickness")]
    pub wall_thickness: i32,
    #[serde(default = "default_wall_inset")]
    pub wall_inset: i32,    // walls sit this far before the cell's far edge
    #[serde(default = "default_decoy_cols")]
    pub decoy_cols: i32,    // decoy offset from start, in cells
    #[serde(default = "default_decoy_rows")]
    pub decoy_rows: i32,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ScoringConfig {
    #[serde(default = "default_prize_val")]
    pub prize_val: i32,
    #[serde(default = "default_trap_val")]
    pub trap_val: i32,
    #[serde(default = "default_decoy_val")]
    pub decoy_val: i32,
    #[serde(default = "default_off_grid_val")]
    pub off_grid_val: i32,
    #[serde(default = "default_hit_wall_val")]
    pub hit_wall_val: i32,
    #[serde(default = "default_end_val")]
    pub end_val: i32,
}

/// Starting values of the session resources.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ResourceConfig {
    #[serde(default = "default_score")]
    pub score: i32,
    #[serde(default = "default_moves")]
    pub moves: i32,
    #[serde(default = "default_time")]
    pub time: i32,
    #[serde(default = "default_scans")]
    pub scans: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct TimingConfig {
    /// Real-time interval of one countdown tick.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct GamepadConfig {
    #[serde(default = "default_pad_pickup")]
    pub pickup: Vec<String>,
    #[serde(default = "default_pad_disarm")]
    pub disarm: Vec<String>,
    #[serde(default = "default_pad_scan")]
    pub scan: Vec<String>,
    #[serde(default = "default_pad_spring")]
    pub spring: Vec<String>,
    #[serde(default = "default_pad_stride")]
    pub stride: Vec<String>,
    #[serde(default = "default_pad_restart")]
    pub restart: Vec<String>,
    #[serde(default = "default_pad_quit")]
    pub quit: Vec<String>,
}

// ── TOML Schema ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    board: BoardConfig,
    #[serde(default)]
    grid: GridSpec,
    #[serde(default)]
    scoring: ScoringConfig,
    #[serde(default)]
    resources: ResourceConfig,
    #[serde(default)]
    timing: TimingConfig,
    #[serde(default)]
    gamepad: GamepadConfig,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_walls() -> i64 { 20 }
fn default_prizes() -> i64 { 3 }
fn default_traps() -> i64 { 5 }

fn default_width() -> i32 { 510 }
fn default_height() -> i32 { 360 }
fn default_space_size() -> i32 { 60 }
fn default_cols() -> i32 { 8 }
fn default_rows() -> i32 { 5 }
fn default_start() -> i32 { 15 }
fn default_token_size() -> i32 { 15 }
fn default_token_inset() -> i32 { 15 }
fn default_wall_thickness() -> i32 { 8 }
fn default_wall_inset() -> i32 { 5 }
fn default_decoy_cols() -> i32 { 3 }
fn default_decoy_rows() -> i32 { 2 }

fn default_prize_val() -> i32 { 10 }
fn default_trap_val() -> i32 { 10 }
fn default_decoy_val() -> i32 { 5 }
fn default_off_grid_val() -> i32 { 5 }
fn default_hit_wall_val() -> i32 { 5 }
fn default_end_val() -> i32 { 10 }

fn default_score() -> i32 { 10 }
fn default_moves() -> i32 { 20 }
fn default_time() -> i32 { 15 }
fn default_scans() -> u32 { 3 }

fn default_tick_ms() -> u64 { 1000 }

fn default_pad_pickup() -> Vec<String> { vec!["A".into()] }
fn default_pad_disarm() -> Vec<String> { vec!["B".into()] }
fn default_pad_scan() -> Vec<String> { vec!["Y".into()] }
fn default_pad_spring() -> Vec<String> { vec!["X".into()] }
fn default_pad_stride() -> Vec<String> { vec!["R1".into(), "L1".into()] }
fn default_pad_restart() -> Vec<String> { vec!["Start".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }
fn default_log_file() -> String { "escape-grid.log".into() }

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            walls: default_walls(),
            prizes: default_prizes(),
            traps: default_traps(),
        }
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        GridSpec {
            width: default_width(),
            height: default_height(),
            space_size: default_space_size(),
            cols: default_cols(),
            rows: default_rows(),
            start_x: default_start(),
            start_y: default_start(),
            token_size: default_token_size(),
            token_inset: default_token_inset(),
            wall_thickness: default_wall_thickness(),
            wall_inset: default_wall_inset(),
            decoy_cols: default_decoy_cols(),
            decoy_rows: default_decoy_rows(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            prize_val: default_prize_val(),
            trap_val: default_trap_val(),
            decoy_val: default_decoy_val(),
            off_grid_val: default_off_grid_val(),
            hit_wall_val: default_hit_wall_val(),
            end_val: default_end_val(),
        }
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        ResourceConfig {
            score: default_score(),
            moves: default_moves(),
            time: default_time(),
            scans: default_scans(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig { tick_ms: default_tick_ms() }
    }
}

impl Default for GamepadConfig {
    fn default() -> Self {
        GamepadConfig {
            pickup: default_pad_pickup(),
            disarm: default_pad_disarm(),
            scan: default_pad_scan(),
            spring: default_pad_spring(),
            stride: default_pad_stride(),
            restart: default_pad_restart(),
            quit: default_pad_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            seed: None,
            log_file: default_log_file(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from(TomlConfig::default())
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(cfg: TomlConfig) -> Self {
        GameConfig {
            board: cfg.board,
            grid: cfg.grid,
            scoring: cfg.scoring,
            resources: cfg.resources,
            timing: cfg.timing,
            gamepad: cfg.gamepad,
            seed: cfg.general.seed,
            log_file: PathBuf::from(cfg.general.log_file),
        }
    }
}

// ── Grid queries ──

impl GridSpec {
    /// Largest x an accepted move may land on.
    pub fn max_x(&self) -> i32 {
        self.width - self.space_size
    }

    pub fn max_y(&self) -> i32 {
        self.height - self.space_size
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        (0..=self.max_x()).contains(&p.x) && (0..=self.max_y()).contains(&p.y)
    }

    pub fn start(&self) -> Point {
        Point::new(self.start_x, self.start_y)
    }

    /// Player x must be strictly greater than this to count as at the far wall.
    pub fn goal_x(&self) -> i32 {
        self.width.saturating_sub(self.space_size.saturating_mul(2))
    }

    /// Lattice cell containing a world point.
    pub fn cell_of(&self, p: Point) -> (i32, i32) {
        (p.x.div_euclid(self.space_size), p.y.div_euclid(self.space_size))
    }

    /// Corner of the decoy square; `None` when the offset overflows.
    pub fn decoy_anchor(&self) -> Option<Point> {
        let dx = self.decoy_cols.checked_mul(self.space_size)?;
        let dy = self.decoy_rows.checked_mul(self.space_size)?;
        Some(Point::new(self.start_x.checked_add(dx)?, self.start_y.checked_add(dy)?))
    }

    /// Reject geometry the board cannot be built on.
    ///
    /// | check                              | error              |
    /// |------------------------------------|--------------------|
    /// | sizes and counts ≤ 0               | `NonPositiveGrid`  |
    /// | lattice wider or taller than world | `GridOverflow`     |
    /// | token or wall spills out of a cell | `OutOfRange`       |
    /// | start is not a legal position      | `StartOutOfBounds` |
    /// | decoy is not a legal position      | `DecoyOutOfBounds` |
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("width", self.width),
            ("height", self.height),
            ("space_size", self.space_size),
            ("cols", self.cols),
            ("rows", self.rows),
            ("token_size", self.token_size),
            ("wall_thickness", self.wall_thickness),
        ] {
            if value <= 0 {
                return Err(ConfigError::NonPositiveGrid { field, value });
            }
        }

        let fits = |cells: i32, extent: i32| {
            cells
                .checked_mul(self.space_size)
                .is_some_and(|span| span <= extent)
        };
        if !fits(self.cols, self.width) || !fits(self.rows, self.height) {
            return Err(ConfigError::GridOverflow {
                cols: self.cols,
                rows: self.rows,
                space_size: self.space_size,
                width: self.width,
                height: self.height,
            });
        }

        // space_size <= width here, so none of these can overflow
        for (field, value, max) in [
            ("token_inset", self.token_inset, self.space_size - self.token_size),
            ("wall_inset", self.wall_inset, self.space_size),
            ("wall_thickness", self.wall_thickness, self.space_size),
        ] {
            if !(0..=max).contains(&value) {
                return Err(ConfigError::OutOfRange { field, value, max });
            }
        }

        if !self.in_bounds(self.start()) {
            return Err(ConfigError::StartOutOfBounds {
                x: self.start_x,
                y: self.start_y,
                max_x: self.max_x(),
                max_y: self.max_y(),
            });
        }

        match self.decoy_anchor() {
            Some(p) if self.in_bounds(p) => Ok(()),
            _ => Err(ConfigError::DecoyOutOfBounds {
                cols: self.decoy_cols,
                rows: self.decoy_rows,
            }),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config.
    ///
    /// With an explicit path, the file must exist and parse.
    /// Otherwise search (1) exe directory, (2) current working directory;
    /// a missing file or missing keys gracefully fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let toml_cfg = match explicit {
            Some(path) => read_toml(path)?,
            None => search_toml(&candidate_dirs()),
        };
        let config = GameConfig::from(toml_cfg);
        config.grid.validate()?;
        Ok(config)
    }

    /// Parse config text directly (no file system access).
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(GameConfig::from)
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn read_toml(path: &Path) -> Result<TomlConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<TomlConfig>(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Search for config.toml in candidate directories.
/// Runs before logging is set up, so warnings go to stderr.
fn search_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match read_toml(&path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    eprintln!("Warning: {e}");
                    eprintln!("Using default settings.");
                    return TomlConfig::default();
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_text_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.board, BoardConfig { walls: 20, prizes: 3, traps: 5 });
        assert_eq!(cfg.grid.width, 510);
        assert_eq!(cfg.grid.height, 360);
        assert_eq!(cfg.grid.space_size, 60);
        assert_eq!(cfg.resources.score, 10);
        assert_eq!(cfg.resources.moves, 20);
        assert_eq!(cfg.resources.time, 15);
        assert_eq!(cfg.resources.scans, 3);
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.log_file, PathBuf::from("escape-grid.log"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[board]\nprizes = 7\n\n[general]\nseed = 42\n",
        )
        .unwrap();
        assert_eq!(cfg.board.prizes, 7);
        assert_eq!(cfg.board.walls, 20);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.scoring, ScoringConfig::default());
    }

    #[test]
    fn negative_counts_survive_parsing() {
        // Rejected later, at board generation.
        let cfg = GameConfig::from_toml_str("[board]\ntraps = -2\n").unwrap();
        assert_eq!(cfg.board.traps, -2);
    }

    #[test]
    fn explicit_path_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[resources]\nmoves = 40\n[timing]\ntick_ms = 250").unwrap();
        let cfg = GameConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.resources.moves, 40);
        assert_eq!(cfg.timing.tick_ms, 250);
    }

    #[test]
    fn explicit_path_missing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GameConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn explicit_path_unparsable_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[board\nwalls = ").unwrap();
        let err = GameConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn oversized_lattice_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[grid]\ncols = 9").unwrap();
        let err = GameConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::GridOverflow { .. }));
    }

    fn grid_error(text: &str) -> ConfigError {
        GameConfig::from_toml_str(text).unwrap().grid.validate().unwrap_err()
    }

    #[test]
    fn default_grid_is_valid() {
        GridSpec::default().validate().unwrap();
    }

    #[test]
    fn huge_space_size_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[grid]\nspace_size = 1000000000").unwrap();
        let err = GameConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::GridOverflow { space_size: 1_000_000_000, .. }));

        // One cell filling the whole world leaves no room past the origin
        let err = grid_error(
            "[grid]\nspace_size = 2147483647\ncols = 1\nrows = 1\nwidth = 2147483647\nheight = 2147483647\n",
        );
        assert!(matches!(err, ConfigError::StartOutOfBounds { max_x: 0, max_y: 0, .. }));
    }

    #[test]
    fn goal_saturates_on_huge_cells() {
        let g = GridSpec { space_size: i32::MAX, ..GridSpec::default() };
        assert!(g.goal_x() < 0);
    }

    #[test]
    fn start_off_the_board_is_rejected() {
        let err = grid_error("[grid]\nstart_x = 480\n");
        assert!(matches!(
            err,
            ConfigError::StartOutOfBounds { x: 480, y: 15, max_x: 450, max_y: 300 }
        ));
        let err = grid_error("[grid]\nstart_y = -1\n");
        assert!(matches!(err, ConfigError::StartOutOfBounds { y: -1, .. }));
    }

    #[test]
    fn decoy_off_the_board_is_rejected() {
        for text in [
            "[grid]\ndecoy_cols = 20\n",
            "[grid]\ndecoy_rows = -1\n",
            "[grid]\ndecoy_cols = 100000000\n",
        ] {
            let err = grid_error(text);
            assert!(matches!(err, ConfigError::DecoyOutOfBounds { .. }), "{text}: {err}");
        }
        // Far corner is still a legal spot
        let cfg = GameConfig::from_toml_str("[grid]\ndecoy_cols = 7\ndecoy_rows = 4\n").unwrap();
        cfg.grid.validate().unwrap();
        assert_eq!(cfg.grid.decoy_anchor(), Some(Point::new(435, 255)));
    }

    #[test]
    fn insets_must_stay_inside_a_cell() {
        let err = grid_error("[grid]\ntoken_inset = 50\n");
        assert!(matches!(err, ConfigError::OutOfRange { field: "token_inset", value: 50, max: 45 }));
        let err = grid_error("[grid]\nwall_inset = -3\n");
        assert!(matches!(err, ConfigError::OutOfRange { field: "wall_inset", .. }));
    }

    #[test]
    fn grid_bounds_and_goal() {
        let g = GridSpec::default();
        assert_eq!(g.max_x(), 450);
        assert_eq!(g.max_y(), 300);
        assert_eq!(g.goal_x(), 390);
        assert!(g.in_bounds(Point::new(450, 300)));
        assert!(!g.in_bounds(Point::new(451, 0)));
        assert!(!g.in_bounds(Point::new(0, -1)));
        assert_eq!(g.cell_of(Point::new(195, 135)), (3, 2));
    }
}

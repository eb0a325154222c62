/// Configuration errors.
///
/// Gameplay never produces errors: a bumped wall or an empty pickup is a
/// normal outcome carried by `sim::intent::Reason`. Only a board that
/// cannot be built, or a config file that cannot be read, ends up here.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{entity} count must be a positive integer, got {value}")]
    NonPositiveCount { entity: &'static str, value: i64 },

    #[error("grid {field} must be positive, got {value}")]
    NonPositiveGrid { field: &'static str, value: i32 },

    #[error("grid of {cols}x{rows} cells of size {space_size} does not fit in {width}x{height}")]
    GridOverflow {
        cols: i32,
        rows: i32,
        space_size: i32,
        width: i32,
        height: i32,
    },

    #[error("grid {field} = {value} must lie within 0..={max}")]
    OutOfRange { field: &'static str, value: i32, max: i32 },

    #[error("start ({x}, {y}) is off the board; it must lie within 0..={max_x} x 0..={max_y}")]
    StartOutOfBounds { x: i32, y: i32, max_x: i32, max_y: i32 },

    #[error("decoy offset of {cols}x{rows} cells from the start leaves the board")]
    DecoyOutOfBounds { cols: i32, rows: i32 },

    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

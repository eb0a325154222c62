//! Escape Grid engine: board model, movement/interaction rules and the
//! session state machine. The terminal front-end lives in the binary.

pub mod config;
pub mod domain;
pub mod error;
pub mod sim;

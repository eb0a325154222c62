pub mod board;
pub mod entity;
pub mod geometry;
pub mod interaction;
pub mod movement;

pub mod indicators;
pub mod position;
pub mod signal;

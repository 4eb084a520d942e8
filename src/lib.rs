//! Signal validation and time-bounded trade supervision engine.
//!
//! The worker binary runs the evaluation pipeline (fetch candles, compute
//! indicators, score, admit, open) and the supervision loop (re-price open
//! positions, close on stop, target, or timeout). The API server exposes
//! health, metrics, position listing, candidate intake, and directional
//! close-all.

pub mod cache;
pub mod common;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod execution;
pub mod indicators;
pub mod jobs;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod positions;
pub mod services;
pub mod signals;

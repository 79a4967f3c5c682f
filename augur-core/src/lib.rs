//! augur-core
//!
//! Core traits, payload normalization, and the prediction fusion engine shared
//! across the augur ecosystem.
//!
//! - `connector`: the `QuoteSource` and `ForecastSource` traits implemented by
//!   data adapters.
//! - `payload`: turns upstream forecast responses into fusion inputs.
//! - `fusion`: aligns historical prices and multi-horizon forecasts on one axis.
//! - `poll`: the handle type owned by long-running poll loops.
//!
//! Async runtime (Tokio)
//! ---------------------
//! `poll::PollHandle` wraps `tokio::task::JoinHandle<()>` and uses
//! `tokio::sync::oneshot::Sender<()>` for cooperative shutdown, so code that
//! drives poll loops must run under a Tokio 1.x runtime. Fusion itself is
//! synchronous and runtime-agnostic.
//!
#![warn(missing_docs)]

/// Source traits implemented by quote and forecast adapters.
pub mod connector;
/// Prediction fusion engine.
pub mod fusion;
/// Normalization of upstream forecast responses.
pub mod payload;
/// Poll loop handle and drop-time shutdown helpers.
pub mod poll;
pub mod types;

pub use connector::{ForecastSource, QuoteSource};
pub use fusion::{fuse, fuse_with};
pub use payload::Normalized;
pub use poll::PollHandle;
pub use types::*;

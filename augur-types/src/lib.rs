//! Augur-specific data transfer objects and configuration primitives.
//!
//! Everything here is plain data: the reconciler and the fusion engine live in
//! `augur` and `augur-core` respectively.
#![warn(missing_docs)]

mod config;
mod error;
mod forecast;
mod quote;
mod series;

pub use config::{BackoffConfig, FusionConfig, ReconcilerConfig};
pub use error::AugurError;
pub use forecast::{
    ChartDatum, EnsemblePrediction, EnsembleResponse, EnsembleWeights, ForecastPayload,
    HybridAdjustment, HybridPrediction, HybridResponse, IntradayForecast, IntradayPrediction,
    LenientF64, ScenarioBucket, ScenarioForecast,
};
pub use quote::{LiveQuote, MarketState, QuoteSnapshot, QuoteTick};
pub use series::{
    BaseEntry, EntryKind, FusedSeries, HorizonSlot, HorizonSummary, SeriesPoint, Zone,
};

//! Re-export of the data types from `augur-types`.
// Consolidated re-exports so downstream crates can depend on `augur-core` only

pub use augur_types::{AugurError, BackoffConfig, FusionConfig, ReconcilerConfig};

pub use augur_types::{LiveQuote, MarketState, QuoteSnapshot, QuoteTick};

pub use augur_types::{
    BaseEntry, EntryKind, FusedSeries, HorizonSlot, HorizonSummary, SeriesPoint, Zone,
};

pub use augur_types::{
    ChartDatum, EnsemblePrediction, EnsembleResponse, EnsembleWeights, ForecastPayload,
    HybridAdjustment, HybridPrediction, HybridResponse, IntradayForecast, IntradayPrediction,
    LenientF64, ScenarioBucket, ScenarioForecast,
};

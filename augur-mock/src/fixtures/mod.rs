pub mod forecasts;
pub mod quotes;

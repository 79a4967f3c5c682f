use augur_core::{MarketState, QuoteTick};
use chrono::DateTime;

pub fn by_symbol(s: &str) -> Option<QuoteTick> {
    match s {
        "AAPL" => Some(q(190.00, 188.20, 191.35, 52_340_100, MarketState::Regular)),
        "MSFT" => Some(q(420.00, 416.10, 421.80, 18_902_450, MarketState::Regular)),
        "NVDA" => Some(q(1000.00, 985.00, 1012.40, 41_005_000, MarketState::Regular)),
        "GOOGL" => Some(q(150.00, 148.75, 151.10, 22_115_300, MarketState::Regular)),
        "KO" => Some(q(60.00, 59.60, 60.25, 9_870_000, MarketState::Post)),
        "PEP" => Some(q(170.00, 168.40, 170.90, 4_120_700, MarketState::Post)),
        "BTC-USD" => Some(QuoteTick {
            price: Some(65_000.00),
            day_high: None,
            day_low: None,
            volume: None,
            market_state: None,
            timestamp: DateTime::from_timestamp(1_700_000_000, 0),
            error: None,
        }),
        _ => None,
    }
}

fn q(price: f64, low: f64, high: f64, volume: u64, state: MarketState) -> QuoteTick {
    QuoteTick {
        price: Some(price),
        day_high: Some(high),
        day_low: Some(low),
        volume: Some(volume),
        market_state: Some(state),
        timestamp: DateTime::from_timestamp(1_700_000_000, 0),
        error: None,
    }
}

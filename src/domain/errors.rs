use thiserror::Error;

/// Errors raised while talking to the market data endpoints.
///
/// On the snapshot endpoint any of these fails the whole refresh cycle. On the
/// candle endpoint they are absorbed per instrument.
#[derive(Debug, Clone, Error)]
pub enum MarketDataError {
    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode {endpoint} response: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("Invalid market data for {symbol}: {reason}")]
    InvalidData { symbol: String, reason: String },
}

/// A numeric ticker field that could not be read as a decimal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed {field} for {symbol}: {value:?}")]
pub struct TickerParseError {
    pub symbol: String,
    pub field: &'static str,
    pub value: String,
}

/// Rejected filter settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CriteriaError {
    #[error("Candle days must be between {min} and {max}, got {value}")]
    CandleDaysOutOfRange { value: u32, min: u32, max: u32 },

    #[error("Minimum {field} must not be negative, got {value}")]
    NegativeThreshold { field: &'static str, value: String },

    #[error("Quote asset must not be empty")]
    EmptyQuoteAsset,

    #[error("Invalid scan mode: {0}. Must be 'bearish' or 'bullish'")]
    InvalidMode(String),
}

/// Errors returned by the scanner handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("Refresh scheduler is no longer running")]
    Closed,

    #[error(transparent)]
    Criteria(#[from] CriteriaError),

    #[error("Refresh scheduler task failed: {0}")]
    TaskFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_formatting() {
        let error = MarketDataError::HttpStatus {
            endpoint: "/api/v3/ticker/24hr".to_string(),
            status: 429,
            body: "Too many requests".to_string(),
        };

        let msg = error.to_string();
        assert!(msg.contains("429"));
        assert!(msg.contains("/api/v3/ticker/24hr"));
        assert!(msg.contains("Too many requests"));
    }

    #[test]
    fn test_criteria_error_formatting() {
        let error = CriteriaError::CandleDaysOutOfRange {
            value: 9,
            min: 1,
            max: 5,
        };
        assert_eq!(error.to_string(), "Candle days must be between 1 and 5, got 9");

        let wrapped: SchedulerError = error.into();
        assert!(wrapped.to_string().contains("got 9"));
    }
}

// Exchange data records
pub mod candle;
pub mod ticker;

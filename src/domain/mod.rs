// Domain-specific error types
pub mod errors;

// Exchange data records
pub mod market;

// Port interfaces
pub mod ports;

// Filter criteria and scan results
pub mod scanner;

// Scan pipeline and refresh scheduling
pub mod scanner;

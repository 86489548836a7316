// Text rendering for the headless runner
pub mod table;

pub use table::render_snapshot;

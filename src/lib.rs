pub mod batch;
pub mod chart;
pub mod format;
pub mod models;
pub mod peaks;
pub mod spectrum;

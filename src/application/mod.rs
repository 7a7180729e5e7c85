pub mod aggregator;
pub mod app;

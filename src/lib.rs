pub mod analysis;
pub mod config;
pub mod fetch;
pub mod interval;
pub mod models;
pub mod report;
pub mod yahoo;

pub mod calendar;
pub mod command;
pub mod config;
pub mod kv;
pub mod limits;
pub mod model;
pub mod observability;
pub mod shell;
pub mod store;
pub mod timescale;

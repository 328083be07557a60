//! LaunchWatch library
//!
//! Aggregates upcoming rocket launches from SpaceX and Launch Library 2 into
//! one canonical model, with rocket facts from SpaceX and NASA APOD. Every
//! upstream response is cached per source, and query results are cached again
//! in a shared response cache, so callers can poll freely.
//!
//! The entry point is [`service::LaunchService`].

pub mod aggregator;
pub mod cache;
pub mod cli;
pub mod clock;
pub mod config;
pub mod data;
pub mod error;
pub mod facts;
pub mod normalize;
pub mod refresh;
pub mod service;

pub use config::Config;
pub use data::{Launch, LaunchLocation, LaunchStatus, RocketFact};
pub use service::LaunchService;

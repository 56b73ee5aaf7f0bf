//! Core library for the `dashboard` CLI.
//!
//! This crate defines:
//! - The uniform fetch result contract and its error taxonomy
//! - Source adapters over four public REST APIs (GitHub, OpenWeatherMap,
//!   ViaCEP, CoinGecko), each normalizing upstream JSON into shared models
//! - A task runner executing adapter calls behind a uniform fault boundary,
//!   concurrently for batches
//! - Order-preserving aggregation of batch results
//! - Configuration & credentials handling
//!
//! It is used by `dashboard-cli`, but can also be reused by other binaries
//! or services.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod model;
pub mod runner;
pub mod source;

pub use config::Config;
pub use error::{FetchError, FetchResult};
pub use model::{
    AddressInfo, PriceDetail, PriceInfo, PriceQuery, ProfileInfo, RepoInfo, WeatherInfo,
    WeatherQuery,
};
pub use runner::{Runner, Task, TaskEvent, TaskObserver, TaskStatus};
pub use source::{Fetch, SourceId, Sources};

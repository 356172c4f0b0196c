//! Simcy - self-updating launcher for SimulationCraft nightly builds
//!
//! This library finds the newest nightly build on the downloads listing page,
//! installs it into a local versioned store when it is not there yet, discards
//! stale builds and launches the current one.
//!
//! - [`locator`]: release discovery and download
//! - [`store`]: extraction, cleanup and launch of local releases
//! - [`updater`]: the update-and-launch run
//! - [`config`] and [`logging`]: ambient setup for the CLI

pub mod config;
pub mod locator;
pub mod logging;
pub mod release;
pub mod store;
pub mod traits;
pub mod updater;

pub use reqwest::Url;

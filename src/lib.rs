//! Radio directory acquisition and sdrtrunk playlist generation.
//!
//! The crate walks a state's RadioReference directory (trunked systems with
//! their sites and talkgroups, plus county agency frequencies), normalizes
//! the responses into a [`model::Database`], and renders that database as an
//! sdrtrunk playlist. A JSON snapshot of the database doubles as a cache so
//! repeated exports do not re-crawl the service.
//!
//! Typical flow:
//!
//! ```no_run
//! use rr2sdrtrunk::acquire::Acquirer;
//! use rr2sdrtrunk::api::RadioReferenceClient;
//! use rr2sdrtrunk::config::Config;
//! use rr2sdrtrunk::{export, geo};
//! use std::path::Path;
//!
//! # async fn run() -> rr2sdrtrunk::Result<()> {
//! let config = Config::from_file(Path::new("config.toml"))?;
//! let client = RadioReferenceClient::new(&config.client, &config.auth)?;
//!
//! // North Carolina, cached in db.json after the first run.
//! let db = Acquirer::new(&client)
//!     .load_or_acquire(37, Path::new("db.json"))
//!     .await?;
//!
//! let nearby = geo::near_point(&db, 35.05, -78.71, 30.0);
//! export::export_playlist(&nearby, Path::new("playlist.xml")).await?;
//! # Ok(())
//! # }
//! ```

pub mod acquire;
pub mod api;
pub mod cache;
pub mod codes;
pub mod config;
pub mod error;
pub mod export;
pub mod geo;
pub mod logging;
pub mod model;

pub use error::{Error, Result};
pub use model::Database;

//! Client for the GOES satellite image browser.
//!
//! Builds catalog search queries from form input, lays results out as a
//! paired-thumbnail gallery, loads the latest full-disk panel and produces
//! shareable deep links. The image search API itself lives elsewhere; this
//! crate only consumes it.

pub mod catalog;
pub mod cli;
pub mod client;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod latest;
pub mod models;
pub mod query;
pub mod render;
pub mod session;
pub mod share;
pub mod templates;

pub use catalog::{Acronym, Channel, Satellite, Sector};
pub use client::{ImageSearch, SearchClient};
pub use error::{Result, SiteError};
pub use latest::{LatestPanel, LatestSlot};
pub use models::{ImageRecord, RetField};
pub use query::{ChannelControl, FormState, SearchQuery, TimeWindow};
pub use render::{pair_records, render, AssetResolver, GalleryItem, ResultsContainer};
pub use session::{SearchSession, SubmitOutcome};
pub use share::{build_share_link, ShareQuery};

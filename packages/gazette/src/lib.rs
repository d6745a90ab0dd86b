#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Mirror CGR gazette documents into object storage.
//!
//! The CGR search endpoint lists documents per day as a paginated,
//! semicolon-delimited export. For each requested date this crate walks
//! the result pages ([`fetch`]), pulls the document rows out of each page
//! ([`parsing`]), and copies every PDF it has not seen yet in the current
//! run to an [`artifact::ArtifactSink`] under a key derived from the
//! document URL ([`keys`]).
//!
//! Everything runs sequentially: one page, then one document at a time,
//! dates in the order given. Failures never abort the run. A page that
//! cannot be fetched ends that date's pagination, and a document that
//! cannot be downloaded or stored is skipped.
//!
//! The entry point is [`processor::Mirror`]:
//!
//! ```no_run
//! use cgr_mirror_gazette::artifact::{ArtifactMover, ArtifactSink};
//! use cgr_mirror_gazette::fetch::CgrClient;
//! use cgr_mirror_gazette::processor::{DateProcessor, Mirror};
//! use chrono::NaiveDate;
//!
//! # async fn example(sink: &dyn ArtifactSink) -> Result<(), Box<dyn std::error::Error>> {
//! let client = CgrClient::new()?;
//! let processor = DateProcessor::new(&client, ArtifactMover::new(&client, sink));
//! let dates = [NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()];
//! let summary = Mirror::new(processor).run(&dates).await;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod date;
pub mod fetch;
pub mod keys;
pub mod parsing;
pub mod processor;
pub mod progress;

#[cfg(test)]
mod testing;

pub use cgr_mirror_gazette_models as models;

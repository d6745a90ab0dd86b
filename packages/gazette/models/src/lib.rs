#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for the CGR gazette mirror.
//!
//! [`DocumentRow`] is one data line of the search endpoint's semicolon
//! export. [`DateOutcome`] and [`RunSummary`] report what a mirror run did
//! for each requested date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// One document record parsed from a results page.
///
/// Field names follow the column headers of the export (`Fecha emision`,
/// `Institucion`, ...). Every field is the trimmed column text; columns the
/// line did not contain are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRow {
    /// Leading row counter (always a run of digits).
    pub row_number: String,
    /// Absolute URL of the referenced document.
    pub link: String,
    /// Issue date, as printed by the endpoint.
    pub fecha_emision: String,
    /// Publication date, as printed by the endpoint.
    pub fecha_publicacion: String,
    /// Issuing institution.
    pub institucion: String,
    /// Issuing office or officer.
    pub emite: String,
    /// Document type.
    pub tipo_documental: String,
    /// Procedure the document belongs to.
    pub proceso: String,
    /// Free-text subject. Absorbs every column from the ninth onward,
    /// rejoined with `;`.
    pub asunto: String,
}

/// Why a row's link was not handed to the artifact mover, or why moving it
/// did not end in a stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    /// The link does not end in `.pdf`.
    NonPdf,
    /// The link was already processed earlier in this run.
    Duplicate,
    /// Downloading the document failed.
    FetchFailed,
    /// Writing the document to storage failed.
    StoreFailed,
}

/// Per-date report of a mirror run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateOutcome {
    /// The date that was processed.
    pub date: NaiveDate,
    /// Number of result pages fetched successfully.
    pub pages_fetched: u32,
    /// Number of data rows parsed across all pages.
    pub rows_seen: u64,
    /// Links that passed the PDF and duplicate filters and were handed to
    /// the artifact mover.
    pub queued: u64,
    /// Documents written to storage.
    pub stored: u64,
    /// Links skipped for not pointing at a PDF.
    pub skipped_non_pdf: u64,
    /// Links skipped because they were already processed in this run.
    pub skipped_duplicate: u64,
    /// Documents whose download failed.
    pub fetch_failed: u64,
    /// Documents whose storage write failed.
    pub store_failed: u64,
    /// Whether pagination ended because a page could not be fetched.
    pub page_fetch_failed: bool,
}

impl DateOutcome {
    /// Creates an empty outcome for `date`.
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self {
            date,
            pages_fetched: 0,
            rows_seen: 0,
            queued: 0,
            stored: 0,
            skipped_non_pdf: 0,
            skipped_duplicate: 0,
            fetch_failed: 0,
            store_failed: 0,
            page_fetch_failed: false,
        }
    }

    /// Counts one skipped link under `reason`.
    pub const fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::NonPdf => self.skipped_non_pdf += 1,
            SkipReason::Duplicate => self.skipped_duplicate += 1,
            SkipReason::FetchFailed => self.fetch_failed += 1,
            SkipReason::StoreFailed => self.store_failed += 1,
        }
    }

    /// Total links that did not end in a stored object.
    #[must_use]
    pub const fn skipped(&self) -> u64 {
        self.skipped_non_pdf + self.skipped_duplicate + self.fetch_failed + self.store_failed
    }
}

impl std::fmt::Display for DateOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} stored, {} non-PDF, {} duplicate, {} fetch failed, {} store failed \
             ({} page(s), {} row(s))",
            self.date,
            self.stored,
            self.skipped_non_pdf,
            self.skipped_duplicate,
            self.fetch_failed,
            self.store_failed,
            self.pages_fetched,
            self.rows_seen,
        )
    }
}

/// Report for a whole run, one [`DateOutcome`] per processed date in
/// processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Outcomes in the order the dates were processed.
    pub dates: Vec<DateOutcome>,
}

impl RunSummary {
    /// Documents stored across every date.
    #[must_use]
    pub fn total_stored(&self) -> u64 {
        self.dates.iter().map(|d| d.stored).sum()
    }

    /// Links skipped across every date, for any reason.
    #[must_use]
    pub fn total_skipped(&self) -> u64 {
        self.dates.iter().map(DateOutcome::skipped).sum()
    }

    /// Looks up the outcome for `date`.
    #[must_use]
    pub fn outcome_for(&self, date: NaiveDate) -> Option<&DateOutcome> {
        self.dates.iter().find(|d| d.date == date)
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} date(s), {} stored, {} skipped",
            self.dates.len(),
            self.total_stored(),
            self.total_skipped()
        )
    }
}

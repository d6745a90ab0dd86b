//! Per-date pagination and the run-level orchestrator.
//!
//! [`DateProcessor`] walks the result pages of one date until a page comes
//! back empty, a page cannot be fetched, or the page cap is reached. Each
//! row's link goes through the PDF filter and the run's [`SeenUrls`] before
//! it is handed to the [`ArtifactMover`]. [`Mirror`] owns the seen set and
//! feeds dates to the processor in order.

use std::collections::HashSet;
use std::sync::Arc;

use cgr_mirror_gazette_models::{DateOutcome, DocumentRow, RunSummary, SkipReason};
use chrono::NaiveDate;

use crate::artifact::{ArtifactMover, document_metadata};
use crate::date::format_dmy;
use crate::fetch::PageSource;
use crate::keys::build_key;
use crate::parsing::parse_rows;
use crate::progress::{ProgressCallback, null_progress};

/// Default cap on result pages fetched per date.
pub const DEFAULT_MAX_PAGES: u32 = 1000;

/// Links already handed to the mover during this run.
///
/// Only grows. Shared across every page and date of one [`Mirror`] run.
#[derive(Debug, Default, Clone)]
pub struct SeenUrls {
    urls: HashSet<String>,
}

impl SeenUrls {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `url` was already recorded.
    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Records `url`. Returns `false` if it was already present.
    pub fn insert(&mut self, url: &str) -> bool {
        if self.urls.contains(url) {
            return false;
        }
        self.urls.insert(url.to_owned())
    }

    /// Number of recorded URLs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Iterates the recorded URLs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }
}

/// Whether `link` ends in `.pdf`, ignoring case.
#[must_use]
pub fn is_pdf_link(link: &str) -> bool {
    link.get(link.len().saturating_sub(4)..)
        .is_some_and(|suffix| suffix.eq_ignore_ascii_case(".pdf"))
}

/// Drives pagination and row processing for one date at a time.
pub struct DateProcessor<'a> {
    pages: &'a dyn PageSource,
    mover: ArtifactMover<'a>,
    max_pages: u32,
}

impl<'a> DateProcessor<'a> {
    /// Creates a processor with the default page cap.
    #[must_use]
    pub const fn new(pages: &'a dyn PageSource, mover: ArtifactMover<'a>) -> Self {
        Self {
            pages,
            mover,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Sets the maximum number of pages fetched per date.
    #[must_use]
    pub const fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Mirrors every new PDF listed for `date`.
    ///
    /// Never fails. A page that cannot be fetched ends pagination for this
    /// date, keeping whatever earlier pages produced. Download and storage
    /// failures skip the affected document only.
    pub async fn process_date(&self, date: NaiveDate, seen: &mut SeenUrls) -> DateOutcome {
        let date_dmy = format_dmy(date);
        log::info!("Processing date {date} (CGR format {date_dmy})");

        let mut outcome = DateOutcome::new(date);

        for page in 1..=self.max_pages {
            log::info!("Fetching results for {date_dmy}, page {page}...");

            let text = match self.pages.fetch_page(&date_dmy, page).await {
                Ok(text) => text,
                Err(e) => {
                    log::error!("Page {page} for {date_dmy} failed, stopping pagination: {e}");
                    outcome.page_fetch_failed = true;
                    break;
                }
            };
            outcome.pages_fetched += 1;

            let rows = parse_rows(&text);
            if rows.is_empty() {
                log::info!(
                    "No more rows found for {date_dmy} on page {page}. Stopping pagination."
                );
                break;
            }

            log::info!("Found {} document rows on page {page}", rows.len());
            outcome.rows_seen += rows.len() as u64;

            for row in &rows {
                self.process_row(row, seen, &mut outcome).await;
            }

            if page == self.max_pages {
                log::warn!("Reached max pages ({}) for {date_dmy}, stopping", self.max_pages);
            }
        }

        log::info!(
            "Finished date {date}. Total PDFs stored for this date: {}",
            outcome.stored
        );
        outcome
    }

    async fn process_row(
        &self,
        row: &DocumentRow,
        seen: &mut SeenUrls,
        outcome: &mut DateOutcome,
    ) {
        let url = row.link.as_str();

        if !is_pdf_link(url) {
            log::info!("Skipping non-PDF link: {url}");
            outcome.record_skip(SkipReason::NonPdf);
            return;
        }

        if !seen.insert(url) {
            log::info!("Already processed URL, skipping: {url}");
            outcome.record_skip(SkipReason::Duplicate);
            return;
        }

        outcome.queued += 1;
        let key = build_key(url);
        log::info!(
            "Downloading and uploading: {url} -> {}",
            self.mover.location(&key)
        );

        match self
            .mover
            .move_artifact(url, &key, &document_metadata(row))
            .await
        {
            Ok(_) => outcome.stored += 1,
            Err(e) => {
                log::error!("Skipping {url}: {e}");
                outcome.record_skip(e.skip_reason());
            }
        }
    }
}

/// One mirror run over a list of dates.
///
/// Owns the run's [`SeenUrls`], so a URL is mirrored at most once no matter
/// how many pages or dates list it. A fresh `Mirror` starts with an empty
/// set.
pub struct Mirror<'a> {
    processor: DateProcessor<'a>,
    seen: SeenUrls,
    progress: Arc<dyn ProgressCallback>,
}

impl<'a> Mirror<'a> {
    /// Creates a run around `processor`.
    #[must_use]
    pub fn new(processor: DateProcessor<'a>) -> Self {
        Self {
            processor,
            seen: SeenUrls::new(),
            progress: null_progress(),
        }
    }

    /// Reports one unit of progress per processed date.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// URLs handed to the mover so far.
    #[must_use]
    pub const fn seen(&self) -> &SeenUrls {
        &self.seen
    }

    /// Processes `dates` strictly in the given order.
    ///
    /// Callers pass dates sorted ascending and without duplicates.
    pub async fn run(&mut self, dates: &[NaiveDate]) -> RunSummary {
        log::info!(
            "Will process {} date(s): {}",
            dates.len(),
            dates
                .iter()
                .map(NaiveDate::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );

        self.progress.set_total(dates.len() as u64);

        let mut summary = RunSummary::default();
        for &date in dates {
            self.progress.set_message(format!("Mirroring {date}"));
            let outcome = self.processor.process_date(date, &mut self.seen).await;
            log::info!("{outcome}");
            summary.dates.push(outcome);
            self.progress.inc(1);
        }

        self.progress.finish(format!("Mirror complete: {summary}"));
        summary
    }
}

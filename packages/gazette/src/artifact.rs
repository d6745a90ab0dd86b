//! Moving one document from the CGR file host into object storage.
//!
//! The move is two steps, download then store, and each step reports its
//! own failure. A failed move is returned to the caller as a [`MoveError`]
//! so the batch it belongs to can carry on.

use std::collections::BTreeMap;

use async_trait::async_trait;
use cgr_mirror_gazette_models::{DocumentRow, SkipReason};

use crate::fetch::{DocumentSource, FetchError};

/// Content type every mirrored document is stored under.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// User metadata attached to a stored object (`x-amz-meta-*`).
pub type ObjectMetadata = BTreeMap<String, String>;

/// A storage write that failed.
#[derive(Debug, thiserror::Error)]
#[error("Failed to store {key}: {source}")]
pub struct StoreError {
    /// Destination key.
    pub key: String,
    /// Underlying storage error.
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

/// Destination for mirrored documents.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Human-readable location of `key`, for logs (e.g. `s3://bucket/key`).
    fn location(&self, key: &str) -> String;

    /// Writes `body` under `key`, replacing any existing object.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails.
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> Result<(), StoreError>;
}

/// Why a single document move failed.
#[derive(Debug, thiserror::Error)]
pub enum MoveError {
    /// The download failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The storage write failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MoveError {
    /// The skip reason this failure is reported under.
    #[must_use]
    pub const fn skip_reason(&self) -> SkipReason {
        match self {
            Self::Fetch(_) => SkipReason::FetchFailed,
            Self::Store(_) => SkipReason::StoreFailed,
        }
    }
}

/// Builds the object metadata for a row.
///
/// Object-store metadata travels as HTTP headers, so every character other
/// than printable ASCII (and `%` itself) is percent-encoded as UTF-8.
/// `urlencoding::decode` restores the original text. Empty values are left
/// out.
#[must_use]
pub fn document_metadata(row: &DocumentRow) -> ObjectMetadata {
    [
        ("row", &row.row_number),
        ("fecha-emision", &row.fecha_emision),
        ("fecha-publicacion", &row.fecha_publicacion),
        ("institucion", &row.institucion),
        ("emite", &row.emite),
        ("tipo-documental", &row.tipo_documental),
        ("proceso", &row.proceso),
        ("source-url", &row.link),
    ]
    .into_iter()
    .filter_map(|(name, value)| {
        let value = value.trim();
        (!value.is_empty()).then(|| (name.to_owned(), header_safe(value)))
    })
    .collect()
}

fn header_safe(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut buf = [0; 4];
    for c in value.chars() {
        if (c.is_ascii_graphic() && c != '%') || c == ' ' {
            out.push(c);
        } else {
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    out
}

/// Downloads documents and writes them to a sink, one at a time.
pub struct ArtifactMover<'a> {
    documents: &'a dyn DocumentSource,
    sink: &'a dyn ArtifactSink,
}

impl<'a> ArtifactMover<'a> {
    /// Creates a mover reading from `documents` and writing to `sink`.
    #[must_use]
    pub const fn new(documents: &'a dyn DocumentSource, sink: &'a dyn ArtifactSink) -> Self {
        Self { documents, sink }
    }

    /// Location of `key` in the sink, for logs.
    #[must_use]
    pub fn location(&self, key: &str) -> String {
        self.sink.location(key)
    }

    /// Downloads `url` and stores it under `key` as a PDF.
    ///
    /// Returns the number of bytes stored.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::Fetch`] if the download fails (nothing is
    /// written) or [`MoveError::Store`] if the write fails.
    pub async fn move_artifact(
        &self,
        url: &str,
        key: &str,
        metadata: &ObjectMetadata,
    ) -> Result<usize, MoveError> {
        let body = self.documents.fetch_document(url).await?;
        let size = body.len();

        self.sink
            .put_object(key, body, PDF_CONTENT_TYPE, metadata)
            .await?;

        #[allow(clippy::cast_precision_loss)] // display-only MB value
        let mb = size as f64 / 1_048_576.0;
        log::debug!("  stored {} ({mb:.2} MB)", self.sink.location(key));

        Ok(size)
    }
}

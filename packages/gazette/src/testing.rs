//! In-memory fakes of the fetch and storage seams for unit tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::artifact::{ArtifactSink, ObjectMetadata, StoreError};
use crate::fetch::{DocumentSource, FetchError, PageSource};

/// Serves canned result pages keyed by `(date_dmy, page)`.
///
/// Unconfigured pages come back as an empty body, which parses to zero
/// rows.
#[derive(Default)]
pub struct FakePages {
    pages: BTreeMap<(String, u32), Result<String, u16>>,
    every_page: Option<String>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl FakePages {
    pub fn with_page(mut self, date_dmy: &str, page: u32, body: &str) -> Self {
        self.pages
            .insert((date_dmy.to_owned(), page), Ok(body.to_owned()));
        self
    }

    pub fn failing(mut self, date_dmy: &str, page: u32, status: u16) -> Self {
        self.pages.insert((date_dmy.to_owned(), page), Err(status));
        self
    }

    /// Answers every unconfigured page with `body`.
    pub fn endless(mut self, body: &str) -> Self {
        self.every_page = Some(body.to_owned());
        self
    }

    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, date_dmy: &str) -> usize {
        self.calls().iter().filter(|(d, _)| d == date_dmy).count()
    }
}

#[async_trait]
impl PageSource for FakePages {
    async fn fetch_page(&self, date_dmy: &str, page: u32) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push((date_dmy.to_owned(), page));

        match self.pages.get(&(date_dmy.to_owned(), page)) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(FetchError::Http {
                url: format!("fake://search?fInicio={date_dmy}&pageAct={page}"),
                status: reqwest::StatusCode::from_u16(*status).unwrap(),
            }),
            None => Ok(self.every_page.clone().unwrap_or_default()),
        }
    }
}

/// Serves canned document bodies. Unknown URLs answer 404.
#[derive(Default)]
pub struct FakeDocuments {
    bodies: BTreeMap<String, Vec<u8>>,
    calls: Mutex<Vec<String>>,
}

impl FakeDocuments {
    pub fn with(mut self, url: &str, body: &[u8]) -> Self {
        self.bodies.insert(url.to_owned(), body.to_vec());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentSource for FakeDocuments {
    async fn fetch_document(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.lock().unwrap().push(url.to_owned());

        self.bodies.get(url).cloned().ok_or_else(|| FetchError::Http {
            url: url.to_owned(),
            status: reqwest::StatusCode::NOT_FOUND,
        })
    }
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
    pub metadata: ObjectMetadata,
}

/// Keeps written objects in memory. Keys registered with
/// [`MemorySink::failing_on`] reject writes.
#[derive(Default)]
pub struct MemorySink {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    failing: BTreeSet<String>,
    puts: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn failing_on(mut self, key: &str) -> Self {
        self.failing.insert(key.to_owned());
        self
    }

    pub fn objects(&self) -> BTreeMap<String, StoredObject> {
        self.objects.lock().unwrap().clone()
    }

    /// Every key a write was attempted for, in order.
    pub fn puts(&self) -> Vec<String> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactSink for MemorySink {
    fn location(&self, key: &str) -> String {
        format!("memory://{key}")
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> Result<(), StoreError> {
        self.puts.lock().unwrap().push(key.to_owned());

        if self.failing.contains(key) {
            return Err(StoreError {
                key: key.to_owned(),
                source: "bucket rejected the write".into(),
            });
        }

        self.objects.lock().unwrap().insert(
            key.to_owned(),
            StoredObject {
                body,
                content_type: content_type.to_owned(),
                metadata: metadata.clone(),
            },
        );
        Ok(())
    }
}

//! HTTP access to the CGR search endpoint and document host.
//!
//! [`PageSource`] and [`DocumentSource`] are the seams the pipeline talks
//! to. [`CgrClient`] implements both over a single [`reqwest::Client`],
//! with a shorter timeout for result pages than for document downloads.
//! Neither path retries: one attempt per page and per document.

use std::time::Duration;

use async_trait::async_trait;

/// Search endpoint returning the semicolon export.
pub const SEARCH_URL: &str = "https://cgrbuscador.cgr.go.cr/BuscadorWebCGR/testcsv";

/// User-Agent sent with every request.
pub const USER_AGENT: &str = "CGRFetcher/1.0";

/// Timeout for one results page.
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for one document download. PDFs can be large.
pub const DOCUMENT_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors from a single HTTP request.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    Http {
        /// Requested URL, including the query string.
        url: String,
        /// Status code returned.
        status: reqwest::StatusCode,
    },

    /// The request never produced a complete response (connect failure,
    /// timeout, reset while reading the body).
    #[error("Network error requesting {url}: {source}")]
    Network {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),
}

impl FetchError {
    /// Whether the server answered with an error status, as opposed to the
    /// request failing in transit.
    #[must_use]
    pub const fn is_http(&self) -> bool {
        matches!(self, Self::Http { .. })
    }
}

/// Fetches one page of search results.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches results page `page` (1-based) for the day `date_dmy`
    /// (`DD/MM/YYYY`) and returns the raw body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on a non-2xx status or a transport failure.
    async fn fetch_page(&self, date_dmy: &str, page: u32) -> Result<String, FetchError>;
}

/// Downloads one document.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Downloads the body at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on a non-2xx status or a transport failure.
    async fn fetch_document(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Builds the endpoint's query parameters for one day and page.
///
/// Every search filter is sent empty and the date range collapses to a
/// single day (`fInicio == fFinal`).
#[must_use]
pub fn search_query(date_dmy: &str, page: u32) -> Vec<(&'static str, String)> {
    vec![
        ("searchFacet", String::new()),
        ("searchFacetString", String::new()),
        ("tipoFacet", String::new()),
        ("searchText", String::new()),
        ("searchText1", String::new()),
        ("searchText2", String::new()),
        ("select1", "+".to_owned()),
        ("select2", "+".to_owned()),
        ("fInicio", date_dmy.to_owned()),
        ("fFinal", date_dmy.to_owned()),
        ("recurrido", String::new()),
        ("searchEsp", String::new()),
        ("pageAct", page.to_string()),
    ]
}

/// HTTP client for the search endpoint and the document host.
#[derive(Debug, Clone)]
pub struct CgrClient {
    client: reqwest::Client,
    search_url: String,
    page_timeout: Duration,
    document_timeout: Duration,
}

impl CgrClient {
    /// Creates a client pointed at [`SEARCH_URL`] with the default
    /// timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the TLS backend fails to
    /// initialize.
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            search_url: SEARCH_URL.to_owned(),
            page_timeout: PAGE_TIMEOUT,
            document_timeout: DOCUMENT_TIMEOUT,
        })
    }

    /// Points page requests at a different search URL.
    #[must_use]
    pub fn with_search_url(mut self, url: &str) -> Self {
        url.clone_into(&mut self.search_url);
        self
    }

    /// Sets the timeout for results pages.
    #[must_use]
    pub const fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    /// Sets the timeout for document downloads.
    #[must_use]
    pub const fn with_document_timeout(mut self, timeout: Duration) -> Self {
        self.document_timeout = timeout;
        self
    }

    /// Sends a GET and rejects non-2xx responses.
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_owned(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                url: response.url().to_string(),
                status,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl PageSource for CgrClient {
    async fn fetch_page(&self, date_dmy: &str, page: u32) -> Result<String, FetchError> {
        let query = search_query(date_dmy, page);
        let response = self.get(&self.search_url, &query, self.page_timeout).await?;
        let url = response.url().to_string();

        let text = response
            .text()
            .await
            .map_err(|source| FetchError::Network { url, source })?;

        log::debug!("Page {page} for {date_dmy}: {} bytes", text.len());
        Ok(text)
    }
}

#[async_trait]
impl DocumentSource for CgrClient {
    async fn fetch_document(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.get(url, &[], self.document_timeout).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_owned(),
                source,
            })?;

        log::debug!("Downloaded {} bytes from {url}", bytes.len());
        Ok(bytes.to_vec())
    }
}

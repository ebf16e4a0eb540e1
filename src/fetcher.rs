// 🌐 Fetcher - raw document retrieval
// HTTP(S) locations go through a Fetcher, anything else is read from disk

use crate::error::{EtlError, EtlResult};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("bank-etl/", env!("CARGO_PKG_VERSION"));

/// Fetcher - retrieves a document body as text
///
/// No retries: a failed fetch is a `NetworkError` and ends the run.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> EtlResult<String>;
}

/// Blocking reqwest client with a per-request timeout
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> EtlResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| EtlError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(HttpFetcher { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> EtlResult<String> {
        debug!(url, "fetching document");

        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(EtlError::Network(format!("GET {} returned {}", url, status)));
        }

        let body = response.text()?;
        debug!(url, bytes = body.len(), "document fetched");
        Ok(body)
    }
}

pub fn is_remote(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Load a document from a URL (via `fetcher`) or a local path
pub fn load_document(fetcher: &dyn Fetcher, location: &str) -> EtlResult<String> {
    if is_remote(location) {
        fetcher.fetch(location)
    } else {
        let path = Path::new(location);
        fs::read_to_string(path)
            .map_err(|e| EtlError::io(format!("reading {}", path.display()), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct FailingFetcher;

    impl Fetcher for FailingFetcher {
        fn fetch(&self, url: &str) -> EtlResult<String> {
            Err(EtlError::Network(format!("unreachable: {}", url)))
        }
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/banks"));
        assert!(is_remote("HTTP://example.com"));
        assert!(!is_remote("./page.html"));
        assert!(!is_remote("/tmp/exchange_rate.csv"));
    }

    #[test]
    fn test_load_document_routes_urls_to_fetcher() {
        let err = load_document(&FailingFetcher, "https://example.com/banks").unwrap_err();
        assert!(matches!(err, EtlError::Network(_)));
    }

    #[test]
    fn test_load_document_reads_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<table></table>").unwrap();
        let location = file.path().to_str().unwrap().to_string();

        let body = load_document(&FailingFetcher, &location).unwrap();
        assert_eq!(body, "<table></table>");
    }

    #[test]
    fn test_load_document_missing_file_is_io_error() {
        let err = load_document(&FailingFetcher, "/nonexistent/banks.html").unwrap_err();
        assert!(matches!(err, EtlError::Io { .. }));
    }
}

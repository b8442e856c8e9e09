//! Async dataset fetcher: download a feature type unless it is cached.

use crate::cache::DatasetCache;
use crate::error::{FetchError, Result};
use crate::http::HttpClient;
use crate::wfs::WfsSource;
use bestplace_core::io::read_geojson;
use bestplace_core::FeatureCollection;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for [`Fetcher`].
#[derive(Debug, Clone)]
pub struct FetcherOptions {
    /// Per-request timeout (default 120 s; full layers are large).
    pub request_timeout: Duration,
    /// Maximum retries on transient failures (default 3).
    pub max_retries: u32,
}

impl Default for FetcherOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(120),
            max_retries: 3,
        }
    }
}

/// Where a dataset ended up and whether it had to be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub type_name: String,
    pub path: PathBuf,
    pub downloaded: bool,
}

/// Downloads WFS feature types into a [`DatasetCache`].
pub struct Fetcher {
    source: WfsSource,
    cache: DatasetCache,
    http: HttpClient,
}

impl Fetcher {
    pub fn new(source: WfsSource, cache: DatasetCache, options: FetcherOptions) -> Result<Self> {
        let http = HttpClient::new(options.request_timeout, options.max_retries)?;
        Ok(Self { source, cache, http })
    }

    pub fn source(&self) -> &WfsSource {
        &self.source
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    /// Make sure a feature type is in the cache, downloading it if needed.
    pub async fn ensure(&self, type_name: &str) -> Result<FetchOutcome> {
        let path = self.cache.path_for(type_name);
        if self.cache.is_cached(type_name) {
            info!(dataset = type_name, path = %path.display(), "dataset already cached");
            return Ok(FetchOutcome {
                type_name: type_name.to_string(),
                path,
                downloaded: false,
            });
        }

        let url = self.source.get_feature_url(type_name)?;
        info!(dataset = type_name, "downloading dataset");
        debug!(url = %url, "GetFeature request");

        let body = self.http.get(&url).await?;
        check_service_exception(type_name, &body)?;
        let path = self.cache.store(type_name, &body)?;
        info!(dataset = type_name, bytes = body.len(), path = %path.display(), "dataset stored");

        Ok(FetchOutcome {
            type_name: type_name.to_string(),
            path,
            downloaded: true,
        })
    }

    /// Ensure several feature types, one after another.
    pub async fn ensure_all<'a, I>(&self, type_names: I) -> Result<Vec<FetchOutcome>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut outcomes = Vec::new();
        for type_name in type_names {
            outcomes.push(self.ensure(type_name).await?);
        }
        Ok(outcomes)
    }

    /// Ensure a feature type and read it as a feature collection.
    pub async fn load(&self, type_name: &str) -> Result<FeatureCollection> {
        let outcome = self.ensure(type_name).await?;
        Ok(read_geojson(&outcome.path)?)
    }
}

/// GeoServer answers some failed requests with status 200 and an XML
/// exception report instead of the requested JSON.
fn check_service_exception(type_name: &str, body: &[u8]) -> Result<()> {
    let start = body.iter().position(|b| !b.is_ascii_whitespace());
    match start {
        Some(i) if body[i] == b'<' => {
            let text = String::from_utf8_lossy(&body[i..]);
            Err(FetchError::ServiceException {
                type_name: type_name.to_string(),
                message: text.chars().take(300).collect(),
            })
        }
        None => Err(FetchError::ServiceException {
            type_name: type_name.to_string(),
            message: "empty response body".to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_fetcher(dir: &std::path::Path) -> Fetcher {
        let options = FetcherOptions {
            request_timeout: Duration::from_secs(2),
            max_retries: 0,
        };
        Fetcher::new(
            WfsSource::new("http://127.0.0.1:9/wfs"),
            DatasetCache::new(dir),
            options,
        )
        .unwrap()
    }

    #[test]
    fn test_service_exception_detection() {
        let xml = b"  <?xml version=\"1.0\"?><ows:ExceptionReport/>";
        assert!(matches!(
            check_service_exception("a:b", xml),
            Err(FetchError::ServiceException { .. })
        ));
        assert!(check_service_exception("a:b", b"").is_err());
        assert!(check_service_exception("a:b", br#"{"type":"FeatureCollection"}"#).is_ok());
    }

    #[tokio::test]
    async fn test_cached_dataset_is_not_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = offline_fetcher(dir.path());
        fetcher
            .cache()
            .store(
                "avoindata:Maavesi_merialue",
                br#"{"type":"FeatureCollection","features":[]}"#,
            )
            .unwrap();

        let outcome = fetcher.ensure("avoindata:Maavesi_merialue").await.unwrap();
        assert!(!outcome.downloaded);
        assert_eq!(outcome.path, dir.path().join("Maavesi_merialue.geojson"));

        let fc = fetcher.load("avoindata:Maavesi_merialue").await.unwrap();
        assert!(fc.is_empty());
    }

    #[tokio::test]
    async fn test_missing_dataset_hits_network() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = offline_fetcher(dir.path());
        let err = fetcher.ensure("avoindata:Postinumeroalue").await.unwrap_err();
        assert!(matches!(err, FetchError::Http(_)));
        assert!(!fetcher.cache().is_cached("avoindata:Postinumeroalue"));
    }
}

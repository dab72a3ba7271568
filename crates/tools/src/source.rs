use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use formats::{CityDataset, FeatureCollection, borders_from_json_str};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("GET {url}: {source}")]
    Http { url: String, source: reqwest::Error },
    #[error("GET {url}: HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("{location}: {reason}")]
    Parse { location: String, reason: String },
}

/// Where a dataset comes from: a local file or an HTTP(S) URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Url(String),
}

impl Source {
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Source::Url(trimmed.to_string())
        } else {
            Source::File(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Url(url) => f.write_str(url),
        }
    }
}

/// Fetches sources with one shared client and timeout.
#[derive(Debug, Clone)]
pub struct Loader {
    client: reqwest::Client,
}

impl Loader {
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub async fn read_text(&self, source: &Source) -> Result<String, SourceError> {
        match source {
            Source::File(path) => read_file(path).await,
            Source::Url(url) => {
                debug!(%url, "fetching");
                let http = |source| SourceError::Http {
                    url: url.clone(),
                    source,
                };
                let resp = self.client.get(url).send().await.map_err(http)?;
                if !resp.status().is_success() {
                    return Err(SourceError::Status {
                        url: url.clone(),
                        status: resp.status().as_u16(),
                    });
                }
                resp.text().await.map_err(http)
            }
        }
    }

    pub async fn borders(
        &self,
        source: &Source,
        object: &str,
    ) -> Result<FeatureCollection, SourceError> {
        let text = self.read_text(source).await?;
        let features = borders_from_json_str(&text, object).map_err(|e| SourceError::Parse {
            location: source.to_string(),
            reason: e.to_string(),
        })?;
        info!(%source, features = features.len(), "borders loaded");
        Ok(features)
    }

    pub async fn cities(&self, source: &Source) -> Result<CityDataset, SourceError> {
        let text = self.read_text(source).await?;
        let cities = CityDataset::from_json_str(&text).map_err(|e| SourceError::Parse {
            location: source.to_string(),
            reason: e.to_string(),
        })?;
        info!(%source, cities = cities.len(), skipped = cities.skipped, "cities loaded");
        Ok(cities)
    }
}

async fn read_file(path: &Path) -> Result<String, SourceError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::{Loader, Source, SourceError};
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn parses_urls_and_paths() {
        assert_eq!(
            Source::parse("https://unpkg.com/world-atlas@2/countries-50m.json"),
            Source::Url("https://unpkg.com/world-atlas@2/countries-50m.json".to_string())
        );
        assert_eq!(
            Source::parse(" data/worldcities.json "),
            Source::File(PathBuf::from("data/worldcities.json"))
        );
    }

    #[tokio::test]
    async fn loads_cities_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(
            file,
            r#"[{{"city":"Oslo","country":"Norway","lat":59.91,"lng":10.75,"population":1064235}}]"#
        )
        .expect("write");

        let loader = Loader::new(None).expect("client");
        let cities = loader
            .cities(&Source::File(file.path().to_path_buf()))
            .await
            .expect("cities");
        assert_eq!(cities.len(), 1);
        assert_eq!(cities.cities[0].name, "Oslo");
    }

    #[tokio::test]
    async fn reports_missing_files_and_bad_payloads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loader = Loader::new(None).expect("client");

        let missing = Source::File(dir.path().join("nope.json"));
        let err = loader.read_text(&missing).await.unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));

        let path = dir.path().join("borders.json");
        std::fs::write(&path, r#"{"type":"Feature"}"#).expect("write");
        let err = loader
            .borders(&Source::File(path), "countries")
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
    }
}

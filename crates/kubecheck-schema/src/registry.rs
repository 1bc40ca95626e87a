//! # Schema Registries
//!
//! A registry turns template data into schema bytes. Two implementations:
//! [`LocalRegistry`] reads files, [`HttpRegistry`] downloads and caches.
//! "Not found" is an ordinary outcome (`RegistryError::NotFound`) so the
//! validator can fall through to the next registry.

use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::DiskCache;
use crate::error::{RegistryError, SchemaError};
use crate::location::{SchemaLocation, TemplateData};
use crate::retry::retry_send;

/// Schema bytes together with the location they came from.
#[derive(Debug, Clone)]
pub struct FetchedSchema {
    /// Rendered URL or path.
    pub location: String,
    /// Raw schema JSON.
    pub bytes: Vec<u8>,
}

/// A source of schemas.
pub trait Registry: Send + Sync + std::fmt::Debug {
    /// Retrieve the schema for the given template data.
    fn download(&self, data: &TemplateData) -> Result<FetchedSchema, RegistryError>;
}

/// Registry backed by files on disk.
#[derive(Debug)]
pub struct LocalRegistry {
    location: SchemaLocation,
}

impl LocalRegistry {
    /// Create a registry from a parsed location.
    pub fn new(location: SchemaLocation) -> Self {
        Self { location }
    }
}

impl Registry for LocalRegistry {
    fn download(&self, data: &TemplateData) -> Result<FetchedSchema, RegistryError> {
        let path = self.location.render(data);
        match std::fs::read(&path) {
            Ok(bytes) => {
                if !is_json(&bytes) {
                    return Err(RegistryError::NotJson { location: path });
                }
                Ok(FetchedSchema {
                    location: path,
                    bytes,
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(RegistryError::NotFound { location: path })
            }
            Err(source) => Err(RegistryError::Io {
                path,
                source: Arc::new(source),
            }),
        }
    }
}

/// Registry served over HTTP(S), with an optional on-disk cache.
#[derive(Debug)]
pub struct HttpRegistry {
    location: SchemaLocation,
    client: reqwest::blocking::Client,
    cache: Option<DiskCache>,
}

impl HttpRegistry {
    /// Create a registry with its own HTTP client.
    ///
    /// # Errors
    ///
    /// `SchemaError::HttpClient` if the client cannot be built.
    pub fn new(
        location: SchemaLocation,
        cache: Option<DiskCache>,
        skip_tls: bool,
        timeout: Duration,
    ) -> Result<Self, SchemaError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(skip_tls)
            .build()
            .map_err(|e| SchemaError::HttpClient(e.to_string()))?;
        Ok(Self {
            location,
            client,
            cache,
        })
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, RegistryError> {
        let resp = retry_send(url, || self.client.get(url).send()).map_err(|e| {
            RegistryError::Http {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound {
                location: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(RegistryError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = resp.bytes().map_err(|e| RegistryError::Http {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }
}

impl Registry for HttpRegistry {
    fn download(&self, data: &TemplateData) -> Result<FetchedSchema, RegistryError> {
        let url = self.location.render(data);

        if let Some(bytes) = self.cache.as_ref().and_then(|c| c.get(&url)) {
            if is_json(&bytes) {
                tracing::debug!(%url, "schema cache hit");
                return Ok(FetchedSchema {
                    location: url,
                    bytes,
                });
            }
            tracing::warn!(%url, "cached schema is not valid JSON, downloading again");
        }

        tracing::debug!(%url, "downloading schema");
        let bytes = self.fetch(&url)?;
        if !is_json(&bytes) {
            return Err(RegistryError::NotJson { location: url });
        }

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&url, &bytes) {
                tracing::warn!(%url, cache = %cache.dir().display(), "failed writing schema cache: {e}");
            }
        }

        Ok(FetchedSchema {
            location: url,
            bytes,
        })
    }
}

/// Build the registry matching a location.
fn is_json(bytes: &[u8]) -> bool {
    serde_json::from_slice::<serde::de::IgnoredAny>(bytes).is_ok()
}

pub(crate) fn for_location(
    location: SchemaLocation,
    cache: Option<&DiskCache>,
    skip_tls: bool,
    timeout: Duration,
) -> Result<Box<dyn Registry>, SchemaError> {
    if location.is_remote() {
        Ok(Box::new(HttpRegistry::new(
            location,
            cache.cloned(),
            skip_tls,
            timeout,
        )?))
    } else {
        Ok(Box::new(LocalRegistry::new(location)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> TemplateData {
        TemplateData::new("ConfigMap", "v1", "master", false)
    }

    #[test]
    fn local_registry_reads_rendered_path() {
        let dir = tempfile::tempdir().unwrap();
        let schema_dir = dir.path().join("master-standalone");
        std::fs::create_dir_all(&schema_dir).unwrap();
        std::fs::write(schema_dir.join("configmap-v1.json"), br#"{"type": "object"}"#).unwrap();

        let location = SchemaLocation::parse(&dir.path().display().to_string()).unwrap();
        let fetched = LocalRegistry::new(location).download(&data()).unwrap();
        assert!(fetched.location.ends_with("master-standalone/configmap-v1.json"));
        assert_eq!(fetched.bytes, br#"{"type": "object"}"#.to_vec());
    }

    #[test]
    fn local_registry_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let location = SchemaLocation::parse(&dir.path().display().to_string()).unwrap();
        let err = LocalRegistry::new(location).download(&data()).unwrap_err();
        assert!(err.is_not_found(), "expected not found, got {err}");
    }

    #[test]
    fn local_registry_non_json_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let schema_dir = dir.path().join("master-standalone");
        std::fs::create_dir_all(&schema_dir).unwrap();
        std::fs::write(schema_dir.join("configmap-v1.json"), b"<html>").unwrap();

        let location = SchemaLocation::parse(&dir.path().display().to_string()).unwrap();
        let err = LocalRegistry::new(location).download(&data()).unwrap_err();
        assert!(matches!(err, RegistryError::NotJson { .. }));
        assert!(err.is_not_found());
    }

    #[test]
    fn http_registry_serves_from_cache_without_network() {
        let cache_dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::open(cache_dir.path()).unwrap();
        // Port 1 is closed; only a cache hit can succeed.
        let location =
            SchemaLocation::parse("http://127.0.0.1:1/{{ .ResourceKind }}{{ .KindSuffix }}.json")
                .unwrap();
        cache
            .set("http://127.0.0.1:1/configmap-v1.json", br#"{"type": "object"}"#)
            .unwrap();

        let registry =
            HttpRegistry::new(location, Some(cache), false, Duration::from_secs(1)).unwrap();
        let fetched = registry.download(&data()).unwrap();
        assert_eq!(fetched.location, "http://127.0.0.1:1/configmap-v1.json");
        assert_eq!(fetched.bytes, br#"{"type": "object"}"#.to_vec());
    }
}

//! Archival location addressing.
/*
 * Copyright 2022-2025 Crown Copyright
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */
use std::fmt::{Display, Formatter};
use thiserror::Error;
use url::Url;

/// Errors raised when constructing an [`ArchiveLocation`].
#[derive(Debug, Error)]
pub enum LocationError {
    /// The URI could not be parsed at all.
    #[error("malformed archival URI")]
    Malformed(#[from] url::ParseError),
    /// The URI parsed but carries no namespace (host) component.
    #[error("archival URI has no namespace component")]
    MissingNamespace,
}

/// Identifies a namespace (container or bucket) and a hierarchical path
/// prefix within a remote blob store.
///
/// Built from a parsed URI at call time; never persisted. The URI scheme
/// marks which storage backend the location addresses. The namespace must be
/// non-empty; the path may be empty (the namespace root).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLocation {
    url: Url,
}

impl ArchiveLocation {
    /// Parse an archival URI such as `as://my-container/temporal_archival/development`.
    ///
    /// # Errors
    /// If the URI is malformed or has no namespace component.
    pub fn new(uri: &str) -> Result<Self, LocationError> {
        Self::from_url(Url::parse(uri)?)
    }

    /// Wrap an already-parsed URL.
    ///
    /// # Errors
    /// If the URL has no namespace component.
    pub fn from_url(url: Url) -> Result<Self, LocationError> {
        if url.host_str().is_none_or(str::is_empty) {
            return Err(LocationError::MissingNamespace);
        }
        Ok(Self { url })
    }

    /// The URI scheme naming the storage backend.
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// The namespace (container or bucket) component. Never empty.
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.url.host_str().unwrap_or("")
    }

    /// The hierarchical path prefix, as parsed. May be empty.
    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path()
    }
}

impl Display for ArchiveLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Normalise a blob path by stripping exactly one leading separator.
///
/// `"/a/b"` becomes `"a/b"`, `"/"` becomes `""`, and a path without a leading
/// separator is returned unchanged. Idempotent on already-normalised paths.
#[must_use]
pub fn format_blob_path(blob_path: &str) -> &str {
    blob_path.strip_prefix('/').unwrap_or(blob_path)
}

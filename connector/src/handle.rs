//! Capability traits over a remote blob store.
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
use async_trait::async_trait;
use bytes::Bytes;
#[cfg(test)]
use mockall::automock;

/// Continuation marker for segment-by-segment listing.
///
/// Mirrors the remote store's pagination token. Three observable states:
/// initial (listing has not started), continuation (a non-empty token, more
/// data exists) and exhausted (terminal).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marker(Option<String>);

impl Marker {
    /// Marker for the first segment of an enumeration.
    #[must_use]
    pub fn initial() -> Self {
        Self(None)
    }

    /// Continuation marker wrapping a store-issued token.
    #[must_use]
    pub fn continuation(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// Terminal marker: the enumeration has no further segments.
    #[must_use]
    pub fn exhausted() -> Self {
        Self(Some(String::new()))
    }

    /// Build the next marker from a store page token; absence is terminal.
    #[must_use]
    pub fn from_page_token(token: Option<String>) -> Self {
        match token {
            Some(token) if !token.is_empty() => Self(Some(token)),
            _ => Self::exhausted(),
        }
    }

    /// True while further segments may exist.
    #[must_use]
    pub fn not_done(&self) -> bool {
        match &self.0 {
            None => true,
            Some(token) => !token.is_empty(),
        }
    }

    /// The raw token to send on the next round trip, if one was issued.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.0.as_deref().filter(|token| !token.is_empty())
    }
}

/// One network round trip's worth of listing results.
///
/// Produced by the store, consumed immediately, never retained across calls.
#[derive(Debug)]
pub struct ListSegment {
    /// Entry names in store enumeration order. The order is whatever the
    /// remote store returns; it is not guaranteed to be globally sorted.
    pub names: Vec<String>,
    /// Marker for the next round trip.
    pub next_marker: Marker,
}

/// Entry point to a remote blob store. Namespaces are containers or buckets.
#[cfg_attr(test, automock)]
pub trait StorageBackend: Send + Sync {
    /// Open a handle on the named namespace. Local only; performs no I/O.
    ///
    /// # Errors
    /// If the backend configuration cannot address the namespace.
    fn namespace(&self, name: &str) -> Result<Box<dyn NamespaceHandle>, object_store::Error>;
}

/// Operations on a single namespace.
///
/// Remote errors are returned unmodified; translation into domain outcomes
/// is the classifier's job, not the handle's.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NamespaceHandle: Send + Sync {
    /// Open a handle on the object at `path`. Local only; performs no I/O.
    fn object(&self, path: &str) -> Box<dyn ObjectHandle>;

    /// Probe the namespace for existence.
    async fn get_properties(&self) -> Result<(), object_store::Error>;

    /// Fetch one listing segment for `prefix`, continuing from `marker`.
    async fn list_segment(
        &self,
        prefix: &str,
        marker: &Marker,
    ) -> Result<ListSegment, object_store::Error>;
}

/// Operations on a single object within a namespace.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectHandle: Send + Sync {
    /// Write the full payload in one call, silently overwriting any
    /// existing object.
    async fn upload(&self, data: Bytes) -> Result<(), object_store::Error>;

    /// Read the full object content, eagerly materialised into memory.
    async fn download(&self) -> Result<Bytes, object_store::Error>;

    /// Probe the object for existence.
    async fn get_properties(&self) -> Result<(), object_store::Error>;
}

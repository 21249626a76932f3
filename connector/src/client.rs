//! The archival storage client: object I/O facade and existence classifier.
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
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use log::debug;

use crate::{
    error::{ConnectorError, QueryError},
    handle::{NamespaceHandle, StorageBackend},
    location::{ArchiveLocation, format_blob_path},
    query::{FilteredPage, Predicate, run_filtered_query, run_query},
};

/// A clean abstraction layer between the archival layer and a remote blob
/// store. Implementations are swappable per backend without touching the
/// listing logic.
#[async_trait]
pub trait Client: Send + Sync {
    /// Push a blob into the namespace, silently overwriting any existing
    /// object of the same name.
    async fn upload(
        &self,
        location: &ArchiveLocation,
        name: &str,
        data: Bytes,
    ) -> Result<(), ConnectorError>;

    /// Retrieve a blob's full content.
    ///
    /// Not-found conditions are not classified here; callers wanting that
    /// distinction probe with [`Client::exists`] first.
    async fn get(&self, location: &ArchiveLocation, name: &str) -> Result<Bytes, ConnectorError>;

    /// Check that the namespace, and optionally a blob within it, exists.
    ///
    /// With an empty `name` this is a namespace-existence probe. A missing
    /// namespace is [`ConnectorError::NamespaceNotFound`] and a missing blob
    /// is [`ConnectorError::ObjectNotFound`]; the split matters upstream
    /// because the two have different recovery policies.
    async fn exists(&self, location: &ArchiveLocation, name: &str)
    -> Result<bool, ConnectorError>;

    /// Retrieve every blob name under the prefix, unfiltered and unwindowed.
    async fn query(
        &self,
        location: &ArchiveLocation,
        prefix: &str,
    ) -> Result<Vec<String>, ConnectorError>;

    /// Retrieve blob names matching every filter, windowed by `offset` and
    /// `page_size`. A `page_size` of zero means all records.
    async fn query_with_filters(
        &self,
        location: &ArchiveLocation,
        prefix: &str,
        page_size: usize,
        offset: usize,
        filters: &[Predicate],
    ) -> Result<FilteredPage, QueryError>;
}

/// [`Client`] implementation over a [`StorageBackend`].
pub struct StorageWrapper {
    backend: Arc<dyn StorageBackend>,
}

impl StorageWrapper {
    /// Wrap a storage backend. The namespace (container or bucket) must be
    /// created beforehand; this library does not create it.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    fn open_namespace(
        &self,
        location: &ArchiveLocation,
    ) -> Result<Box<dyn NamespaceHandle>, ConnectorError> {
        Ok(self.backend.namespace(location.namespace())?)
    }

    fn blob_path(location: &ArchiveLocation, name: &str) -> String {
        format!("{}/{}", format_blob_path(location.path()), name)
    }

    fn listing_prefix(location: &ArchiveLocation, prefix: &str) -> String {
        format!("{}/{}", format_blob_path(location.path()), prefix)
    }
}

fn is_not_found(err: &object_store::Error) -> bool {
    matches!(err, object_store::Error::NotFound { .. })
}

#[async_trait]
impl Client for StorageWrapper {
    async fn upload(
        &self,
        location: &ArchiveLocation,
        name: &str,
        data: Bytes,
    ) -> Result<(), ConnectorError> {
        let namespace = self.open_namespace(location)?;
        let path = Self::blob_path(location, name);
        debug!(
            "PUT {} bytes to {}/{}",
            data.len(),
            location.namespace(),
            path
        );
        namespace.object(&path).upload(data).await?;
        Ok(())
    }

    async fn get(&self, location: &ArchiveLocation, name: &str) -> Result<Bytes, ConnectorError> {
        let namespace = self.open_namespace(location)?;
        let path = Self::blob_path(location, name);
        debug!("GET {}/{}", location.namespace(), path);
        Ok(namespace.object(&path).download().await?)
    }

    async fn exists(
        &self,
        location: &ArchiveLocation,
        name: &str,
    ) -> Result<bool, ConnectorError> {
        let namespace = self.open_namespace(location)?;

        if let Err(err) = namespace.get_properties().await {
            if is_not_found(&err) {
                return Err(ConnectorError::NamespaceNotFound);
            }
            return Err(err.into());
        }

        // Probing only the namespace
        if name.is_empty() {
            return Ok(true);
        }

        let path = Self::blob_path(location, name);
        if let Err(err) = namespace.object(&path).get_properties().await {
            if is_not_found(&err) {
                return Err(ConnectorError::ObjectNotFound);
            }
            return Err(err.into());
        }

        Ok(true)
    }

    async fn query(
        &self,
        location: &ArchiveLocation,
        prefix: &str,
    ) -> Result<Vec<String>, ConnectorError> {
        let namespace = self.open_namespace(location)?;
        run_query(namespace.as_ref(), &Self::listing_prefix(location, prefix)).await
    }

    async fn query_with_filters(
        &self,
        location: &ArchiveLocation,
        prefix: &str,
        page_size: usize,
        offset: usize,
        filters: &[Predicate],
    ) -> Result<FilteredPage, QueryError> {
        let namespace = self.open_namespace(location).map_err(|source| QueryError {
            position: offset,
            source,
        })?;
        run_filtered_query(
            namespace.as_ref(),
            &Self::listing_prefix(location, prefix),
            page_size,
            offset,
            filters,
        )
        .await
    }
}

//! Map archival URI schemes to storage backend providers.
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
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;

use crate::{
    azure::AzureStorageBackend, error::ConnectorError, handle::StorageBackend,
    s3::S3StorageBackend,
};

/// Constructs a [`StorageBackend`] on demand.
///
/// Construction is asynchronous because credential resolution may perform
/// I/O (e.g. the AWS default provider chain).
#[async_trait]
pub trait BackendProvider: Send + Sync {
    /// Build a backend ready to serve handles.
    async fn connect(&self) -> Result<Arc<dyn StorageBackend>, ConnectorError>;
}

/// Registry from URI scheme to [`BackendProvider`].
///
/// Intended to be initialised once at process start; lookups never fall back
/// silently — an unknown scheme is an error.
pub struct BackendRegistry {
    providers: RwLock<HashMap<String, Arc<dyn BackendProvider>>>,
}

impl BackendRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
        }
    }

    /// A registry seeded with the built-in schemes: `s3` (Amazon S3) and
    /// `as` (Azure Blob Storage).
    #[must_use]
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register("s3", Arc::new(S3Provider));
        registry.register("as", Arc::new(AzureProvider));
        registry
    }

    /// Register a provider for a scheme.
    ///
    /// If a provider was already registered for the scheme, it is replaced
    /// and returned.
    ///
    /// # Panics
    /// If the registry lock is poisoned.
    pub fn register(
        &self,
        scheme: impl Into<String>,
        provider: Arc<dyn BackendProvider>,
    ) -> Option<Arc<dyn BackendProvider>> {
        self.providers
            .write()
            .expect("backend registry lock poisoned")
            .insert(scheme.into(), provider)
    }

    /// Resolve the provider for a scheme. Fails closed: an unknown scheme is
    /// [`ConnectorError::UnknownScheme`], never a silent fallback.
    ///
    /// # Errors
    /// If no provider is registered for `scheme`.
    ///
    /// # Panics
    /// If the registry lock is poisoned.
    pub fn resolve(&self, scheme: &str) -> Result<Arc<dyn BackendProvider>, ConnectorError> {
        self.providers
            .read()
            .expect("backend registry lock poisoned")
            .get(scheme)
            .cloned()
            .ok_or_else(|| ConnectorError::UnknownScheme(scheme.to_owned()))
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Provider for the `s3` scheme: AWS default credential chain.
struct S3Provider;

#[async_trait]
impl BackendProvider for S3Provider {
    async fn connect(&self) -> Result<Arc<dyn StorageBackend>, ConnectorError> {
        Ok(Arc::new(S3StorageBackend::from_default_credentials().await?))
    }
}

/// Provider for the `as` scheme: Azure environment credentials.
struct AzureProvider;

#[async_trait]
impl BackendProvider for AzureProvider {
    async fn connect(&self) -> Result<Arc<dyn StorageBackend>, ConnectorError> {
        Ok(Arc::new(AzureStorageBackend::from_env()?))
    }
}

//! Amazon S3 storage backend and AWS credential retrieval.
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
use std::{future::ready, pin::Pin, sync::Arc};

use aws_config::BehaviorVersion;
use aws_credential_types::provider::ProvideCredentials;
use object_store::{
    CredentialProvider, Error,
    aws::{AmazonS3Builder, AwsCredential},
};

use crate::{
    error::ConnectorError,
    handle::{NamespaceHandle, StorageBackend},
    store::RemoteNamespace,
};

/// A tuple struct to bridge AWS credentials obtained from the [`aws_config`]
/// crate and the [`CredentialProvider`] trait in the [`object_store`] crate.
#[derive(Debug)]
struct CredentialsFromConfigProvider(Arc<AwsCredential>);

impl CredentialsFromConfigProvider {
    /// Create a credentials provider for an `object_store` S3 implementation.
    /// The credentials should be able to provide AWS key, secret key and
    /// session token.
    pub fn new(creds: &aws_credential_types::Credentials) -> CredentialsFromConfigProvider {
        Self(Arc::new(AwsCredential {
            key_id: creds.access_key_id().to_owned(),
            secret_key: creds.secret_access_key().to_owned(),
            token: creds.session_token().map(ToOwned::to_owned),
        }))
    }
}

impl CredentialProvider for CredentialsFromConfigProvider {
    type Credential = AwsCredential;

    fn get_credential<'a, 'async_trait>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Arc<Self::Credential>, Error>> + Send + 'async_trait>>
    where
        'a: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(ready(Ok(self.0.clone())))
    }
}

/// [`StorageBackend`] over Amazon S3. Namespaces are buckets; handles are
/// built by cloning a shared builder, which performs no I/O.
#[derive(Debug, Clone)]
pub struct S3StorageBackend {
    config: AmazonS3Builder,
}

impl S3StorageBackend {
    /// Create a backend from a pre-configured builder.
    #[must_use]
    pub fn new(config: AmazonS3Builder) -> Self {
        Self { config }
    }

    /// Create a backend from the default credential provider chain.
    ///
    /// # Errors
    /// Fails if we can't find any credentials in any of the
    /// [standard places](https://docs.aws.amazon.com/sdk-for-rust/latest/dg/credproviders.html),
    /// or if a default region is not set.
    pub async fn from_default_credentials() -> Result<Self, ConnectorError> {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        let creds = config
            .credentials_provider()
            .ok_or_else(|| ConnectorError::Config("couldn't retrieve AWS credentials".into()))?
            .provide_credentials()
            .await
            .map_err(|err| ConnectorError::Config(err.to_string()))?;
        let region = config
            .region()
            .ok_or_else(|| ConnectorError::Config("couldn't retrieve AWS region".into()))?;
        Ok(Self::new(
            AmazonS3Builder::from_env()
                .with_credentials(Arc::new(CredentialsFromConfigProvider::new(&creds)))
                .with_region(region.as_ref()),
        ))
    }
}

impl StorageBackend for S3StorageBackend {
    fn namespace(&self, name: &str) -> Result<Box<dyn NamespaceHandle>, Error> {
        let store = self.config.clone().with_bucket_name(name).build()?;
        Ok(Box::new(RemoteNamespace::new(store)))
    }
}

//! Azure Blob Storage backend and environment credential resolution.
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
use std::env;

use object_store::{Error, azure::MicrosoftAzureBuilder};

use crate::{
    error::ConnectorError,
    handle::{NamespaceHandle, StorageBackend},
    store::RemoteNamespace,
};

/// Connection string environment variable, tried first.
pub const CONNECTION_STRING_VAR: &str = "AZURE_STORAGE_CONNECTION_STRING";
/// Account name environment variable, paired with [`KEY_VAR`].
pub const ACCOUNT_VAR: &str = "AZURE_STORAGE_ACCOUNT";
/// Account key environment variable, paired with [`ACCOUNT_VAR`].
pub const KEY_VAR: &str = "AZURE_STORAGE_KEY";

/// [`StorageBackend`] over Azure Blob Storage. Namespaces are containers;
/// handles are built by cloning a shared builder, which performs no I/O.
#[derive(Debug, Clone)]
pub struct AzureStorageBackend {
    config: MicrosoftAzureBuilder,
}

impl AzureStorageBackend {
    /// Create a backend from a pre-configured builder.
    #[must_use]
    pub fn new(config: MicrosoftAzureBuilder) -> Self {
        Self { config }
    }

    /// Create a backend from environment credentials: a connection string,
    /// or an account-name/account-key pair.
    ///
    /// # Errors
    /// If neither credential source is present — a configuration error the
    /// caller cannot recover from at runtime.
    pub fn from_env() -> Result<Self, ConnectorError> {
        if let Ok(connection_string) = env::var(CONNECTION_STRING_VAR) {
            let (account, key) = parse_connection_string(&connection_string)?;
            return Ok(Self::with_shared_key(&account, &key));
        }

        if let (Ok(account), Ok(key)) = (env::var(ACCOUNT_VAR), env::var(KEY_VAR)) {
            if !account.is_empty() && !key.is_empty() {
                return Ok(Self::with_shared_key(&account, &key));
            }
        }

        Err(ConnectorError::Config(format!(
            "Azure credentials not found: set {CONNECTION_STRING_VAR}, or both {ACCOUNT_VAR} and {KEY_VAR}"
        )))
    }

    /// Create a backend from an explicit shared-key credential.
    #[must_use]
    pub fn with_shared_key(account: &str, key: &str) -> Self {
        Self::new(
            MicrosoftAzureBuilder::new()
                .with_account(account)
                .with_access_key(key),
        )
    }
}

impl StorageBackend for AzureStorageBackend {
    fn namespace(&self, name: &str) -> Result<Box<dyn NamespaceHandle>, Error> {
        let store = self.config.clone().with_container_name(name).build()?;
        Ok(Box::new(RemoteNamespace::new(store)))
    }
}

/// Extract the account name and key from an Azure storage connection string,
/// e.g. `DefaultEndpointsProtocol=https;AccountName=x;AccountKey=y;EndpointSuffix=core.windows.net`.
fn parse_connection_string(connection_string: &str) -> Result<(String, String), ConnectorError> {
    let mut account = None;
    let mut key = None;
    for field in connection_string.split(';') {
        // Account keys are base64 and may themselves contain '='
        let Some((name, value)) = field.split_once('=') else {
            continue;
        };
        match name {
            "AccountName" => account = Some(value.to_owned()),
            "AccountKey" => key = Some(value.to_owned()),
            _ => {}
        }
    }
    match (account, key) {
        (Some(account), Some(key)) => Ok((account, key)),
        _ => Err(ConnectorError::Config(
            "connection string must contain AccountName and AccountKey".into(),
        )),
    }
}

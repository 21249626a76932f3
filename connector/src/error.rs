//! Connector error taxonomy.
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
use thiserror::Error;

/// Errors surfaced by the connector.
///
/// The two not-found variants are stable sentinels: callers match on them by
/// identity, never by message. Everything else passes through from the
/// underlying store unmodified; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The namespace (container or bucket) does not exist. Non-retryable.
    #[error("container not found")]
    NamespaceNotFound,

    /// The object does not exist within an existing namespace. Non-retryable.
    #[error("blob not found")]
    ObjectNotFound,

    /// No storage backend is registered for the URI scheme.
    #[error("no storage backend registered for scheme {0:?}")]
    UnknownScheme(String),

    /// Credential or backend configuration failure, raised before any remote
    /// operation runs.
    #[error("storage configuration error: {0}")]
    Config(String),

    /// Any other error from the underlying store, passed through unmodified.
    #[error(transparent)]
    Storage(#[from] object_store::Error),
}

/// Error from a filtered listing that aborted mid-pagination.
///
/// Carries the accepted-count position reached before the failure so a
/// caller can resume from it on a later attempt (at-least-once resumption,
/// not exactly-once).
#[derive(Debug, Error)]
#[error("listing aborted after {position} accepted entries")]
pub struct QueryError {
    /// Accepted-count position reached before the abort.
    pub position: usize,
    /// The underlying failure.
    #[source]
    pub source: ConnectorError,
}

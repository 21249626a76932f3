//! Archival error taxonomy.
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
use connector::{ConnectorError, QueryError};
use thiserror::Error;

/// Errors surfaced by the history archiver.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archival URI names a scheme this archiver does not serve.
    #[error("URI scheme does not match this archiver: {0:?}")]
    SchemeMismatch(String),

    /// The archival URI is structurally unusable (no target path).
    #[error("invalid archival URI: {0}")]
    InvalidUri(String),

    /// The request is missing a required field or carries an unusable value.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No archived history exists for the requested workflow.
    #[error("no archived history for the requested workflow")]
    HistoryNotFound,

    /// The supplied page token could not be decoded.
    #[error("malformed page token")]
    InvalidToken(#[source] serde_json::Error),

    /// The caller-supplied history iterator failed to produce a batch.
    #[error("history iterator failure")]
    Iterator(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A storage operation failed; see [`ConnectorError`] for the taxonomy.
    #[error(transparent)]
    Connector(#[from] ConnectorError),

    /// A filtered listing aborted mid-pagination.
    #[error(transparent)]
    Query(#[from] QueryError),
}

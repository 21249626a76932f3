//! Archival and retrieval of workflow history batches.
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
use connector::{ArchiveLocation, Client, ConnectorError, FilteredPage, Predicate, format_blob_path};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    error::ArchiveError,
    filename::{construct_history_filename, history_filename_prefix, parse_history_filename},
};

/// Request to archive the full history of one closed workflow execution.
#[derive(Debug, Clone)]
pub struct ArchiveHistoryRequest {
    pub namespace_id: String,
    pub namespace: String,
    pub workflow_id: String,
    pub run_id: String,
    pub close_failover_version: i64,
}

/// Request for one page of a previously archived history.
#[derive(Debug, Clone)]
pub struct GetHistoryRequest {
    pub namespace_id: String,
    pub workflow_id: String,
    pub run_id: String,
    /// Maximum number of history batches per page. Must be positive.
    pub page_size: usize,
    /// Opaque token from a previous response, absent for the first page.
    pub next_page_token: Option<Vec<u8>>,
}

/// One page of archived history batches, in batch order.
#[derive(Debug)]
pub struct GetHistoryResponse {
    /// Serialized history batches, exactly as they were archived.
    pub records: Vec<Bytes>,
    /// Token for the next page, absent once the history is drained.
    pub next_page_token: Option<Vec<u8>>,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
struct HistoryPageToken {
    version: i64,
    batch_index: usize,
}

/// Source of serialized history batches for one workflow execution.
///
/// History serialization lives behind this boundary: the archiver treats
/// each batch as opaque bytes.
#[async_trait]
pub trait HistoryIterator: Send {
    /// Whether another batch is available.
    fn has_next(&self) -> bool;

    /// Produce the next serialized batch.
    async fn next(&mut self) -> Result<Bytes, Box<dyn std::error::Error + Send + Sync>>;
}

/// Archives closed workflow histories into a blob store and reads them back
/// page by page.
pub struct HistoryArchiver {
    storage: Arc<dyn Client>,
    scheme: String,
}

impl HistoryArchiver {
    /// Create an archiver over a storage client serving the given URI scheme.
    pub fn new(storage: Arc<dyn Client>, scheme: impl Into<String>) -> Self {
        Self {
            storage,
            scheme: scheme.into(),
        }
    }

    /// Check an archival URI names this archiver's backend, addresses a
    /// usable target and that the target namespace exists.
    ///
    /// # Errors
    /// [`ArchiveError::SchemeMismatch`] or [`ArchiveError::InvalidUri`] for a
    /// structurally wrong URI; storage errors (including
    /// [`ConnectorError::NamespaceNotFound`]) pass through from the probe.
    pub async fn validate_uri(&self, location: &ArchiveLocation) -> Result<(), ArchiveError> {
        if location.scheme() != self.scheme {
            return Err(ArchiveError::SchemeMismatch(location.scheme().to_owned()));
        }
        if format_blob_path(location.path()).is_empty() {
            return Err(ArchiveError::InvalidUri(location.to_string()));
        }
        self.storage.exists(location, "").await?;
        Ok(())
    }

    /// Archive every batch produced by `history` under the target location.
    ///
    /// Batches already present in the store are skipped, making re-archival
    /// of a partially archived history idempotent. Returns the number of
    /// batches the iterator produced.
    ///
    /// # Errors
    /// The first failed probe, upload or iterator step aborts the call.
    pub async fn archive(
        &self,
        location: &ArchiveLocation,
        request: &ArchiveHistoryRequest,
        history: &mut dyn HistoryIterator,
    ) -> Result<usize, ArchiveError> {
        validate_archive_request(request)?;
        self.validate_uri(location).await?;

        let mut batch_index = 0;
        while history.has_next() {
            let record = history.next().await.map_err(ArchiveError::Iterator)?;
            let filename = construct_history_filename(
                &request.namespace_id,
                &request.workflow_id,
                &request.run_id,
                request.close_failover_version,
                batch_index,
            );
            match self.storage.exists(location, &filename).await {
                Ok(_) => {
                    debug!("history blob {filename} already archived, skipping upload");
                }
                Err(ConnectorError::ObjectNotFound) => {
                    debug!("uploading history blob {filename}");
                    self.storage.upload(location, &filename, record).await?;
                }
                Err(err) => return Err(err.into()),
            }
            batch_index += 1;
        }

        info!(
            "archived {batch_index} history batches for workflow {} run {}",
            request.workflow_id, request.run_id
        );
        Ok(batch_index)
    }

    /// Read one page of a previously archived history.
    ///
    /// The first page selects the highest close failover version present in
    /// the store; follow-up pages carry that choice in the token so the
    /// version stays pinned across the whole read.
    ///
    /// # Errors
    /// [`ArchiveError::HistoryNotFound`] when nothing was archived for the
    /// workflow; [`ArchiveError::InvalidToken`] for an undecodable token.
    pub async fn get(
        &self,
        location: &ArchiveLocation,
        request: &GetHistoryRequest,
    ) -> Result<GetHistoryResponse, ArchiveError> {
        validate_get_request(request)?;
        self.validate_uri(location).await?;

        let prefix =
            history_filename_prefix(&request.namespace_id, &request.workflow_id, &request.run_id);
        let names = self.storage.query(location, &prefix).await?;
        let batches: Vec<_> = names
            .iter()
            .filter_map(|name| parse_history_filename(name))
            .collect();
        let highest_version = batches
            .iter()
            .map(|batch| batch.version)
            .max()
            .ok_or(ArchiveError::HistoryNotFound)?;

        let token = match &request.next_page_token {
            Some(bytes) => decode_page_token(bytes)?,
            None => HistoryPageToken {
                version: highest_version,
                batch_index: 0,
            },
        };

        // Batch indices sort numerically; the store's lexicographic listing
        // order would misplace batch 10 before batch 2.
        let mut remaining: Vec<usize> = batches
            .iter()
            .filter(|batch| batch.version == token.version)
            .map(|batch| batch.batch_index)
            .filter(|index| *index >= token.batch_index)
            .collect();
        remaining.sort_unstable();
        remaining.dedup();

        let mut records = Vec::new();
        let mut next_batch = token.batch_index;
        for index in remaining.iter().take(request.page_size) {
            let filename = construct_history_filename(
                &request.namespace_id,
                &request.workflow_id,
                &request.run_id,
                token.version,
                *index,
            );
            records.push(self.storage.get(location, &filename).await?);
            next_batch = index + 1;
        }

        let next_page_token = if remaining.len() > request.page_size {
            Some(encode_page_token(&HistoryPageToken {
                version: token.version,
                batch_index: next_batch,
            })?)
        } else {
            None
        };

        debug!(
            "served {} archived batches for workflow {} at version {}",
            records.len(),
            request.workflow_id,
            token.version
        );
        Ok(GetHistoryResponse {
            records,
            next_page_token,
        })
    }

    /// Enumerate archived blob names under `name_prefix` that pass every
    /// filter, windowed by `offset` and `page_size`. The visibility layer
    /// drives this to scan archived workflows without materialising the
    /// whole namespace.
    ///
    /// # Errors
    /// URI validation failures, or a listing abort carrying the position
    /// reached (see [`connector::QueryError`]).
    pub async fn list_archived(
        &self,
        location: &ArchiveLocation,
        name_prefix: &str,
        page_size: usize,
        offset: usize,
        filters: &[Predicate],
    ) -> Result<FilteredPage, ArchiveError> {
        self.validate_uri(location).await?;
        Ok(self
            .storage
            .query_with_filters(location, name_prefix, page_size, offset, filters)
            .await?)
    }
}

fn validate_archive_request(request: &ArchiveHistoryRequest) -> Result<(), ArchiveError> {
    for (field, value) in [
        ("namespace_id", &request.namespace_id),
        ("workflow_id", &request.workflow_id),
        ("run_id", &request.run_id),
    ] {
        if value.is_empty() {
            return Err(ArchiveError::InvalidRequest(format!("{field} is empty")));
        }
    }
    Ok(())
}

fn validate_get_request(request: &GetHistoryRequest) -> Result<(), ArchiveError> {
    for (field, value) in [
        ("namespace_id", &request.namespace_id),
        ("workflow_id", &request.workflow_id),
        ("run_id", &request.run_id),
    ] {
        if value.is_empty() {
            return Err(ArchiveError::InvalidRequest(format!("{field} is empty")));
        }
    }
    if request.page_size == 0 {
        return Err(ArchiveError::InvalidRequest(
            "page_size must be positive".into(),
        ));
    }
    Ok(())
}

fn encode_page_token(token: &HistoryPageToken) -> Result<Vec<u8>, ArchiveError> {
    serde_json::to_vec(token).map_err(ArchiveError::InvalidToken)
}

fn decode_page_token(bytes: &[u8]) -> Result<HistoryPageToken, ArchiveError> {
    serde_json::from_slice(bytes).map_err(ArchiveError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::{HistoryPageToken, decode_page_token, encode_page_token};

    #[test]
    fn page_token_round_trips() {
        let token = HistoryPageToken {
            version: -24,
            batch_index: 7,
        };

        let encoded = encode_page_token(&token).expect("token encodes");

        assert_eq!(decode_page_token(&encoded).expect("token decodes"), token);
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(decode_page_token(b"not json").is_err());
    }
}

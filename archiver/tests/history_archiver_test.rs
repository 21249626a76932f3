//! History archiver behaviour against a stubbed storage client.
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
    collections::{BTreeMap, VecDeque},
    sync::{Arc, Mutex},
};

use archiver::{
    ArchiveError, ArchiveHistoryRequest, GetHistoryRequest, HistoryArchiver, HistoryIterator,
    construct_history_filename,
};
use async_trait::async_trait;
use bytes::Bytes;
use connector::{
    ArchiveLocation, Client, ConnectorError, FilteredPage, Predicate, QueryError,
    is_page_completed,
};

const NAMESPACE_ID: &str = "test-namespace-id";
const NAMESPACE: &str = "test-namespace";
const WORKFLOW_ID: &str = "test-workflow-id";
const RUN_ID: &str = "test-run-id";
const CLOSE_FAILOVER_VERSION: i64 = 100;

/// Storage client stub over an in-memory map of blob names to contents,
/// standing in for the connector the same way the original suite mocks it.
#[derive(Default)]
struct StubClient {
    namespace_missing: bool,
    objects: Mutex<BTreeMap<String, Bytes>>,
}

impl StubClient {
    fn with_namespace() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn without_namespace() -> Arc<Self> {
        Arc::new(Self {
            namespace_missing: true,
            ..Self::default()
        })
    }

    fn insert(&self, name: &str, data: &[u8]) {
        self.objects
            .lock()
            .expect("stub lock")
            .insert(name.to_owned(), Bytes::copy_from_slice(data));
    }

    fn contains(&self, name: &str) -> bool {
        self.objects.lock().expect("stub lock").contains_key(name)
    }

    fn read(&self, name: &str) -> Option<Bytes> {
        self.objects.lock().expect("stub lock").get(name).cloned()
    }

    fn check_namespace(&self) -> Result<(), ConnectorError> {
        if self.namespace_missing {
            Err(ConnectorError::NamespaceNotFound)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Client for StubClient {
    async fn upload(
        &self,
        _location: &ArchiveLocation,
        name: &str,
        data: Bytes,
    ) -> Result<(), ConnectorError> {
        self.check_namespace()?;
        self.objects
            .lock()
            .expect("stub lock")
            .insert(name.to_owned(), data);
        Ok(())
    }

    async fn get(
        &self,
        _location: &ArchiveLocation,
        name: &str,
    ) -> Result<Bytes, ConnectorError> {
        self.check_namespace()?;
        self.read(name).ok_or_else(|| {
            ConnectorError::Storage(object_store_not_found(name))
        })
    }

    async fn exists(
        &self,
        _location: &ArchiveLocation,
        name: &str,
    ) -> Result<bool, ConnectorError> {
        self.check_namespace()?;
        if name.is_empty() {
            return Ok(true);
        }
        if self.contains(name) {
            Ok(true)
        } else {
            Err(ConnectorError::ObjectNotFound)
        }
    }

    async fn query(
        &self,
        _location: &ArchiveLocation,
        prefix: &str,
    ) -> Result<Vec<String>, ConnectorError> {
        self.check_namespace()?;
        Ok(self
            .objects
            .lock()
            .expect("stub lock")
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn query_with_filters(
        &self,
        location: &ArchiveLocation,
        prefix: &str,
        page_size: usize,
        offset: usize,
        filters: &[Predicate],
    ) -> Result<FilteredPage, QueryError> {
        let names = self.query(location, prefix).await.map_err(|source| {
            QueryError {
                position: offset,
                source,
            }
        })?;
        let mut page = FilteredPage {
            next_offset: offset,
            exhausted: true,
            ..FilteredPage::default()
        };
        let mut remaining_skip = offset;
        for name in names {
            if is_page_completed(page_size, page.names.len()) {
                page.exhausted = false;
                return Ok(page);
            }
            if !filters.iter().all(|accept| accept(&name)) {
                continue;
            }
            if remaining_skip > 0 {
                remaining_skip -= 1;
                continue;
            }
            page.names.push(name);
            page.next_offset += 1;
        }
        Ok(page)
    }
}

fn object_store_not_found(path: &str) -> object_store::Error {
    object_store::Error::NotFound {
        path: path.to_owned(),
        source: "no such entry".into(),
    }
}

/// Iterator over a fixed queue of pre-serialized batches.
struct QueuedHistory {
    batches: VecDeque<Bytes>,
}

impl QueuedHistory {
    fn of<'a>(batches: impl IntoIterator<Item = &'a [u8]>) -> Self {
        Self {
            batches: batches
                .into_iter()
                .map(Bytes::copy_from_slice)
                .collect(),
        }
    }
}

#[async_trait]
impl HistoryIterator for QueuedHistory {
    fn has_next(&self) -> bool {
        !self.batches.is_empty()
    }

    async fn next(&mut self) -> Result<Bytes, Box<dyn std::error::Error + Send + Sync>> {
        self.batches
            .pop_front()
            .ok_or_else(|| "iterator drained".into())
    }
}

fn archival_uri() -> ArchiveLocation {
    ArchiveLocation::new("as://my-bucket-cad/temporal_archival/development")
        .expect("test URI parses")
}

fn archive_request() -> ArchiveHistoryRequest {
    ArchiveHistoryRequest {
        namespace_id: NAMESPACE_ID.into(),
        namespace: NAMESPACE.into(),
        workflow_id: WORKFLOW_ID.into(),
        run_id: RUN_ID.into(),
        close_failover_version: CLOSE_FAILOVER_VERSION,
    }
}

fn get_request(page_size: usize, next_page_token: Option<Vec<u8>>) -> GetHistoryRequest {
    GetHistoryRequest {
        namespace_id: NAMESPACE_ID.into(),
        workflow_id: WORKFLOW_ID.into(),
        run_id: RUN_ID.into(),
        page_size,
        next_page_token,
    }
}

fn blob_name(version: i64, batch_index: usize) -> String {
    construct_history_filename(NAMESPACE_ID, WORKFLOW_ID, RUN_ID, version, batch_index)
}

#[tokio::test]
async fn should_validate_uri_shape_and_scheme() {
    let archiver = HistoryArchiver::new(StubClient::with_namespace(), "as");

    let cases = [
        ("wrongscheme://a/b/c", Some("scheme")),
        ("as://my-bucket-cad", Some("uri")),
        ("as://my-bucket-cad/temporal_archival/development", None),
    ];
    for (uri, expected) in cases {
        let location = ArchiveLocation::new(uri).expect("URI parses");
        let result = archiver.validate_uri(&location).await;
        match expected {
            None => assert!(result.is_ok(), "{uri} should validate"),
            Some("scheme") => {
                assert!(matches!(result, Err(ArchiveError::SchemeMismatch(_))), "{uri}");
            }
            Some(_) => {
                assert!(matches!(result, Err(ArchiveError::InvalidUri(_))), "{uri}");
            }
        }
    }
}

#[tokio::test]
async fn should_fail_validation_when_namespace_missing() {
    let archiver = HistoryArchiver::new(StubClient::without_namespace(), "as");

    let result = archiver.validate_uri(&archival_uri()).await;

    assert!(matches!(
        result,
        Err(ArchiveError::Connector(ConnectorError::NamespaceNotFound))
    ));
}

#[tokio::test]
async fn should_reject_archive_request_without_workflow_id() {
    let archiver = HistoryArchiver::new(StubClient::with_namespace(), "as");
    let request = ArchiveHistoryRequest {
        workflow_id: String::new(),
        ..archive_request()
    };
    let mut history = QueuedHistory::of([b"batch".as_slice()]);

    let result = archiver
        .archive(&archival_uri(), &request, &mut history)
        .await;

    assert!(matches!(result, Err(ArchiveError::InvalidRequest(_))));
}

#[tokio::test]
async fn should_archive_every_batch_under_constructed_names() -> Result<(), ArchiveError> {
    // Given
    let storage = StubClient::with_namespace();
    let archiver = HistoryArchiver::new(Arc::clone(&storage) as Arc<dyn Client>, "as");
    let mut history = QueuedHistory::of([b"batch zero".as_slice(), b"batch one".as_slice()]);

    // When
    let archived = archiver
        .archive(&archival_uri(), &archive_request(), &mut history)
        .await?;

    // Then
    assert_eq!(archived, 2);
    assert_eq!(
        storage.read(&blob_name(CLOSE_FAILOVER_VERSION, 0)),
        Some(Bytes::from_static(b"batch zero"))
    );
    assert_eq!(
        storage.read(&blob_name(CLOSE_FAILOVER_VERSION, 1)),
        Some(Bytes::from_static(b"batch one"))
    );
    Ok(())
}

#[tokio::test]
async fn should_skip_batches_already_archived() -> Result<(), ArchiveError> {
    // Given batch zero survived an earlier, interrupted archival
    let storage = StubClient::with_namespace();
    storage.insert(&blob_name(CLOSE_FAILOVER_VERSION, 0), b"original upload");
    let archiver = HistoryArchiver::new(Arc::clone(&storage) as Arc<dyn Client>, "as");
    let mut history = QueuedHistory::of([b"rewritten".as_slice(), b"batch one".as_slice()]);

    // When the archival is repeated
    let archived = archiver
        .archive(&archival_uri(), &archive_request(), &mut history)
        .await?;

    // Then the surviving batch is untouched and the missing one is written
    assert_eq!(archived, 2);
    assert_eq!(
        storage.read(&blob_name(CLOSE_FAILOVER_VERSION, 0)),
        Some(Bytes::from_static(b"original upload"))
    );
    assert_eq!(
        storage.read(&blob_name(CLOSE_FAILOVER_VERSION, 1)),
        Some(Bytes::from_static(b"batch one"))
    );
    Ok(())
}

#[tokio::test]
async fn should_get_history_at_highest_version() -> Result<(), ArchiveError> {
    // Given the same history archived at two failover versions
    let storage = StubClient::with_namespace();
    storage.insert(&blob_name(-25, 0), b"stale version");
    storage.insert(&blob_name(-24, 0), b"current batch zero");
    storage.insert(&blob_name(-24, 1), b"current batch one");
    let archiver = HistoryArchiver::new(Arc::clone(&storage) as Arc<dyn Client>, "as");

    // When
    let response = archiver
        .get(&archival_uri(), &get_request(10, None))
        .await?;

    // Then only the highest version is served, in batch order
    assert_eq!(
        response.records,
        vec![
            Bytes::from_static(b"current batch zero"),
            Bytes::from_static(b"current batch one"),
        ]
    );
    assert!(response.next_page_token.is_none());
    Ok(())
}

#[tokio::test]
async fn should_page_batches_in_numeric_order() -> Result<(), ArchiveError> {
    // Given twelve batches, whose names do not sort numerically
    let storage = StubClient::with_namespace();
    for index in 0..12 {
        storage.insert(
            &blob_name(CLOSE_FAILOVER_VERSION, index),
            format!("batch {index}").as_bytes(),
        );
    }
    let archiver = HistoryArchiver::new(Arc::clone(&storage) as Arc<dyn Client>, "as");

    // When paging through with the returned tokens
    let mut collected = Vec::new();
    let mut token = None;
    loop {
        let response = archiver
            .get(&archival_uri(), &get_request(5, token))
            .await?;
        collected.extend(response.records);
        token = response.next_page_token;
        if token.is_none() {
            break;
        }
    }

    // Then every batch arrives exactly once, in batch-index order
    let expected: Vec<Bytes> = (0..12)
        .map(|index| Bytes::from(format!("batch {index}")))
        .collect();
    assert_eq!(collected, expected);
    Ok(())
}

#[tokio::test]
async fn should_report_missing_history_as_not_found() {
    let archiver = HistoryArchiver::new(StubClient::with_namespace(), "as");

    let result = archiver.get(&archival_uri(), &get_request(2, None)).await;

    assert!(matches!(result, Err(ArchiveError::HistoryNotFound)));
}

#[tokio::test]
async fn should_reject_undecodable_page_token() {
    let storage = StubClient::with_namespace();
    storage.insert(&blob_name(CLOSE_FAILOVER_VERSION, 0), b"batch");
    let archiver = HistoryArchiver::new(Arc::clone(&storage) as Arc<dyn Client>, "as");

    let result = archiver
        .get(&archival_uri(), &get_request(2, Some(b"garbage".to_vec())))
        .await;

    assert!(matches!(result, Err(ArchiveError::InvalidToken(_))));
}

#[tokio::test]
async fn should_reject_get_request_without_page_size() {
    let archiver = HistoryArchiver::new(StubClient::with_namespace(), "as");

    let result = archiver.get(&archival_uri(), &get_request(0, None)).await;

    assert!(matches!(result, Err(ArchiveError::InvalidRequest(_))));
}

#[tokio::test]
async fn should_list_archived_names_through_filters() -> Result<(), ArchiveError> {
    // Given archived blobs for two workflows
    let storage = StubClient::with_namespace();
    storage.insert("aaa_100_0.history", b"");
    storage.insert("aaa_100_1.history", b"");
    storage.insert("bbb_100_0.history", b"");
    let archiver = HistoryArchiver::new(Arc::clone(&storage) as Arc<dyn Client>, "as");
    let filters: Vec<Predicate> = vec![Box::new(|name: &str| name.starts_with("aaa"))];

    // When
    let page = archiver
        .list_archived(&archival_uri(), "", 10, 0, &filters)
        .await?;

    // Then
    assert_eq!(page.names, vec!["aaa_100_0.history", "aaa_100_1.history"]);
    assert!(page.exhausted);
    assert_eq!(page.next_offset, 2);
    Ok(())
}

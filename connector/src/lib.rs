//! The `connector` crate persists immutable archival records into a remote
//! blob store and retrieves them by prefix, with paginated, filtered
//! enumeration of previously stored objects.
//!
//! The public API is the [`Client`] trait and its [`StorageWrapper`]
//! implementation over a swappable [`StorageBackend`]. Backends for Amazon
//! S3 and Azure Blob Storage are provided and resolved per URI scheme
//! through the [`BackendRegistry`].
//!
//! Every call is an independent traversal with call-scoped state; nothing is
//! cached between invocations and no cursor object is persisted — resumption
//! is caller-driven by re-supplying the offset from a previous page. Calls
//! are cancelled by dropping the returned future; every segment fetch is an
//! await point, so a cancelled listing aborts before its next round trip.
//!
//! This crate performs no retries: the two not-found sentinels in
//! [`ConnectorError`] are terminal, and every other store error passes
//! through for the caller's retry policy to handle.
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

mod azure;
mod client;
mod error;
mod handle;
mod location;
mod query;
mod registry;
mod s3;
mod store;

pub use azure::AzureStorageBackend;
pub use client::{Client, StorageWrapper};
pub use error::{ConnectorError, QueryError};
pub use handle::{ListSegment, Marker, NamespaceHandle, ObjectHandle, StorageBackend};
pub use location::{ArchiveLocation, LocationError, format_blob_path};
pub use query::{FilteredPage, Predicate, is_page_completed};
pub use registry::{BackendProvider, BackendRegistry};
pub use s3::S3StorageBackend;

//! The `archiver` crate persists closed workflow histories into a remote
//! blob store through the `connector` crate and reads them back page by
//! page.
//!
//! History serialization is not this crate's concern: batches cross the
//! [`HistoryIterator`] boundary as opaque bytes and are stored under the
//! `<hash>_<version>_<batchIndex>.history` naming convention. Re-archiving
//! a partially archived history is idempotent — batches already present are
//! skipped, never rewritten.
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

mod error;
mod filename;
mod history;

pub use error::ArchiveError;
pub use filename::{
    ParsedHistoryFilename, construct_history_filename, history_filename_prefix,
    parse_history_filename,
};
pub use history::{
    ArchiveHistoryRequest, GetHistoryRequest, GetHistoryResponse, HistoryArchiver, HistoryIterator,
};

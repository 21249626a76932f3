//! Archived history blob naming.
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

const HISTORY_SUFFIX: &str = ".history";

/// Stable FNV-1a 64-bit fingerprint of a workflow identity.
///
/// The identity parts are separated before hashing so shifting characters
/// between fields cannot collide.
fn workflow_fingerprint(namespace_id: &str, workflow_id: &str, run_id: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET_BASIS;
    for part in [namespace_id, workflow_id, run_id] {
        for byte in part.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(PRIME);
        }
        hash ^= u64::from(b'!');
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// Build the blob name for one archived history batch:
/// `<hash>_<version>_<batchIndex>.history`.
#[must_use]
pub fn construct_history_filename(
    namespace_id: &str,
    workflow_id: &str,
    run_id: &str,
    version: i64,
    batch_index: usize,
) -> String {
    format!(
        "{}_{version}_{batch_index}{HISTORY_SUFFIX}",
        workflow_fingerprint(namespace_id, workflow_id, run_id)
    )
}

/// The listing prefix shared by every batch archived for a workflow.
#[must_use]
pub fn history_filename_prefix(namespace_id: &str, workflow_id: &str, run_id: &str) -> String {
    workflow_fingerprint(namespace_id, workflow_id, run_id).to_string()
}

/// Version and batch index recovered from an archived history blob name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedHistoryFilename {
    pub version: i64,
    pub batch_index: usize,
}

/// Parse `<hash>_<version>_<batchIndex>.history`, ignoring any directory
/// components in `name`. Names that are not history blobs yield `None`.
#[must_use]
pub fn parse_history_filename(name: &str) -> Option<ParsedHistoryFilename> {
    let base = name.rsplit('/').next().unwrap_or(name);
    let stem = base.strip_suffix(HISTORY_SUFFIX)?;
    let mut parts = stem.split('_');
    let _hash = parts.next()?;
    let version = parts.next()?.parse().ok()?;
    let batch_index = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(ParsedHistoryFilename {
        version,
        batch_index,
    })
}

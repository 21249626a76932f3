//! The paginated filtered listing engine.
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
use crate::{
    error::{ConnectorError, QueryError},
    handle::{Marker, NamespaceHandle},
};
use log::debug;

/// A pure predicate over an entry name. A set of predicates is ANDed; an
/// entry survives only if every predicate accepts it.
pub type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// One page of filtered listing results plus continuation metadata.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FilteredPage {
    /// Surviving entry names, in store enumeration order.
    pub names: Vec<String>,
    /// True only if the underlying enumeration completed naturally. False
    /// means the page filled first; more data may exist beyond it, though
    /// the next unscanned entries might all fail the filters.
    pub exhausted: bool,
    /// Absolute accepted-count position, suitable as the `offset` of a
    /// follow-up call.
    pub next_offset: usize,
}

/// A page is complete once it holds at least `page_size` entries.
/// A `page_size` of zero means unbounded.
#[must_use]
pub fn is_page_completed(page_size: usize, current_position: usize) -> bool {
    page_size != 0 && current_position > 0 && page_size <= current_position
}

/// Enumerate every entry under `prefix`, segment by segment.
///
/// The first error aborts the whole call; accumulated names are discarded.
pub(crate) async fn run_query(
    namespace: &dyn NamespaceHandle,
    prefix: &str,
) -> Result<Vec<String>, ConnectorError> {
    let mut names = Vec::new();
    let mut marker = Marker::initial();
    while marker.not_done() {
        let segment = namespace.list_segment(prefix, &marker).await?;
        debug!(
            "LIST segment under {:?} returned {} entries",
            prefix,
            segment.names.len()
        );
        names.extend(segment.names);
        marker = segment.next_marker;
    }
    Ok(names)
}

/// Enumerate entries under `prefix` that pass every filter, windowed by
/// `offset` and `page_size`.
///
/// Two cursors are maintained deliberately: `remaining_skip` implements
/// "skip N already-seen matches" and is consumed exactly once, while
/// `current_pos` reports the absolute accepted-count position back to the
/// caller. Collapsing them into one counter breaks resumption under
/// filtering.
///
/// The page-completion test runs before filtering each entry, so a full page
/// reports `exhausted = false` even when every remaining entry would have
/// failed the filters. Callers must not infer "no more matches" from it.
pub(crate) async fn run_filtered_query(
    namespace: &dyn NamespaceHandle,
    prefix: &str,
    page_size: usize,
    offset: usize,
    filters: &[Predicate],
) -> Result<FilteredPage, QueryError> {
    let mut current_pos = offset;
    let mut remaining_skip = offset;
    let mut names: Vec<String> = Vec::new();

    let mut marker = Marker::initial();
    while marker.not_done() {
        let segment = namespace
            .list_segment(prefix, &marker)
            .await
            .map_err(|err| QueryError {
                position: current_pos,
                source: err.into(),
            })?;

        for name in segment.names {
            if is_page_completed(page_size, names.len()) {
                return Ok(FilteredPage {
                    names,
                    exhausted: false,
                    next_offset: current_pos,
                });
            }

            if !filters.iter().all(|accept| accept(&name)) {
                continue;
            }

            if remaining_skip > 0 {
                remaining_skip -= 1;
                continue;
            }

            names.push(name);
            current_pos += 1;
        }

        marker = segment.next_marker;
    }

    Ok(FilteredPage {
        names,
        exhausted: true,
        next_offset: current_pos,
    })
}

#[cfg(test)]
mod tests {
    use super::is_page_completed;

    #[test]
    fn zero_page_size_is_never_complete() {
        for position in [0, 1, 100] {
            assert!(!is_page_completed(0, position));
        }
    }

    #[test]
    fn page_completes_at_or_past_its_size() {
        assert!(!is_page_completed(2, 0));
        assert!(!is_page_completed(2, 1));
        assert!(is_page_completed(2, 2));
        assert!(is_page_completed(2, 3));
    }

    #[test]
    fn empty_page_is_never_complete() {
        // position zero keeps a page open even for page_size 1
        assert!(!is_page_completed(1, 0));
    }
}

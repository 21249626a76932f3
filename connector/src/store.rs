//! Handle implementations over an [`ObjectStore`] transport.
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
use object_store::{
    Error, ObjectStore,
    list::{PaginatedListOptions, PaginatedListStore},
    path::Path,
};

use crate::handle::{ListSegment, Marker, NamespaceHandle, ObjectHandle};

/// [`NamespaceHandle`] over any store supporting stateless page-token
/// listing. One instance per namespace; the wrapped store is already scoped
/// to the container or bucket.
pub(crate) struct RemoteNamespace<T> {
    store: Arc<T>,
}

impl<T> RemoteNamespace<T> {
    pub(crate) fn new(store: T) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

#[async_trait]
impl<T: ObjectStore + PaginatedListStore> NamespaceHandle for RemoteNamespace<T> {
    fn object(&self, path: &str) -> Box<dyn ObjectHandle> {
        Box::new(RemoteObject {
            store: Arc::clone(&self.store),
            path: Path::from(path),
        })
    }

    async fn get_properties(&self) -> Result<(), Error> {
        // The transport exposes no container HEAD; a delimited list of the
        // namespace root is the cheapest existence probe.
        self.store.list_with_delimiter(None).await.map(|_| ())
    }

    async fn list_segment(&self, prefix: &str, marker: &Marker) -> Result<ListSegment, Error> {
        let options = PaginatedListOptions {
            page_token: marker.token().map(ToOwned::to_owned),
            ..Default::default()
        };
        let page = self.store.list_paginated(Some(prefix), options).await?;
        Ok(ListSegment {
            names: page
                .result
                .objects
                .into_iter()
                .map(|meta| meta.location.to_string())
                .collect(),
            next_marker: Marker::from_page_token(page.page_token),
        })
    }
}

/// [`ObjectHandle`] over an [`ObjectStore`] blob.
struct RemoteObject<T> {
    store: Arc<T>,
    path: Path,
}

#[async_trait]
impl<T: ObjectStore> ObjectHandle for RemoteObject<T> {
    async fn upload(&self, data: Bytes) -> Result<(), Error> {
        self.store.put(&self.path, data.into()).await.map(|_| ())
    }

    async fn download(&self) -> Result<Bytes, Error> {
        // The GetResult is consumed here, releasing the underlying
        // connection on success and failure alike.
        self.store.get(&self.path).await?.bytes().await
    }

    async fn get_properties(&self) -> Result<(), Error> {
        self.store.head(&self.path).await.map(|_| ())
    }
}

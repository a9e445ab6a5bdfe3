/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::sync::Arc;

use acton_ern::Ern;
use tracing::{instrument, trace};

use crate::message::{SerializationBoundary, TypeKey};
use crate::operation::{AdapterBinding, OperationError};
use crate::traits::{downcast_message, BusinessMessage, HostHandle};

/// Everything a handler can reach besides its own state.
///
/// Holds the operation's identity, the host handle supplied at setup, the bound
/// outbound adapter, and the serialization boundary shared with the dispatch table.
#[derive(Debug, Default)]
pub struct OperationContext {
    id: Ern,
    host: Option<Arc<dyn HostHandle>>,
    adapter: AdapterBinding,
    boundary: SerializationBoundary,
}

impl OperationContext {
    /// Creates a context for the operation `id`, speaking the wire format of `boundary`.
    #[must_use]
    pub fn new(id: Ern, boundary: SerializationBoundary) -> Self {
        Self {
            id,
            host: None,
            adapter: AdapterBinding::default(),
            boundary,
        }
    }

    /// Identifier of the operation.
    #[must_use]
    pub const fn id(&self) -> &Ern {
        &self.id
    }

    /// The host handle supplied at setup, if any.
    #[must_use]
    pub fn host(&self) -> Option<&Arc<dyn HostHandle>> {
        self.host.as_ref()
    }

    pub(crate) fn set_host(&mut self, host: Option<Arc<dyn HostHandle>>) {
        self.host = host;
    }

    /// The outbound adapter binding.
    #[must_use]
    pub const fn adapter(&self) -> &AdapterBinding {
        &self.adapter
    }

    /// The outbound adapter binding, mutably.
    pub fn adapter_mut(&mut self) -> &mut AdapterBinding {
        &mut self.adapter
    }

    /// The serialization boundary.
    #[must_use]
    pub const fn boundary(&self) -> &SerializationBoundary {
        &self.boundary
    }

    pub(crate) fn set_boundary(&mut self, boundary: SerializationBoundary) {
        self.boundary = boundary;
    }

    /// Sends `request` to the component `target` and waits for its typed reply.
    ///
    /// # Errors
    ///
    /// * [`OperationError::HostUnavailable`] without a host handle.
    /// * [`OperationError::Serialization`] if `request` is not a registered type.
    /// * [`OperationError::Forward`] if the host fails to deliver.
    /// * [`OperationError::Deserialization`] if the answer cannot be decoded.
    /// * [`OperationError::UnexpectedReply`] if the answer is not an `R`.
    #[instrument(skip(self, request), fields(operation = %self.id))]
    pub fn send_request_sync<R>(
        &self,
        target: &str,
        request: &dyn BusinessMessage,
    ) -> Result<R, OperationError>
    where
        R: BusinessMessage + Clone,
    {
        let host = self.host.as_ref().ok_or(OperationError::HostUnavailable)?;
        let wire = self.boundary.serialize(request)?;
        let answer = host
            .send_request_sync(target, &wire)
            .map_err(|source| OperationError::Forward {
                target: target.to_string(),
                source,
            })?;
        trace!(to = target, "Received forwarded reply");
        let reply = self.boundary.deserialize(&answer)?;
        downcast_message::<R>(&*reply)
            .cloned()
            .ok_or_else(|| OperationError::UnexpectedReply {
                expected: TypeKey::of::<R>(),
                actual: (*reply).type_key(),
            })
    }

    /// Sends `request` to the component `target` without waiting for a reply.
    ///
    /// # Errors
    ///
    /// [`OperationError::HostUnavailable`], [`OperationError::Serialization`] or
    /// [`OperationError::Forward`], as for [`send_request_sync`](Self::send_request_sync).
    #[instrument(skip(self, request), fields(operation = %self.id))]
    pub fn send_request_async(
        &self,
        target: &str,
        request: &dyn BusinessMessage,
    ) -> Result<(), OperationError> {
        let host = self.host.as_ref().ok_or(OperationError::HostUnavailable)?;
        let wire = self.boundary.serialize(request)?;
        host.send_request_async(target, &wire)
            .map_err(|source| OperationError::Forward {
                target: target.to_string(),
                source,
            })
    }
}

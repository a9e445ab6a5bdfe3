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
use thiserror::Error;

use crate::message::{DeserializationError, SerializationError, TypeKey};
use crate::operation::{AdapterResolutionError, LifecycleEvent, LifecycleState};

/// Errors surfaced by a [`ManagedOperation`](crate::operation::ManagedOperation) to its host.
///
/// A message type without a handler is not an error: it is routed to the default handler.
#[derive(Debug, Error)]
pub enum OperationError {
    /// The wire form of a request could not be turned into a message.
    #[error(transparent)]
    Deserialization(#[from] DeserializationError),

    /// A response or forwarded request could not be serialized.
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// The partner handle supplied at setup could not be resolved to an adapter.
    #[error(transparent)]
    AdapterResolution(#[from] AdapterResolutionError),

    /// The resolved handler failed. Never retried or suppressed.
    #[error("handler {handler} for {type_key} failed: {source}")]
    Handler {
        /// Type of the request being handled
        type_key: TypeKey,
        /// Name of the handler that failed
        handler: String,
        /// Error returned by the handler
        #[source]
        source: anyhow::Error,
    },

    /// A lifecycle hook failed.
    #[error("{event:?} hook failed: {source}")]
    Hook {
        /// Lifecycle event whose hook failed
        event: LifecycleEvent,
        /// Error returned by the hook
        #[source]
        source: anyhow::Error,
    },

    /// Two handlers were registered for one message type under [`DuplicatePolicy::Reject`](crate::config::DuplicatePolicy::Reject).
    #[error("message type {type_key} has two handlers: {first} and {second}")]
    DuplicateHandler {
        /// Contested message type
        type_key: TypeKey,
        /// Handler registered first
        first: String,
        /// Handler registered second
        second: String,
    },

    /// The host drove the lifecycle out of order.
    #[error("lifecycle event {event:?} is not valid in state {state:?}")]
    InvalidTransition {
        /// State the operation was in
        state: LifecycleState,
        /// Event that was rejected
        event: LifecycleEvent,
    },

    /// A message arrived while the operation was not initialized.
    #[error("operation cannot accept messages in state {0:?}")]
    NotInitialized(LifecycleState),

    /// Forwarding was attempted without a host handle.
    #[error("no host handle is available for forwarding")]
    HostUnavailable,

    /// The host failed to deliver a forwarded request.
    #[error("forwarding to {target} failed: {source}")]
    Forward {
        /// Component the request was addressed to
        target: String,
        /// Error reported by the host
        #[source]
        source: anyhow::Error,
    },

    /// A forwarded request was answered with a message of another type.
    #[error("expected a {expected} reply, got {actual}")]
    UnexpectedReply {
        /// Type the caller asked for
        expected: TypeKey,
        /// Type that came back
        actual: TypeKey,
    },

    /// An adapter call was attempted without a bound adapter.
    #[error("no outbound adapter is bound")]
    AdapterUnbound,

    /// The bound adapter failed.
    #[error("adapter call {method} failed: {source}")]
    Adapter {
        /// Adapter method that was invoked
        method: String,
        /// Error reported by the adapter
        #[source]
        source: anyhow::Error,
    },
}

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

#![forbid(unsafe_code)]
#![forbid(missing_docs)]

//! # Bizop
//!
//! The message-dispatch core of a *business operation*: a long-lived component of a
//! message-driven production framework that receives typed messages from other
//! components, routes each one to the handler written for its concrete type, may call
//! an external system through an outbound adapter, and answers with a response.
//!
//! ## Key Concepts
//!
//! - **Messages (`BusinessMessage`)**: typed, cloneable payloads, usually declared with
//!   [`#[business_message]`](prelude::business_message).
//! - **Serialization boundary (`SerializationBoundary`)**: converts between the opaque
//!   wire string used at the host boundary and typed messages, through a swappable
//!   [`WireCodec`](prelude::WireCodec).
//! - **Dispatch table (`DispatchTable`)**: per-instance mapping from a message's
//!   [`TypeKey`](prelude::TypeKey) to exactly one handler, built once on initialization.
//! - **Router**: resolves a request to its handler, falling back to
//!   [`BusinessOperation::on_message`](prelude::BusinessOperation::on_message), and shapes
//!   the reply to mirror the request's representation.
//! - **Adapter binding (`AdapterBinding`)**: the outbound adapter supplied by the host at
//!   setup time.
//! - **Lifecycle (`ManagedOperation`)**: drives the `connected → init → message* →
//!   teardown` state machine around a user-defined [`BusinessOperation`](prelude::BusinessOperation).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bizop::prelude::*;
//!
//! #[business_message]
//! pub struct OrderMsg {
//!     pub sku: String,
//! }
//!
//! #[business_operation]
//! pub struct Orders {
//!     seen: usize,
//! }
//!
//! impl BusinessOperation for Orders {
//!     fn register_handlers(handlers: &mut DispatchTableBuilder<Self>) {
//!         handlers.on::<OrderMsg>("handle_order", |orders, _ctx, _order| {
//!             orders.seen += 1;
//!             Ok(Reply::Empty)
//!         });
//!     }
//! }
//!
//! let mut operation = ManagedOperation::new(Orders::default());
//! operation.setup(None, PartnerHandle::None)?;
//! operation.on_connected()?;
//! operation.on_init()?;
//! let response = operation.on_message(Inbound::message(OrderMsg { sku: "A-1".into() }))?;
//! ```

// Lets the attribute macros refer to `::bizop` from inside this crate as well.
extern crate self as bizop;

/// Configuration and internal type aliases.
pub(crate) mod common;

/// Messages, type keys and the serialization boundary.
pub(crate) mod message;

/// Dispatch table, router, adapter binding and lifecycle management.
pub(crate) mod operation;

/// Core traits implemented by users of the crate.
pub(crate) mod traits;

#[doc(hidden)]
pub mod __private {
    pub use serde;
}

/// Global configuration loaded from XDG-compliant locations.
pub mod config {
    pub use crate::common::config::{
        BizopConfig, CodecConfig, DefaultsConfig, DispatchConfig, DuplicatePolicy, WireFormat,
        CONFIG,
    };
    pub use crate::message::{InvalidSeparator, TagSeparator};
}

/// A prelude module for conveniently importing the most commonly used items.
///
/// # Re-exports
///
/// ## Macros (from `bizop-macro`)
/// *   [`bizop_macro::business_message`]: derives the boilerplate of a message payload.
/// *   [`bizop_macro::business_operation`]: derives the boilerplate of operation state.
///
/// ## Core Types
/// *   [`crate::operation::ManagedOperation`]: the lifecycle-managed component the host drives.
/// *   [`crate::operation::DispatchTable`], [`crate::operation::DispatchTableBuilder`],
///     [`crate::operation::DispatchEntry`], [`crate::operation::Route`].
/// *   [`crate::operation::AdapterBinding`], [`crate::operation::AdapterCatalog`],
///     [`crate::operation::AdapterDescriptor`], [`crate::operation::PartnerHandle`].
/// *   [`crate::message::SerializationBoundary`], [`crate::message::MessageTypeRegistry`],
///     [`crate::message::TaggedJsonCodec`], [`crate::message::EnvelopeJsonCodec`].
/// *   [`crate::message::Inbound`], [`crate::message::Outbound`], [`crate::message::Reply`].
/// *   [`crate::traits::BusinessMessage`], [`crate::traits::BusinessOperation`],
///     [`crate::traits::OutboundAdapter`], [`crate::traits::HostHandle`].
pub mod prelude {
    pub use bizop_macro::*;

    pub use acton_ern::Ern;

    pub use crate::common::config::{BizopConfig, DuplicatePolicy, WireFormat};
    pub use crate::message::{
        DeserializationError, EnvelopeJsonCodec, Inbound, MessageTypeRegistry, Outbound, Reply,
        SerializationBoundary, SerializationError, TagSeparator, TaggedJsonCodec, TypeKey, WireCodec,
    };
    pub use crate::operation::{
        route, AdapterBinding, AdapterCatalog, AdapterDescriptor, AdapterResolutionError,
        DispatchEntry, DispatchTable, DispatchTableBuilder, LifecycleEvent, LifecycleState,
        ManagedOperation, OperationContext, OperationError, PartnerHandle, Route,
    };
    pub use crate::traits::{
        downcast_message, AsAny, BusinessMessage, BusinessOperation, HostHandle, OutboundAdapter,
    };
}

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

//! The shapes a request, a handler result and a response can take at the host boundary.

use crate::traits::{downcast_message, BusinessMessage};

/// A unit of work delivered by the host.
///
/// Hosts either hand over a typed message directly or its wire form; the response of
/// [`ManagedOperation::on_message`](crate::operation::ManagedOperation::on_message)
/// mirrors whichever representation the request used.
#[derive(Debug, Clone)]
pub enum Inbound {
    /// An in-memory typed message.
    Message(Box<dyn BusinessMessage>),
    /// The serialized form of a message.
    Wire(String),
}

impl Inbound {
    /// Wraps a typed message.
    pub fn message<M: BusinessMessage>(message: M) -> Self {
        Self::Message(Box::new(message))
    }

    /// Wraps a wire string.
    pub fn wire(wire: impl Into<String>) -> Self {
        Self::Wire(wire.into())
    }

    /// Returns `true` if the request arrived in wire form.
    #[must_use]
    pub const fn is_wire(&self) -> bool {
        matches!(self, Self::Wire(_))
    }
}

impl From<String> for Inbound {
    fn from(wire: String) -> Self {
        Self::Wire(wire)
    }
}

impl From<&str> for Inbound {
    fn from(wire: &str) -> Self {
        Self::Wire(wire.to_string())
    }
}

impl From<Box<dyn BusinessMessage>> for Inbound {
    fn from(message: Box<dyn BusinessMessage>) -> Self {
        Self::Message(message)
    }
}

/// What a handler hands back to the router.
#[derive(Debug, Clone, Default)]
pub enum Reply {
    /// A message; serialized on the way out if the request came in wire form.
    Message(Box<dyn BusinessMessage>),
    /// Any other value; passed through unchanged.
    Value(serde_json::Value),
    /// No response.
    #[default]
    Empty,
}

impl Reply {
    /// Wraps a typed message.
    pub fn message<M: BusinessMessage>(message: M) -> Self {
        Self::Message(Box::new(message))
    }

    /// Wraps a plain value.
    pub fn value(value: impl Into<serde_json::Value>) -> Self {
        Self::Value(value.into())
    }
}

/// The response returned to the host.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// A typed message, returned when the request was typed.
    Message(Box<dyn BusinessMessage>),
    /// A serialized message, returned when the request was in wire form.
    Wire(String),
    /// A non-message handler result, passed through unchanged.
    Value(serde_json::Value),
    /// The handler produced nothing.
    Empty,
}

impl Outbound {
    /// Returns the wire string, if this is a serialized response.
    #[must_use]
    pub fn as_wire(&self) -> Option<&str> {
        match self {
            Self::Wire(wire) => Some(wire),
            _ => None,
        }
    }

    /// Returns the typed message downcast to `M`, if this is a typed response of that type.
    #[must_use]
    pub fn downcast_ref<M: BusinessMessage>(&self) -> Option<&M> {
        match self {
            Self::Message(message) => downcast_message::<M>(&**message),
            _ => None,
        }
    }

    /// Returns the plain value, if this is a pass-through result.
    #[must_use]
    pub const fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Returns `true` if there is no response.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

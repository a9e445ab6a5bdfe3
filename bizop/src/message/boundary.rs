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

use tracing::{instrument, trace};

use crate::message::{
    DeserializationError, MessageTypeRegistry, SerializationError, TaggedJsonCodec, WireCodec,
};
use crate::traits::BusinessMessage;

/// Converts between the opaque wire string used at the host boundary and typed messages.
///
/// Combines a [`MessageTypeRegistry`] (typed value ↔ JSON body) with a [`WireCodec`]
/// (type key + JSON body ↔ string). For every registered message `m`,
/// `deserialize(&serialize(&m)?)` yields a value equal to `m`.
#[derive(Debug, Clone)]
pub struct SerializationBoundary {
    registry: Arc<MessageTypeRegistry>,
    codec: Arc<dyn WireCodec>,
}

impl Default for SerializationBoundary {
    fn default() -> Self {
        Self::new(
            Arc::new(MessageTypeRegistry::new()),
            Arc::new(TaggedJsonCodec::new()),
        )
    }
}

impl SerializationBoundary {
    /// Creates a boundary over a registry and a codec.
    #[must_use]
    pub fn new(registry: Arc<MessageTypeRegistry>, codec: Arc<dyn WireCodec>) -> Self {
        Self { registry, codec }
    }

    /// Returns a boundary sharing this registry but speaking another wire format.
    #[must_use]
    pub fn with_codec(&self, codec: Arc<dyn WireCodec>) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            codec,
        }
    }

    /// The registry holding the known message types.
    #[must_use]
    pub const fn registry(&self) -> &Arc<MessageTypeRegistry> {
        &self.registry
    }

    /// The active wire codec.
    #[must_use]
    pub fn codec(&self) -> &dyn WireCodec {
        self.codec.as_ref()
    }

    /// Parses a wire string into the message it encodes.
    ///
    /// # Errors
    ///
    /// A [`DeserializationError`] if the wire form is malformed, names an unknown type, or
    /// carries a body that does not fit the type.
    #[instrument(skip(self), level = "trace")]
    pub fn deserialize(&self, wire: &str) -> Result<Box<dyn BusinessMessage>, DeserializationError> {
        let (type_key, body) = self.codec.decode(wire)?;
        trace!(%type_key, "Decoded wire form");
        self.registry.decode(&type_key, body)
    }

    /// Renders a message into its wire string.
    ///
    /// # Errors
    ///
    /// A [`SerializationError`] if the message's type is not registered or cannot be encoded.
    pub fn serialize(&self, message: &dyn BusinessMessage) -> Result<String, SerializationError> {
        let (type_key, body) = self.registry.encode(message)?;
        trace!(%type_key, "Encoding message");
        self.codec.encode(&type_key, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{EnvelopeJsonCodec, TypeKey};
    use crate::traits::downcast_message;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct PostMessage {
        title: String,
        score: u32,
        found: Option<String>,
    }

    fn boundary() -> SerializationBoundary {
        let boundary = SerializationBoundary::default();
        boundary.registry().register::<PostMessage>();
        boundary
    }

    #[test]
    fn test_round_trip_tagged() {
        let boundary = boundary();
        let original = PostMessage {
            title: "dog".into(),
            score: 3,
            found: Some("dog".into()),
        };
        let wire = boundary.serialize(&original).unwrap();
        assert!(wire.starts_with(TypeKey::of::<PostMessage>().as_str()));

        let decoded = boundary.deserialize(&wire).unwrap();
        assert_eq!(downcast_message::<PostMessage>(&*decoded), Some(&original));
    }

    #[test]
    fn test_round_trip_envelope_shares_registry() {
        let boundary = boundary().with_codec(Arc::new(EnvelopeJsonCodec));
        let original = PostMessage::default();
        let wire = boundary.serialize(&original).unwrap();
        assert!(wire.starts_with('{'));
        let decoded = boundary.deserialize(&wire).unwrap();
        assert_eq!(downcast_message::<PostMessage>(&*decoded), Some(&original));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let boundary = boundary();
        let wire = format!("{}:{{\"title\":\"cat\"}}", TypeKey::of::<PostMessage>());
        let decoded = boundary.deserialize(&wire).unwrap();
        let post = downcast_message::<PostMessage>(&*decoded).unwrap();
        assert_eq!(post.title, "cat");
        assert_eq!(post.score, 0);
        assert_eq!(post.found, None);
    }

    #[test]
    fn test_unknown_type_fails() {
        let result = boundary().deserialize("demo.Ghost:{}");
        assert!(matches!(result, Err(DeserializationError::UnknownType(_))));
    }
}

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

//! Wire codecs: the concrete string encoding of a message at the host boundary.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::{DeserializationError, SerializationError, TypeKey};

/// A wire format for messages.
///
/// A codec only frames a type key and a JSON body into a string and back; turning the
/// body into a typed message is the [`MessageTypeRegistry`](crate::message::MessageTypeRegistry)'s
/// job. Swapping the codec therefore never touches handlers or the router.
pub trait WireCodec: Send + Sync + Debug {
    /// Frames a type key and body into a wire string.
    ///
    /// # Errors
    ///
    /// [`SerializationError::Encode`] if the body cannot be rendered.
    fn encode(
        &self,
        type_key: &TypeKey,
        body: &serde_json::Value,
    ) -> Result<String, SerializationError>;

    /// Splits a wire string into its type key and body.
    ///
    /// # Errors
    ///
    /// [`DeserializationError::Malformed`] if the string is not in this codec's format.
    fn decode(&self, wire: &str) -> Result<(TypeKey, serde_json::Value), DeserializationError>;
}

/// Punctuation that `std::any::type_name` can produce inside a type key.
const TYPE_KEY_PUNCTUATION: &[char] = &[
    '.', '_', '<', '>', '&', '\'', '[', ']', ';', '(', ')', ',', '*', '-', '{', '}', '#', '!',
    '=', '+',
];

/// A separator character was rejected because it can occur inside a type key.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("{0:?} cannot separate a type tag from its body: it can occur inside type keys")]
pub struct InvalidSeparator(pub char);

/// The character between type tag and body in the [`TaggedJsonCodec`] wire form.
///
/// Only characters that never occur in a [`TypeKey`] are accepted, so the first
/// separator in a wire string always ends the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct TagSeparator(char);

impl TagSeparator {
    /// `:`
    pub const COLON: Self = Self(':');

    /// Validates `separator`.
    ///
    /// # Errors
    ///
    /// [`InvalidSeparator`] for alphanumerics, whitespace, and punctuation found in type
    /// names such as `.`, `_`, `<` and `>`.
    pub fn new(separator: char) -> Result<Self, InvalidSeparator> {
        if separator.is_alphanumeric()
            || separator.is_whitespace()
            || separator.is_control()
            || TYPE_KEY_PUNCTUATION.contains(&separator)
        {
            return Err(InvalidSeparator(separator));
        }
        Ok(Self(separator))
    }

    /// The separator character.
    #[must_use]
    pub const fn get(self) -> char {
        self.0
    }
}

impl Default for TagSeparator {
    fn default() -> Self {
        Self::COLON
    }
}

impl TryFrom<char> for TagSeparator {
    type Error = InvalidSeparator;

    fn try_from(separator: char) -> Result<Self, Self::Error> {
        Self::new(separator)
    }
}

impl From<TagSeparator> for char {
    fn from(separator: TagSeparator) -> Self {
        separator.0
    }
}

impl PartialEq<char> for TagSeparator {
    fn eq(&self, other: &char) -> bool {
        self.0 == *other
    }
}

/// `<type.key><separator><json body>`, e.g. `shop.OrderMsg:{"sku":"A-1"}`.
///
/// The default separator is `:`. Type keys never contain `::` after normalization, and a
/// [`TagSeparator`] never occurs in a type key, so the first separator always ends the tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaggedJsonCodec {
    separator: TagSeparator,
}

impl TaggedJsonCodec {
    /// Creates a codec with the default `:` separator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a codec with a custom separator.
    #[must_use]
    pub const fn with_separator(separator: TagSeparator) -> Self {
        Self { separator }
    }
}

impl WireCodec for TaggedJsonCodec {
    fn encode(
        &self,
        type_key: &TypeKey,
        body: &serde_json::Value,
    ) -> Result<String, SerializationError> {
        let json = serde_json::to_string(body).map_err(|e| SerializationError::Encode {
            type_key: type_key.clone(),
            reason: e.to_string(),
        })?;
        Ok(format!("{type_key}{}{json}", self.separator.get()))
    }

    fn decode(&self, wire: &str) -> Result<(TypeKey, serde_json::Value), DeserializationError> {
        let (tag, json) = wire.split_once(self.separator.get()).ok_or_else(|| {
            DeserializationError::Malformed(format!(
                "missing '{}' between type tag and body",
                self.separator.get()
            ))
        })?;
        if tag.trim().is_empty() {
            return Err(DeserializationError::Malformed("empty type tag".to_string()));
        }
        let body = serde_json::from_str(json)
            .map_err(|e| DeserializationError::Malformed(format!("invalid JSON body: {e}")))?;
        Ok((TypeKey::new(tag), body))
    }
}

/// `{"type": "<type.key>", "payload": <json body>}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvelopeJsonCodec;

#[derive(Deserialize)]
struct WireEnvelope {
    #[serde(rename = "type")]
    type_key: TypeKey,
    #[serde(default)]
    payload: serde_json::Value,
}

impl WireCodec for EnvelopeJsonCodec {
    fn encode(
        &self,
        type_key: &TypeKey,
        body: &serde_json::Value,
    ) -> Result<String, SerializationError> {
        let envelope = serde_json::json!({ "type": type_key, "payload": body });
        serde_json::to_string(&envelope).map_err(|e| SerializationError::Encode {
            type_key: type_key.clone(),
            reason: e.to_string(),
        })
    }

    fn decode(&self, wire: &str) -> Result<(TypeKey, serde_json::Value), DeserializationError> {
        let envelope: WireEnvelope = serde_json::from_str(wire)
            .map_err(|e| DeserializationError::Malformed(format!("invalid envelope: {e}")))?;
        if envelope.type_key.as_str().is_empty() {
            return Err(DeserializationError::Malformed("empty type tag".to_string()));
        }
        Ok((TypeKey::new(envelope.type_key.as_str()), envelope.payload))
    }
}

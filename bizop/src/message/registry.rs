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

//! Type registry converting between typed messages and JSON values.

use std::any::{Any, TypeId};
use std::sync::Arc;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

use crate::message::{DeserializationError, SerializationError, TypeKey};
use crate::traits::BusinessMessage;

/// Builds a typed message from a JSON body.
type DecoderFn = Arc<
    dyn Fn(serde_json::Value) -> Result<Box<dyn BusinessMessage>, serde_json::Error> + Send + Sync,
>;

/// Turns a type-erased message back into a JSON body.
type EncoderFn =
    Arc<dyn Fn(&dyn BusinessMessage) -> Result<serde_json::Value, String> + Send + Sync>;

/// Registry mapping message type keys to decoders and concrete types to encoders.
///
/// The wire form of a message only names its type, so every type that may cross the
/// serialization boundary has to be registered here first. Registering a handler with
/// [`DispatchTableBuilder::on`](crate::operation::DispatchTableBuilder::on) does so
/// automatically; reply types and messages served by the default handler are added with
/// [`DispatchTableBuilder::message`](crate::operation::DispatchTableBuilder::message) or
/// [`register`](Self::register).
///
/// # Thread Safety
///
/// Backed by [`DashMap`], so registration and lookups can happen concurrently.
#[derive(Default)]
pub struct MessageTypeRegistry {
    /// Maps wire type keys to decoders.
    decoders: DashMap<TypeKey, DecoderFn>,
    /// Maps concrete types to their wire key and encoder.
    encoders: DashMap<TypeId, (TypeKey, EncoderFn)>,
}

impl std::fmt::Debug for MessageTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageTypeRegistry")
            .field("registered_types", &self.decoders.len())
            .finish()
    }
}

impl MessageTypeRegistry {
    /// Creates a new, empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `M` under its canonical [`TypeKey`] and returns that key.
    pub fn register<M>(&self) -> TypeKey
    where
        M: BusinessMessage + Serialize + DeserializeOwned,
    {
        let type_key = TypeKey::of::<M>();
        self.register_as::<M>(type_key.clone());
        type_key
    }

    /// Registers `M` under a custom wire key.
    ///
    /// Useful when the peer speaks a type name that does not match the Rust path. The
    /// message's dispatch key is still [`TypeKey::of::<M>()`](TypeKey::of).
    pub fn register_as<M>(&self, type_key: TypeKey)
    where
        M: BusinessMessage + Serialize + DeserializeOwned,
    {
        trace!(type_name = std::any::type_name::<M>(), %type_key, "Registering message type");

        let decoder: DecoderFn = Arc::new(
            |body: serde_json::Value| -> Result<Box<dyn BusinessMessage>, serde_json::Error> {
                let message: M = serde_json::from_value(body)?;
                Ok(Box::new(message))
            },
        );
        self.decoders.insert(type_key.clone(), decoder);

        let encoder: EncoderFn = Arc::new(|message: &dyn BusinessMessage| -> Result<serde_json::Value, String> {
            let concrete = message
                .as_any()
                .downcast_ref::<M>()
                .ok_or_else(|| "Type mismatch during serialization".to_string())?;
            serde_json::to_value(concrete).map_err(|e| e.to_string())
        });
        self.encoders.insert(TypeId::of::<M>(), (type_key, encoder));
    }

    /// Decodes `body` into a message of the type registered under `type_key`.
    ///
    /// # Errors
    ///
    /// * [`DeserializationError::UnknownType`] if nothing is registered under `type_key`.
    /// * [`DeserializationError::InvalidBody`] if the body does not fit the type.
    pub fn decode(
        &self,
        type_key: &TypeKey,
        body: serde_json::Value,
    ) -> Result<Box<dyn BusinessMessage>, DeserializationError> {
        let decoder = self
            .decoders
            .get(type_key)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| DeserializationError::UnknownType(type_key.clone()))?;

        decoder(body).map_err(|e| DeserializationError::InvalidBody {
            type_key: type_key.clone(),
            reason: e.to_string(),
        })
    }

    /// Encodes a message into its wire key and JSON body.
    ///
    /// # Errors
    ///
    /// * [`SerializationError::Unregistered`] if the message's type was never registered.
    /// * [`SerializationError::Encode`] if serde rejects the value.
    pub fn encode(
        &self,
        message: &dyn BusinessMessage,
    ) -> Result<(TypeKey, serde_json::Value), SerializationError> {
        let type_id = Any::type_id(message.as_any());
        let (type_key, encoder) = self
            .encoders
            .get(&type_id)
            .map(|entry| {
                let (key, encoder) = entry.value();
                (key.clone(), Arc::clone(encoder))
            })
            .ok_or_else(|| SerializationError::Unregistered(message.type_key()))?;

        let body = encoder(message).map_err(|reason| SerializationError::Encode {
            type_key: type_key.clone(),
            reason,
        })?;
        Ok((type_key, body))
    }

    /// Returns `true` if a decoder is registered under `type_key`.
    #[must_use]
    pub fn is_registered(&self, type_key: &TypeKey) -> bool {
        self.decoders.contains_key(type_key)
    }

    /// Returns the number of registered wire keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Returns the registered wire keys.
    pub fn type_keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.decoders.iter().map(|entry| entry.key().clone())
    }
}

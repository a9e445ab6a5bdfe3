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

use crate::message::TypeKey;

/// Failure to turn a wire string back into a typed message.
#[derive(Debug, Error)]
pub enum DeserializationError {
    /// The wire form could not be parsed at all.
    #[error("malformed wire form: {0}")]
    Malformed(String),

    /// The wire form names a type no decoder is registered for.
    #[error("unknown message type: {0}")]
    UnknownType(TypeKey),

    /// The body does not fit the type named by the wire form.
    #[error("invalid body for {type_key}: {reason}")]
    InvalidBody {
        /// Type named by the wire form
        type_key: TypeKey,
        /// Error reported by the decoder
        reason: String,
    },
}

/// Failure to turn a typed message into its wire string.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// No encoder is registered for the message's concrete type.
    #[error("message type {0} is not registered for serialization")]
    Unregistered(TypeKey),

    /// The encoder or the codec rejected the message.
    #[error("failed to encode {type_key}: {reason}")]
    Encode {
        /// Type being encoded
        type_key: TypeKey,
        /// Error reported by the encoder
        reason: String,
    },
}

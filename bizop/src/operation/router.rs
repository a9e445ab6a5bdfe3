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

use tracing::{debug, instrument, trace};

use crate::message::{Inbound, Outbound, Reply};
use crate::operation::{DispatchTable, OperationContext, OperationError, Route};
use crate::traits::{BusinessMessage, BusinessOperation};

/// Routes one request to its handler and shapes the handler's reply.
///
/// A wire request is deserialized through the context's serialization boundary first;
/// when that fails the table is never consulted. The resolved handler, or
/// [`BusinessOperation::on_message`] when the type has none, runs exactly once. A message
/// reply is serialized back if and only if the request arrived in wire form.
///
/// `default_handler` is the name reported for the default handler in logs and in
/// [`OperationError::Handler`].
///
/// # Errors
///
/// * [`OperationError::Deserialization`] if the wire form cannot be decoded.
/// * [`OperationError::Handler`] if the handler fails.
/// * [`OperationError::Serialization`] if a message reply to a wire request cannot be encoded.
#[instrument(skip_all, fields(wire = request.is_wire()))]
pub fn route<Model: BusinessOperation>(
    table: &DispatchTable<Model>,
    model: &mut Model,
    ctx: &mut OperationContext,
    default_handler: &str,
    request: Inbound,
) -> Result<Outbound, OperationError> {
    let came_as_wire = request.is_wire();
    let message: Box<dyn BusinessMessage> = match request {
        Inbound::Message(message) => message,
        Inbound::Wire(wire) => ctx.boundary().deserialize(&wire)?,
    };
    let message: &dyn BusinessMessage = &*message;
    let type_key = message.type_key();

    let (handler_name, result) = match table.resolve(&type_key) {
        Route::Handler(entry) => {
            trace!(%type_key, handler = entry.handler_name(), "Dispatching to handler");
            (
                entry.handler_name().to_string(),
                entry.invoke(model, ctx, message),
            )
        }
        Route::Default => {
            debug!(%type_key, handler = default_handler, "No handler registered, using default");
            (default_handler.to_string(), model.on_message(ctx, message))
        }
    };

    let reply = result.map_err(|source| OperationError::Handler {
        type_key: type_key.clone(),
        handler: handler_name,
        source,
    })?;

    Ok(match reply {
        Reply::Message(response) if came_as_wire => {
            Outbound::Wire(ctx.boundary().serialize(&*response)?)
        }
        Reply::Message(response) => Outbound::Message(response),
        Reply::Value(value) => Outbound::Value(value),
        Reply::Empty => Outbound::Empty,
    })
}

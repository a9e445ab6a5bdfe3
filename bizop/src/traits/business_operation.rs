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
use crate::message::Reply;
use crate::operation::{DispatchTableBuilder, OperationContext};
use crate::traits::BusinessMessage;

/// A business operation: the component a host runtime drives through its lifecycle and
/// feeds with messages.
///
/// Implementors declare their type-specific handlers in [`register_handlers`](Self::register_handlers)
/// and override whichever lifecycle hooks they need. Every hook defaults to a no-op.
///
/// The host never talks to the implementor directly; it wraps it in a
/// [`ManagedOperation`](crate::operation::ManagedOperation), which enforces the lifecycle
/// order and owns the dispatch table.
///
/// ```rust,ignore
/// impl BusinessOperation for Mailer {
///     const ADAPTER_TYPE: &'static str = "smtp.Sender";
///
///     fn register_handlers(handlers: &mut DispatchTableBuilder<Self>) {
///         handlers.on::<SendMail>("send_mail", |mailer, ctx, mail| {
///             ctx.adapter().invoke("send", serde_json::to_value(mail)?)?;
///             mailer.sent += 1;
///             Ok(Reply::Empty)
///         });
///     }
/// }
/// ```
pub trait BusinessOperation: Send + Sized + 'static {
    /// Qualified name of the outbound adapter this operation expects, or the empty
    /// string for an adapterless operation.
    const ADAPTER_TYPE: &'static str = "";

    /// Declares the type-specific handlers of this operation.
    ///
    /// Called exactly once per instance, when the dispatch table is first built.
    fn register_handlers(_handlers: &mut DispatchTableBuilder<Self>) {}

    /// Called when the component is connected, or reconnected after a disconnect.
    ///
    /// # Errors
    ///
    /// An error is surfaced to the host as [`OperationError::Hook`](crate::operation::OperationError::Hook).
    fn on_connected(&mut self, _ctx: &mut OperationContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called once when the component starts, right before its dispatch table is built.
    ///
    /// # Errors
    ///
    /// An error is surfaced to the host as [`OperationError::Hook`](crate::operation::OperationError::Hook).
    fn on_init(&mut self, _ctx: &mut OperationContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called before the component is terminated.
    ///
    /// # Errors
    ///
    /// An error is surfaced to the host as [`OperationError::Hook`](crate::operation::OperationError::Hook).
    fn on_tear_down(&mut self, _ctx: &mut OperationContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// Default handler, used for every message type without a registered handler.
    ///
    /// # Errors
    ///
    /// An error is surfaced to the host as [`OperationError::Handler`](crate::operation::OperationError::Handler).
    fn on_message(
        &mut self,
        _ctx: &mut OperationContext,
        _request: &dyn BusinessMessage,
    ) -> anyhow::Result<Reply> {
        Ok(Reply::Empty)
    }
}

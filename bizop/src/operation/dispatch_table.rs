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

//! The per-instance routing table from message type to handler.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, instrument, trace, warn};

use crate::common::config::DuplicatePolicy;
use crate::common::HandlerFn;
use crate::message::{MessageTypeRegistry, Reply, TypeKey};
use crate::operation::{OperationContext, OperationError};
use crate::traits::{downcast_message, BusinessMessage, BusinessOperation};

/// One routing rule: requests of `type_key` go to the handler called `handler_name`.
pub struct DispatchEntry<Model> {
    type_key: TypeKey,
    handler_name: String,
    handler: Box<HandlerFn<Model>>,
}

impl<Model> DispatchEntry<Model> {
    /// The message type this entry handles.
    #[must_use]
    pub const fn type_key(&self) -> &TypeKey {
        &self.type_key
    }

    /// The name the handler was registered under.
    #[must_use]
    pub fn handler_name(&self) -> &str {
        &self.handler_name
    }

    /// Runs the handler.
    ///
    /// # Errors
    ///
    /// Whatever the handler returns.
    pub fn invoke(
        &self,
        model: &mut Model,
        ctx: &mut OperationContext,
        request: &dyn BusinessMessage,
    ) -> anyhow::Result<Reply> {
        (self.handler)(model, ctx, request)
    }
}

impl<Model> fmt::Debug for DispatchEntry<Model> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchEntry")
            .field("type_key", &self.type_key)
            .field("handler_name", &self.handler_name)
            .finish_non_exhaustive()
    }
}

/// The outcome of resolving a message type against a [`DispatchTable`].
#[derive(Debug)]
pub enum Route<'a, Model> {
    /// A handler is registered for the type.
    Handler(&'a DispatchEntry<Model>),
    /// No handler is registered; the operation's default handler applies.
    Default,
}

/// Ordered routing table of one business operation instance.
///
/// Built once, through [`DispatchTableBuilder`], and immutable afterwards. Entries keep
/// their registration order. When the table was built under
/// [`DuplicatePolicy::LastWins`] it may hold several entries for one type; resolution
/// then picks the one registered last.
pub struct DispatchTable<Model> {
    entries: Vec<DispatchEntry<Model>>,
    index: HashMap<TypeKey, usize>,
}

impl<Model> fmt::Debug for DispatchTable<Model> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("entries", &self.entries)
            .finish()
    }
}

impl<Model> DispatchTable<Model> {
    /// Resolves a message type to its handler, or to [`Route::Default`].
    #[must_use]
    pub fn resolve(&self, type_key: &TypeKey) -> Route<'_, Model> {
        match self.index.get(type_key).and_then(|&i| self.entries.get(i)) {
            Some(entry) => Route::Handler(entry),
            None => Route::Default,
        }
    }

    /// Returns `true` if a specific handler is registered for `type_key`.
    #[must_use]
    pub fn handles(&self, type_key: &TypeKey) -> bool {
        self.index.contains_key(type_key)
    }

    /// All entries in registration order, shadowed duplicates included.
    pub fn entries(&self) -> impl Iterator<Item = &DispatchEntry<Model>> {
        self.entries.iter()
    }

    /// Number of entries, shadowed duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no handler was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collects the handlers of a business operation and builds its [`DispatchTable`].
///
/// Handed to [`BusinessOperation::register_handlers`]. Every handler takes exactly one
/// typed message, so the table can only ever hold routable entries.
pub struct DispatchTableBuilder<Model> {
    entries: Vec<DispatchEntry<Model>>,
    registry: Arc<MessageTypeRegistry>,
    policy: DuplicatePolicy,
}

impl<Model: BusinessOperation> DispatchTableBuilder<Model> {
    /// Creates a builder that registers message types into `registry`.
    #[must_use]
    pub fn new(registry: Arc<MessageTypeRegistry>, policy: DuplicatePolicy) -> Self {
        Self {
            entries: Vec::new(),
            registry,
            policy,
        }
    }

    /// Registers `handler` for messages of type `M` under `handler_name`.
    ///
    /// `M` is also registered with the message type registry, so its wire form can be
    /// decoded.
    ///
    /// # Returns
    ///
    /// `self`, for chaining.
    pub fn on<M>(
        &mut self,
        handler_name: impl Into<String>,
        handler: impl Fn(&mut Model, &mut OperationContext, &M) -> anyhow::Result<Reply>
            + Send
            + Sync
            + 'static,
    ) -> &mut Self
    where
        M: BusinessMessage + Serialize + DeserializeOwned,
    {
        let type_key = self.registry.register::<M>();
        let handler_name = handler_name.into();
        trace!(%type_key, handler = %handler_name, "Adding message handler");

        let erased: Box<HandlerFn<Model>> = Box::new(
            move |model: &mut Model, ctx: &mut OperationContext, request: &dyn BusinessMessage| {
                match downcast_message::<M>(request) {
                    Some(concrete) => handler(model, ctx, concrete),
                    None => {
                        error!(
                            type_name = std::any::type_name::<M>(),
                            "Message handler called with incompatible message type (downcast failed)"
                        );
                        Err(anyhow::anyhow!(
                            "handler for {} received {}",
                            std::any::type_name::<M>(),
                            request.type_key()
                        ))
                    }
                }
            },
        );

        self.entries.push(DispatchEntry {
            type_key,
            handler_name,
            handler: erased,
        });
        self
    }

    /// Registers `M` with the message type registry without a handler.
    ///
    /// Use it for reply types and for requests served by the default handler.
    pub fn message<M>(&mut self) -> &mut Self
    where
        M: BusinessMessage + Serialize + DeserializeOwned,
    {
        self.registry.register::<M>();
        self
    }

    /// Finishes the table.
    ///
    /// # Errors
    ///
    /// [`OperationError::DuplicateHandler`] if two handlers share a message type and the
    /// policy is [`DuplicatePolicy::Reject`].
    #[instrument(skip(self), fields(entries = self.entries.len()), level = "debug")]
    pub fn build(self) -> Result<DispatchTable<Model>, OperationError> {
        let mut index: HashMap<TypeKey, usize> = HashMap::with_capacity(self.entries.len());
        for (position, entry) in self.entries.iter().enumerate() {
            if let Some(previous) = index.insert(entry.type_key.clone(), position) {
                let first = self
                    .entries
                    .get(previous)
                    .map(|e| e.handler_name.clone())
                    .unwrap_or_default();
                match self.policy {
                    DuplicatePolicy::Reject => {
                        return Err(OperationError::DuplicateHandler {
                            type_key: entry.type_key.clone(),
                            first,
                            second: entry.handler_name.clone(),
                        });
                    }
                    DuplicatePolicy::LastWins => {
                        warn!(
                            type_key = %entry.type_key,
                            shadowed = %first,
                            winner = %entry.handler_name,
                            "Duplicate handler registration; the later one wins"
                        );
                    }
                }
            }
        }
        debug!(handlers = index.len(), "Dispatch table built");
        Ok(DispatchTable {
            entries: self.entries,
            index,
        })
    }
}

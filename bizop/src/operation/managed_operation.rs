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

use acton_ern::Ern;
use once_cell::sync::OnceCell;
use static_assertions::assert_impl_all;
use tracing::{debug, error, instrument, trace, warn};

use crate::common::config::{BizopConfig, DuplicatePolicy, CONFIG};
use crate::message::{Inbound, Outbound, SerializationBoundary, WireCodec};
use crate::operation::{
    route, AdapterCatalog, DispatchTable, DispatchTableBuilder, LifecycleEvent, LifecycleState,
    OperationContext, OperationError, PartnerHandle,
};
use crate::traits::{BusinessOperation, HostHandle};

/// A business operation hosted by the framework.
///
/// Wraps the operation's own state (`Model`) together with its [`OperationContext`], its
/// lifecycle state and its dispatch table. The host drives it through [`setup`],
/// [`on_connected`], [`on_init`], [`on_message`] and [`on_tear_down`].
///
/// The dispatch table is built during [`on_init`], once per instance, and reused for every
/// message afterwards. Each instance has its own table; two operations of the same type
/// never share one.
///
/// [`setup`]: ManagedOperation::setup
/// [`on_connected`]: ManagedOperation::on_connected
/// [`on_init`]: ManagedOperation::on_init
/// [`on_message`]: ManagedOperation::on_message
/// [`on_tear_down`]: ManagedOperation::on_tear_down
#[derive(Debug)]
pub struct ManagedOperation<Model: BusinessOperation> {
    model: Model,
    context: OperationContext,
    state: LifecycleState,
    table: OnceCell<DispatchTable<Model>>,
    catalog: Arc<AdapterCatalog>,
    duplicate_policy: DuplicatePolicy,
    default_handler_name: String,
}

impl<Model: BusinessOperation> ManagedOperation<Model> {
    /// Wraps `model` using the global [`CONFIG`].
    pub fn new(model: Model) -> Self {
        Self::with_config(model, &CONFIG)
    }

    /// Wraps `model` under the identifier `name`.
    ///
    /// # Errors
    ///
    /// Fails if `name` is not a valid identifier segment.
    pub fn named(name: impl Into<String>, model: Model) -> anyhow::Result<Self> {
        let mut operation = Self::new(model);
        operation.context = OperationContext::new(
            Ern::with_root(name.into())?,
            operation.context.boundary().clone(),
        );
        Ok(operation)
    }

    /// Wraps `model` using an explicit configuration.
    pub fn with_config(model: Model, config: &BizopConfig) -> Self {
        let id = Ern::with_root(config.defaults.operation_name.clone()).unwrap_or_else(|err| {
            warn!(name = %config.defaults.operation_name, error = %err, "Invalid operation name; using default identifier");
            Ern::default()
        });
        let boundary = SerializationBoundary::default().with_codec(config.codec.codec());
        Self {
            model,
            context: OperationContext::new(id, boundary),
            state: LifecycleState::default(),
            table: OnceCell::new(),
            catalog: Arc::new(AdapterCatalog::new()),
            duplicate_policy: config.dispatch.duplicate_policy,
            default_handler_name: config.dispatch.default_handler_name.clone(),
        }
    }

    /// Resolves native partner handles through `catalog`.
    #[must_use]
    pub fn with_adapter_catalog(mut self, catalog: Arc<AdapterCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Speaks `codec` on the wire instead of the configured format.
    #[must_use]
    pub fn with_codec(mut self, codec: Arc<dyn WireCodec>) -> Self {
        let boundary = self.context.boundary().with_codec(codec);
        self.context.set_boundary(boundary);
        self
    }

    /// Overrides the configured duplicate handler policy.
    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Stores the host handle and binds the adapter `partner` provides.
    ///
    /// Any previous binding is replaced. A [`PartnerHandle::Native`] descriptor is resolved
    /// to a new adapter instance through the adapter catalog; if that fails the previous
    /// adapter stays bound.
    ///
    /// # Errors
    ///
    /// * [`OperationError::AdapterResolution`] if a native descriptor names no registered
    ///   implementation.
    /// * [`OperationError::InvalidTransition`] after teardown.
    #[instrument(skip(self, primary), fields(id = %self.context.id()))]
    pub fn setup(
        &mut self,
        primary: Option<Arc<dyn HostHandle>>,
        partner: PartnerHandle,
    ) -> Result<(), OperationError> {
        self.advance(LifecycleEvent::Setup)?;
        if matches!(partner, PartnerHandle::None) && !Model::ADAPTER_TYPE.is_empty() {
            warn!(adapter_type = Model::ADAPTER_TYPE, "Operation expects an adapter but none was supplied");
        }
        self.context.set_host(primary);
        self.context
            .adapter_mut()
            .bind(partner, &self.catalog)
            .map_err(|err| {
                error!(error = %err, "Adapter resolution failed");
                OperationError::from(err)
            })
    }

    /// Runs the connected hook. Legal again after initialization, to signal a reconnect.
    ///
    /// # Errors
    ///
    /// [`OperationError::InvalidTransition`] after teardown, [`OperationError::Hook`] if the
    /// hook fails.
    #[instrument(skip(self), fields(id = %self.context.id(), state = ?self.state))]
    pub fn on_connected(&mut self) -> Result<(), OperationError> {
        let next = self.next_state(LifecycleEvent::Connected)?;
        self.model
            .on_connected(&mut self.context)
            .map_err(|source| OperationError::Hook {
                event: LifecycleEvent::Connected,
                source,
            })?;
        self.state = next;
        Ok(())
    }

    /// Runs the init hook, then builds the dispatch table.
    ///
    /// On failure the operation stays `Connected` and can be initialized again; a retry runs
    /// the init hook once more before the table build is attempted again.
    ///
    /// # Errors
    ///
    /// [`OperationError::InvalidTransition`] unless connected, [`OperationError::Hook`] if the
    /// hook fails, [`OperationError::DuplicateHandler`] if the table cannot be built.
    #[instrument(skip(self), fields(id = %self.context.id()))]
    pub fn on_init(&mut self) -> Result<(), OperationError> {
        let next = self.next_state(LifecycleEvent::Init)?;
        self.model
            .on_init(&mut self.context)
            .map_err(|source| OperationError::Hook {
                event: LifecycleEvent::Init,
                source,
            })?;
        let handlers = self.build_dispatch_table()?.len();
        debug!(handlers, "Operation initialized");
        self.state = next;
        Ok(())
    }

    /// Runs the teardown hook. The operation accepts nothing afterwards.
    ///
    /// # Errors
    ///
    /// [`OperationError::InvalidTransition`] unless initialized. The operation is torn down
    /// even when the hook fails, in which case [`OperationError::Hook`] is returned.
    #[instrument(skip(self), fields(id = %self.context.id()))]
    pub fn on_tear_down(&mut self) -> Result<(), OperationError> {
        let next = self.next_state(LifecycleEvent::TearDown)?;
        self.state = next;
        self.model
            .on_tear_down(&mut self.context)
            .map_err(|source| OperationError::Hook {
                event: LifecycleEvent::TearDown,
                source,
            })
    }

    /// Handles one request from the host.
    ///
    /// The response mirrors the request: a typed request gets a typed response, a wire
    /// request gets a wire response. See [`route`].
    ///
    /// # Errors
    ///
    /// [`OperationError::NotInitialized`] outside the initialized state, otherwise whatever
    /// [`route`] reports.
    #[instrument(skip(self, request), fields(id = %self.context.id()))]
    pub fn on_message(&mut self, request: impl Into<Inbound>) -> Result<Outbound, OperationError> {
        if !self.state.accepts_messages() {
            return Err(OperationError::NotInitialized(self.state));
        }
        let table = self
            .table
            .get()
            .ok_or(OperationError::NotInitialized(self.state))?;
        route(
            table,
            &mut self.model,
            &mut self.context,
            &self.default_handler_name,
            request.into(),
        )
    }

    /// Builds the dispatch table if it does not exist yet, and returns it.
    ///
    /// Only the first call collects handlers; later calls, concurrent ones included,
    /// return the same table.
    ///
    /// # Errors
    ///
    /// [`OperationError::DuplicateHandler`] if two handlers share a message type under
    /// [`DuplicatePolicy::Reject`]. A failed build is retried on the next call.
    pub fn build_dispatch_table(&self) -> Result<&DispatchTable<Model>, OperationError> {
        self.table.get_or_try_init(|| {
            trace!(operation = std::any::type_name::<Model>(), "Collecting message handlers");
            let mut builder = DispatchTableBuilder::new(
                Arc::clone(self.context.boundary().registry()),
                self.duplicate_policy,
            );
            Model::register_handlers(&mut builder);
            builder.build()
        })
    }

    /// The dispatch table, once built.
    #[must_use]
    pub fn dispatch_table(&self) -> Option<&DispatchTable<Model>> {
        self.table.get()
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// The operation's own state.
    #[must_use]
    pub const fn model(&self) -> &Model {
        &self.model
    }

    /// The operation's own state, mutably.
    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    /// The handler context.
    #[must_use]
    pub const fn context(&self) -> &OperationContext {
        &self.context
    }

    /// The handler context, mutably.
    pub fn context_mut(&mut self) -> &mut OperationContext {
        &mut self.context
    }

    /// Qualified name of the adapter this operation type expects; empty when adapterless.
    #[must_use]
    pub const fn adapter_type(&self) -> &'static str {
        Model::ADAPTER_TYPE
    }

    fn next_state(&self, event: LifecycleEvent) -> Result<LifecycleState, OperationError> {
        self.state.transition(event).ok_or_else(|| {
            error!(state = ?self.state, ?event, "Rejected lifecycle event");
            OperationError::InvalidTransition {
                state: self.state,
                event,
            }
        })
    }

    fn advance(&mut self, event: LifecycleEvent) -> Result<(), OperationError> {
        self.state = self.next_state(event)?;
        Ok(())
    }
}

assert_impl_all!(OperationContext: Send, Sync);
assert_impl_all!(DispatchTable<()>: Send, Sync);

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::message::Reply;
    use crate::traits::BusinessMessage;

    #[derive(Debug, Default)]
    struct Counter {
        inits: usize,
        connects: usize,
        registrations: usize,
    }

    #[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
    struct Tick;

    impl BusinessOperation for Counter {
        fn register_handlers(handlers: &mut DispatchTableBuilder<Self>) {
            handlers.on::<Tick>("tick", |counter: &mut Counter, _, _: &Tick| {
                counter.registrations += 1;
                Ok(Reply::Empty)
            });
        }

        fn on_connected(&mut self, _ctx: &mut OperationContext) -> anyhow::Result<()> {
            self.connects += 1;
            Ok(())
        }

        fn on_init(&mut self, _ctx: &mut OperationContext) -> anyhow::Result<()> {
            self.inits += 1;
            Ok(())
        }
    }

    fn operation() -> ManagedOperation<Counter> {
        ManagedOperation::with_config(Counter::default(), &BizopConfig::default())
    }

    #[test]
    fn test_message_before_init_is_rejected() {
        let mut op = operation();
        assert!(matches!(
            op.on_message(Inbound::message(Tick)),
            Err(OperationError::NotInitialized(LifecycleState::Uninitialized))
        ));
    }

    #[test]
    fn test_init_requires_connect() {
        let mut op = operation();
        assert!(matches!(
            op.on_init(),
            Err(OperationError::InvalidTransition {
                event: LifecycleEvent::Init,
                ..
            })
        ));
        assert_eq!(op.model().inits, 0);
        assert!(op.dispatch_table().is_none());
    }

    #[test]
    fn test_lifecycle_happy_path() {
        let mut op = operation();
        op.setup(None, PartnerHandle::None).unwrap();
        op.on_connected().unwrap();
        op.on_init().unwrap();
        assert_eq!(op.state(), LifecycleState::Initialized);
        assert_eq!(op.dispatch_table().map(DispatchTable::len), Some(1));

        op.on_connected().unwrap();
        assert_eq!(op.state(), LifecycleState::Initialized);
        assert_eq!(op.model().connects, 2);

        assert!(op.on_message(Inbound::message(Tick)).unwrap().is_empty());
        op.on_tear_down().unwrap();
        assert!(matches!(
            op.on_message(Inbound::message(Tick)),
            Err(OperationError::NotInitialized(LifecycleState::TornDown))
        ));
        assert!(op.setup(None, PartnerHandle::None).is_err());
    }

    #[test]
    fn test_table_built_once() {
        let op = operation();
        let first: *const DispatchTable<Counter> = op.build_dispatch_table().unwrap();
        let second: *const DispatchTable<Counter> = op.build_dispatch_table().unwrap();
        assert!(std::ptr::eq(first, second));
    }

    static CROWD_REGISTRATIONS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug, Default)]
    struct Crowd;

    impl BusinessOperation for Crowd {
        fn register_handlers(handlers: &mut DispatchTableBuilder<Self>) {
            CROWD_REGISTRATIONS.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            handlers.on::<Tick>("tick", |_: &mut Crowd, _, _: &Tick| Ok(Reply::Empty));
        }
    }

    #[test]
    fn test_concurrent_first_build_collects_handlers_once() {
        let op = ManagedOperation::with_config(Crowd, &BizopConfig::default());

        let addresses: Vec<usize> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        let table = op.build_dispatch_table().unwrap();
                        table as *const DispatchTable<Crowd> as usize
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(CROWD_REGISTRATIONS.load(Ordering::SeqCst), 1);
        assert!(addresses.iter().all(|&a| a == addresses[0]));
        assert_eq!(op.dispatch_table().map(DispatchTable::len), Some(1));
    }

    #[derive(Debug, Default)]
    struct Refusing {
        inits: usize,
    }

    impl BusinessOperation for Refusing {
        fn register_handlers(handlers: &mut DispatchTableBuilder<Self>) {
            handlers
                .on::<Tick>("first_tick", |_: &mut Refusing, _, _: &Tick| Ok(Reply::Empty))
                .on::<Tick>("second_tick", |_: &mut Refusing, _, _: &Tick| Ok(Reply::Empty));
        }

        fn on_init(&mut self, _ctx: &mut OperationContext) -> anyhow::Result<()> {
            self.inits += 1;
            Ok(())
        }

        fn on_message(
            &mut self,
            _ctx: &mut OperationContext,
            _request: &dyn BusinessMessage,
        ) -> anyhow::Result<Reply> {
            anyhow::bail!("nothing is handled here")
        }
    }

    #[test]
    fn test_failed_table_build_keeps_connected_and_retry_reruns_hook() {
        let mut op = ManagedOperation::with_config(Refusing::default(), &BizopConfig::default());
        op.on_connected().unwrap();

        for attempt in 1..=2 {
            assert!(matches!(
                op.on_init(),
                Err(OperationError::DuplicateHandler { .. })
            ));
            assert_eq!(op.state(), LifecycleState::Connected);
            assert_eq!(op.model().inits, attempt);
            assert!(op.dispatch_table().is_none());
        }

        let mut op = op.with_duplicate_policy(DuplicatePolicy::LastWins);
        op.on_init().unwrap();
        assert_eq!(op.state(), LifecycleState::Initialized);
        assert_eq!(op.model().inits, 3);
    }

    #[test]
    fn test_default_handler_name_comes_from_given_config() {
        let mut config = BizopConfig::default();
        config.dispatch.default_handler_name = "fallback".to_string();
        config.dispatch.duplicate_policy = DuplicatePolicy::LastWins;
        let mut op = ManagedOperation::with_config(Refusing::default(), &config);
        op.on_connected().unwrap();
        op.on_init().unwrap();

        #[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
        struct Stray;

        match op.on_message(Inbound::message(Stray)) {
            Err(OperationError::Handler { handler, .. }) => assert_eq!(handler, "fallback"),
            other => panic!("expected a handler error, got {other:?}"),
        }
    }
}

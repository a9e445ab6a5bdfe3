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

//! Binding an operation to the outbound adapter it forwards work through.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::operation::OperationError;
use crate::traits::OutboundAdapter;

type AdapterFactory = dyn Fn() -> Box<dyn OutboundAdapter> + Send + Sync + 'static;

/// Names an adapter implementation by module and class name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdapterDescriptor {
    /// Module the implementation lives in, e.g. `ext.mod`
    pub module: String,
    /// Name of the implementation within its module, e.g. `Sender`
    pub classname: String,
}

impl AdapterDescriptor {
    /// Creates a descriptor.
    pub fn new(module: impl Into<String>, classname: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            classname: classname.into(),
        }
    }

    /// `module.classname`, the key the [`AdapterCatalog`] resolves.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        if self.module.is_empty() {
            self.classname.clone()
        } else {
            format!("{}.{}", self.module, self.classname)
        }
    }
}

impl fmt::Display for AdapterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

/// The partner handle a host passes to `setup`.
#[derive(Debug, Default)]
pub enum PartnerHandle {
    /// No adapter.
    #[default]
    None,
    /// A ready adapter, stored as is.
    Adapter(Box<dyn OutboundAdapter>),
    /// A framework-native wrapper naming the implementation to instantiate.
    Native(AdapterDescriptor),
}

impl PartnerHandle {
    /// Wraps a ready adapter.
    pub fn adapter<A: OutboundAdapter>(adapter: A) -> Self {
        Self::Adapter(Box::new(adapter))
    }

    /// Names an implementation to be resolved through the [`AdapterCatalog`].
    pub fn native(module: impl Into<String>, classname: impl Into<String>) -> Self {
        Self::Native(AdapterDescriptor::new(module, classname))
    }
}

/// A native adapter descriptor could not be resolved.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdapterResolutionError {
    /// No implementation is registered under the qualified name.
    #[error("no adapter implementation registered as {0}")]
    UnknownAdapter(String),
}

/// Registry of adapter implementations a native descriptor can name.
#[derive(Default)]
pub struct AdapterCatalog {
    factories: DashMap<String, Arc<AdapterFactory>>,
}

impl fmt::Debug for AdapterCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.factories.iter().map(|e| e.key().clone()).collect();
        f.debug_struct("AdapterCatalog")
            .field("adapters", &names)
            .finish()
    }
}

impl AdapterCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `A` under `module.classname`, constructed through [`Default`].
    pub fn register<A: OutboundAdapter + Default>(
        &self,
        module: impl Into<String>,
        classname: impl Into<String>,
    ) -> &Self {
        self.register_with(module, classname, || A::default())
    }

    /// Registers a factory under `module.classname`. A previous registration is replaced.
    pub fn register_with<A, F>(
        &self,
        module: impl Into<String>,
        classname: impl Into<String>,
        factory: F,
    ) -> &Self
    where
        A: OutboundAdapter,
        F: Fn() -> A + Send + Sync + 'static,
    {
        let name = AdapterDescriptor::new(module, classname).qualified_name();
        let erased: Arc<AdapterFactory> =
            Arc::new(move || -> Box<dyn OutboundAdapter> { Box::new(factory()) });
        if self.factories.insert(name.clone(), erased).is_some() {
            warn!(adapter = %name, "Adapter implementation registered twice; replacing");
        } else {
            debug!(adapter = %name, "Registered adapter implementation");
        }
        self
    }

    /// Returns `true` if `descriptor` names a registered implementation.
    #[must_use]
    pub fn contains(&self, descriptor: &AdapterDescriptor) -> bool {
        self.factories.contains_key(&descriptor.qualified_name())
    }

    /// Constructs a fresh instance of the implementation `descriptor` names.
    ///
    /// # Errors
    ///
    /// [`AdapterResolutionError::UnknownAdapter`] if nothing is registered under the name.
    pub fn resolve(
        &self,
        descriptor: &AdapterDescriptor,
    ) -> Result<Box<dyn OutboundAdapter>, AdapterResolutionError> {
        let name = descriptor.qualified_name();
        // Clone the factory out so no map guard is held while it runs.
        let factory = self
            .factories
            .get(&name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(AdapterResolutionError::UnknownAdapter(name))?;
        Ok(factory())
    }
}

/// The single adapter an operation forwards work through, if any.
#[derive(Debug, Default)]
pub struct AdapterBinding {
    adapter: Option<Box<dyn OutboundAdapter>>,
}

impl AdapterBinding {
    /// Binds the adapter `partner` provides, replacing any previous binding.
    ///
    /// A [`PartnerHandle::Native`] descriptor is resolved to a new instance through
    /// `catalog`; a ready adapter is stored directly; [`PartnerHandle::None`] clears the
    /// binding.
    ///
    /// # Errors
    ///
    /// [`AdapterResolutionError`] if a native descriptor names no known implementation.
    /// The previous binding is kept in that case.
    #[instrument(skip(self, catalog), level = "debug")]
    pub fn bind(
        &mut self,
        partner: PartnerHandle,
        catalog: &AdapterCatalog,
    ) -> Result<(), AdapterResolutionError> {
        self.adapter = match partner {
            PartnerHandle::None => None,
            PartnerHandle::Adapter(adapter) => Some(adapter),
            PartnerHandle::Native(descriptor) => Some(catalog.resolve(&descriptor)?),
        };
        Ok(())
    }

    /// Returns `true` if an adapter is bound.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.adapter.is_some()
    }

    /// The bound adapter.
    #[must_use]
    pub fn get(&self) -> Option<&dyn OutboundAdapter> {
        self.adapter.as_deref()
    }

    /// The bound adapter, mutably.
    pub fn get_mut(&mut self) -> Option<&mut (dyn OutboundAdapter + 'static)> {
        self.adapter.as_deref_mut()
    }

    /// The bound adapter as its concrete type `A`.
    #[must_use]
    pub fn downcast_ref<A: OutboundAdapter>(&self) -> Option<&A> {
        self.adapter
            .as_deref()
            .and_then(|adapter| adapter.as_any().downcast_ref::<A>())
    }

    /// The bound adapter as its concrete type `A`, mutably.
    pub fn downcast_mut<A: OutboundAdapter>(&mut self) -> Option<&mut A> {
        self.adapter
            .as_deref_mut()
            .and_then(|adapter| adapter.as_any_mut().downcast_mut::<A>())
    }

    /// Calls `method` on the bound adapter.
    ///
    /// # Errors
    ///
    /// [`OperationError::AdapterUnbound`] without an adapter, [`OperationError::Adapter`]
    /// if the call fails.
    pub fn invoke(
        &mut self,
        method: &str,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, OperationError> {
        let adapter = self
            .adapter
            .as_deref_mut()
            .ok_or(OperationError::AdapterUnbound)?;
        adapter
            .invoke(method, payload)
            .map_err(|source| OperationError::Adapter {
                method: method.to_string(),
                source,
            })
    }
}

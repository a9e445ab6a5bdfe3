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
use std::any::Any;
use std::fmt::Debug;

/// Upcasts to [`Any`] so trait objects built on top of it can be downcast.
///
/// Blanket-implemented for every `'static` type.
pub trait AsAny: Any {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A collaborator that performs the actual communication with an external system on
/// behalf of a business operation.
///
/// Handlers reach the bound adapter through
/// [`OperationContext::adapter`](crate::operation::OperationContext::adapter) and either
/// call [`invoke`](Self::invoke) or downcast to the concrete adapter for typed access.
pub trait OutboundAdapter: AsAny + Send + Sync + Debug {
    /// Performs `method` against the external system.
    ///
    /// # Errors
    ///
    /// Any failure of the external call.
    fn invoke(
        &mut self,
        method: &str,
        payload: serde_json::Value,
    ) -> anyhow::Result<serde_json::Value>;
}

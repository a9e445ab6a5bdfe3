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

pub use adapter_binding::{
    AdapterBinding, AdapterCatalog, AdapterDescriptor, AdapterResolutionError, PartnerHandle,
};
pub use context::OperationContext;
pub use dispatch_table::{DispatchEntry, DispatchTable, DispatchTableBuilder, Route};
pub use lifecycle::{LifecycleEvent, LifecycleState};
pub use managed_operation::ManagedOperation;
pub use operation_error::OperationError;
pub use router::route;

mod adapter_binding;
mod context;
mod dispatch_table;
mod lifecycle;
mod managed_operation;
mod operation_error;
mod router;

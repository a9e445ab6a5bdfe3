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

//! The traits that user code implements or consumes.
//!
//! *   [`BusinessMessage`]: blanket-implemented marker for every routable payload.
//! *   [`BusinessOperation`]: the component a host drives; declares handlers and
//!     overrides lifecycle hooks.
//! *   [`OutboundAdapter`]: the collaborator that talks to an external system.
//! *   [`HostHandle`]: the host runtime's services available to handlers.

pub use business_message::{downcast_message, BusinessMessage};
pub use business_operation::BusinessOperation;
pub use host_handle::HostHandle;
pub use outbound_adapter::{AsAny, OutboundAdapter};

mod business_message;
mod business_operation;
mod host_handle;
mod outbound_adapter;

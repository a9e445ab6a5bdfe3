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

//! Internal type aliases shared by the dispatch machinery.

use crate::message::Reply;
use crate::operation::OperationContext;
use crate::traits::BusinessMessage;

/// Type-erased handler stored in a dispatch entry.
///
/// Receives the operation state, its context and the still-erased request. The closure
/// produced by [`DispatchTableBuilder::on`](crate::operation::DispatchTableBuilder::on)
/// downcasts the request to its concrete type before calling user code.
pub type HandlerFn<Model> = dyn Fn(&mut Model, &mut OperationContext, &dyn BusinessMessage) -> anyhow::Result<Reply>
    + Send
    + Sync
    + 'static;

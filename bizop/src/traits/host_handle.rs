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
use std::fmt::Debug;

/// Services the host runtime offers to a business operation.
///
/// Supplied as the primary handle of [`ManagedOperation::setup`](crate::operation::ManagedOperation::setup).
/// Requests and responses cross this boundary in wire form; handlers normally use the
/// typed wrappers on [`OperationContext`](crate::operation::OperationContext) instead.
pub trait HostHandle: Send + Sync + Debug {
    /// Sends `wire` to the component named `target` and blocks until it answers.
    ///
    /// # Errors
    ///
    /// Fails if the target is unknown or the exchange fails.
    fn send_request_sync(&self, target: &str, wire: &str) -> anyhow::Result<String>;

    /// Sends `wire` to the component named `target` without waiting for an answer.
    ///
    /// # Errors
    ///
    /// Fails if the request cannot be queued.
    fn send_request_async(&self, target: &str, wire: &str) -> anyhow::Result<()>;
}

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

/// Where a business operation is in its life.
///
/// `Uninitialized → Connected → Initialized → TornDown`. Reconnecting an initialized
/// operation keeps it `Initialized`; nothing ever leaves `TornDown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Created, not yet connected.
    #[default]
    Uninitialized,
    /// Connected to the host, not yet initialized.
    Connected,
    /// Dispatch table built; messages are accepted.
    Initialized,
    /// Torn down; nothing further is accepted.
    TornDown,
}

/// A host-driven lifecycle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// `setup`
    Setup,
    /// `on_connected`
    Connected,
    /// `on_init`
    Init,
    /// `on_tear_down`
    TearDown,
}

impl LifecycleState {
    /// Returns the state reached by applying `event`, or `None` if the event is not legal
    /// in this state.
    #[must_use]
    pub const fn transition(self, event: LifecycleEvent) -> Option<Self> {
        match (self, event) {
            (Self::TornDown, LifecycleEvent::Setup) => None,
            (state, LifecycleEvent::Setup) => Some(state),
            (Self::Uninitialized | Self::Connected, LifecycleEvent::Connected) => {
                Some(Self::Connected)
            }
            (Self::Initialized, LifecycleEvent::Connected) => Some(Self::Initialized),
            (Self::Connected, LifecycleEvent::Init) => Some(Self::Initialized),
            (Self::Initialized, LifecycleEvent::TearDown) => Some(Self::TornDown),
            _ => None,
        }
    }

    /// Returns `true` if messages may be routed in this state.
    #[must_use]
    pub const fn accepts_messages(self) -> bool {
        matches!(self, Self::Initialized)
    }
}

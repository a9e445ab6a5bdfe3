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
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical name of a message's concrete type.
///
/// Built from the fully qualified Rust path of the type with every `::` turned into
/// `.`, so `shop::messages::OrderMsg` becomes `shop.messages.OrderMsg`. Qualifying by
/// module keeps identically named types from different modules apart.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeKey(String);

impl TypeKey {
    /// Returns the key of type `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(std::any::type_name::<T>())
    }

    /// Normalizes a qualified type name into a key.
    #[must_use]
    pub fn new(qualified_name: impl AsRef<str>) -> Self {
        Self(qualified_name.as_ref().trim().replace("::", "."))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the module part of the key, without the type name.
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.split().0
    }

    /// Returns the unqualified type name, generic arguments included.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.split().1
    }

    // Generic arguments may contain dots of their own, so only the head is searched.
    fn split(&self) -> (&str, &str) {
        let head_end = self.0.find('<').unwrap_or(self.0.len());
        match self.0[..head_end].rfind('.') {
            Some(dot) => (&self.0[..dot], &self.0[dot + 1..]),
            None => ("", self.0.as_str()),
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

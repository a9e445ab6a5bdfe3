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

use dyn_clone::DynClone;

use crate::message::TypeKey;

/// A marker trait for types that can travel through the dispatch core as messages.
///
/// Combines `Any`, `Send`, `Sync` and `Debug` with [`DynClone`], so messages can be
/// cloned as trait objects and downcast back to their concrete type. A blanket
/// implementation covers every qualifying type; message structs normally get there by
/// way of [`#[business_message]`](bizop_macro::business_message).
///
/// Note that `Box<dyn BusinessMessage>` itself satisfies the blanket bounds. Always
/// dereference a boxed message (`&*boxed`) before calling these methods, otherwise they
/// describe the box instead of the payload.
pub trait BusinessMessage: DynClone + Any + Send + Sync + Debug {
    /// Returns a reference to the message as a dynamic [`Any`] trait object.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable reference to the message as a dynamic [`Any`] trait object.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Returns the canonical key of the message's concrete type.
    fn type_key(&self) -> TypeKey;
}

dyn_clone::clone_trait_object!(BusinessMessage);

impl<T> BusinessMessage for T
where
    T: Any + Send + Sync + Debug + DynClone + 'static,
{
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline]
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<T>()
    }
}

/// Attempts to downcast a type-erased message to the concrete type `T`.
///
/// Returns `None` when `msg` holds a value of another type.
pub fn downcast_message<T: BusinessMessage>(msg: &dyn BusinessMessage) -> Option<&T> {
    msg.as_any().downcast_ref::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Ping(u8);

    #[derive(Clone, Debug)]
    struct Pong;

    #[test]
    fn test_downcast_matches_concrete_type() {
        let boxed: Box<dyn BusinessMessage> = Box::new(Ping(7));
        assert_eq!(downcast_message::<Ping>(&*boxed), Some(&Ping(7)));
        assert!(downcast_message::<Pong>(&*boxed).is_none());
    }

    #[test]
    fn test_type_key_of_boxed_message_names_payload() {
        let boxed: Box<dyn BusinessMessage> = Box::new(Pong);
        assert_eq!((*boxed).type_key(), TypeKey::of::<Pong>());
        assert!((*boxed).type_key().as_str().ends_with(".Pong"));
    }

    #[test]
    fn test_boxed_message_clones() {
        let boxed: Box<dyn BusinessMessage> = Box::new(Ping(1));
        let cloned = boxed.clone();
        assert_eq!(downcast_message::<Ping>(&*cloned), Some(&Ping(1)));
    }
}

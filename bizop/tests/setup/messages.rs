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
#![allow(unused)]

use bizop::prelude::*;

#[business_message]
pub struct OrderMsg {
    pub sku: String,
    pub quantity: u32,
}

#[business_message]
pub struct OrderAccepted {
    pub sku: String,
    pub backlog: u32,
}

#[business_message]
pub struct PingMsg;

#[business_message]
pub struct Quote {
    pub sku: String,
}

#[business_message]
pub struct Price {
    pub cents: u64,
}

// the same simple name as `OrderMsg` in another module
pub mod legacy {
    use bizop::prelude::*;

    #[business_message]
    pub struct OrderMsg {
        pub reference: String,
    }
}

#[business_message(no_default)]
pub enum Shipment {
    Pending,
    Sent { carrier: String },
}

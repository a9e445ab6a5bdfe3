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

use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use bizop::prelude::*;
use serde_json::json;

use crate::setup::messages::{legacy, OrderAccepted, OrderMsg, PingMsg, Price, Quote, Shipment};

/// Order desk: one specific handler plus the default handler.
#[business_operation]
pub struct Shop {
    pub backlog: u32,
    pub handled: Vec<&'static str>,
    pub defaulted: Vec<TypeKey>,
    pub inits: usize,
    pub connects: usize,
    pub teardowns: usize,
}

impl Shop {
    fn handle_order(&mut self, _ctx: &mut OperationContext, order: &OrderMsg) -> anyhow::Result<Reply> {
        self.handled.push("handle_order");
        self.backlog += order.quantity;
        Ok(Reply::message(OrderAccepted {
            sku: order.sku.clone(),
            backlog: self.backlog,
        }))
    }

    fn handle_legacy_order(
        &mut self,
        _ctx: &mut OperationContext,
        _order: &legacy::OrderMsg,
    ) -> anyhow::Result<Reply> {
        self.handled.push("handle_legacy_order");
        Ok(Reply::Empty)
    }
}

impl BusinessOperation for Shop {
    fn register_handlers(handlers: &mut DispatchTableBuilder<Self>) {
        handlers
            .on::<OrderMsg>("handle_order", Self::handle_order)
            .on::<legacy::OrderMsg>("handle_legacy_order", Self::handle_legacy_order)
            .message::<OrderAccepted>()
            .message::<PingMsg>()
            .message::<Shipment>();
    }

    fn on_connected(&mut self, _ctx: &mut OperationContext) -> anyhow::Result<()> {
        self.connects += 1;
        Ok(())
    }

    fn on_init(&mut self, _ctx: &mut OperationContext) -> anyhow::Result<()> {
        self.inits += 1;
        Ok(())
    }

    fn on_tear_down(&mut self, _ctx: &mut OperationContext) -> anyhow::Result<()> {
        self.teardowns += 1;
        Ok(())
    }

    fn on_message(
        &mut self,
        _ctx: &mut OperationContext,
        request: &dyn BusinessMessage,
    ) -> anyhow::Result<Reply> {
        self.defaulted.push(request.type_key());
        Ok(Reply::value(json!({ "default": request.type_key().simple_name() })))
    }
}

/// Declares two handlers for the same message type, `handle_a` first.
#[business_operation]
pub struct TwoHandlers {
    pub calls: Vec<&'static str>,
}

impl BusinessOperation for TwoHandlers {
    fn register_handlers(handlers: &mut DispatchTableBuilder<Self>) {
        handlers
            .on::<OrderMsg>("handle_a", |op: &mut Self, _, _: &OrderMsg| {
                op.calls.push("handle_a");
                Ok(Reply::value("a"))
            })
            .on::<OrderMsg>("handle_b", |op: &mut Self, _, _: &OrderMsg| {
                op.calls.push("handle_b");
                Ok(Reply::value("b"))
            });
    }
}

/// Every order fails.
#[business_operation]
pub struct OutOfStock;

impl BusinessOperation for OutOfStock {
    fn register_handlers(handlers: &mut DispatchTableBuilder<Self>) {
        handlers.on::<OrderMsg>("reject_order", |_: &mut Self, _, order: &OrderMsg| {
            Err(anyhow!("{} is out of stock", order.sku))
        });
    }
}

/// Fails the requested lifecycle hook.
#[business_operation]
pub struct Fragile {
    pub fail_on: Option<LifecycleEvent>,
    pub journal: Vec<&'static str>,
}

impl Fragile {
    fn hook(&mut self, event: LifecycleEvent, name: &'static str) -> anyhow::Result<()> {
        self.journal.push(name);
        if self.fail_on == Some(event) {
            anyhow::bail!("{name} refused");
        }
        Ok(())
    }
}

impl BusinessOperation for Fragile {
    fn on_connected(&mut self, _ctx: &mut OperationContext) -> anyhow::Result<()> {
        self.hook(LifecycleEvent::Connected, "connected")
    }

    fn on_init(&mut self, _ctx: &mut OperationContext) -> anyhow::Result<()> {
        self.hook(LifecycleEvent::Init, "init")
    }

    fn on_tear_down(&mut self, _ctx: &mut OperationContext) -> anyhow::Result<()> {
        self.hook(LifecycleEvent::TearDown, "tear_down")
    }
}

/// Records every payload it is asked to send.
#[derive(Debug, Default)]
pub struct Sender {
    pub sent: Vec<serde_json::Value>,
}

impl OutboundAdapter for Sender {
    fn invoke(&mut self, method: &str, payload: serde_json::Value) -> anyhow::Result<serde_json::Value> {
        match method {
            "send" => {
                self.sent.push(payload);
                Ok(json!({ "delivered": self.sent.len() }))
            }
            other => Err(anyhow!("Sender does not support {other}")),
        }
    }
}

/// Another adapter, to tell bindings apart.
#[derive(Debug, Default)]
pub struct Fax;

impl OutboundAdapter for Fax {
    fn invoke(&mut self, _method: &str, _payload: serde_json::Value) -> anyhow::Result<serde_json::Value> {
        Ok(json!("beep"))
    }
}

/// Forwards every order to its bound adapter.
#[business_operation]
pub struct Courier;

impl BusinessOperation for Courier {
    const ADAPTER_TYPE: &'static str = "ext.mod.Sender";

    fn register_handlers(handlers: &mut DispatchTableBuilder<Self>) {
        handlers.on::<OrderMsg>("ship_order", |_: &mut Self, ctx, order: &OrderMsg| {
            let receipt = ctx
                .adapter_mut()
                .invoke("send", json!({ "sku": order.sku, "quantity": order.quantity }))?;
            Ok(Reply::Value(receipt))
        });
    }
}

/// Asks the pricing component for a price and relays it.
#[business_operation]
pub struct Broker {
    pub notified: usize,
}

impl BusinessOperation for Broker {
    fn register_handlers(handlers: &mut DispatchTableBuilder<Self>) {
        handlers
            .on::<Quote>("quote", |broker: &mut Self, ctx, quote: &Quote| {
                let price: Price = ctx.send_request_sync("pricing", quote)?;
                ctx.send_request_async("audit", quote)?;
                broker.notified += 1;
                Ok(Reply::message(price))
            })
            .message::<Price>();
    }
}

/// Host double that answers `pricing` requests and records every delivery.
#[derive(Debug)]
pub struct FakeHost {
    boundary: SerializationBoundary,
    pub delivered: Mutex<Vec<(String, String)>>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        let boundary = SerializationBoundary::default();
        boundary.registry().register::<Quote>();
        boundary.registry().register::<Price>();
        Arc::new(Self {
            boundary,
            delivered: Mutex::new(Vec::new()),
        })
    }

    pub fn deliveries(&self) -> Vec<(String, String)> {
        self.delivered.lock().map(|d| d.clone()).unwrap_or_default()
    }

    fn record(&self, target: &str, wire: &str) -> anyhow::Result<()> {
        self.delivered
            .lock()
            .map_err(|_| anyhow!("delivery log poisoned"))?
            .push((target.to_string(), wire.to_string()));
        Ok(())
    }
}

impl HostHandle for FakeHost {
    fn send_request_sync(&self, target: &str, wire: &str) -> anyhow::Result<String> {
        self.record(target, wire)?;
        if target != "pricing" {
            anyhow::bail!("no component named {target}");
        }
        let request = self.boundary.deserialize(wire)?;
        let quote = downcast_message::<Quote>(&*request)
            .ok_or_else(|| anyhow!("pricing only answers quotes"))?;
        let price = Price {
            cents: 100 * quote.sku.len() as u64,
        };
        Ok(self.boundary.serialize(&price)?)
    }

    fn send_request_async(&self, target: &str, wire: &str) -> anyhow::Result<()> {
        self.record(target, wire)
    }
}

/// Initialized operation, ready to take messages.
pub fn started<Model: BusinessOperation>(model: Model) -> anyhow::Result<ManagedOperation<Model>> {
    let mut operation = ManagedOperation::with_config(model, &BizopConfig::default());
    operation.setup(None, PartnerHandle::None)?;
    operation.on_connected()?;
    operation.on_init()?;
    Ok(operation)
}

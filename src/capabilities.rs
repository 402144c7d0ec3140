//! Capability wiring. The core only ever needs three effects: HTTP to talk
//! to the listing service, key-value storage for the persisted session, and
//! render requests. Crux's built-in capabilities cover all of them.
//!
//! The `Effect`/`EffectFfi` enums and the `WithContext` impl are written out
//! by hand: the derive macro shipped with this crux_core version puts the
//! event type where `WithContext` expects the app type, which leaves
//! `AppTester`/`Core` unsatisfiable.

use serde::{Deserialize, Serialize};

use crux_core::bridge::ResolveSerialized;
use crux_core::capability::ProtoContext;
use crux_core::render::{Render, RenderOperation};
use crux_core::Request;
use crux_http::protocol::HttpRequest;
use crux_http::Http;
use crux_kv::{KeyValue, KeyValueOperation};

use crate::app::App;
use crate::event::Event;

pub struct Capabilities {
    pub http: Http<Event>,
    pub kv: KeyValue<Event>,
    pub render: Render<Event>,
}

#[derive(Debug)]
pub enum Effect {
    Http(Request<HttpRequest>),
    Kv(Request<KeyValueOperation>),
    Render(Request<RenderOperation>),
}

#[derive(Serialize, Deserialize)]
#[serde(rename = "Effect")]
pub enum EffectFfi {
    Http(HttpRequest),
    Kv(KeyValueOperation),
    Render(RenderOperation),
}

impl crux_core::Effect for Effect {
    type Ffi = EffectFfi;

    fn serialize(self) -> (Self::Ffi, ResolveSerialized) {
        match self {
            Effect::Http(request) => request.serialize(EffectFfi::Http),
            Effect::Kv(request) => request.serialize(EffectFfi::Kv),
            Effect::Render(request) => request.serialize(EffectFfi::Render),
        }
    }
}

impl crux_core::WithContext<App, Effect> for Capabilities {
    fn new_with_context(context: ProtoContext<Effect, Event>) -> Capabilities {
        Capabilities {
            http: Http::new(context.specialize(Effect::Http)),
            kv: KeyValue::new(context.specialize(Effect::Kv)),
            render: Render::new(context.specialize(Effect::Render)),
        }
    }
}

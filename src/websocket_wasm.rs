//! WASM WebSocket client for the live candle feed

use crate::ws_state::SyncState;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, ErrorEvent, MessageEvent, WebSocket};

/// Shared message buffer — the WS callback pushes, the app drains in update()
pub type MessageBuffer = Rc<RefCell<VecDeque<String>>>;

/// Subscription request sent once the socket opens. Private candles never
/// cross the wire; the backend filters on visibility in {public, anonymous}
/// and a non-null location.
const SUBSCRIBE_MSG: &str =
    r#"{"type":"subscribe","collection":"candles","filter":{"visibility":["public","anonymous"],"located":true}}"#;

/// WASM client for the candle change feed
pub struct FeedClient {
    #[allow(dead_code)]
    ws: WebSocket,
    #[allow(dead_code)]
    state: Rc<RefCell<SyncState>>,
}

impl FeedClient {
    /// Connect to the feed endpoint.
    ///
    /// Change messages are buffered into `msg_buffer` for the app to drain;
    /// no parsing happens on the callback.
    pub fn connect(
        url: &str,
        msg_buffer: MessageBuffer,
        state: Rc<RefCell<SyncState>>,
    ) -> Result<Self, JsValue> {
        info!(url, "Connecting to candle feed");

        let ws = WebSocket::new(url)?;

        let ws_clone = ws.clone();
        let state_clone = state.clone();
        let on_open = Closure::wrap(Box::new(move |_| {
            info!("Feed connected");
            *state_clone.borrow_mut() = SyncState::Live;

            debug!(SUBSCRIBE_MSG, "Subscribing to candle collection");
            if let Err(e) = ws_clone.send_with_str(SUBSCRIBE_MSG) {
                error!(?e, "Failed to send subscribe message");
            }
        }) as Box<dyn Fn(JsValue)>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        on_open.forget();

        let on_msg = Closure::wrap(Box::new(move |e: MessageEvent| {
            if let Ok(txt) = e.data().dyn_into::<js_sys::JsString>() {
                msg_buffer.borrow_mut().push_back(txt.into());
            }
        }) as Box<dyn Fn(MessageEvent)>);
        ws.set_onmessage(Some(on_msg.as_ref().unchecked_ref()));
        on_msg.forget();

        let state_clone = state.clone();
        let on_err = Closure::wrap(Box::new(move |e: ErrorEvent| {
            let msg = e.message();
            error!(error = %msg, "Feed error");
            *state_clone.borrow_mut() = SyncState::Error(msg);
        }) as Box<dyn Fn(ErrorEvent)>);
        ws.set_onerror(Some(on_err.as_ref().unchecked_ref()));
        on_err.forget();

        let state_clone = state.clone();
        let on_close = Closure::wrap(Box::new(move |e: CloseEvent| {
            warn!(code = e.code(), reason = %e.reason(), "Feed closed");
            *state_clone.borrow_mut() = SyncState::Offline;
        }) as Box<dyn Fn(CloseEvent)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        on_close.forget();

        Ok(Self { ws, state })
    }
}

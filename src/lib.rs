//! Vigil - a world map of lit prayer candles
//!
//! Connects to the candle feed via WebSocket and displays:
//! - Candle markers at their geographic positions
//! - Golden threads connecting candles that share an intention category

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

#[cfg(target_arch = "wasm32")]
mod app;
mod core;
#[cfg(target_arch = "wasm32")]
mod theme;
mod time;
#[cfg(target_arch = "wasm32")]
mod websocket_wasm;
mod ws_state;

#[cfg(target_arch = "wasm32")]
use app::VigilApp;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();

    // Initialize tracing for browser console
    tracing_wasm::set_as_global_default();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let canvas = web_sys::window()
            .expect("no window")
            .document()
            .expect("no document")
            .get_element_by_id("map")
            .expect("no map canvas element")
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .expect("not a canvas element");

        eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(VigilApp::new(cc)))),
            )
            .await
            .expect("Failed to start eframe");
    });
}

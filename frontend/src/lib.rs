extern crate console_error_panic_hook;
extern crate serde;
#[macro_use]
extern crate serde_derive;

pub mod board;
pub mod config;
pub mod dispatcher;
pub mod dom;
pub mod error;
pub mod http;
pub mod logging;
pub mod posts;
pub mod request;
pub mod textarea;
pub mod visibility;

use wasm_bindgen::prelude::*;

use crate::config::PageConfig;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(contents: &str);

    #[wasm_bindgen(js_namespace = console, js_name = error)]
    pub fn log_error(contents: &str);
}

/// Entry point, called once the page's markup is in place.
#[wasm_bindgen]
pub fn bootstrap() {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));

    let window = match web_sys::window() {
        Some(window) => window,
        None => return,
    };
    let document = match window.document() {
        Some(document) => document,
        None => return,
    };

    logging::init_logger(::log::LevelFilter::Info);
    let config = PageConfig::load(&document).unwrap_or_else(|err| {
        log::warn!("ignoring page config: {}", err);
        PageConfig::default()
    });
    log::set_max_level(config.level_filter());
    log::debug!("page config: {:?}", config);

    dom::wire_page(&window, &document, &config);
}

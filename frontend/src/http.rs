use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::XmlHttpRequest;

use crate::dispatcher::{Completion, OutgoingRequest, Reload, Transport};
use crate::error::FrontendError;

/// Browser transport. Paths are resolved against the page's origin.
#[derive(Clone, Copy, Debug, Default)]
pub struct XhrTransport;

impl XhrTransport {
    fn open(request: &OutgoingRequest) -> Result<XmlHttpRequest, FrontendError> {
        let xhr = XmlHttpRequest::new()?;
        xhr.open(request.method.as_str(), &request.path)?;
        for (name, value) in &request.headers {
            xhr.set_request_header(name, value)?;
        }
        Ok(xhr)
    }
}

impl Transport for XhrTransport {
    fn send(&self, request: OutgoingRequest, on_done: Completion) {
        let xhr = match XhrTransport::open(&request) {
            Ok(xhr) => xhr,
            Err(err) => return on_done(Err(err)),
        };

        // onload and onerror race for the single completion
        let on_done = Rc::new(RefCell::new(Some(on_done)));
        let on_done0 = on_done.clone();
        let on_done1 = on_done.clone();

        let loaded = xhr.clone();
        let onload = Closure::<dyn FnMut()>::new(move || {
            if let Some(done) = on_done0.borrow_mut().take() {
                let text = loaded
                    .response_text()
                    .map_err(FrontendError::from)
                    .map(|text| text.unwrap_or_default());
                done(text);
            }
        });
        xhr.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();

        let path = request.path.clone();
        let onerror = Closure::<dyn FnMut()>::new(move || {
            if let Some(done) = on_done1.borrow_mut().take() {
                done(Err(FrontendError::Transport(format!("network error on {}", path))));
            }
        });
        xhr.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();

        if let Err(err) = xhr.send_with_opt_str(request.body.as_deref()) {
            if let Some(done) = on_done.borrow_mut().take() {
                done(Err(FrontendError::from(err)));
            }
        }
    }
}

/// Reloads the whole page through `window.location`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocationReload;

impl Reload for LocationReload {
    fn reload(&self) {
        let reloaded = web_sys::window()
            .ok_or(JsValue::from_str("no window"))
            .and_then(|window| window.location().reload());

        if let Err(err) = reloaded {
            log::error!("could not reload page: {:?}", err);
        }
    }
}

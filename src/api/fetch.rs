//! `fetch` transport

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::HttpRequest;
use crate::error::{ApiError, js_error_string};

fn transport(e: JsValue) -> ApiError {
    ApiError::Transport(js_error_string(&e))
}

pub(super) async fn send(request: &HttpRequest) -> Result<(u16, String), ApiError> {
    let window = web_sys::window().ok_or(ApiError::Unsupported)?;

    let init = RequestInit::new();
    init.set_method(request.method.as_str());
    init.set_mode(RequestMode::Cors);
    if let Some(body) = &request.body {
        init.set_body(&JsValue::from_str(body));
    }

    let req = Request::new_with_str_and_init(&request.url, &init).map_err(transport)?;
    for (name, value) in &request.headers {
        req.headers().set(name, value).map_err(transport)?;
    }

    let resp_value = JsFuture::from(window.fetch_with_request(&req))
        .await
        .map_err(transport)?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|_| ApiError::Transport("fetch did not return a Response".into()))?;

    let text = JsFuture::from(resp.text().map_err(transport)?)
        .await
        .map_err(transport)?;
    Ok((resp.status(), text.as_string().unwrap_or_default()))
}

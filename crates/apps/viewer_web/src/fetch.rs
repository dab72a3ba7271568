use std::pin::pin;
use std::time::Duration;

use futures_util::future::{Either, select};
use gloo_net::http::Request;
use wasm_bindgen_futures::JsFuture;

/// GETs `url` as text. With a timeout, whichever of the request and the
/// timer finishes first decides the result.
pub async fn fetch_text(url: &str, timeout: Option<Duration>) -> Result<String, String> {
    let request = get_text(url);
    let Some(timeout) = timeout else {
        return request.await;
    };

    let millis = timeout.as_millis();
    match select(pin!(request), pin!(sleep(millis))).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => Err(format!("timed out after {millis} ms")),
    }
}

async fn get_text(url: &str) -> Result<String, String> {
    let resp = Request::get(url).send().await.map_err(|e| e.to_string())?;
    if !resp.ok() {
        return Err(format!("HTTP {} {}", resp.status(), resp.status_text()));
    }
    resp.text().await.map_err(|e| e.to_string())
}

/// Resolves after `millis` via `setTimeout`. Never resolves outside a window
/// context, which leaves the request to finish on its own.
async fn sleep(millis: u128) {
    let millis = millis.min(i32::MAX as u128) as i32;
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis);
        }
    });
    let _ = JsFuture::from(promise).await;
}

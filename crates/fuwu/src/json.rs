//! JSON over HTTP: GET a URL and decode the success body.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::FuwuResult;
use crate::http::{BlockingHttpClient, HttpClient, RequestOptions};

/// Parse JSON text.
pub fn parse(text: &str) -> FuwuResult<Value> {
    Ok(serde_json::from_str(text)?)
}

/// Serialize a value to compact JSON text.
pub fn stringify<T: Serialize + ?Sized>(value: &T) -> FuwuResult<String> {
    Ok(serde_json::to_string(value)?)
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> FuwuResult<T> {
    serde_json::from_str(body).map_err(|e| {
        tracing::debug!("Response from {url} is not valid JSON: {e}");
        e.into()
    })
}

/// GET `url` and decode the 2xx body.
///
/// A non-2xx status surfaces as [`crate::FuwuError::Http`], a body that does
/// not decode as [`crate::FuwuError::Json`].
pub async fn get_json<T: DeserializeOwned>(
    client: &HttpClient,
    url: &str,
    options: &RequestOptions,
) -> FuwuResult<T> {
    let response = client.get(url, options).await?;
    decode(url, &response.body)
}

/// Blocking variant of [`get_json`].
pub fn get_json_blocking<T: DeserializeOwned>(
    client: &BlockingHttpClient,
    url: &str,
    options: &RequestOptions,
) -> FuwuResult<T> {
    let body = client.get(url, options)?;
    decode(url, &body)
}

//! Fuwu — page-side shorthands: CSS selection, cookies, query parameters,
//! HTTP and JSON requests, and a one-shot DOM-ready callback queue.

pub mod config;
pub mod cookies;
pub mod dom;
pub mod error;
pub mod http;
pub mod json;
pub mod page;
pub mod params;
pub mod ready;

pub use config::ClientConfig;
pub use cookies::{CookieJar, CookieLifetime, CookieOptions, Cookies};
pub use dom::Document;
pub use error::{FuwuError, FuwuResult, HttpError};
pub use http::{BlockingHttpClient, HttpClient, HttpResponse, Method, RequestOptions};
pub use json::{get_json, get_json_blocking};
pub use page::Page;
pub use params::QueryParams;
pub use ready::{ReadyGate, ReadyState};

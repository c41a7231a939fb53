//! A loaded page: location, document, cookies and the ready gate.

use scraper::ElementRef;
use url::Url;

use crate::config::{ClientConfig, DEFAULT_COOKIE_LIFETIME_DAYS};
use crate::cookies::{CookieJar, Cookies};
use crate::dom::Document;
use crate::error::FuwuResult;
use crate::params::QueryParams;
use crate::ready::{ReadyGate, ReadyState};

/// One page and the state the shorthands operate on.
#[derive(Debug)]
pub struct Page {
    location: Url,
    document: Document,
    jar: CookieJar,
    ready: ReadyGate,
    cookie_lifetime_days: i64,
}

impl Page {
    /// A page whose document is still loading.
    pub fn new(location: &str, html: &str) -> FuwuResult<Self> {
        Self::with_state(location, html, ReadyState::Loading)
    }

    /// A page observed in `state`; the gate starts open once the DOM is usable.
    pub fn with_state(location: &str, html: &str, state: ReadyState) -> FuwuResult<Self> {
        let location = Url::parse(location)?;
        tracing::debug!("Page at {location} created in state {state:?}");
        Ok(Self {
            location,
            document: Document::parse(html),
            jar: CookieJar::new(),
            ready: ReadyGate::for_state(state),
            cookie_lifetime_days: DEFAULT_COOKIE_LIFETIME_DAYS,
        })
    }

    /// Apply client config (cookie lifetime).
    pub fn configure(mut self, config: &ClientConfig) -> FuwuResult<Self> {
        config.validate()?;
        self.cookie_lifetime_days = config.cookie_lifetime_days;
        Ok(self)
    }

    /// Keep cookies from an earlier page on the same site.
    pub fn with_cookie_jar(mut self, jar: CookieJar) -> Self {
        self.jar = jar;
        self
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn cookie_jar(&self) -> &CookieJar {
        &self.jar
    }

    pub fn into_cookie_jar(self) -> CookieJar {
        self.jar
    }

    /// Cookie shorthand scoped to this page's path.
    pub fn cookies(&mut self) -> Cookies<'_> {
        Cookies::new(&mut self.jar, self.location.path())
            .with_checked_lifetime(self.cookie_lifetime_days)
    }

    /// Query parameters of this page's location.
    pub fn params(&self) -> QueryParams {
        QueryParams::from_url(&self.location)
    }

    pub fn select_all(&self, css: &str) -> FuwuResult<Vec<ElementRef<'_>>> {
        self.document.select_all(css)
    }

    pub fn select_one(&self, css: &str) -> FuwuResult<Option<ElementRef<'_>>> {
        self.document.select_one(css)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_ready()
    }

    /// Run `callback` once the document is ready (immediately if it already is).
    pub fn on_ready<F>(&mut self, callback: F)
    where
        F: FnOnce() + 'static,
    {
        self.ready.on_ready(callback);
    }

    /// The document finished loading. Runs deferred ready callbacks once.
    pub fn finish_loading(&mut self) -> bool {
        self.ready.open()
    }
}

//! Shorthand CSS selection over a parsed HTML document.
//!
//! Uses the `scraper` crate for parsing and selector matching.

use scraper::{ElementRef, Html, Selector};

use crate::error::{FuwuError, FuwuResult};

/// A parsed HTML document.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parse a full HTML document.
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Every element matching `css`, in document order.
    pub fn select_all(&self, css: &str) -> FuwuResult<Vec<ElementRef<'_>>> {
        let selector = parse_selector(css)?;
        Ok(self.html.select(&selector).collect())
    }

    /// Like [`Document::select_all`], calling `each` on every match first.
    pub fn select_each<F>(&self, css: &str, mut each: F) -> FuwuResult<Vec<ElementRef<'_>>>
    where
        F: FnMut(ElementRef<'_>),
    {
        let matches = self.select_all(css)?;
        for el in &matches {
            each(*el);
        }
        Ok(matches)
    }

    /// The first element matching `css`.
    pub fn select_one(&self, css: &str) -> FuwuResult<Option<ElementRef<'_>>> {
        let selector = parse_selector(css)?;
        Ok(self.html.select(&selector).next())
    }

    /// Text of the `<title>` element, if any.
    pub fn title(&self) -> Option<String> {
        self.select_one("title")
            .ok()
            .flatten()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }

    pub fn html(&self) -> &Html {
        &self.html
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("title", &self.title())
            .finish_non_exhaustive()
    }
}

fn parse_selector(css: &str) -> FuwuResult<Selector> {
    Selector::parse(css).map_err(|e| FuwuError::Selector(format!("'{css}': {e:?}")))
}

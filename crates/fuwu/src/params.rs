//! Read-only access to URL query parameters.

use std::collections::HashMap;

use url::Url;

use crate::error::FuwuResult;

/// Decoded query pairs of one URL, in their original order.
///
/// Decoding follows `application/x-www-form-urlencoded`, so `+` reads as a
/// space, matching `URLSearchParams`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parameters of an absolute URL.
    pub fn parse(url: &str) -> FuwuResult<Self> {
        Ok(Self::from_url(&Url::parse(url)?))
    }

    pub fn from_url(url: &Url) -> Self {
        Self {
            pairs: url.query_pairs().into_owned().collect(),
        }
    }

    /// First value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Every value of `name`, left to right.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Every value of `name`, handing each to `each` in order before returning them.
    pub fn get_each<F>(&self, name: &str, mut each: F) -> Vec<&str>
    where
        F: FnMut(&str),
    {
        let values = self.get_all(name);
        for value in &values {
            each(value);
        }
        values
    }

    pub fn has(&self, name: &str) -> bool {
        self.pairs.iter().any(|(key, _)| key == name)
    }

    /// First value per key.
    pub fn all(&self) -> HashMap<String, String> {
        let mut all = HashMap::new();
        for (key, value) in &self.pairs {
            all.entry(key.clone()).or_insert_with(|| value.clone());
        }
        all
    }

    /// Raw pairs including repeats.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FuwuError;

    #[test]
    fn test_repeated_keys() {
        let params =
            QueryParams::parse("https://example.com/list?tag=a&page=2&tag=b&tag=c").unwrap();
        assert_eq!(params.get("tag"), Some("a"));
        assert_eq!(params.get_all("tag"), vec!["a", "b", "c"]);
        assert_eq!(params.all().get("tag").map(String::as_str), Some("a"));
        assert_eq!(params.all().len(), 2);
    }

    #[test]
    fn test_get_each_visits_values_in_order() {
        let params = QueryParams::parse("https://example.com/?id=3&x=0&id=1&id=2").unwrap();
        let mut seen = Vec::new();
        let values = params.get_each("id", |v| seen.push(v.to_string()));
        assert_eq!(seen, vec!["3", "1", "2"]);
        assert_eq!(values, vec!["3", "1", "2"]);

        let mut calls = 0;
        assert!(params.get_each("missing", |_| calls += 1).is_empty());
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_absent() {
        let params = QueryParams::parse("https://example.com/?a=1").unwrap();
        assert_eq!(params.get("b"), None);
        assert!(params.get_all("b").is_empty());
        assert!(!params.has("b"));
        assert!(params.has("a"));
    }

    #[test]
    fn test_decoding() {
        let params =
            QueryParams::parse("https://example.com/?q=hello+world&e=%C3%BC&k%3D=v%26w").unwrap();
        assert_eq!(params.get("q"), Some("hello world"));
        assert_eq!(params.get("e"), Some("ü"));
        assert_eq!(params.get("k="), Some("v&w"));
    }

    #[test]
    fn test_empty_values_and_flags() {
        let params = QueryParams::parse("https://example.com/?flag&empty=").unwrap();
        assert!(params.has("flag"));
        assert_eq!(params.get("flag"), Some(""));
        assert_eq!(params.get("empty"), Some(""));
    }

    #[test]
    fn test_no_query() {
        let params = QueryParams::parse("https://example.com/path#frag").unwrap();
        assert!(params.is_empty());
        assert!(params.all().is_empty());
    }

    #[test]
    fn test_relative_url_rejected() {
        assert!(matches!(
            QueryParams::parse("/path?a=1"),
            Err(FuwuError::Url(_))
        ));
    }
}

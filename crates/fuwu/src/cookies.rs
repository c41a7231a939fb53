//! Cookie store and the shorthand accessor over it.
//!
//! [`CookieJar`] behaves like the browser's `document.cookie`: writes take a
//! single `name=value;expires=...;path=...` assignment, reads return the
//! flat `name=value; name=value` string visible from a path. [`Cookies`]
//! is the convenience layer that encodes, scopes and decodes on top of it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use cookie::Cookie;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use time::OffsetDateTime;

use crate::config::{check_cookie_lifetime, DEFAULT_COOKIE_LIFETIME_DAYS};
use crate::error::FuwuResult;

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const SECONDS_PER_DAY: i64 = 86_400;

/// 9999-12-31T23:59:59Z, the last instant an `Expires` date can carry.
const MAX_EXPIRES_TIMESTAMP: i64 = 253_402_300_799;

/// Percent-encode a cookie name or value.
pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

/// Reverse [`encode_component`]. Invalid UTF-8 sequences become U+FFFD.
pub fn decode_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// `now` moved by `secs`, saturating at the ends of the representable range.
fn seconds_from(now: DateTime<Utc>, secs: i64) -> DateTime<Utc> {
    chrono::Duration::try_seconds(secs)
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(if secs > 0 {
            DateTime::<Utc>::MAX_UTC
        } else {
            DateTime::<Utc>::MIN_UTC
        })
}

fn to_offset(at: DateTime<Utc>) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(at.timestamp().clamp(0, MAX_EXPIRES_TIMESTAMP))
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

fn from_offset(at: OffsetDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(at.unix_timestamp(), 0)
}

/// Folder of a document path: everything up to and including the last `/`.
pub fn folder_path(document_path: &str) -> String {
    match document_path.rfind('/') {
        Some(idx) => document_path[..=idx].to_string(),
        None => "/".to_string(),
    }
}

/// RFC 6265 default-path of a document path.
fn default_path(document_path: &str) -> String {
    if !document_path.starts_with('/') {
        return "/".to_string();
    }
    match document_path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => document_path[..idx].to_string(),
    }
}

/// RFC 6265 path-match.
fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/'))
}

#[derive(Debug, Clone)]
struct StoredCookie {
    name: String,
    value: String,
    path: String,
    expires: Option<DateTime<Utc>>,
    created: u64,
}

impl StoredCookie {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires.map_or(true, |at| at > now)
    }
}

/// In-memory cookie store with `document.cookie` read/write semantics.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Vec<StoredCookie>,
    next_created: u64,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one cookie assignment as written to `document.cookie` from a
    /// document at `document_path`.
    ///
    /// A cookie is identified by name and path. An `expires`/`max-age`
    /// that is not in the future deletes it.
    pub fn write(&mut self, assignment: &str, document_path: &str) {
        let cookie = match Cookie::parse(assignment) {
            Ok(cookie) => cookie,
            Err(e) => {
                tracing::debug!("Ignoring cookie assignment '{assignment}': {e}");
                return;
            }
        };

        let now = Utc::now();
        let name = cookie.name().to_string();
        let value = cookie.value().to_string();
        let path = cookie
            .path()
            .filter(|p| p.starts_with('/'))
            .map_or_else(|| default_path(document_path), str::to_string);
        let expires = match cookie.max_age() {
            Some(age) => Some(seconds_from(now, age.whole_seconds())),
            None => cookie.expires_datetime().and_then(from_offset),
        };

        let existing = self
            .cookies
            .iter()
            .position(|c| c.name == name && c.path == path);

        if expires.is_some_and(|at| at <= now) {
            if let Some(idx) = existing {
                tracing::trace!("Cookie '{name}' on path {path} expired");
                self.cookies.remove(idx);
            }
            return;
        }

        tracing::trace!("Cookie '{name}' stored on path {path}");
        match existing {
            Some(idx) => {
                let cookie = &mut self.cookies[idx];
                cookie.value = value;
                cookie.expires = expires;
            }
            None => {
                let created = self.next_created;
                self.next_created += 1;
                self.cookies.push(StoredCookie {
                    name,
                    value,
                    path,
                    expires,
                    created,
                });
            }
        }
    }

    /// The cookie string visible to a document at `request_path`.
    pub fn read(&self, request_path: &str) -> String {
        let now = Utc::now();
        let mut visible: Vec<&StoredCookie> = self
            .cookies
            .iter()
            .filter(|c| c.is_live(now) && path_matches(request_path, &c.path))
            .collect();
        visible.sort_by(|a, b| {
            b.path
                .len()
                .cmp(&a.path.len())
                .then(a.created.cmp(&b.created))
        });

        visible
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Drop every cookie without an expiry, as ending the browser session does.
    pub fn clear_session(&mut self) {
        let before = self.cookies.len();
        self.cookies.retain(|c| c.expires.is_some());
        tracing::debug!("Cleared {} session cookies", before - self.cookies.len());
    }

    /// Number of stored cookies that have not expired.
    pub fn len(&self) -> usize {
        let now = Utc::now();
        self.cookies.iter().filter(|c| c.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How long a written cookie lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CookieLifetime {
    /// The configured default lifetime from now.
    #[default]
    Default,
    /// Until the given instant.
    Until(DateTime<Utc>),
    /// No `expires` attribute: gone when the session ends.
    Session,
}

/// Named options for [`Cookies::set_with`] and [`Cookies::clear_with`].
#[derive(Debug, Clone, Default)]
pub struct CookieOptions {
    /// Cookie path; `None` means `/`.
    pub path: Option<String>,
    pub lifetime: CookieLifetime,
}

impl CookieOptions {
    /// Site-wide (`path=/`) persistent cookie.
    pub fn global() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn expires(mut self, at: DateTime<Utc>) -> Self {
        self.lifetime = CookieLifetime::Until(at);
        self
    }

    pub fn session(mut self) -> Self {
        self.lifetime = CookieLifetime::Session;
        self
    }
}

/// Cookie shorthand bound to a jar and the current document path.
///
/// Names and values are percent-encoded on write and decoded on read, so
/// `=` and `;` survive a round trip.
pub struct Cookies<'a> {
    jar: &'a mut CookieJar,
    document_path: &'a str,
    lifetime_days: i64,
}

impl<'a> Cookies<'a> {
    pub fn new(jar: &'a mut CookieJar, document_path: &'a str) -> Self {
        Self {
            jar,
            document_path,
            lifetime_days: DEFAULT_COOKIE_LIFETIME_DAYS,
        }
    }

    /// Override the lifetime used for [`CookieLifetime::Default`].
    ///
    /// Fails with [`FuwuError::Config`](crate::FuwuError::Config) outside
    /// `1..=MAX_COOKIE_LIFETIME_DAYS`.
    pub fn with_lifetime_days(self, days: i64) -> FuwuResult<Self> {
        Ok(self.with_checked_lifetime(check_cookie_lifetime(days)?))
    }

    pub(crate) fn with_checked_lifetime(mut self, days: i64) -> Self {
        self.lifetime_days = days;
        self
    }

    /// Value of the first visible cookie called `name`.
    pub fn get(&self, name: &str) -> Option<String> {
        let encoded = encode_component(name);
        self.jar
            .read(self.document_path)
            .split(';')
            .filter_map(|entry| entry.split_once('='))
            .find(|(key, _)| key.trim() == encoded)
            .map(|(_, value)| decode_component(value.trim()))
    }

    /// Every visible cookie, decoded. The first occurrence of a name wins.
    pub fn all(&self) -> HashMap<String, String> {
        let mut all = HashMap::new();
        for entry in self.jar.read(self.document_path).split(';') {
            let Some((key, value)) = entry.split_once('=') else {
                continue;
            };
            all.entry(decode_component(key.trim()))
                .or_insert_with(|| decode_component(value.trim()));
        }
        all
    }

    /// Persistent cookie on the current folder. `expires` defaults to the
    /// configured lifetime.
    pub fn set(&mut self, name: &str, value: &str, expires: Option<DateTime<Utc>>) {
        let lifetime = expires.map_or(CookieLifetime::Default, CookieLifetime::Until);
        let path = folder_path(self.document_path);
        self.write(name, value, &path, lifetime);
    }

    /// Session cookie on the current folder.
    pub fn set_session(&mut self, name: &str, value: &str) {
        let path = folder_path(self.document_path);
        self.write(name, value, &path, CookieLifetime::Session);
    }

    /// Expire the current folder's cookie called `name`.
    pub fn clear(&mut self, name: &str) {
        let path = folder_path(self.document_path);
        self.write(name, "", &path, CookieLifetime::Until(Utc::now()));
    }

    /// Cookie with an explicit path (default `/`) and lifetime.
    pub fn set_with(&mut self, name: &str, value: &str, options: &CookieOptions) {
        let path = options.path.as_deref().unwrap_or("/");
        self.write(name, value, path, options.lifetime);
    }

    /// Expire the cookie called `name` on the options' path (default `/`).
    pub fn clear_with(&mut self, name: &str, options: &CookieOptions) {
        let path = options.path.as_deref().unwrap_or("/");
        self.write(name, "", path, CookieLifetime::Until(Utc::now()));
    }

    fn write(&mut self, name: &str, value: &str, path: &str, lifetime: CookieLifetime) {
        let assignment = self.assignment(name, value, path, lifetime);
        tracing::debug!("Writing cookie: {assignment}");
        self.jar.write(&assignment, self.document_path);
    }

    /// `name=value; Path=...; Expires=...` with name and value encoded.
    fn assignment(
        &self,
        name: &str,
        value: &str,
        path: &str,
        lifetime: CookieLifetime,
    ) -> String {
        let expires = match lifetime {
            CookieLifetime::Default => Some(seconds_from(
                Utc::now(),
                self.lifetime_days.saturating_mul(SECONDS_PER_DAY),
            )),
            CookieLifetime::Until(at) => Some(at),
            CookieLifetime::Session => None,
        };

        let mut cookie =
            Cookie::build((encode_component(name), encode_component(value))).path(path);
        if let Some(at) = expires {
            cookie = cookie.expires(to_offset(at));
        }
        cookie.build().to_string()
    }
}

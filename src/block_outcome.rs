use std::fmt::{Display, Formatter};

use http::header::{CONTENT_TYPE, LOCATION};
use http::{Response, StatusCode};
use rusqlite::types::ToSqlOutput;
use rusqlite::ToSql;

use crate::BlockerError;

/// What to do with a request once the blocklist has been checked.
#[derive(Default, Clone, Eq, PartialEq, Debug)]
pub enum BlockOutcome {
    /// The request goes through.
    #[default]
    Allow,
    /// The client is sent to the given URL (HTTP 302).
    Redirect(String),
    /// The client gets the given HTML message (HTTP 403).
    Deny(String),
}

impl BlockOutcome {
    const DENY_TITLE: &'static str = "Access denied";

    #[must_use]
    pub fn is_blocked(&self) -> bool {
        !matches!(self, BlockOutcome::Allow)
    }

    /// Builds the response to send back, or `None` if the request is allowed.
    ///
    /// # Errors
    ///
    /// Will return a [`BlockerError`] if the redirect URL isn't a valid header value.
    ///
    /// # Examples
    ///
    /// ```
    /// use page_ip_blocker::BlockOutcome;
    ///
    /// let outcome = BlockOutcome::Redirect("https://example.com/blocked".to_owned());
    /// let response = outcome.to_response().unwrap().unwrap();
    /// assert_eq!(response.status(), 302);
    ///
    /// assert!(BlockOutcome::Allow.to_response().unwrap().is_none());
    /// ```
    pub fn to_response(&self) -> Result<Option<Response<String>>, BlockerError> {
        let response = match self {
            BlockOutcome::Allow => return Ok(None),
            BlockOutcome::Redirect(url) => Response::builder()
                .status(StatusCode::FOUND)
                .header(LOCATION, url.as_str())
                .body(String::new())?,
            BlockOutcome::Deny(message) => Response::builder()
                .status(StatusCode::FORBIDDEN)
                .header(CONTENT_TYPE, "text/html; charset=utf-8")
                .body(Self::deny_page(message))?,
        };
        Ok(Some(response))
    }

    fn deny_page(message: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{message}\n</body>\n</html>\n",
            Self::DENY_TITLE
        )
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            BlockOutcome::Allow => "ALLOW",
            BlockOutcome::Redirect(_) => "REDIRECT",
            BlockOutcome::Deny(_) => "DENY",
        }
    }
}

impl Display for BlockOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockOutcome::Redirect(url) => write!(f, "{} {url}", self.label()),
            _ => write!(f, "{}", self.label()),
        }
    }
}

impl ToSql for BlockOutcome {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.label()))
    }
}

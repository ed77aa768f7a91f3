//! Sources of the current Unix time.
//!
//! [SystemClock] is what a [TOTP](struct.TOTP.html) normally runs on. With the `remote` feature,
//! [HttpDateClock] and [JsonApiClock] read the time from a web server; they are meant for
//! [TOTP::validate_time](struct.TOTP.html#method.validate_time), to detect a drifting local clock.

use std::time::{SystemTime, UNIX_EPOCH};

/// Different ways reading or comparing clocks failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    /// The provider could not tell the time.
    Unavailable { provider: String, reason: String },
    /// The provider disagrees with the reference clock by more than the allowed leniency.
    Skew {
        provider: String,
        leniency: u64,
        difference: u64,
    },
}

impl std::error::Error for ClockError {}

impl std::fmt::Display for ClockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClockError::Unavailable { provider, reason } => write!(
                f,
                "Unable to retrieve time from {} ({})",
                provider, reason
            ),
            ClockError::Skew {
                provider,
                leniency,
                difference,
            } => write!(
                f,
                "Time is off by more than {} seconds when compared to {} ({} seconds)",
                leniency, provider, difference
            ),
        }
    }
}

/// A supplier of the current Unix timestamp, in seconds.
pub trait Clock {
    fn time(&self) -> Result<u64, ClockError>;

    /// Identifies the provider in errors and logs.
    fn name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

impl<T: Clock + ?Sized> Clock for Box<T> {
    fn time(&self) -> Result<u64, ClockError> {
        (**self).time()
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn time(&self) -> Result<u64, ClockError> {
        (**self).time()
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

/// The machine's clock. Never fails; a clock set before the epoch reads as 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

impl Clock for SystemClock {
    fn time(&self) -> Result<u64, ClockError> {
        Ok(SystemClock::now())
    }

    fn name(&self) -> String {
        "SystemClock".to_string()
    }
}

/// Always returns the same timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn time(&self) -> Result<u64, ClockError> {
        Ok(self.0)
    }

    fn name(&self) -> String {
        format!("FixedClock({})", self.0)
    }
}

#[cfg(feature = "remote")]
pub use remote::{default_remote_clocks, HttpDateClock, JsonApiClock};

#[cfg(feature = "remote")]
#[cfg_attr(docsrs, doc(cfg(feature = "remote")))]
mod remote {
    use log::trace;
    use reqwest::blocking::Client;
    use reqwest::header::{CONNECTION, DATE};
    use serde::Deserialize;

    use super::{Clock, ClockError};

    pub const DEFAULT_DATE_URL: &str = "https://google.com";
    pub const DEFAULT_JSON_URL: &str = "http://www.convert-unix-time.com/api?timestamp=now";

    /// Reads the `Date:` header of a `HEAD` request.
    #[derive(Debug, Clone)]
    pub struct HttpDateClock {
        url: String,
        client: Client,
    }

    impl HttpDateClock {
        pub fn new<S: Into<String>>(url: S) -> Result<HttpDateClock, ClockError> {
            let url = url.into();
            let client = crate::http::client(false).map_err(|e| ClockError::Unavailable {
                provider: format!("HttpDateClock({})", url),
                reason: e.to_string(),
            })?;
            Ok(HttpDateClock { url, client })
        }

        pub fn url(&self) -> &str {
            &self.url
        }

        fn unavailable<E: std::fmt::Display>(&self, reason: E) -> ClockError {
            ClockError::Unavailable {
                provider: self.name(),
                reason: reason.to_string(),
            }
        }
    }

    /// Parse an HTTP date such as `Sun, 06 Nov 1994 08:49:37 GMT`.
    pub(crate) fn parse_http_date(value: &str) -> Option<u64> {
        let date = chrono::DateTime::parse_from_rfc2822(value.trim()).ok()?;
        u64::try_from(date.timestamp()).ok()
    }

    impl Clock for HttpDateClock {
        fn time(&self) -> Result<u64, ClockError> {
            let response = self
                .client
                .head(&self.url)
                .header(CONNECTION, "close")
                .send()
                .map_err(|e| self.unavailable(e))?;
            let header = response
                .headers()
                .get(DATE)
                .ok_or_else(|| self.unavailable("invalid or no \"Date:\" header found"))?;
            let value = header.to_str().map_err(|e| self.unavailable(e))?;
            let time = parse_http_date(value)
                .ok_or_else(|| self.unavailable(format!("unparseable date \"{}\"", value)))?;
            trace!("{} reports {}", self.name(), time);
            Ok(time)
        }

        fn name(&self) -> String {
            format!("HttpDateClock({})", self.url)
        }
    }

    #[derive(Deserialize)]
    struct TimestampResponse {
        timestamp: i64,
    }

    pub(crate) fn parse_timestamp(body: &str) -> Result<u64, String> {
        let response: TimestampResponse =
            serde_json::from_str(body).map_err(|e| e.to_string())?;
        u64::try_from(response.timestamp).map_err(|e| e.to_string())
    }

    /// Reads an integer `timestamp` field from a JSON API.
    #[derive(Debug, Clone)]
    pub struct JsonApiClock {
        url: String,
        client: Client,
    }

    impl JsonApiClock {
        pub fn new<S: Into<String>>(url: S) -> Result<JsonApiClock, ClockError> {
            let url = url.into();
            let client = crate::http::client(true).map_err(|e| ClockError::Unavailable {
                provider: format!("JsonApiClock({})", url),
                reason: e.to_string(),
            })?;
            Ok(JsonApiClock { url, client })
        }

        pub fn url(&self) -> &str {
            &self.url
        }
    }

    impl Clock for JsonApiClock {
        fn time(&self) -> Result<u64, ClockError> {
            let unavailable = |reason: String| ClockError::Unavailable {
                provider: self.name(),
                reason,
            };
            let body = self
                .client
                .get(&self.url)
                .send()
                .and_then(|r| r.error_for_status())
                .and_then(|r| r.text())
                .map_err(|e| unavailable(e.to_string()))?;
            let time = parse_timestamp(&body).map_err(unavailable)?;
            trace!("{} reports {}", self.name(), time);
            Ok(time)
        }

        fn name(&self) -> String {
            format!("JsonApiClock({})", self.url)
        }
    }

    /// The providers [TOTP::validate_time](../struct.TOTP.html#method.validate_time) is usually
    /// given when the caller has no servers of their own.
    pub fn default_remote_clocks() -> Result<Vec<Box<dyn Clock + Send + Sync>>, ClockError> {
        Ok(vec![
            Box::new(JsonApiClock::new(DEFAULT_JSON_URL)?),
            Box::new(HttpDateClock::new(DEFAULT_DATE_URL)?),
        ])
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock() {
        let before = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let now = SystemClock.time().unwrap();
        assert!(now >= before && now - before <= 1);
        assert_eq!(SystemClock.name(), "SystemClock");
    }

    #[test]
    fn fixed_clock() {
        let clock = FixedClock(1496641949);
        assert_eq!(clock.time(), Ok(1496641949));
        assert_eq!(clock.name(), "FixedClock(1496641949)");
    }

    #[test]
    fn boxed_and_borrowed() {
        let boxed: Box<dyn Clock> = Box::new(FixedClock(7));
        assert_eq!(boxed.time(), Ok(7));
        assert_eq!(boxed.name(), "FixedClock(7)");
        let borrowed = &FixedClock(8);
        assert_eq!(Clock::time(&borrowed), Ok(8));
    }

    #[test]
    fn display() {
        assert_eq!(
            ClockError::Unavailable {
                provider: "SystemClock".to_string(),
                reason: "offline".to_string()
            }
            .to_string(),
            "Unable to retrieve time from SystemClock (offline)"
        );
        assert_eq!(
            ClockError::Skew {
                provider: "FixedClock(4)".to_string(),
                leniency: 0,
                difference: 4
            }
            .to_string(),
            "Time is off by more than 0 seconds when compared to FixedClock(4) (4 seconds)"
        );
    }
}

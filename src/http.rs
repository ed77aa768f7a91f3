use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;

/// Connect and whole-request timeout for every network-backed collaborator.
pub const TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("tfa-rs/", env!("CARGO_PKG_VERSION"));

/// Blocking client with the crate's timeouts. Redirects are only followed when asked for.
pub(crate) fn client(follow_redirects: bool) -> Result<Client, reqwest::Error> {
    let policy = if follow_redirects {
        Policy::limited(5)
    } else {
        Policy::none()
    };
    Client::builder()
        .connect_timeout(TIMEOUT)
        .timeout(TIMEOUT)
        .user_agent(USER_AGENT)
        .redirect(policy)
        .build()
}

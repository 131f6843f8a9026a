//! Obtains response text for a request URL, tolerating the sheet host's
//! refusal to serve cross-origin or unauthenticated requests.
//!
//! Direct retrieval first, then an ordered list of third-party relay
//! endpoints, then one retry of the relay sequence against the alternate
//! publish URL when the body turns out to be an authentication page.

use chrono::Utc;
use reqwest::Client;
use tracing::{info, warn};

use super::{looks_like_html, url::publish_url, LoadError};

/// One third-party URL-rewriting endpoint, tried in declaration order.
struct Relay {
    name: &'static str,
    build: fn(&str) -> String,
}

const RELAYS: [Relay; 3] = [
    Relay {
        name: "corsproxy.io",
        build: |u| format!("https://corsproxy.io/?{}", urlencoding::encode(u)),
    },
    Relay {
        name: "api.allorigins.win",
        // Cache-busting timestamp: allorigins caches aggressively.
        build: |u| {
            format!(
                "https://api.allorigins.win/raw?url={}&t={}",
                urlencoding::encode(u),
                Utc::now().timestamp_millis()
            )
        },
    },
    Relay {
        name: "api.codetabs.com",
        build: |u| format!("https://api.codetabs.com/v1/proxy?quest={}", urlencoding::encode(u)),
    },
];

/// Relay placeholder pages that count as failed attempts even with an OK
/// status.
fn is_placeholder_page(body: &str) -> bool {
    body.is_empty() || body.contains("Temporary Redirect") || body.contains("moved temporarily")
}

/// Sign-in and redirect pages served instead of the document when the
/// sheet is not shared publicly.
fn is_auth_page(body: &str) -> bool {
    body.contains("Temporary Redirect")
        || body.contains("moved temporarily")
        || body.contains("Sign in")
        || body.contains("accounts.google.com")
}

async fn fetch_direct(client: &Client, url: &str) -> Result<String, reqwest::Error> {
    let response = client.get(url).send().await?.error_for_status()?;
    response.text().await
}

async fn fetch_via_relays(
    client: &Client,
    url: &str,
    trace: &mut Vec<String>,
) -> Result<String, LoadError> {
    for relay in &RELAYS {
        let relay_url = (relay.build)(url);
        match fetch_direct(client, &relay_url).await {
            Ok(body) if !is_placeholder_page(&body) => {
                trace.push(format!("Method: relay ({})", relay.name));
                info!(relay = relay.name, "relay fetch succeeded");
                return Ok(body);
            }
            Ok(_) => {
                trace.push(format!("Relay {} returned a placeholder page", relay.name));
                warn!(relay = relay.name, "relay returned placeholder page");
            }
            Err(e) => {
                trace.push(format!("Relay {} failed: {e}", relay.name));
                warn!(relay = relay.name, "relay failed: {e}");
            }
        }
    }
    Err(LoadError::ConnectionFailed)
}

/// Resolves the request URL to response text.
///
/// `original_link` is the link as the user supplied it; the publish-URL
/// retry is derived from it, not from the already-normalized request URL.
/// Total attempts are bounded: one direct, three relays, doubled at most
/// once if the publish retry triggers.
#[tracing::instrument(err, skip(client, trace))]
pub async fn fetch_document(
    client: &Client,
    request_url: &str,
    original_link: &str,
    trace: &mut Vec<String>,
) -> Result<String, LoadError> {
    let mut body = match fetch_direct(client, request_url).await {
        Ok(body) => {
            trace.push("Method: direct fetch (success)".to_string());
            body
        }
        Err(e) => {
            trace.push(format!("Direct fetch blocked: {e}"));
            fetch_via_relays(client, request_url, trace).await?
        }
    };

    if looks_like_html(&body) && is_auth_page(&body) {
        trace.push("Received a redirect/auth page, retrying via publish URL".to_string());
        let pub_url = publish_url(original_link);
        trace.push(format!("Requesting: {pub_url}"));

        body = fetch_via_relays(client, &pub_url, trace)
            .await
            .map_err(|_| LoadError::NotPubliclyShared)?;

        if looks_like_html(&body) {
            trace.push("Publish URL still answered with HTML".to_string());
            return Err(LoadError::NotPubliclyShared);
        }
        trace.push("Publish URL answered with CSV".to_string());
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_urls_embed_the_encoded_target() {
        let target = "https://docs.google.com/spreadsheets/d/abc/export?format=csv&gid=0";
        let encoded = urlencoding::encode(target).into_owned();

        let first = (RELAYS[0].build)(target);
        assert_eq!(first, format!("https://corsproxy.io/?{encoded}"));

        let second = (RELAYS[1].build)(target);
        assert!(second.starts_with(&format!("https://api.allorigins.win/raw?url={encoded}&t=")));

        let third = (RELAYS[2].build)(target);
        assert_eq!(third, format!("https://api.codetabs.com/v1/proxy?quest={encoded}"));
    }

    #[test]
    fn placeholder_and_auth_pages_are_recognized() {
        assert!(is_placeholder_page(""));
        assert!(is_placeholder_page("<html>Temporary Redirect</html>"));
        assert!(is_placeholder_page("the page moved temporarily"));
        assert!(!is_placeholder_page("name,link\na,b"));

        assert!(is_auth_page("<html>Sign in to continue</html>"));
        assert!(is_auth_page("redirecting to accounts.google.com"));
        assert!(!is_auth_page("<html><table class=\"waffle\"></table></html>"));
    }
}

//! Mock identity provider serving a realm JWKS.
//!
//! One wiremock route answers `GET /realms/{realm}/protocol/openid-connect/certs`
//! with whatever response is currently configured. Swapping the response
//! (rotation, outage, garbage) never remounts the route, so the request
//! counter survives across swaps.

use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Realm used when a test does not care about the name.
pub const TEST_REALM: &str = "test-realm";

#[derive(Clone)]
struct SwappableResponder {
    current: Arc<Mutex<ResponseTemplate>>,
    hits: Arc<AtomicUsize>,
}

impl Respond for SwappableResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.hits.fetch_add(1, Ordering::SeqCst);
        self.current
            .lock()
            .expect("responder lock poisoned")
            .clone()
    }
}

/// A running mock identity provider.
pub struct MockIdentityProvider {
    server: MockServer,
    realm: String,
    responder: SwappableResponder,
}

impl MockIdentityProvider {
    /// Start a provider for `realm` that publishes an empty key set.
    pub async fn start(realm: &str) -> Self {
        let server = MockServer::start().await;
        let responder = SwappableResponder {
            current: Arc::new(Mutex::new(jwks_response(&[]))),
            hits: Arc::new(AtomicUsize::new(0)),
        };

        Mock::given(method("GET"))
            .and(path(format!(
                "/realms/{}/protocol/openid-connect/certs",
                realm
            )))
            .respond_with(responder.clone())
            .mount(&server)
            .await;

        Self {
            server,
            realm: realm.to_string(),
            responder,
        }
    }

    /// Start a provider for `realm` already publishing `keys`.
    pub async fn with_keys(realm: &str, keys: &[Value]) -> Self {
        let provider = Self::start(realm).await;
        provider.publish(keys);
        provider
    }

    /// Base URL to configure the key cache with.
    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Full JWKS URL for this realm.
    pub fn jwks_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/certs",
            self.server.uri(),
            self.realm
        )
    }

    /// Serve `{"keys": keys}` from now on.
    pub fn publish(&self, keys: &[Value]) {
        self.set_response(jwks_response(keys));
    }

    /// Answer every fetch with `status` and an empty body.
    pub fn fail_with(&self, status: u16) {
        self.set_response(ResponseTemplate::new(status));
    }

    /// Answer every fetch with `status` and a raw body.
    pub fn serve_body(&self, status: u16, body: &str) {
        self.set_response(ResponseTemplate::new(status).set_body_string(body));
    }

    /// Number of JWKS requests received so far.
    pub fn jwks_request_count(&self) -> usize {
        self.responder.hits.load(Ordering::SeqCst)
    }

    fn set_response(&self, template: ResponseTemplate) {
        *self
            .responder
            .current
            .lock()
            .expect("responder lock poisoned") = template;
    }
}

fn jwks_response(keys: &[Value]) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "keys": keys }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RSA_KEY_1;

    #[tokio::test]
    async fn test_provider_serves_and_counts() {
        let provider = MockIdentityProvider::with_keys("acme", &[RSA_KEY_1.jwk_json("K1")]).await;

        let body: Value = reqwest::get(provider.jwks_url())
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["keys"][0]["kid"], "K1");
        assert_eq!(provider.jwks_request_count(), 1);

        provider.fail_with(503);
        let response = reqwest::get(provider.jwks_url()).await.unwrap();
        assert_eq!(response.status().as_u16(), 503);
        assert_eq!(provider.jwks_request_count(), 2);
    }

    #[tokio::test]
    async fn test_other_realm_is_not_served() {
        let provider = MockIdentityProvider::start(TEST_REALM).await;
        let other = format!(
            "{}/realms/other/protocol/openid-connect/certs",
            provider.base_url()
        );

        let response = reqwest::get(other).await.unwrap();
        assert_eq!(response.status().as_u16(), 404);
        assert_eq!(provider.jwks_request_count(), 0);
    }
}

//! The call-wrapper layer: one request in, one `ApiResult` out.
//!
//! # Design
//! Each wrapper builds a request with `MicroUrlClient`, awaits the transport
//! once, and parses the response. Every failure along the way (payload
//! encoding, transport, status, decoding, content headers) is normalized into
//! a `BasicError` and returned as `ApiResult::Err`; nothing is raised past
//! this layer. There is no retry: callers re-invoke if they want one.
//!
//! Outside production, failures are also emitted as `tracing` error events.
//! Logging never changes the returned value.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::asset::NamedAsset;
use crate::client::MicroUrlClient;
use crate::config::Mode;
use crate::error::{ApiError, BasicError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::result::ApiResult;
use crate::transport::Transport;

pub type Query = Vec<(String, String)>;

#[derive(Debug, Clone)]
pub struct Caller<T> {
    client: MicroUrlClient,
    transport: T,
    mode: Mode,
}

impl<T: Transport> Caller<T> {
    pub fn new(client: MicroUrlClient, transport: T, mode: Mode) -> Self {
        Self {
            client,
            transport,
            mode,
        }
    }

    pub fn client(&self) -> &MicroUrlClient {
        &self.client
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// GET `url` and decode the JSON body.
    pub async fn get<R: DeserializeOwned>(&self, url: String, query: Query) -> ApiResult<R> {
        let request = self.client.build_get(url, query);
        self.settle(request, MicroUrlClient::parse_json).await
    }

    /// GET `url` and return the body as text.
    pub async fn get_text(&self, url: String, query: Query) -> ApiResult<String> {
        let request = self.client.build_get(url, query);
        self.settle(request, MicroUrlClient::parse_text).await
    }

    /// POST `body` as JSON to `url` and decode the JSON reply.
    pub async fn post<B, R>(&self, url: String, body: &B, query: Query) -> ApiResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(HttpMethod::Post, url, body, query).await
    }

    /// PUT `body` as JSON to `url` and decode the JSON reply.
    pub async fn put<B, R>(&self, url: String, body: &B, query: Query) -> ApiResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(HttpMethod::Put, url, body, query).await
    }

    /// DELETE `url` and decode the JSON reply.
    pub async fn delete<R: DeserializeOwned>(&self, url: String, query: Query) -> ApiResult<R> {
        let request = self.client.build_delete(url, query);
        self.settle(request, MicroUrlClient::parse_json).await
    }

    /// GET a binary image and recover its filename and type from the headers.
    pub async fn get_asset(&self, url: String, query: Query) -> ApiResult<NamedAsset> {
        let request = self.client.build_get_binary(url, query);
        self.settle(request, MicroUrlClient::parse_asset).await
    }

    async fn send_json<B, R>(&self, method: HttpMethod, url: String, body: &B, query: Query) -> ApiResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        match self.client.build_json(method, url.clone(), body, query) {
            Ok(request) => self.settle(request, MicroUrlClient::parse_json).await,
            Err(failure) => self.fail(method, &url, failure),
        }
    }

    async fn settle<R, P>(&self, request: HttpRequest, parse: P) -> ApiResult<R>
    where
        P: FnOnce(&MicroUrlClient, HttpResponse) -> Result<R, ApiError>,
    {
        let method = request.method;
        let url = request.url.clone();
        let outcome = self
            .transport
            .execute(request)
            .await
            .and_then(|response| parse(&self.client, response));
        match outcome {
            Ok(value) => ApiResult::Ok(value),
            Err(failure) => self.fail(method, &url, failure),
        }
    }

    fn fail<R>(&self, method: HttpMethod, url: &str, failure: ApiError) -> ApiResult<R> {
        if self.mode.logs_failures() {
            tracing::error!(method = method.as_str(), url, error = %failure, "request failed");
        }
        ApiResult::Err(BasicError::from(failure))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fmt;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::{Layer, Registry};

    use super::*;
    use crate::types::{BasicResponse, NewUrlRequest, ShortLink};

    /// Answers every request with the same canned outcome and records what it saw.
    struct Canned {
        outcome: Result<HttpResponse, ApiError>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Canned {
        fn respond(status: u16, headers: &[(&str, &str)], body: &[u8]) -> Self {
            Self {
                outcome: Ok(HttpResponse {
                    status,
                    headers: headers
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                    body: body.to_vec(),
                }),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn fail(failure: ApiError) -> Self {
            Self {
                outcome: Err(failure),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for Canned {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.lock().unwrap().push(request);
            self.outcome.clone()
        }
    }

    /// Fields of every error event seen while installed.
    #[derive(Clone, Default)]
    struct ErrorEvents(Arc<Mutex<Vec<HashMap<String, String>>>>);

    struct Fields(HashMap<String, String>);

    impl Visit for Fields {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{value:?}"));
        }
    }

    impl<S: Subscriber> Layer<S> for ErrorEvents {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::ERROR {
                let mut fields = Fields(HashMap::new());
                event.record(&mut fields);
                self.0.lock().unwrap().push(fields.0);
            }
        }
    }

    impl ErrorEvents {
        fn take(&self) -> Vec<HashMap<String, String>> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    fn caller(transport: Canned, mode: Mode) -> Caller<Canned> {
        Caller::new(MicroUrlClient::new("http://localhost:8081"), transport, mode)
    }

    const LINK: &str = r#"{"id":"abc","short_url":"http://localhost:8081/abc",
        "original_url":"https://example.com","created_at":"t0","updated_at":"t0"}"#;

    #[tokio::test]
    async fn get_decodes_success_body() {
        let c = caller(Canned::respond(200, &[], LINK.as_bytes()), Mode::Development);
        let url = c.client().routes().url_info("abc");
        let res: ApiResult<ShortLink> = c.get(url, Vec::new()).await;
        assert_eq!(res.value().map(|l| l.id.as_str()), Some("abc"));
    }

    #[tokio::test]
    async fn post_sends_exactly_one_json_request() {
        let c = caller(Canned::respond(201, &[], LINK.as_bytes()), Mode::Development);
        let url = c.client().routes().new_url();
        let res: ApiResult<ShortLink> = c
            .post(url, &NewUrlRequest::new("https://example.com"), Vec::new())
            .await;
        assert!(res.is_ok());
        let seen = c.transport.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, HttpMethod::Post);
        assert_eq!(seen[0].body.as_deref(), Some(r#"{"url":"https://example.com"}"#));
    }

    #[tokio::test]
    async fn error_body_is_passed_through() {
        let c = caller(
            Canned::respond(400, &[], br#"{"error":"invalid url"}"#),
            Mode::Development,
        );
        let url = c.client().routes().new_url();
        let res: ApiResult<ShortLink> = c.post(url, &NewUrlRequest::new("nope"), Vec::new()).await;
        assert_eq!(res, ApiResult::Err(BasicError::new("invalid url")));
    }

    #[tokio::test]
    async fn transport_failure_becomes_err() {
        let c = caller(Canned::fail(ApiError::transport("connection refused")), Mode::Development);
        let url = c.client().routes().health();
        let res: ApiResult<String> = c.get(url, Vec::new()).await;
        assert_eq!(
            res.error().map(|e| e.error.as_str()),
            Some("transport error: connection refused")
        );
    }

    #[tokio::test]
    async fn outcome_does_not_depend_on_mode() {
        let dev = caller(Canned::respond(500, &[], b"oops"), Mode::Development);
        let prod = caller(Canned::respond(500, &[], b"oops"), Mode::Production);
        let url = dev.client().routes().delete_url("x");
        let a: ApiResult<BasicResponse> = dev.delete(url.clone(), Vec::new()).await;
        let b: ApiResult<BasicResponse> = prod.delete(url, Vec::new()).await;
        assert!(a.is_err());
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn development_failure_emits_one_error_event() {
        let events = ErrorEvents::default();
        let _guard = tracing::subscriber::set_default(Registry::default().with(events.clone()));

        let c = caller(Canned::respond(404, &[], br#"{"error":"URL not found"}"#), Mode::Development);
        let url = c.client().routes().delete_url("x");
        let res: ApiResult<BasicResponse> = c.delete(url.clone(), Vec::new()).await;
        assert!(res.is_err());

        let seen = events.take();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].get("method").map(String::as_str), Some("DELETE"));
        assert_eq!(seen[0].get("url"), Some(&url));
    }

    #[tokio::test]
    async fn production_failure_is_silent() {
        let events = ErrorEvents::default();
        let _guard = tracing::subscriber::set_default(Registry::default().with(events.clone()));

        let c = caller(Canned::fail(ApiError::transport("connection refused")), Mode::Production);
        let url = c.client().routes().health();
        let res: ApiResult<String> = c.get_text(url, Vec::new()).await;
        assert!(res.is_err());
        assert!(events.take().is_empty());
    }

    #[tokio::test]
    async fn success_is_not_logged() {
        let events = ErrorEvents::default();
        let _guard = tracing::subscriber::set_default(Registry::default().with(events.clone()));

        let c = caller(Canned::respond(200, &[], LINK.as_bytes()), Mode::Development);
        let url = c.client().routes().url_info("abc");
        let res: ApiResult<ShortLink> = c.get(url, Vec::new()).await;
        assert!(res.is_ok());
        assert!(events.take().is_empty());
    }

    #[tokio::test]
    async fn unserializable_payload_never_reaches_transport() {
        let mut payload: HashMap<Vec<u8>, u8> = HashMap::new();
        payload.insert(vec![1], 1);
        let c = caller(Canned::respond(200, &[], b"{}"), Mode::Production);
        let url = c.client().routes().update_url("x");
        let res: ApiResult<ShortLink> = c.put(url, &payload, Vec::new()).await;
        assert!(res.is_err());
        assert!(c.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn query_pairs_are_forwarded() {
        let c = caller(Canned::respond(200, &[], br#"{"urls":[]}"#), Mode::Development);
        let url = c.client().routes().user_urls_paged();
        let query = vec![("page".to_string(), "0".to_string()), ("size".to_string(), "10".to_string())];
        let _: ApiResult<serde_json::Value> = c.get(url, query.clone()).await;
        assert_eq!(c.transport.requests()[0].query, query);
    }

    #[tokio::test]
    async fn asset_with_valid_headers() {
        let png = [137, 80, 78, 71, 13, 10, 26, 10, 0, 0];
        let c = caller(
            Canned::respond(
                200,
                &[
                    ("Content-Type", "image/png"),
                    ("Content-Disposition", r#"attachment; filename="qr.png""#),
                ],
                &png,
            ),
            Mode::Development,
        );
        let url = c.client().routes().url_qr_code("abc");
        let res = c.get_asset(url, Vec::new()).await;
        let asset = res.into_value().unwrap();
        assert_eq!(asset.filename, "qr.png");
        assert_eq!(asset.bytes[..8], [137, 80, 78, 71, 13, 10, 26, 10]);
        assert_eq!(
            c.transport.requests()[0].headers,
            vec![("accept".to_string(), "image/*".to_string())]
        );
    }

    #[tokio::test]
    async fn asset_missing_disposition_is_err() {
        let c = caller(
            Canned::respond(200, &[("Content-Type", "image/png")], &[137, 80]),
            Mode::Development,
        );
        let url = c.client().routes().url_qr_code("abc");
        let res = c.get_asset(url, Vec::new()).await;
        let message = res.into_error().unwrap().error;
        assert!(message.starts_with("Invalid response headers"), "{message}");
        assert!(message.contains("missing"), "{message}");
    }
}

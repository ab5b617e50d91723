//! Stateless HTTP request builder and response parser for the micro-url API.
//!
//! # Design
//! `MicroUrlClient` holds only the route builder and carries no mutable
//! state between calls. Building produces an `HttpRequest`; parsing consumes
//! an `HttpResponse`. The round-trip in between belongs to a `Transport`, so
//! everything here is deterministic and testable against canned responses.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::asset::NamedAsset;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::routes::Routes;

/// Synchronous, stateless client for the micro-url API.
#[derive(Debug, Clone)]
pub struct MicroUrlClient {
    routes: Routes,
}

impl MicroUrlClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            routes: Routes::new(base_url),
        }
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    pub fn build_get(&self, url: String, query: Vec<(String, String)>) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url,
            query,
            headers: vec![("accept".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    /// Like `build_get`, but asks for image bytes instead of JSON.
    pub fn build_get_binary(&self, url: String, query: Vec<(String, String)>) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url,
            query,
            headers: vec![("accept".to_string(), "image/*".to_string())],
            body: None,
        }
    }

    pub fn build_delete(&self, url: String, query: Vec<(String, String)>) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url,
            query,
            headers: vec![("accept".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    /// Build a POST or PUT carrying `body` as JSON.
    pub fn build_json<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        url: String,
        body: &B,
        query: Vec<(String, String)>,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            url,
            query,
            headers: vec![
                ("accept".to_string(), "application/json".to_string()),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body: Some(body),
        })
    }

    pub fn parse_json<R: DeserializeOwned>(&self, response: HttpResponse) -> Result<R, ApiError> {
        check_status(&response)?;
        serde_json::from_slice(&response.body).map_err(|e| ApiError::deserialization(e.to_string()))
    }

    /// Success body as text, for endpoints that may answer in plain text.
    pub fn parse_text(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response)?;
        String::from_utf8(response.body).map_err(|e| ApiError::deserialization(e.to_string()))
    }

    pub fn parse_asset(&self, response: HttpResponse) -> Result<NamedAsset, ApiError> {
        check_status(&response)?;
        NamedAsset::from_response(response)
    }
}

/// Map any non-2xx status to `ApiError::HttpStatus`, keeping the body.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::HttpStatus {
        status: response.status,
        body: response.body_text(),
    })
}

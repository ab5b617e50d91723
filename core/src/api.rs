//! One method per backend endpoint, each returning an `ApiResult`.

use serde::Deserialize;

use crate::asset::NamedAsset;
use crate::calls::Caller;
use crate::client::MicroUrlClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::result::ApiResult;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{
    BasicResponse, LoginRequest, NewUrlRequest, NewUserRequest, OidcName, Paginate, QrCodeParams,
    ShortLink, User, UserLink, UserLinksAndViews,
};

/// Typed client for the micro-url service.
#[derive(Debug, Clone)]
pub struct MicroUrlApi<T = ReqwestTransport> {
    caller: Caller<T>,
}

impl MicroUrlApi<ReqwestTransport> {
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::with_transport(config, ReqwestTransport::new()?))
    }
}

impl<T: Transport> MicroUrlApi<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let client = MicroUrlClient::new(&config.base_url);
        Self {
            caller: Caller::new(client, transport, config.mode),
        }
    }

    pub fn caller(&self) -> &Caller<T> {
        &self.caller
    }

    fn client(&self) -> &MicroUrlClient {
        self.caller.client()
    }

    /// Liveness of the backend. Accepts `{"status": "..."}`, a JSON string,
    /// or a plain-text body and yields the status word.
    pub async fn check_health(&self) -> ApiResult<String> {
        let url = self.client().routes().health();
        self.caller.get_text(url, Vec::new()).await.map(|body| health_status(&body))
    }

    pub async fn new_url(&self, request: &NewUrlRequest) -> ApiResult<ShortLink> {
        let url = self.client().routes().new_url();
        self.caller.post(url, request, Vec::new()).await
    }

    pub async fn get_url_info(&self, id: &str) -> ApiResult<ShortLink> {
        let url = self.client().routes().url_info(id);
        self.caller.get(url, Vec::new()).await
    }

    pub async fn update_url(&self, id: &str, request: &NewUrlRequest) -> ApiResult<ShortLink> {
        let url = self.client().routes().update_url(id);
        self.caller.put(url, request, Vec::new()).await
    }

    pub async fn delete_url(&self, id: &str) -> ApiResult<BasicResponse> {
        let url = self.client().routes().delete_url(id);
        self.caller.delete(url, Vec::new()).await
    }

    pub async fn get_qr_code(&self, id: &str, params: &QrCodeParams) -> ApiResult<NamedAsset> {
        let url = self.client().routes().url_qr_code(id);
        self.caller.get_asset(url, params.query_pairs()).await
    }

    pub async fn get_user_info(&self) -> ApiResult<User> {
        let url = self.client().routes().user();
        self.caller.get(url, Vec::new()).await
    }

    pub async fn logout(&self) -> ApiResult<BasicResponse> {
        let url = self.client().routes().logout();
        self.caller.get(url, Vec::new()).await
    }

    pub async fn get_user_urls(&self) -> ApiResult<Vec<UserLink>> {
        let url = self.client().routes().user_urls();
        self.caller.get(url, Vec::new()).await
    }

    pub async fn get_user_urls_paged(&self, page: &Paginate) -> ApiResult<UserLinksAndViews> {
        let url = self.client().routes().user_urls_paged();
        self.caller.get(url, page.query_pairs()).await
    }

    pub async fn get_oidc_provider(&self) -> ApiResult<OidcName> {
        let url = self.client().routes().oidc_provider();
        self.caller.get(url, Vec::new()).await
    }

    /// Where to send the browser to start an OIDC login. No request is made.
    pub fn oidc_login_url(&self) -> String {
        self.client().routes().oidc_login()
    }

    pub async fn register_local_user(&self, request: &NewUserRequest) -> ApiResult<User> {
        let url = self.client().routes().local_register();
        self.caller.post(url, request, Vec::new()).await
    }

    pub async fn login_local_user(&self, request: &LoginRequest) -> ApiResult<User> {
        let url = self.client().routes().local_login();
        self.caller.post(url, request, Vec::new()).await
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HealthBody {
    Status { status: String },
    Word(String),
}

fn health_status(body: &str) -> String {
    match serde_json::from_str::<HealthBody>(body) {
        Ok(HealthBody::Status { status }) | Ok(HealthBody::Word(status)) => status,
        Err(_) => body.trim().to_string(),
    }
}

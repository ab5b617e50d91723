//! Route builders for every backend endpoint.
//!
//! All routes hang off a configured base URL (`http://host:port`, or empty
//! for same-origin relative paths). The trailing slash is stripped once at
//! construction.
//!
//! Ids are placed into path segments as given and must already be URL-safe;
//! slugs accepted by `validate::validate_slug` always are.

const URL_BASE: &str = "/api/url";
const USER_BASE: &str = "/api/user";
const OIDC_BASE: &str = "/api/user/oidc";
const LOCAL_BASE: &str = "/api/user/local";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    base_url: String,
}

impl Routes {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn join(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn health(&self) -> String {
        self.join("/api/health")
    }

    pub fn new_url(&self) -> String {
        self.join(&format!("{URL_BASE}/new"))
    }

    pub fn url_info(&self, id: &str) -> String {
        self.join(&format!("{URL_BASE}/{id}"))
    }

    pub fn update_url(&self, id: &str) -> String {
        self.join(&format!("{URL_BASE}/update/{id}"))
    }

    pub fn delete_url(&self, id: &str) -> String {
        self.join(&format!("{URL_BASE}/delete/{id}"))
    }

    pub fn url_qr_code(&self, id: &str) -> String {
        self.join(&format!("{URL_BASE}/qr/{id}"))
    }

    pub fn user(&self) -> String {
        self.join(USER_BASE)
    }

    pub fn logout(&self) -> String {
        self.join(&format!("{USER_BASE}/logout"))
    }

    pub fn user_urls(&self) -> String {
        self.join(&format!("{USER_BASE}/urls"))
    }

    pub fn user_urls_paged(&self) -> String {
        self.join(&format!("{USER_BASE}/urls/page"))
    }

    pub fn oidc_provider(&self) -> String {
        self.join(&format!("{OIDC_BASE}/provider"))
    }

    pub fn oidc_login(&self) -> String {
        self.join(&format!("{OIDC_BASE}/login"))
    }

    pub fn local_register(&self) -> String {
        self.join(&format!("{LOCAL_BASE}/register"))
    }

    pub fn local_login(&self) -> String {
        self.join(&format!("{LOCAL_BASE}/login"))
    }
}

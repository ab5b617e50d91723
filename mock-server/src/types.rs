//! Wire types of the mock backend. Defined independently of the client
//! crate so integration tests catch schema drift.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortLink {
    pub id: String,
    pub short_url: String,
    pub original_url: String,
    pub user_id: Option<String>,
    pub expiry_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewUrlRequest {
    pub url: String,
    #[serde(default)]
    pub short: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub expiry: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BasicResponse {
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserView {
    pub id: i64,
    pub headers: Option<HashMap<String, Vec<String>>>,
    pub ip: Option<String>,
    pub cache_hit: bool,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserLink {
    pub id: String,
    pub short_url: String,
    pub original_url: String,
    pub user_id: String,
    pub expiry_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub views: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserLinkWithViews {
    pub id: String,
    pub short_url: String,
    pub original_url: String,
    pub user_id: String,
    pub expiry_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub views: Vec<UserView>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserLinksAndViews {
    pub urls: Vec<UserLinkWithViews>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Paginate {
    pub page: u64,
    pub size: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OidcName {
    pub name: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
    Gif,
}

/// QR query string. Colour channels are accepted but do not change the
/// placeholder image.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct QrQuery {
    #[serde(default)]
    pub format: ImageFormat,
    pub bg_red: Option<u8>,
    pub bg_green: Option<u8>,
    pub bg_blue: Option<u8>,
    pub bg_alpha: Option<u8>,
    pub fg_red: Option<u8>,
    pub fg_green: Option<u8>,
    pub fg_blue: Option<u8>,
    pub fg_alpha: Option<u8>,
}

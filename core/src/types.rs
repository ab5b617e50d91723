//! Domain DTOs for the micro-url API.
//!
//! # Design
//! These mirror the backend's JSON schema but are defined independently;
//! integration tests against the mock server catch drift. Timestamps are kept
//! as the strings the backend sends.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A stored short link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortLink {
    pub id: String,
    pub short_url: String,
    pub original_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for creating or replacing a short link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUrlRequest {
    pub url: String,
    /// Custom slug; the backend generates one when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
}

impl NewUrlRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A link owned by the current user with its total view count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLink {
    pub id: String,
    pub short_url: String,
    pub original_url: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub views: u64,
}

/// One recorded visit of a short link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    pub cache_hit: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLinkWithViews {
    pub id: String,
    pub short_url: String,
    pub original_url: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub views: Vec<UserView>,
}

/// One page of the current user's links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLinksAndViews {
    pub urls: Vec<UserLinkWithViews>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcName {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Zero-based page index and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginate {
    pub page: u64,
    pub size: u64,
}

impl Paginate {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
    Gif,
}

impl ImageFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Webp => "webp",
            ImageFormat::Gif => "gif",
        }
    }
}

/// Query parameters of the QR endpoint, as the backend names them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrCodeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ImageFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_red: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_green: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_blue: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_alpha: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg_red: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg_green: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg_blue: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg_alpha: Option<u8>,
}

impl QrCodeParams {
    /// Present parameters in a stable order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(format) = self.format {
            pairs.push(("format".to_string(), format.as_str().to_string()));
        }
        let channels = [
            ("bg_red", self.bg_red),
            ("bg_green", self.bg_green),
            ("bg_blue", self.bg_blue),
            ("bg_alpha", self.bg_alpha),
            ("fg_red", self.fg_red),
            ("fg_green", self.fg_green),
            ("fg_blue", self.fg_blue),
            ("fg_alpha", self.fg_alpha),
        ];
        for (name, value) in channels {
            if let Some(value) = value {
                pairs.push((name.to_string(), value.to_string()));
            }
        }
        pairs
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgba {
    pub red: Option<u8>,
    pub green: Option<u8>,
    pub blue: Option<u8>,
    pub alpha: Option<u8>,
}

impl Rgba {
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: Some(red),
            green: Some(green),
            blue: Some(blue),
            alpha: None,
        }
    }

    /// Channels as sent on the wire. Zero channels are dropped; an opaque
    /// alpha is filled in when all three colour channels are set.
    fn channels(&self) -> [Option<u8>; 4] {
        let set = |c: Option<u8>| c.filter(|v| *v != 0);
        let (red, green, blue) = (set(self.red), set(self.green), set(self.blue));
        let alpha = set(self.alpha).or_else(|| {
            if red.is_some() && green.is_some() && blue.is_some() {
                Some(u8::MAX)
            } else {
                None
            }
        });
        [red, green, blue, alpha]
    }
}

/// Colour and format choices for a QR image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QrParams {
    pub format: ImageFormat,
    pub bg: Option<Rgba>,
    pub fg: Option<Rgba>,
}

impl From<QrParams> for QrCodeParams {
    fn from(params: QrParams) -> Self {
        let [bg_red, bg_green, bg_blue, bg_alpha] = params.bg.map(|c| c.channels()).unwrap_or_default();
        let [fg_red, fg_green, fg_blue, fg_alpha] = params.fg.map(|c| c.channels()).unwrap_or_default();
        Self {
            format: Some(params.format),
            bg_red,
            bg_green,
            bg_blue,
            bg_alpha,
            fg_red,
            fg_green,
            fg_blue,
            fg_alpha,
        }
    }
}

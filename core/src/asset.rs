//! Named binary assets recovered from image responses.
//!
//! The QR endpoint answers with raw image bytes. The filename comes from
//! `Content-Disposition` and the image subtype from `Content-Type`; both
//! headers are required and the subtype must be on the allow-list below.

use std::fmt;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// Image subtypes a binary asset may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageMime {
    Png,
    Jpeg,
    Gif,
}

impl ImageMime {
    pub const ALLOWED: [ImageMime; 3] = [ImageMime::Png, ImageMime::Jpeg, ImageMime::Gif];

    pub fn subtype(self) -> &'static str {
        match self {
            ImageMime::Png => "png",
            ImageMime::Jpeg => "jpeg",
            ImageMime::Gif => "gif",
        }
    }

    pub fn content_type(self) -> String {
        format!("image/{}", self.subtype())
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "image/{}", self.subtype())
    }
}

/// Binary payload with the filename and type the server gave it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedAsset {
    pub filename: String,
    pub mime: ImageMime,
    pub bytes: Vec<u8>,
}

impl NamedAsset {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Build an asset from a successful binary response.
    pub fn from_response(response: HttpResponse) -> Result<Self, ApiError> {
        let (Some(content_type), Some(disposition)) =
            (response.header("content-type"), response.header("content-disposition"))
        else {
            return Err(ApiError::invalid_headers(
                "Content-Type or Content-Disposition is missing.",
            ));
        };

        let (Some(filename), Some(mime)) = (parse_filename(disposition), parse_image_mime(content_type))
        else {
            return Err(ApiError::invalid_headers(format!(
                "Unable to parse filename or content type (Content-Type: {content_type:?}, \
                 Content-Disposition: {disposition:?})."
            )));
        };

        Ok(Self {
            filename,
            mime,
            bytes: response.body,
        })
    }
}

/// Extract the filename from a `Content-Disposition` value.
///
/// Accepts quoted and bare forms (`filename="qr.png"`, `filename=qr.png`);
/// the name ends at the first quote or semicolon.
pub fn parse_filename(disposition: &str) -> Option<String> {
    const KEY: &str = "filename=";
    let lower = disposition.to_ascii_lowercase();
    lower.match_indices(KEY).find_map(|(idx, _)| {
        let rest = &disposition[idx + KEY.len()..];
        let rest = rest.strip_prefix('"').unwrap_or(rest);
        let name: String = rest.chars().take_while(|c| *c != '"' && *c != ';').collect();
        (!name.is_empty()).then_some(name)
    })
}

/// Find an allowed `image/<subtype>` inside a `Content-Type` value.
pub fn parse_image_mime(content_type: &str) -> Option<ImageMime> {
    const KEY: &str = "image/";
    let lower = content_type.to_ascii_lowercase();
    lower.match_indices(KEY).find_map(|(idx, _)| {
        let rest = &lower[idx + KEY.len()..];
        ImageMime::ALLOWED
            .into_iter()
            .find(|mime| rest.starts_with(mime.subtype()))
    })
}

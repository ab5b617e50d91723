//! In-memory state behind the mock backend: links, their views, accounts and
//! login sessions.

use std::collections::HashMap;

use axum::http::StatusCode;
use uuid::Uuid;

use crate::types::{
    LoginRequest, NewUrlRequest, NewUserRequest, ShortLink, User, UserLink, UserLinkWithViews,
    UserView,
};

const SLUG_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A request the store refused, with the status and message to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub status: StatusCode,
    pub message: String,
}

impl Failure {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn url_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "URL not found")
    }

    pub fn not_logged_in() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "User not logged in")
    }
}

#[derive(Debug, Clone)]
struct StoredLink {
    seq: u64,
    link: ShortLink,
    views: Vec<UserView>,
}

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password: String,
}

/// Outcome of creating a link: a fresh one, or the existing link for the
/// same original URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Created {
    New(ShortLink),
    Existing(ShortLink),
}

#[derive(Debug)]
pub struct Store {
    public_url: String,
    links: HashMap<String, StoredLink>,
    accounts: HashMap<String, Account>,
    sessions: HashMap<String, String>,
    counter: u64,
    next_view: i64,
    next_seq: u64,
}

fn now() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

fn encode_slug(mut n: u64) -> String {
    let base = SLUG_ALPHABET.len() as u64;
    let mut out = Vec::new();
    loop {
        out.push(SLUG_ALPHABET[(n % base) as usize]);
        n /= base;
        if n == 0 {
            break;
        }
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

fn check_url(url: &str) -> Result<(), Failure> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| Failure::bad_request("invalid url"))?;
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return Err(Failure::bad_request("invalid url"));
    }
    Ok(())
}

impl Store {
    pub fn new(public_url: &str) -> Self {
        Self {
            public_url: public_url.trim_end_matches('/').to_string(),
            links: HashMap::new(),
            accounts: HashMap::new(),
            sessions: HashMap::new(),
            counter: 0,
            next_view: 1,
            next_seq: 0,
        }
    }

    fn short_url(&self, slug: &str) -> String {
        format!("{}/{slug}", self.public_url)
    }

    fn next_slug(&mut self) -> String {
        loop {
            self.counter += 1;
            let slug = encode_slug(self.counter);
            if !self.links.contains_key(&slug) {
                return slug;
            }
        }
    }

    pub fn create_link(&mut self, input: NewUrlRequest, owner: Option<String>) -> Result<Created, Failure> {
        check_url(&input.url)?;
        if input.short.is_none() {
            if let Some(existing) = self.links.values().find(|s| s.link.original_url == input.url) {
                return Ok(Created::Existing(existing.link.clone()));
            }
        }
        let slug = match input.short {
            Some(slug) if slug.is_empty() => return Err(Failure::bad_request("short url must not be empty")),
            Some(slug) if self.links.contains_key(&slug) => {
                return Err(Failure::bad_request("short url already taken"));
            }
            Some(slug) => slug,
            None => self.next_slug(),
        };

        let created = now();
        let link = ShortLink {
            id: slug.clone(),
            short_url: self.short_url(&slug),
            original_url: input.url,
            user_id: owner.or(input.user),
            expiry_date: input.expiry,
            created_at: created.clone(),
            updated_at: created,
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        self.links.insert(
            slug,
            StoredLink {
                seq,
                link: link.clone(),
                views: Vec::new(),
            },
        );
        Ok(Created::New(link))
    }

    pub fn link(&self, id: &str) -> Option<ShortLink> {
        self.links.get(id).map(|s| s.link.clone())
    }

    pub fn update_link(&mut self, id: &str, input: NewUrlRequest) -> Result<ShortLink, Failure> {
        check_url(&input.url)?;
        let mut stored = self.links.remove(id).ok_or_else(Failure::url_not_found)?;
        let slug = match input.short {
            Some(slug) if slug != id && self.links.contains_key(&slug) => {
                self.links.insert(id.to_string(), stored);
                return Err(Failure::bad_request("short url already taken"));
            }
            Some(slug) if !slug.is_empty() => slug,
            _ => id.to_string(),
        };
        stored.link.short_url = self.short_url(&slug);
        stored.link.id = slug.clone();
        stored.link.original_url = input.url;
        stored.link.expiry_date = input.expiry;
        stored.link.updated_at = now();
        let link = stored.link.clone();
        self.links.insert(slug, stored);
        Ok(link)
    }

    pub fn delete_link(&mut self, id: &str) -> bool {
        self.links.remove(id).is_some()
    }

    /// Record a visit and return where to send the visitor.
    pub fn visit(&mut self, id: &str, ip: Option<String>) -> Option<String> {
        let view_id = self.next_view;
        let stored = self.links.get_mut(id)?;
        stored.views.push(UserView {
            id: view_id,
            headers: None,
            ip,
            cache_hit: false,
            created_at: now(),
        });
        self.next_view += 1;
        Some(stored.link.original_url.clone())
    }

    fn open_session(&mut self, user_id: &str) -> String {
        let sid = Uuid::new_v4().to_string();
        self.sessions.insert(sid.clone(), user_id.to_string());
        sid
    }

    pub fn register(&mut self, input: NewUserRequest) -> Result<(String, User), Failure> {
        let email = input.email.trim().to_lowercase();
        if input.name.trim().is_empty() || email.is_empty() || input.password.is_empty() {
            return Err(Failure::bad_request("name, email and password are required"));
        }
        if self.accounts.values().any(|a| a.user.email == email) {
            return Err(Failure::new(StatusCode::CONFLICT, "User already exists"));
        }
        let created = now();
        let user = User {
            user_id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            email,
            created_at: created.clone(),
            updated_at: created,
        };
        self.accounts.insert(
            user.user_id.clone(),
            Account {
                user: user.clone(),
                password: input.password,
            },
        );
        let sid = self.open_session(&user.user_id);
        Ok((sid, user))
    }

    pub fn login(&mut self, input: LoginRequest) -> Result<(String, User), Failure> {
        let email = input.email.trim().to_lowercase();
        let user = self
            .accounts
            .values()
            .find(|a| a.user.email == email && a.password == input.password)
            .map(|a| a.user.clone())
            .ok_or_else(|| Failure::bad_request("Invalid credentials"))?;
        let sid = self.open_session(&user.user_id);
        Ok((sid, user))
    }

    pub fn logout(&mut self, sid: &str) -> bool {
        self.sessions.remove(sid).is_some()
    }

    pub fn session_user(&self, sid: &str) -> Option<User> {
        let user_id = self.sessions.get(sid)?;
        self.accounts.get(user_id).map(|a| a.user.clone())
    }

    fn owned_by(&self, user_id: &str) -> Vec<&StoredLink> {
        let mut owned: Vec<&StoredLink> = self
            .links
            .values()
            .filter(|s| s.link.user_id.as_deref() == Some(user_id))
            .collect();
        owned.sort_by_key(|s| s.seq);
        owned
    }

    pub fn user_links(&self, user_id: &str) -> Vec<UserLink> {
        self.owned_by(user_id)
            .into_iter()
            .map(|s| UserLink {
                id: s.link.id.clone(),
                short_url: s.link.short_url.clone(),
                original_url: s.link.original_url.clone(),
                user_id: user_id.to_string(),
                expiry_date: s.link.expiry_date.clone(),
                created_at: s.link.created_at.clone(),
                updated_at: s.link.updated_at.clone(),
                views: s.views.len() as u64,
            })
            .collect()
    }

    /// Zero-based page of the user's links, oldest first.
    pub fn user_links_page(&self, user_id: &str, page: u64, size: u64) -> Result<Vec<UserLinkWithViews>, Failure> {
        if size == 0 {
            return Err(Failure::bad_request("page size must be positive"));
        }
        let skip = usize::try_from(page.saturating_mul(size)).unwrap_or(usize::MAX);
        let take = usize::try_from(size).unwrap_or(usize::MAX);
        Ok(self
            .owned_by(user_id)
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|s| UserLinkWithViews {
                id: s.link.id.clone(),
                short_url: s.link.short_url.clone(),
                original_url: s.link.original_url.clone(),
                user_id: user_id.to_string(),
                expiry_date: s.link.expiry_date.clone(),
                created_at: s.link.created_at.clone(),
                updated_at: s.link.updated_at.clone(),
                views: s.views.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::new("http://short.test/")
    }

    fn new_url(url: &str, short: Option<&str>) -> NewUrlRequest {
        NewUrlRequest {
            url: url.to_string(),
            short: short.map(str::to_string),
            user: None,
            expiry: None,
        }
    }

    fn unwrap_new(created: Created) -> ShortLink {
        match created {
            Created::New(link) => link,
            Created::Existing(link) => panic!("expected a new link, got existing {}", link.id),
        }
    }

    #[test]
    fn slugs_are_base62() {
        assert_eq!(encode_slug(0), "0");
        assert_eq!(encode_slug(61), "Z");
        assert_eq!(encode_slug(62), "10");
    }

    #[test]
    fn create_generates_slug_and_short_url() {
        let mut s = store();
        let link = unwrap_new(s.create_link(new_url("https://example.com", None), None).unwrap());
        assert_eq!(link.id, "1");
        assert_eq!(link.short_url, "http://short.test/1");
        assert_eq!(link.created_at, link.updated_at);
    }

    #[test]
    fn same_original_url_returns_existing() {
        let mut s = store();
        let first = unwrap_new(s.create_link(new_url("https://example.com", None), None).unwrap());
        let again = s.create_link(new_url("https://example.com", None), None).unwrap();
        assert_eq!(again, Created::Existing(first));
    }

    #[test]
    fn custom_slug_conflict_is_rejected() {
        let mut s = store();
        s.create_link(new_url("https://a.example", Some("mine")), None).unwrap();
        let err = s.create_link(new_url("https://b.example", Some("mine")), None).unwrap_err();
        assert_eq!(err, Failure::bad_request("short url already taken"));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let mut s = store();
        for bad in ["example.com", "ftp://x", "https://", "http:// space"] {
            let err = s.create_link(new_url(bad, None), None).unwrap_err();
            assert_eq!(err.message, "invalid url", "{bad}");
        }
    }

    #[test]
    fn update_renames_slug() {
        let mut s = store();
        s.create_link(new_url("https://a.example", Some("old")), None).unwrap();
        let updated = s.update_link("old", new_url("https://b.example", Some("new"))).unwrap();
        assert_eq!(updated.id, "new");
        assert_eq!(updated.short_url, "http://short.test/new");
        assert_eq!(updated.original_url, "https://b.example");
        assert!(s.link("old").is_none());
        assert!(s.link("new").is_some());
    }

    #[test]
    fn failed_rename_keeps_original() {
        let mut s = store();
        s.create_link(new_url("https://a.example", Some("one")), None).unwrap();
        s.create_link(new_url("https://b.example", Some("two")), None).unwrap();
        assert!(s.update_link("one", new_url("https://c.example", Some("two"))).is_err());
        assert_eq!(s.link("one").unwrap().original_url, "https://a.example");
    }

    #[test]
    fn sessions_and_ownership() {
        let mut s = store();
        let (sid, user) = s
            .register(NewUserRequest {
                name: "Ada".to_string(),
                email: "Ada@Example.com".to_string(),
                password: "Secret123!".to_string(),
            })
            .unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(s.session_user(&sid), Some(user.clone()));

        for i in 0..3 {
            s.create_link(new_url(&format!("https://{i}.example"), None), Some(user.user_id.clone()))
                .unwrap();
        }
        s.visit("1", Some("127.0.0.1".to_string())).unwrap();

        let links = s.user_links(&user.user_id);
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].views, 1);

        let page = s.user_links_page(&user.user_id, 1, 2).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].original_url, "https://2.example");
        assert!(s.user_links_page(&user.user_id, 0, 0).is_err());

        assert!(s.logout(&sid));
        assert!(s.session_user(&sid).is_none());
    }

    #[test]
    fn login_checks_password() {
        let mut s = store();
        s.register(NewUserRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "Secret123!".to_string(),
        })
        .unwrap();
        let bad = s.login(LoginRequest {
            email: "ada@example.com".to_string(),
            password: "wrong".to_string(),
        });
        assert_eq!(bad.unwrap_err(), Failure::bad_request("Invalid credentials"));
        let (_, user) = s
            .login(LoginRequest {
                email: " ada@example.com".to_string(),
                password: "Secret123!".to_string(),
            })
            .unwrap();
        assert_eq!(user.name, "Ada");
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut s = store();
        let req = NewUserRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "Secret123!".to_string(),
        };
        s.register(req.clone()).unwrap();
        assert_eq!(s.register(req).unwrap_err().message, "User already exists");
    }
}

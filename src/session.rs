//! Cookie-backed login sessions and one-shot flash messages.
//!
//! The logged-in user's id lives in a signed `uid` cookie. Flash messages ride
//! in a signed `flash` cookie that the next rendered page consumes.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Key, SignedCookieJar};
use cookie::{Cookie, SameSite};

use crate::{AppState, entities::users, error::AppError};

const USER_COOKIE: &str = "uid";
const FLASH_COOKIE: &str = "flash";
const LOGIN_MAX_AGE: time::Duration = time::Duration::days(30);

pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to access this page.";

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Builds the signing key from `SECRET_KEY`. Short or missing secrets get a random
/// key, which logs everybody out on restart.
pub fn cookie_key(secret: &str) -> Key {
    if secret.is_empty() {
        tracing::warn!("no SECRET_KEY set - generated a random session key");
        return Key::generate();
    }
    match Key::try_from(secret.as_bytes()) {
        Ok(key) => key,
        Err(_) => {
            tracing::warn!("SECRET_KEY shorter than 64 bytes - generated a random session key");
            Key::generate()
        },
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FlashLevel {
    Success,
    Danger,
    Info,
}

impl FlashLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Danger => "danger",
            FlashLevel::Info => "info",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(FlashLevel::Success),
            "danger" => Some(FlashLevel::Danger),
            "info" => Some(FlashLevel::Info),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Success, message: message.into() }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Danger, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Info, message: message.into() }
    }

    fn encode(&self) -> String {
        format!("{}:{}", self.level.as_str(), urlencoding::encode(&self.message))
    }

    fn decode(raw: &str) -> Option<Self> {
        let (level, message) = raw.split_once(':')?;
        Some(Self {
            level: FlashLevel::parse(level)?,
            message: urlencoding::decode(message).ok()?.into_owned(),
        })
    }
}

pub fn with_flash(jar: SignedCookieJar, flash: Flash) -> SignedCookieJar {
    jar.add(session_cookie(FLASH_COOKIE, flash.encode()))
}

pub fn log_in(jar: SignedCookieJar, user_id: i32) -> SignedCookieJar {
    let mut cookie = session_cookie(USER_COOKIE, user_id.to_string());
    cookie.set_max_age(LOGIN_MAX_AGE);
    jar.add(cookie)
}

pub fn log_out(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(USER_COOKIE).path("/"))
}

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value)).path("/").http_only(true).same_site(SameSite::Lax).build()
}

/// What the page layout needs to know about the visitor.
#[derive(Clone, Debug, Default)]
pub struct PageContext {
    pub username: Option<String>,
    /// Pending messages in the order they were raised.
    pub flashes: Vec<Flash>,
}

impl PageContext {
    pub fn push_flash(&mut self, flash: Flash) {
        self.flashes.push(flash);
    }
}

/// Current visitor, logged in or not. Taking this extractor consumes any pending
/// flash message; return `jar` with the response so the removal sticks.
pub struct Session {
    pub jar: SignedCookieJar,
    pub user: Option<users::Model>,
    pub flash: Option<Flash>,
}

impl Session {
    pub fn context(&self) -> PageContext {
        PageContext {
            username: self.user.as_ref().map(|u| u.username.clone()),
            flashes: self.flash.iter().cloned().collect(),
        }
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let jar = match SignedCookieJar::<Key>::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };

        let user_id = jar.get(USER_COOKIE).and_then(|c| c.value().parse::<i32>().ok());
        let user = match user_id {
            Some(id) => state.store.find_user_by_id(id).await?,
            None => None,
        };

        let flash = jar.get(FLASH_COOKIE).and_then(|c| Flash::decode(c.value()));
        let jar = if jar.get(FLASH_COOKIE).is_some() {
            jar.remove(Cookie::build(FLASH_COOKIE).path("/"))
        } else {
            jar
        };

        Ok(Self { jar, user, flash })
    }
}

/// A visitor that must be logged in. Anonymous requests are redirected to the
/// login page.
pub struct AuthSession {
    pub jar: SignedCookieJar,
    pub user: users::Model,
    pub flash: Option<Flash>,
}

impl AuthSession {
    pub fn context(&self) -> PageContext {
        PageContext {
            username: Some(self.user.username.clone()),
            flashes: self.flash.iter().cloned().collect(),
        }
    }
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Response> {
        let session =
            Session::from_request_parts(parts, state).await.map_err(IntoResponse::into_response)?;

        match session.user {
            Some(user) => Ok(Self { jar: session.jar, user, flash: session.flash }),
            None => {
                tracing::debug!(path = %parts.uri.path(), "login required");
                let jar = with_flash(log_out(session.jar), Flash::info(LOGIN_REQUIRED_MESSAGE));
                Err((jar, Redirect::to("/login")).into_response())
            },
        }
    }
}

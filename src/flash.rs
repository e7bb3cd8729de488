//! One-shot notices carried across a redirect in a short-lived cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar};

pub const FLASH_COOKIE: &str = "gif_collector_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Registered,
    LoggedOut,
    CollectionCreated,
}

impl Flash {
    fn code(self) -> &'static str {
        match self {
            Flash::Registered => "registered",
            Flash::LoggedOut => "logged_out",
            Flash::CollectionCreated => "collection_created",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "registered" => Some(Flash::Registered),
            "logged_out" => Some(Flash::LoggedOut),
            "collection_created" => Some(Flash::CollectionCreated),
            _ => None,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Flash::Registered => "You can now log in!",
            Flash::LoggedOut => "You have been logged out",
            Flash::CollectionCreated => "Collection saved.",
        }
    }
}

fn flash_cookie(value: &'static str) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, value)).path("/").http_only(true).build()
}

/// Queues `flash` for the next rendered page.
pub fn set(jar: CookieJar, flash: Flash) -> CookieJar {
    jar.add(flash_cookie(flash.code()))
}

/// Reads and clears the pending flash, if any.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(flash) = jar.get(FLASH_COOKIE).map(|c| Flash::from_code(c.value())) else {
        return (jar, None);
    };
    (jar.remove(flash_cookie("")), flash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_is_shown_once() {
        let jar = set(CookieJar::new(), Flash::LoggedOut);
        let (jar, flash) = take(jar);
        assert_eq!(flash, Some(Flash::LoggedOut));
        assert!(jar.get(FLASH_COOKIE).is_none());

        let (_, flash) = take(jar);
        assert_eq!(flash, None);
    }

    #[test]
    fn unknown_codes_are_cleared_silently() {
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, "bogus"));
        let (jar, flash) = take(jar);
        assert_eq!(flash, None);
        assert!(jar.get(FLASH_COOKIE).is_none());
    }
}

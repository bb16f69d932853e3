//! Client views and their paths.

use std::{fmt, str::FromStr};

use strum::EnumIter;
use thiserror::Error;

/// Views of the client that the controllers reason about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter)]
pub enum Route {
    /// Landing view: bootstrap prompt or shop entry.
    #[default]
    Home,
    /// Logged-out view.
    Login,
    /// Profile and account deletion.
    Me,
    /// Shop, reachable once bootstrap has run.
    Shop,
}

impl Route {
    /// Path of the view, with a leading slash.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Me => "/me",
            Self::Shop => "/shop",
        }
    }

    /// Whether this is the view that triggers the fallback login.
    #[must_use]
    pub const fn is_landing(self) -> bool {
        matches!(self, Self::Home)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Returned for paths that name no known view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown route: {0}")]
pub struct ParseRouteError(String);

impl FromStr for Route {
    type Err = ParseRouteError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" => "/",
            path => path,
        };
        match normalized {
            "/" => Ok(Self::Home),
            "/login" => Ok(Self::Login),
            "/me" => Ok(Self::Me),
            "/shop" => Ok(Self::Shop),
            _ => Err(ParseRouteError(trimmed.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_paths_roundtrip() {
        for route in Route::iter() {
            assert_eq!(route.path().parse::<Route>(), Ok(route));
            assert_eq!(route.to_string(), route.path());
        }
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        assert_eq!("/me/".parse::<Route>(), Ok(Route::Me));
        assert_eq!("".parse::<Route>(), Ok(Route::Home));
    }

    #[test]
    fn test_unknown_route() {
        assert!("/admin".parse::<Route>().is_err());
        assert!("me".parse::<Route>().is_err());
    }

    #[test]
    fn test_only_home_is_landing() {
        let landing: Vec<_> = Route::iter().filter(|route| route.is_landing()).collect();
        assert_eq!(landing, vec![Route::Home]);
        assert_eq!(Route::default(), Route::Home);
    }
}

use core::fmt;
use core::str::FromStr;

use crate::error::RouteError;

/// The two screens of the browser: `/` and `/:id`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    List,
    /// `id` is the path segment, kept verbatim.
    Detail { id: String },
}

impl Route {
    pub fn detail(id: impl Into<String>) -> Self {
        Self::Detail { id: id.into() }
    }

    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let trimmed = path.strip_suffix('/').unwrap_or(path);
        if trimmed.is_empty() {
            return Ok(Self::List);
        }
        match trimmed.strip_prefix('/') {
            Some(id) if !id.is_empty() && !id.contains('/') => Ok(Self::detail(id)),
            _ => Err(RouteError::NotFound(path.to_string())),
        }
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => f.write_str("/"),
            Self::Detail { id } => write!(f, "/{id}"),
        }
    }
}

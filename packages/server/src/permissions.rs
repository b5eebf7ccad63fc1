//! Composable access rules.
//!
//! A [`Permission`] is a small boolean expression over the request method,
//! the caller and the host of the hackathon being acted on. Rules combine
//! with `&` and `|`:
//!
//! ```ignore
//! let rule = Permission::ReadOnly | Permission::IsAdmin | Permission::IsHackathonHost;
//! rule.check(&AccessContext::new(&method, Some(&user)).with_hackathon_host(host_id))?;
//! ```

use std::ops::{BitAnd, BitOr};

use axum::http::Method;
use uuid::Uuid;

use crate::entity::{hackathon, participant, participation_request};
use crate::error::AppError;
use crate::extractors::auth::AuthUser;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    /// Safe methods only (GET, HEAD, OPTIONS).
    ReadOnly,
    /// Creation requests only.
    PostOnly,
    IsAuthenticated,
    IsAdmin,
    /// Caller has the host role.
    IsHost,
    /// Caller hosts the hackathon in the context. False when none was resolved.
    IsHackathonHost,
    All(Vec<Permission>),
    Any(Vec<Permission>),
}

/// Everything a rule may look at for one request.
#[derive(Debug, Clone, Copy)]
pub struct AccessContext<'a> {
    pub method: &'a Method,
    pub user: Option<&'a AuthUser>,
    pub hackathon_host: Option<Uuid>,
}

impl<'a> AccessContext<'a> {
    pub fn new(method: &'a Method, user: Option<&'a AuthUser>) -> Self {
        Self {
            method,
            user,
            hackathon_host: None,
        }
    }

    pub fn with_hackathon_host(mut self, host_id: Uuid) -> Self {
        self.hackathon_host = Some(host_id);
        self
    }
}

impl Permission {
    pub fn allows(&self, ctx: &AccessContext<'_>) -> bool {
        match self {
            Permission::ReadOnly => matches!(
                *ctx.method,
                Method::GET | Method::HEAD | Method::OPTIONS
            ),
            Permission::PostOnly => *ctx.method == Method::POST,
            Permission::IsAuthenticated => ctx.user.is_some(),
            Permission::IsAdmin => ctx.user.is_some_and(|u| u.is_admin),
            Permission::IsHost => ctx.user.is_some_and(|u| u.is_host()),
            Permission::IsHackathonHost => match (ctx.user, ctx.hackathon_host) {
                (Some(user), Some(host_id)) => user.user_id == host_id,
                _ => false,
            },
            Permission::All(rules) => rules.iter().all(|r| r.allows(ctx)),
            Permission::Any(rules) => rules.iter().any(|r| r.allows(ctx)),
        }
    }

    /// `Ok(())` when the rule holds; 401 for anonymous callers, 403 otherwise.
    pub fn check(&self, ctx: &AccessContext<'_>) -> Result<(), AppError> {
        if self.allows(ctx) {
            Ok(())
        } else if ctx.user.is_none() {
            Err(AppError::TokenMissing)
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

impl BitAnd for Permission {
    type Output = Permission;

    fn bitand(self, rhs: Permission) -> Permission {
        match self {
            Permission::All(mut rules) => {
                rules.push(rhs);
                Permission::All(rules)
            }
            lhs => Permission::All(vec![lhs, rhs]),
        }
    }
}

impl BitOr for Permission {
    type Output = Permission;

    fn bitor(self, rhs: Permission) -> Permission {
        match self {
            Permission::Any(mut rules) => {
                rules.push(rhs);
                Permission::Any(rules)
            }
            lhs => Permission::Any(vec![lhs, rhs]),
        }
    }
}

// Rules shared by the route handlers.

/// Anyone may read; hosts and admins may create.
pub fn hackathon_create() -> Permission {
    Permission::ReadOnly | Permission::IsAdmin | Permission::IsHost
}

/// Anyone may read; only admins and the owning host may change.
pub fn hackathon_write() -> Permission {
    Permission::ReadOnly | Permission::IsAdmin | Permission::IsHackathonHost
}

/// The owning host and admins may list requests; any signed-in user may file one.
pub fn request_collection() -> Permission {
    (Permission::ReadOnly & (Permission::IsAdmin | Permission::IsHackathonHost))
        | (Permission::PostOnly & Permission::IsAuthenticated)
}

/// Review access to a single request or participant.
pub fn hackathon_staff() -> Permission {
    Permission::IsAdmin | Permission::IsHackathonHost
}

pub fn category_write() -> Permission {
    Permission::ReadOnly | Permission::IsAdmin
}

/// Anything that belongs to exactly one hackathon.
pub trait HackathonScoped {
    fn hackathon_id(&self) -> Uuid;
}

impl HackathonScoped for hackathon::Model {
    fn hackathon_id(&self) -> Uuid {
        self.id
    }
}

impl HackathonScoped for participant::Model {
    fn hackathon_id(&self) -> Uuid {
        self.hackathon_id
    }
}

impl HackathonScoped for participation_request::Model {
    fn hackathon_id(&self) -> Uuid {
        self.hackathon_id
    }
}

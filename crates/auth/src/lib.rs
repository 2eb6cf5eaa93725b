//! `graphura-auth`: session and role-routing core (pure, no I/O).
//!
//! This crate is intentionally decoupled from HTTP and storage: it answers
//! "who is signed in", "which pages may they reach" and "what should be shown
//! for this path", and leaves fetching and persisting to `graphura-client`.

pub mod authorize;
pub mod claims;
pub mod navigation;
pub mod path;
pub mod permissions;
pub mod roles;
pub mod router;
pub mod session;
pub mod user;

pub use authorize::{GuardDecision, GuardExplanation, GuardRule, RenderTarget, RouteGuard, authorize_route};
pub use claims::{AuthToken, TokenError};
pub use navigation::{NavItem, Navigation, render_navigation};
pub use path::normalize_path;
pub use permissions::{
    Icon, LOGIN_PATH, PageId, RoleRouteSet, RouteEntry, RoutePermissionTable, TableError, routes_for,
};
pub use roles::{Role, RoleClaim, RoleParseError};
pub use router::{Resolution, RoleRouter, RouteTable};
pub use session::{Session, SessionStatus};
pub use user::{DEFAULT_AVATAR, User, UserProfile};

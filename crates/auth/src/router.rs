//! Role Router: turns a role's route set into a concrete route table.
//!
//! The table is generic over the content attached to each route so the same
//! routing works for the terminal shell and the web frontend.

use crate::{RoleRouteSet, RouteEntry, RoutePermissionTable, Session, normalize_path};

/// Result of resolving a path against a [`RouteTable`].
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution<'a, V> {
    Matched { entry: &'a RouteEntry, content: &'a V },
    /// Catch-all: the path is not routed for this role.
    Fallback(&'static str),
}

/// Routes for one role, in declared order, plus the catch-all redirect.
#[derive(Debug, Clone)]
pub struct RouteTable<V> {
    routes: Vec<(RouteEntry, V)>,
    fallback: &'static str,
}

impl<V> RouteTable<V> {
    /// Build a table from a route set, attaching content to every entry.
    pub fn build(set: &RoleRouteSet, mut content: impl FnMut(&RouteEntry) -> V) -> Self {
        let routes = set
            .entries()
            .iter()
            .map(|entry| (*entry, content(entry)))
            .collect();

        Self {
            routes,
            fallback: set.default_path(),
        }
    }

    pub fn resolve(&self, path: &str) -> Resolution<'_, V> {
        let path = normalize_path(path);
        self.routes
            .iter()
            .find(|(entry, _)| entry.path == path)
            .map(|(entry, content)| Resolution::Matched { entry, content })
            .unwrap_or(Resolution::Fallback(self.fallback))
    }

    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.iter().map(|(entry, _)| entry)
    }

    pub fn contains(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.routes.iter().any(|(entry, _)| entry.path == path)
    }

    pub fn fallback(&self) -> &'static str {
        self.fallback
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Builds route tables for sessions. Holds no state beyond the table it reads.
#[derive(Debug, Clone, Copy)]
pub struct RoleRouter<'t> {
    table: &'t RoutePermissionTable,
}

impl RoleRouter<'static> {
    pub fn standard() -> Self {
        Self::new(RoutePermissionTable::standard_ref())
    }
}

impl<'t> RoleRouter<'t> {
    pub fn new(table: &'t RoutePermissionTable) -> Self {
        Self { table }
    }

    /// Route table for an authenticated session with a known role.
    ///
    /// `None` for loading or signed-out sessions and for unrecognised roles.
    pub fn for_session<V>(&self, session: &Session, content: impl FnMut(&RouteEntry) -> V) -> Option<RouteTable<V>> {
        let claim = session.role()?;
        let set = self.table.routes_for(claim)?;
        Some(RouteTable::build(set, content))
    }
}

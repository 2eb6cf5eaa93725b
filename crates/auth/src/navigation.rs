//! Navigation Renderer: the menu for a session.
//!
//! Items are derived from the Role Router's table rather than from the role
//! directly, so a link can only exist for a path the router actually serves.

use serde::Serialize;

use crate::{Icon, RouteTable, normalize_path};

/// One menu link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub path: &'static str,
    pub label: &'static str,
    pub icon: Icon,
    pub active: bool,
}

/// The rendered menu, in route-set order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub items: Vec<NavItem>,
}

impl Navigation {
    pub fn active(&self) -> Option<&NavItem> {
        self.items.iter().find(|item| item.active)
    }

    pub fn paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.items.iter().map(|item| item.path)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Render one link per routed entry, highlighting the current path.
pub fn render_navigation<V>(table: &RouteTable<V>, current_path: &str) -> Navigation {
    let current = normalize_path(current_path);
    let items = table
        .entries()
        .map(|entry| NavItem {
            path: entry.path,
            label: entry.label,
            icon: entry.icon,
            active: entry.path == current,
        })
        .collect();

    Navigation { items }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuthToken, Role, RoleRouter, RoutePermissionTable, Session, User};
    use graphura_core::UserId;

    fn manager_session() -> Session {
        let user = User::new(UserId::new("m-1").unwrap(), "Nisha", "nisha@graphura.in", Role::Manager);
        Session::authenticated(AuthToken::new("tok").unwrap(), user)
    }

    #[test]
    fn manager_menu_lists_manager_routes_in_order() {
        let table = RoleRouter::standard().for_session(&manager_session(), |_| ()).unwrap();
        let nav = render_navigation(&table, "/salary");

        let expected: Vec<&str> = RoutePermissionTable::standard_ref()
            .for_role(Role::Manager)
            .paths()
            .collect();
        assert_eq!(nav.paths().collect::<Vec<_>>(), expected);
        assert_eq!(nav.active().map(|i| i.label), Some("Salary"));
        assert_eq!(nav.items.iter().filter(|i| i.active).count(), 1);
    }

    #[test]
    fn every_link_is_routed() {
        for role in Role::ALL {
            let user = User::new(UserId::new("x").unwrap(), "X", "x@graphura.in", role);
            let session = Session::authenticated(AuthToken::new("tok").unwrap(), user);
            let table = RoleRouter::standard().for_session(&session, |_| ()).unwrap();
            let nav = render_navigation(&table, "/");
            assert!(nav.paths().all(|p| table.contains(p)), "{role}");
            assert!(nav.active().is_none());
        }
    }
}

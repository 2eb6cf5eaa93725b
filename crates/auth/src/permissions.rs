//! Role-Permission Table: the one place role → page access is declared.
//!
//! The Route Guard, the Role Router and the Navigation Renderer all read from
//! this table, so the menu and the routing can never disagree.

use serde::Serialize;
use thiserror::Error;

use crate::{Role, RoleClaim};

/// The login page; reachable only without a session.
pub const LOGIN_PATH: &str = "/login";

/// Menu icon identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Dashboard,
    Chart,
    Clock,
    Users,
    Report,
    Document,
    Database,
    Transfer,
    Star,
    Dollar,
    Check,
    Logout,
}

impl Icon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Icon::Dashboard => "dashboard",
            Icon::Chart => "chart",
            Icon::Clock => "clock",
            Icon::Users => "users",
            Icon::Report => "report",
            Icon::Document => "document",
            Icon::Database => "database",
            Icon::Transfer => "transfer",
            Icon::Star => "star",
            Icon::Dollar => "dollar",
            Icon::Check => "check",
            Icon::Logout => "logout",
        }
    }
}

/// Page content a route renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageId {
    Dashboard,
    TotalProjects,
    WorkingProjects,
    TeamMembers,
    ManagerReport,
    TeamReport,
    TransferData,
    Review,
    Salary,
    Settings,
    MyTeam,
    TeamLeadReviews,
    MyProjects,
    CompletedProjects,
    MyPayout,
    Help,
}

impl PageId {
    pub fn title(&self) -> &'static str {
        match self {
            PageId::Dashboard => "Dashboard",
            PageId::TotalProjects => "Total Projects",
            PageId::WorkingProjects => "Working Projects",
            PageId::TeamMembers => "Team Members",
            PageId::ManagerReport => "Manager Report",
            PageId::TeamReport => "Team Report",
            PageId::TransferData => "Transfer Data",
            PageId::Review => "Review",
            PageId::Salary => "Salary",
            PageId::Settings => "Settings",
            PageId::MyTeam => "My Team",
            PageId::TeamLeadReviews => "Reviews",
            PageId::MyProjects => "My Projects",
            PageId::CompletedProjects => "Completed Projects",
            PageId::MyPayout => "My Payout",
            PageId::Help => "Help",
        }
    }
}

/// One navigable page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RouteEntry {
    pub path: &'static str,
    pub label: &'static str,
    pub icon: Icon,
    pub page: PageId,
}

const fn entry(path: &'static str, label: &'static str, icon: Icon, page: PageId) -> RouteEntry {
    RouteEntry { path, label, icon, page }
}

const MANAGER_ENTRIES: &[RouteEntry] = &[
    entry("/dashboard", "Dashboard", Icon::Dashboard, PageId::Dashboard),
    entry("/total-projects", "Total Projects", Icon::Chart, PageId::TotalProjects),
    entry("/working-projects", "Working Projects", Icon::Clock, PageId::WorkingProjects),
    entry("/team-members", "Team Members", Icon::Users, PageId::TeamMembers),
    entry("/manager-report", "Manager Report", Icon::Report, PageId::ManagerReport),
    entry("/team-report", "Team Report", Icon::Document, PageId::TeamReport),
    entry("/transfer-data", "Transfer Data", Icon::Transfer, PageId::TransferData),
    entry("/review", "Review", Icon::Star, PageId::Review),
    entry("/salary", "Salary", Icon::Dollar, PageId::Salary),
    entry("/settings", "Settings", Icon::Check, PageId::Settings),
];

const TEAM_LEAD_ENTRIES: &[RouteEntry] = &[
    entry("/dashboard", "Dashboard", Icon::Dashboard, PageId::Dashboard),
    entry("/total-projects", "Projects", Icon::Chart, PageId::TotalProjects),
    entry("/team", "My Team", Icon::Users, PageId::MyTeam),
    entry("/transfer-data", "Transfer Projects", Icon::Transfer, PageId::TransferData),
    entry("/team-report", "Team Report", Icon::Document, PageId::TeamReport),
    entry("/tlreview", "Reviews", Icon::Document, PageId::TeamLeadReviews),
    entry("/help", "Help", Icon::Check, PageId::Help),
];

const EXECUTIVE_ENTRIES: &[RouteEntry] = &[
    entry("/dashboard", "Dashboard", Icon::Dashboard, PageId::Dashboard),
    entry("/my-projects", "My Projects", Icon::Clock, PageId::MyProjects),
    entry("/completed-projects", "Completed Projects", Icon::Check, PageId::CompletedProjects),
    entry("/my-payout", "My Payout", Icon::Dollar, PageId::MyPayout),
    entry("/help", "Help", Icon::Check, PageId::Help),
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("route set for {0} is empty")]
    EmptySet(Role),

    #[error("default path '{path}' is not a route of {role}")]
    DefaultNotListed { role: Role, path: String },

    #[error("route '{path}' is listed twice for {role}")]
    DuplicatePath { role: Role, path: String },

    #[error("route '{path}' for {role} must be an absolute path other than the login page")]
    InvalidPath { role: Role, path: String },
}

/// Ordered routes for one role plus its landing page.
///
/// The default path doubles as the fallback for unmatched paths and as the
/// post-login landing target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleRouteSet {
    entries: &'static [RouteEntry],
    default_path: &'static str,
}

impl RoleRouteSet {
    pub fn entries(&self) -> &'static [RouteEntry] {
        self.entries
    }

    pub fn default_path(&self) -> &'static str {
        self.default_path
    }

    pub fn paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.path)
    }

    /// Look up a (normalised) path.
    pub fn entry(&self, path: &str) -> Option<&'static RouteEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entry(path).is_some()
    }

    fn validate(&self, role: Role) -> Result<(), TableError> {
        if self.entries.is_empty() {
            return Err(TableError::EmptySet(role));
        }

        for (idx, e) in self.entries.iter().enumerate() {
            if !e.path.starts_with('/') || e.path == LOGIN_PATH {
                return Err(TableError::InvalidPath {
                    role,
                    path: e.path.to_string(),
                });
            }
            if self.entries[..idx].iter().any(|earlier| earlier.path == e.path) {
                return Err(TableError::DuplicatePath {
                    role,
                    path: e.path.to_string(),
                });
            }
        }

        if !self.contains(self.default_path) {
            return Err(TableError::DefaultNotListed {
                role,
                path: self.default_path.to_string(),
            });
        }

        Ok(())
    }
}

/// Static role → route set mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePermissionTable {
    manager: RoleRouteSet,
    team_lead: RoleRouteSet,
    executive: RoleRouteSet,
}

static STANDARD: RoutePermissionTable = RoutePermissionTable::standard();

impl RoutePermissionTable {
    /// The built-in table.
    pub const fn standard() -> Self {
        Self {
            manager: RoleRouteSet {
                entries: MANAGER_ENTRIES,
                default_path: "/dashboard",
            },
            team_lead: RoleRouteSet {
                entries: TEAM_LEAD_ENTRIES,
                default_path: "/dashboard",
            },
            executive: RoleRouteSet {
                entries: EXECUTIVE_ENTRIES,
                default_path: "/my-projects",
            },
        }
    }

    /// Shared reference to the built-in table.
    pub fn standard_ref() -> &'static Self {
        &STANDARD
    }

    /// Route set for a known role (total over [`Role`]).
    pub fn for_role(&self, role: Role) -> &RoleRouteSet {
        match role {
            Role::Manager => &self.manager,
            Role::TeamLead => &self.team_lead,
            Role::Executive => &self.executive,
        }
    }

    /// Route set for whatever role a user record carries.
    ///
    /// `None` is the empty set: callers must force a logout rather than show
    /// an empty shell.
    pub fn routes_for(&self, claim: &RoleClaim) -> Option<&RoleRouteSet> {
        claim.role().map(|role| self.for_role(role))
    }

    /// Replace a role's landing page with another of its own routes.
    pub fn with_default_path(mut self, role: Role, path: &str) -> Result<Self, TableError> {
        let set = match role {
            Role::Manager => &mut self.manager,
            Role::TeamLead => &mut self.team_lead,
            Role::Executive => &mut self.executive,
        };

        let entry = set.entry(path).ok_or_else(|| TableError::DefaultNotListed {
            role,
            path: path.to_string(),
        })?;
        set.default_path = entry.path;

        tracing::debug!(role = %role, default_path = entry.path, "overrode role landing page");
        Ok(self)
    }

    /// Check every structural invariant of every role's set.
    pub fn validate(&self) -> Result<(), TableError> {
        for role in Role::ALL {
            self.for_role(role).validate(role)?;
        }
        Ok(())
    }
}

impl Default for RoutePermissionTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// `routesFor` against the built-in table.
pub fn routes_for(claim: &RoleClaim) -> Option<&'static RoleRouteSet> {
    STANDARD.routes_for(claim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_is_valid() {
        assert_eq!(RoutePermissionTable::standard().validate(), Ok(()));
    }

    #[test]
    fn every_default_is_one_of_its_own_paths() {
        let table = RoutePermissionTable::standard();
        for role in Role::ALL {
            let set = table.for_role(role);
            assert!(!set.entries().is_empty());
            assert!(set.paths().any(|p| p == set.default_path()), "{role}");
        }
    }

    #[test]
    fn landing_pages_match_roles() {
        let table = RoutePermissionTable::standard();
        assert_eq!(table.for_role(Role::Manager).default_path(), "/dashboard");
        assert_eq!(table.for_role(Role::TeamLead).default_path(), "/dashboard");
        assert_eq!(table.for_role(Role::Executive).default_path(), "/my-projects");
    }

    #[test]
    fn unknown_claim_has_no_routes() {
        assert!(routes_for(&RoleClaim::Unrecognized("intern".into())).is_none());
        assert!(routes_for(&RoleClaim::Known(Role::Executive)).is_some());
    }

    #[test]
    fn team_members_is_manager_only() {
        let table = RoutePermissionTable::standard();
        assert!(table.for_role(Role::Manager).contains("/team-members"));
        assert!(!table.for_role(Role::TeamLead).contains("/team-members"));
        assert!(!table.for_role(Role::Executive).contains("/team-members"));
    }

    #[test]
    fn default_override_must_be_listed() {
        let table = RoutePermissionTable::standard()
            .with_default_path(Role::Manager, "/salary")
            .unwrap();
        assert_eq!(table.for_role(Role::Manager).default_path(), "/salary");
        assert_eq!(table.validate(), Ok(()));

        let err = RoutePermissionTable::standard()
            .with_default_path(Role::Executive, "/salary")
            .unwrap_err();
        assert!(matches!(err, TableError::DefaultNotListed { role: Role::Executive, .. }));
    }

    #[test]
    fn validation_rejects_login_path_and_duplicates() {
        static BAD: &[RouteEntry] = &[
            entry("/dashboard", "Dashboard", Icon::Dashboard, PageId::Dashboard),
            entry("/login", "Login", Icon::Logout, PageId::Help),
        ];
        static DUP: &[RouteEntry] = &[
            entry("/help", "Help", Icon::Check, PageId::Help),
            entry("/help", "Help again", Icon::Check, PageId::Help),
        ];

        let bad = RoleRouteSet {
            entries: BAD,
            default_path: "/dashboard",
        };
        assert!(matches!(bad.validate(Role::Manager), Err(TableError::InvalidPath { .. })));

        let dup = RoleRouteSet {
            entries: DUP,
            default_path: "/help",
        };
        assert!(matches!(dup.validate(Role::Manager), Err(TableError::DuplicatePath { .. })));

        let empty = RoleRouteSet {
            entries: &[],
            default_path: "/dashboard",
        };
        assert_eq!(empty.validate(Role::Executive), Err(TableError::EmptySet(Role::Executive)));
    }
}

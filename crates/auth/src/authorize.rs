use serde::Serialize;

use crate::{LOGIN_PATH, RouteEntry, RoutePermissionTable, Session, SessionStatus, normalize_path};

/// What to show for the requested location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderTarget {
    Login,
    Route(RouteEntry),
}

/// Outcome of the Route Guard for one (session, path) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "target", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Session still validating: render a neutral placeholder, decide nothing.
    Suspend,
    Render(RenderTarget),
    RedirectTo(&'static str),
    /// The user's role has no route set; the caller must log out and then
    /// show the login page.
    ForceLogout,
}

impl GuardDecision {
    /// The session must be ended before the decision is rendered.
    pub fn requires_logout(&self) -> bool {
        matches!(self, GuardDecision::ForceLogout)
    }
}

/// The guard rule that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardRule {
    SessionLoading,
    LoginRequired,
    LoginPage,
    AlreadySignedIn,
    RoutePermitted,
    RouteNotPermitted,
    UnrecognizedRole,
}

/// A decision together with why it was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardExplanation {
    /// Normalised form of the requested path.
    pub path: String,
    pub status: SessionStatus,
    pub decision: GuardDecision,
    pub rule: GuardRule,
    pub reason: String,
}

/// Route Guard bound to one permission table.
///
/// Total over every (session, path) pair; never leaves a case where nothing
/// would be rendered.
#[derive(Debug, Clone, Copy)]
pub struct RouteGuard<'t> {
    table: &'t RoutePermissionTable,
}

impl RouteGuard<'static> {
    pub fn standard() -> Self {
        Self::new(RoutePermissionTable::standard_ref())
    }
}

impl<'t> RouteGuard<'t> {
    pub fn new(table: &'t RoutePermissionTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'t RoutePermissionTable {
        self.table
    }

    pub fn decide(&self, session: &Session, path: &str) -> GuardDecision {
        self.evaluate(session, &normalize_path(path)).0
    }

    pub fn explain(&self, session: &Session, path: &str) -> GuardExplanation {
        let path = normalize_path(path);
        let (decision, rule) = self.evaluate(session, &path);

        let reason = match rule {
            GuardRule::SessionLoading => "session is still being validated".to_string(),
            GuardRule::LoginRequired => format!("no session; '{path}' requires sign-in"),
            GuardRule::LoginPage => "no session; showing the login page".to_string(),
            GuardRule::AlreadySignedIn => "already signed in; login page is not shown again".to_string(),
            GuardRule::RoutePermitted => format!("'{path}' is in the role's route set"),
            GuardRule::RouteNotPermitted => {
                format!("'{path}' is not in the role's route set; sending to the role's default page")
            }
            GuardRule::UnrecognizedRole => {
                let role = session.role().map(|r| r.as_str().to_string()).unwrap_or_default();
                format!("role '{role}' has no route set; session must be ended")
            }
        };

        GuardExplanation {
            path,
            status: session.status(),
            decision,
            rule,
            reason,
        }
    }

    /// Where a signed-in user lands (login redirect and unmatched paths).
    pub fn landing_path(&self, session: &Session) -> Option<&'static str> {
        let claim = session.role()?;
        self.table.routes_for(claim).map(|set| set.default_path())
    }

    fn evaluate(&self, session: &Session, path: &str) -> (GuardDecision, GuardRule) {
        let is_login = path == LOGIN_PATH;

        match session.status() {
            SessionStatus::Loading => (GuardDecision::Suspend, GuardRule::SessionLoading),
            SessionStatus::Unauthenticated if is_login => {
                (GuardDecision::Render(RenderTarget::Login), GuardRule::LoginPage)
            }
            SessionStatus::Unauthenticated => (GuardDecision::RedirectTo(LOGIN_PATH), GuardRule::LoginRequired),
            SessionStatus::Authenticated => {
                let Some(set) = session.role().and_then(|claim| self.table.routes_for(claim)) else {
                    return (GuardDecision::ForceLogout, GuardRule::UnrecognizedRole);
                };

                if is_login {
                    return (GuardDecision::RedirectTo(set.default_path()), GuardRule::AlreadySignedIn);
                }

                match set.entry(path) {
                    Some(entry) => (GuardDecision::Render(RenderTarget::Route(*entry)), GuardRule::RoutePermitted),
                    None => (GuardDecision::RedirectTo(set.default_path()), GuardRule::RouteNotPermitted),
                }
            }
        }
    }
}

/// Run the guard against the built-in permission table.
pub fn authorize_route(session: &Session, path: &str) -> GuardDecision {
    RouteGuard::standard().decide(session, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuthToken, Role, RoleClaim, User};
    use graphura_core::UserId;
    use proptest::prelude::*;

    fn session_for(role: impl Into<RoleClaim>) -> Session {
        let user = User::new(UserId::new("u-1").unwrap(), "Kiran", "kiran@graphura.in", role);
        Session::authenticated(AuthToken::new("tok").unwrap(), user)
    }

    fn known_paths() -> Vec<&'static str> {
        let table = RoutePermissionTable::standard();
        let mut paths: Vec<&'static str> = Role::ALL
            .iter()
            .flat_map(|role| table.for_role(*role).paths().collect::<Vec<_>>())
            .collect();
        paths.push(LOGIN_PATH);
        paths.push("/");
        paths.sort_unstable();
        paths.dedup();
        paths
    }

    fn any_path() -> impl Strategy<Value = String> {
        prop_oneof![
            prop::sample::select(known_paths()).prop_map(str::to_string),
            "/[a-z\\-]{0,16}",
        ]
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    #[test]
    fn loading_suspends_every_path() {
        let session = Session::new();
        for path in known_paths() {
            assert_eq!(authorize_route(&session, path), GuardDecision::Suspend);
        }
    }

    #[test]
    fn unauthenticated_sees_login_page() {
        let session = Session::unauthenticated();
        assert_eq!(authorize_route(&session, "/login"), GuardDecision::Render(RenderTarget::Login));
        assert_eq!(authorize_route(&session, "/login/"), GuardDecision::Render(RenderTarget::Login));
        assert_eq!(authorize_route(&session, "/dashboard"), GuardDecision::RedirectTo("/login"));
    }

    #[test]
    fn executive_asking_for_manager_page_goes_to_my_projects() {
        let session = session_for(Role::Executive);
        assert_eq!(authorize_route(&session, "/team-members"), GuardDecision::RedirectTo("/my-projects"));
    }

    #[test]
    fn signed_in_team_lead_is_bounced_off_login() {
        let session = session_for(Role::TeamLead);
        assert_eq!(authorize_route(&session, "/login"), GuardDecision::RedirectTo("/dashboard"));
    }

    #[test]
    fn root_redirects_to_role_default() {
        assert_eq!(authorize_route(&session_for(Role::Manager), "/"), GuardDecision::RedirectTo("/dashboard"));
    }

    #[test]
    fn permitted_route_renders_its_entry() {
        let session = session_for(Role::Manager);
        let GuardDecision::Render(RenderTarget::Route(entry)) = authorize_route(&session, "/salary?month=May") else {
            panic!("expected salary page to render");
        };
        assert_eq!(entry.path, "/salary");
        assert_eq!(entry.label, "Salary");
    }

    #[test]
    fn unrecognized_role_forces_logout_everywhere() {
        let session = session_for(RoleClaim::Unrecognized("intern".into()));
        for path in known_paths() {
            assert_eq!(authorize_route(&session, path), GuardDecision::ForceLogout, "{path}");
        }
    }

    #[test]
    fn only_unrecognized_roles_require_logout() {
        let unknown = session_for(RoleClaim::Unrecognized("intern".into()));
        assert!(authorize_route(&unknown, "/dashboard").requires_logout());

        for path in known_paths() {
            for session in [Session::new(), Session::unauthenticated(), session_for(Role::TeamLead)] {
                assert!(!authorize_route(&session, path).requires_logout(), "{path}");
            }
        }
    }

    #[test]
    fn explanation_names_the_rule() {
        let guard = RouteGuard::standard();
        let explanation = guard.explain(&session_for(Role::Executive), "/salary/");
        assert_eq!(explanation.path, "/salary");
        assert_eq!(explanation.rule, GuardRule::RouteNotPermitted);
        assert_eq!(explanation.decision, GuardDecision::RedirectTo("/my-projects"));
        assert!(explanation.reason.contains("/salary"));
    }

    #[test]
    fn guard_honours_custom_landing() {
        let table = RoutePermissionTable::standard()
            .with_default_path(Role::TeamLead, "/team")
            .unwrap();
        let guard = RouteGuard::new(&table);
        let session = session_for(Role::TeamLead);
        assert_eq!(guard.decide(&session, "/login"), GuardDecision::RedirectTo("/team"));
        assert_eq!(guard.landing_path(&session), Some("/team"));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Without a session, everything except the login page redirects to it.
        #[test]
        fn unauthenticated_redirects_to_login(path in any_path()) {
            let decision = authorize_route(&Session::unauthenticated(), &path);
            if normalize_path(&path) == LOGIN_PATH {
                prop_assert_eq!(decision, GuardDecision::Render(RenderTarget::Login));
            } else {
                prop_assert_eq!(decision, GuardDecision::RedirectTo(LOGIN_PATH));
            }
        }

        /// A path outside the role's set always redirects to the role default.
        #[test]
        fn unlisted_paths_redirect_to_default(role in any_role(), path in any_path()) {
            let set = RoutePermissionTable::standard_ref().for_role(role);
            prop_assume!(!set.contains(&normalize_path(&path)));

            let decision = authorize_route(&session_for(role), &path);
            prop_assert_eq!(decision, GuardDecision::RedirectTo(set.default_path()));
        }

        /// Reachable paths are exactly the role's listed paths.
        #[test]
        fn reachable_set_equals_route_set(role in any_role(), path in any_path()) {
            let set = RoutePermissionTable::standard_ref().for_role(role);
            let rendered = matches!(
                authorize_route(&session_for(role), &path),
                GuardDecision::Render(RenderTarget::Route(_))
            );
            prop_assert_eq!(rendered, set.contains(&normalize_path(&path)));
        }
    }
}

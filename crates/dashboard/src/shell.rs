//! Shell: the top-level screen for the current session and location.
//!
//! [`Dashboard`] ties the Session Store, Route Guard, Role Router and page
//! loaders together. Every screen it produces is one of loading, the login
//! page, or the layout (header, profile, navigation, page).

use std::fmt;

use serde::Serialize;

use graphura_auth::{
    GuardDecision, LOGIN_PATH, Navigation, PageId, RenderTarget, Resolution, RoleRouter, RouteEntry, RouteGuard,
    RoutePermissionTable, Session, SessionStatus, User, normalize_path, render_navigation,
};
use graphura_client::types::{
    LoginRequest, PasswordUpdate, ProfileUpdate, Project, Review, ReviewStatus, SignupRequest, TaskAssignment,
    TeamMember,
};
use graphura_client::{ApiClient, ApiError, SessionError, SessionStore, TokenStore};
use graphura_core::{ProjectId, ReviewId, UserId};

use crate::pages::{PageFilters, PageState, PageTable, load_page};

pub const APP_TITLE: &str = "Graphura";

/// Guard redirects followed by one navigation before giving up.
const MAX_REDIRECTS: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("too many redirects while opening '{0}'")]
    RedirectLoop(String),

    #[error("not signed in")]
    SignedOut,

    /// The action belongs to a page outside the session's route set.
    #[error("{0} is not available to your role")]
    NotPermitted(&'static str),
}

/// Sidebar identity block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileBlock {
    pub name: String,
    /// Display form of the role, e.g. "Team Lead".
    pub role: String,
    pub avatar: String,
}

impl ProfileBlock {
    pub fn for_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            role: user.role.display_name(),
            avatar: user.avatar_url().to_string(),
        }
    }
}

/// Everything shown around and inside an authorized page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: &'static str,
    pub profile: ProfileBlock,
    pub navigation: Navigation,
    pub route: RouteEntry,
    pub page: PageState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    /// Neutral placeholder while the session is validated.
    Loading,
    Login,
    Layout(Box<Layout>),
}

impl Screen {
    pub fn layout(&self) -> Option<&Layout> {
        match self {
            Screen::Layout(layout) => Some(layout),
            _ => None,
        }
    }
}

/// Session-aware shell over a token store and the API.
#[derive(Debug)]
pub struct Dashboard<S: TokenStore> {
    api: ApiClient,
    store: SessionStore<S>,
    permissions: RoutePermissionTable,
    location: String,
}

impl<S: TokenStore> Dashboard<S> {
    pub fn new(api: ApiClient, tokens: S, permissions: RoutePermissionTable) -> Self {
        Self {
            api,
            store: SessionStore::new(tokens),
            permissions,
            location: LOGIN_PATH.to_string(),
        }
    }

    pub fn session(&self) -> &Session {
        self.store.session()
    }

    pub fn status(&self) -> SessionStatus {
        self.store.status()
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Path of the last screen produced.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn guard(&self) -> RouteGuard<'_> {
        RouteGuard::new(&self.permissions)
    }

    /// Restore the session from the persisted token.
    pub async fn start(&mut self) -> Result<SessionStatus, DashboardError> {
        let status = self.store.initialize(&self.api).await?;
        self.api.set_token(self.store.session().token().cloned());
        Ok(status)
    }

    /// Sign in, persist the session and land on the role's default page.
    pub async fn login(&mut self, request: &LoginRequest) -> Result<Screen, DashboardError> {
        let success = self.api.login(request).await?;
        self.store.login(success.user, success.token.clone())?;
        self.api.set_token(Some(success.token));
        self.navigate(LOGIN_PATH).await
    }

    /// Save profile edits and refresh the session's user record.
    ///
    /// The role stays the one the session started with; a role change only
    /// takes effect after signing in again.
    pub async fn update_profile(&mut self, update: &ProfileUpdate) -> Result<User, DashboardError> {
        let mut user = self.api.update_me(update).await?;
        let session = self.store.session();
        if let (Some(token), Some(current)) = (session.token().cloned(), session.user()) {
            if user.role != current.role {
                tracing::warn!(
                    session_role = %current.role,
                    returned_role = %user.role,
                    "profile update reported a different role; keeping the session role"
                );
                user.role = current.role.clone();
            }
            self.store.login(user.clone(), token)?;
        }
        Ok(user)
    }

    /// Change the password. A token reissued by the API replaces the
    /// persisted one.
    pub async fn change_password(&mut self, update: &PasswordUpdate) -> Result<(), DashboardError> {
        let reissued = self.api.update_my_password(update).await?;
        if let (Some(token), Some(user)) = (reissued, self.store.session().user().cloned()) {
            self.store.login(user, token.clone())?;
            self.api.set_token(Some(token));
        }
        Ok(())
    }

    /// Sign out. Idempotent.
    pub fn logout(&mut self) {
        self.store.logout();
        self.api.set_token(None);
        self.location = LOGIN_PATH.to_string();
    }

    /// Menu for the current session, highlighting `current_path`. Empty when
    /// there is no routed session.
    pub fn navigation(&self, current_path: &str) -> Navigation {
        RoleRouter::new(&self.permissions)
            .for_session(self.store.session(), |entry| entry.page)
            .map(|table| render_navigation(&table, current_path))
            .unwrap_or_default()
    }

    /// Run the guard on `path`, following redirects, and build the final
    /// screen. A forced logout ends on the login page. Filters in the query
    /// string (`?month=May`) narrow the page.
    pub async fn navigate(&mut self, path: &str) -> Result<Screen, DashboardError> {
        self.open(path, &PageFilters::from_path(path)).await
    }

    /// [`navigate`](Self::navigate) with explicit page filters.
    pub async fn open(&mut self, path: &str, filters: &PageFilters) -> Result<Screen, DashboardError> {
        let mut path = normalize_path(path);

        for _ in 0..=MAX_REDIRECTS {
            let explanation = self.guard().explain(self.store.session(), &path);
            tracing::debug!(
                path = %explanation.path,
                rule = ?explanation.rule,
                reason = %explanation.reason,
                "route guard"
            );

            match explanation.decision {
                GuardDecision::Suspend => return Ok(Screen::Loading),
                GuardDecision::Render(RenderTarget::Login) => {
                    self.location = LOGIN_PATH.to_string();
                    return Ok(Screen::Login);
                }
                GuardDecision::Render(RenderTarget::Route(entry)) => {
                    self.location = entry.path.to_string();
                    return Ok(self.layout(entry, filters).await);
                }
                GuardDecision::RedirectTo(target) => path = target.to_string(),
                GuardDecision::ForceLogout => {
                    tracing::warn!(
                        role = ?self.store.session().role().map(|r| r.as_str()),
                        "role has no route set; ending session"
                    );
                    self.logout();
                    path = LOGIN_PATH.to_string();
                }
            }
        }

        Err(DashboardError::RedirectLoop(path))
    }

    async fn layout(&self, entry: RouteEntry, filters: &PageFilters) -> Screen {
        let session = self.store.session();
        let (Some(user), Some(table)) = (
            session.user(),
            RoleRouter::new(&self.permissions).for_session(session, |e| e.page),
        ) else {
            return Screen::Login;
        };

        let page: PageId = match table.resolve(entry.path) {
            Resolution::Matched { content, .. } => *content,
            Resolution::Fallback(_) => entry.page,
        };

        let state = PageState::from(load_page(&self.api, page, user, filters).await);
        if let PageState::Failed { message, .. } = &state {
            tracing::warn!(page = page.title(), %message, "page failed to load");
        }

        Screen::Layout(Box::new(Layout {
            title: APP_TITLE,
            profile: ProfileBlock::for_user(user),
            navigation: render_navigation(&table, entry.path),
            route: entry,
            page: state,
        }))
    }

    // ── Page actions ────────────────────────────────────────────────────────

    /// The API client, if the session's role can reach `page`.
    fn api_for(&self, page: PageId) -> Result<&ApiClient, DashboardError> {
        let role = self.store.session().role().ok_or(DashboardError::SignedOut)?;
        let permitted = self
            .permissions
            .routes_for(role)
            .is_some_and(|set| set.entries().iter().any(|entry| entry.page == page));
        if permitted {
            Ok(&self.api)
        } else {
            Err(DashboardError::NotPermitted(page.title()))
        }
    }

    /// Add a team member (Team Members page).
    pub async fn add_member(&self, request: &SignupRequest) -> Result<TeamMember, DashboardError> {
        let member = self.api_for(PageId::TeamMembers)?.create_user(request).await?;
        tracing::info!(user_id = %member.id, role = %member.role, "team member added");
        Ok(member)
    }

    /// Remove a team member (Team Members page).
    pub async fn remove_member(&self, id: &UserId) -> Result<(), DashboardError> {
        self.api_for(PageId::TeamMembers)?.delete_user(id).await?;
        tracing::info!(user_id = %id, "team member removed");
        Ok(())
    }

    /// Approve or reject a pending review (Review page).
    pub async fn decide_review(&self, id: &ReviewId, status: ReviewStatus) -> Result<Review, DashboardError> {
        Ok(self.api_for(PageId::Review)?.update_review(id, &status).await?)
    }

    /// Projects of one member of the team report.
    pub async fn member_projects(&self, member: &UserId) -> Result<Vec<Project>, DashboardError> {
        Ok(self.api_for(PageId::TeamReport)?.member_projects(member).await?)
    }

    /// Hand tasks of a project to team members (Projects page).
    pub async fn assign_tasks(&self, project: &ProjectId, tasks: &[TaskAssignment]) -> Result<Project, DashboardError> {
        Ok(self.api_for(PageId::TotalProjects)?.assign_tasks(project, tasks).await?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Terminal rendering
// ─────────────────────────────────────────────────────────────────────────────

/// One line per menu item, the active one marked with `>`.
pub fn navigation_text(navigation: &Navigation) -> String {
    navigation
        .items
        .iter()
        .map(|item| {
            let marker = if item.active { '>' } else { ' ' };
            format!("{marker} {:<20} {}\n", item.label, item.path)
        })
        .collect()
}

fn write_table(f: &mut fmt::Formatter<'_>, table: &PageTable) -> fmt::Result {
    if table.is_empty() {
        return writeln!(f, "(nothing to show)");
    }

    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    for row in &table.rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(f, "{}", line(table.columns.clone()))?;
    for row in &table.rows {
        writeln!(f, "{}", line(row.iter().map(String::as_str).collect()))?;
    }
    Ok(())
}

impl fmt::Display for PageTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_table(f, self)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Loading => writeln!(f, "Loading..."),
            Screen::Login => writeln!(f, "Not signed in. Run `graphura login` first."),
            Screen::Layout(layout) => {
                writeln!(f, "{} | {} ({})", layout.title, layout.profile.name, layout.profile.role)?;
                writeln!(f)?;
                write!(f, "{}", navigation_text(&layout.navigation))?;
                writeln!(f)?;
                writeln!(f, "== {} ==", layout.route.page.title())?;
                match &layout.page {
                    PageState::Loading => writeln!(f, "Loading..."),
                    PageState::Ready(content) => write_table(f, &content.table()),
                    PageState::Failed { message, .. } => {
                        writeln!(f, "Error: {message}")?;
                        if layout.page.can_retry() {
                            writeln!(f, "(temporary failure; try again)")?;
                        }
                        Ok(())
                    }
                }
            }
        }
    }
}

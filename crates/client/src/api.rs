//! REST client for the Graphura API.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use graphura_auth::{AuthToken, Role, User};
use graphura_core::{ProjectId, ReviewId, UserId};

use crate::error::ApiError;
use crate::types::{
    AssignTasksBody, DashboardStats, Envelope, ErrorBody, LoginEnvelope, LoginRequest, LoginSuccess, PasswordUpdate,
    Payout, PayoutsData, ProfileUpdate, Project, ProjectData, ProjectStatus, ProjectsData, ReceivedData,
    ReceivedRecord, Review, ReviewData, ReviewStatus, ReviewUpdate, ReviewsData, SalariesData, SalaryRecord,
    SignupRequest, TaskAssignment, Team, TeamLeadReview, TeamLeadReviewFilter, TeamMember, TeamReport, TeamsData,
    UserData, UsersData,
};

/// Resolves a token to the user it belongs to ("whoami").
///
/// Futures are not required to be `Send`: the session core runs on a single
/// cooperative thread, including in the browser.
#[async_trait(?Send)]
pub trait IdentityProvider {
    async fn whoami(&self, token: &AuthToken) -> Result<User, ApiError>;
}

/// Client for the Graphura API.
///
/// Requests carry the bearer token when the client holds one. Login and
/// signup never do.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<AuthToken>,
}

#[derive(Debug, Deserialize)]
struct PasswordChanged {
    #[serde(default)]
    token: Option<AuthToken>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            token: None,
        }
    }

    pub fn with_token(mut self, token: AuthToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn set_token(&mut self, token: Option<AuthToken>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn anonymous(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(method = %method, path, "api request");
        self.http.request(method, self.url(path))
    }

    fn authed(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.anonymous(method, path);
        match &self.token {
            Some(token) => req.bearer_auth(token.expose()),
            None => req,
        }
    }

    async fn execute(req: RequestBuilder) -> Result<Response, ApiError> {
        let resp = req.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(error_from_response(resp).await)
        }
    }

    async fn fetch<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, ApiError> {
        let resp = Self::execute(req).await?;
        resp.json::<T>().await.map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn fetch_data<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, ApiError> {
        Ok(Self::fetch::<Envelope<T>>(req).await?.data)
    }

    // ── Auth ────────────────────────────────────────────────────────────────

    /// `POST /api/auth/login`.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginSuccess, ApiError> {
        let req = self.anonymous(Method::POST, "/api/auth/login").json(request);
        let body: LoginEnvelope = Self::fetch(req).await?;
        tracing::info!(user_id = %body.data.user.id, role = %body.data.user.role, "signed in");
        Ok(LoginSuccess {
            user: body.data.user,
            token: body.token,
        })
    }

    /// `POST /api/auth/signup`.
    pub async fn signup(&self, request: &SignupRequest) -> Result<User, ApiError> {
        let req = self.anonymous(Method::POST, "/api/auth/signup").json(request);
        Ok(Self::fetch_data::<UserData>(req).await?.user)
    }

    /// `GET /api/users/me` with the client's own token.
    pub async fn me(&self) -> Result<User, ApiError> {
        let req = self.authed(Method::GET, "/api/users/me");
        Ok(Self::fetch_data::<UserData>(req).await?.user)
    }

    /// `PATCH /api/users/updateMe`.
    pub async fn update_me(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let req = self.authed(Method::PATCH, "/api/users/updateMe").json(update);
        Ok(Self::fetch_data::<UserData>(req).await?.user)
    }

    /// `PATCH /api/users/updateMyPassword`. Returns a fresh token if the API
    /// issued one.
    pub async fn update_my_password(&self, update: &PasswordUpdate) -> Result<Option<AuthToken>, ApiError> {
        let req = self.authed(Method::PATCH, "/api/users/updateMyPassword").json(update);
        Ok(Self::fetch::<PasswordChanged>(req).await?.token)
    }

    // ── Team administration ─────────────────────────────────────────────────

    /// `GET /api/users`, optionally filtered by role (`?role=a&role=b`).
    pub async fn list_users(&self, roles: &[Role]) -> Result<Vec<TeamMember>, ApiError> {
        let query: Vec<(&str, &str)> = roles.iter().map(|r| ("role", r.as_str())).collect();
        let req = self.authed(Method::GET, "/api/users").query(&query);
        Ok(Self::fetch_data::<UsersData<TeamMember>>(req).await?.users)
    }

    /// `POST /api/users`.
    pub async fn create_user(&self, request: &SignupRequest) -> Result<TeamMember, ApiError> {
        #[derive(Deserialize)]
        struct Created {
            user: TeamMember,
        }

        let req = self.authed(Method::POST, "/api/users").json(request);
        Ok(Self::fetch_data::<Created>(req).await?.user)
    }

    /// `DELETE /api/users/:id`.
    pub async fn delete_user(&self, id: &UserId) -> Result<(), ApiError> {
        let req = self.authed(Method::DELETE, &format!("/api/users/{id}"));
        Self::execute(req).await?;
        Ok(())
    }

    // ── Projects ────────────────────────────────────────────────────────────

    /// `GET /api/projects`, optionally `?status=`.
    pub async fn projects(&self, status: Option<ProjectStatus>) -> Result<Vec<Project>, ApiError> {
        let mut req = self.authed(Method::GET, "/api/projects");
        if let Some(status) = status {
            req = req.query(&[("status", status.as_str())]);
        }
        Ok(Self::fetch_data::<ProjectsData>(req).await?.projects)
    }

    /// `PATCH /api/projects/:id/assign-task`.
    pub async fn assign_tasks(&self, project: &ProjectId, tasks: &[TaskAssignment]) -> Result<Project, ApiError> {
        let req = self
            .authed(Method::PATCH, &format!("/api/projects/{project}/assign-task"))
            .json(&AssignTasksBody { tasks });
        Ok(Self::fetch_data::<ProjectData>(req).await?.project)
    }

    /// `GET /api/executive/my-projects`.
    pub async fn my_projects(&self) -> Result<Vec<Project>, ApiError> {
        let req = self.authed(Method::GET, "/api/executive/my-projects");
        Ok(Self::fetch_data::<ProjectsData>(req).await?.projects)
    }

    /// `GET /api/executive/completed-projects`.
    pub async fn completed_projects(&self) -> Result<Vec<Project>, ApiError> {
        let req = self.authed(Method::GET, "/api/executive/completed-projects");
        Ok(Self::fetch_data::<ProjectsData>(req).await?.projects)
    }

    /// `GET /api/executive/my-payout`.
    pub async fn my_payout(&self) -> Result<Vec<Payout>, ApiError> {
        let req = self.authed(Method::GET, "/api/executive/my-payout");
        Ok(Self::fetch_data::<PayoutsData>(req).await?.payouts)
    }

    // ── Teams and reports ───────────────────────────────────────────────────

    /// `GET /api/teams`.
    pub async fn teams(&self) -> Result<Vec<Team>, ApiError> {
        let req = self.authed(Method::GET, "/api/teams");
        Ok(Self::fetch_data::<TeamsData>(req).await?.teams)
    }

    /// `GET /api/reports/team-report`.
    pub async fn team_report(&self) -> Result<TeamReport, ApiError> {
        let req = self.authed(Method::GET, "/api/reports/team-report");
        Self::fetch_data(req).await
    }

    /// `GET /api/reports/team-report/projects/:userId`.
    pub async fn member_projects(&self, user: &UserId) -> Result<Vec<Project>, ApiError> {
        let req = self.authed(Method::GET, &format!("/api/reports/team-report/projects/{user}"));
        Ok(Self::fetch_data::<ProjectsData>(req).await?.projects)
    }

    // ── Reviews ─────────────────────────────────────────────────────────────

    /// `GET /api/reviews`.
    pub async fn reviews(&self) -> Result<Vec<Review>, ApiError> {
        let req = self.authed(Method::GET, "/api/reviews");
        Ok(Self::fetch_data::<ReviewsData>(req).await?.reviews)
    }

    /// `PATCH /api/reviews/:id` with a new status.
    pub async fn update_review(&self, id: &ReviewId, status: &ReviewStatus) -> Result<Review, ApiError> {
        let req = self
            .authed(Method::PATCH, &format!("/api/reviews/{id}"))
            .json(&ReviewUpdate { status });
        Ok(Self::fetch_data::<ReviewData>(req).await?.review)
    }

    /// `GET /api/tl/reviews`.
    pub async fn team_lead_reviews(&self, filter: &TeamLeadReviewFilter) -> Result<Vec<TeamLeadReview>, ApiError> {
        let req = self.authed(Method::GET, "/api/tl/reviews").query(&filter.query());
        Self::fetch_data(req).await
    }

    // ── Payroll, dashboard, received data ───────────────────────────────────

    /// `GET /api/salaries`.
    pub async fn salaries(&self) -> Result<Vec<SalaryRecord>, ApiError> {
        let req = self.authed(Method::GET, "/api/salaries");
        Ok(Self::fetch_data::<SalariesData>(req).await?.salaries)
    }

    /// `GET /api/dashboard/stats`.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let req = self.authed(Method::GET, "/api/dashboard/stats");
        Self::fetch_data(req).await
    }

    /// `GET /api/received-data`.
    pub async fn received_data(&self) -> Result<Vec<ReceivedRecord>, ApiError> {
        let req = self.authed(Method::GET, "/api/received-data");
        Ok(Self::fetch_data::<ReceivedData>(req).await?.data)
    }
}

#[async_trait(?Send)]
impl IdentityProvider for ApiClient {
    /// `GET /api/users/me` with an explicit token.
    async fn whoami(&self, token: &AuthToken) -> Result<User, ApiError> {
        let req = self
            .anonymous(Method::GET, "/api/users/me")
            .bearer_auth(token.expose());
        Ok(Self::fetch_data::<UserData>(req).await?.user)
    }
}

async fn error_from_response(resp: Response) -> ApiError {
    let status = resp.status();
    let message = resp
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP error! Status: {}", status.as_u16()));

    tracing::debug!(status = status.as_u16(), %message, "api request failed");

    if status == StatusCode::UNAUTHORIZED {
        ApiError::Unauthorized { message }
    } else {
        ApiError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

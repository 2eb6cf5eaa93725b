use axum::Json;
use axum::Router;
use axum::extract::{Path, RawQuery};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use serde_json::{Value, json};

use graphura_auth::{AuthToken, Role, RoleClaim, RoutePermissionTable, SessionStatus};
use graphura_client::types::{LoginRequest, ProfileUpdate, ReviewStatus, SignupRequest, TaskAssignment};
use graphura_client::{ApiClient, MemoryTokenStore};
use graphura_core::{Email, PasswordPair, ProjectId, ReviewId, UserId};
use graphura_dashboard::{Dashboard, DashboardError, PageContent, PageFilters, PageState, Screen};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let app = Router::new()
            .route("/api/users/me", get(me))
            .route("/api/auth/login", post(login))
            .route("/api/dashboard/stats", get(stats))
            .route("/api/executive/my-projects", get(my_projects))
            .route("/api/received-data", get(forbidden))
            .route("/api/teams", get(unavailable))
            .route("/api/salaries", get(salaries))
            .route("/api/users", get(team_leads).post(create_user))
            .route("/api/users/updateMe", patch(update_me))
            .route("/api/users/:id", delete(delete_user))
            .route("/api/reviews/:id", patch(update_review))
            .route("/api/tl/reviews", get(tl_reviews))
            .route("/api/reports/team-report/projects/:id", get(member_projects))
            .route("/api/projects/:id/assign-task", patch(assign_task));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn dashboard(&self, tokens: MemoryTokenStore) -> Dashboard<MemoryTokenStore> {
        Dashboard::new(ApiClient::new(&self.base_url), tokens, RoutePermissionTable::standard())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn token(raw: &str) -> AuthToken {
    AuthToken::new(raw).unwrap()
}

fn user_json(id: &str, name: &str, role: &str) -> Value {
    json!({ "_id": id, "name": name, "email": format!("{id}@graphura.in"), "role": role })
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

async fn me(headers: HeaderMap) -> Response {
    let user = match bearer(&headers) {
        Some("manager-token") => user_json("m-1", "Nisha", "manager"),
        Some("lead-token") => user_json("t-1", "Sana", "teamlead"),
        Some("exec-token") => user_json("e-1", "Ravi", "executive"),
        Some("intern-token") => user_json("i-1", "Kabir", "intern"),
        _ => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "status": "fail", "message": "Invalid token. Please log in again!" })),
            )
                .into_response();
        }
    };
    Json(json!({ "status": "success", "data": { "user": user } })).into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] != "secret" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "status": "fail", "message": "Incorrect email or password" })),
        )
            .into_response();
    }
    Json(json!({
        "status": "success",
        "token": "manager-token",
        "data": { "user": user_json("m-1", "Nisha", "manager") }
    }))
    .into_response()
}

async fn stats(headers: HeaderMap) -> Response {
    if bearer(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({
        "status": "success",
        "data": { "totalProjects": 12, "currentProjects": 5.0, "completedProjects": null, "totalIncome": 1500.5 }
    }))
    .into_response()
}

async fn my_projects() -> Response {
    Json(json!({
        "status": "success",
        "data": { "projects": [ { "_id": "p-1", "companyName": "Acme", "serviceName": "SEO" } ] }
    }))
    .into_response()
}

async fn salaries() -> Response {
    Json(json!({
        "status": "success",
        "data": { "salaries": [
            { "_id": "s-1", "name": "Ravi", "tlId": "t-1", "month": "May", "amount": 100 },
            { "_id": "s-2", "name": "Asha", "tlId": "t-2", "month": "June", "amount": null },
            { "_id": "s-3", "name": "Dev", "tlId": "t-2", "month": "may", "amount": "250" }
        ] }
    }))
    .into_response()
}

async fn team_leads() -> Response {
    Json(json!({ "status": "success", "data": { "users": [ user_json("t-1", "Sana", "teamlead") ] } })).into_response()
}

async fn create_user(Json(body): Json<Value>) -> Response {
    let user = json!({ "_id": "u-9", "name": body["name"], "email": body["email"], "role": body["role"] });
    (StatusCode::CREATED, Json(json!({ "status": "success", "data": { "user": user } }))).into_response()
}

async fn delete_user(Path(id): Path<String>) -> Response {
    if id == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "fail", "message": "No user found with that ID" })),
        )
            .into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn update_me(Json(body): Json<Value>) -> Response {
    let mut user = user_json("m-1", "Nisha", "executive");
    user["name"] = body["name"].clone();
    Json(json!({ "status": "success", "data": { "user": user } })).into_response()
}

async fn update_review(Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    Json(json!({ "status": "success", "data": { "review": { "_id": id, "status": body["status"] } } })).into_response()
}

async fn tl_reviews(RawQuery(query): RawQuery) -> Response {
    Json(json!({
        "status": "success",
        "data": [ { "_id": "r-1", "companyName": "Acme", "serviceName": "SEO", "comment": query } ]
    }))
    .into_response()
}

async fn member_projects(Path(id): Path<String>) -> Response {
    Json(json!({
        "status": "success",
        "data": { "projects": [ { "_id": format!("p-{id}"), "companyName": "Acme", "serviceName": "SEO" } ] }
    }))
    .into_response()
}

async fn assign_task(Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    let tasks = body["tasks"].as_array().map(Vec::len).unwrap_or_default();
    Json(json!({
        "status": "success",
        "data": { "project": {
            "_id": id,
            "companyName": "Acme",
            "serviceName": "SEO",
            "status": format!("{tasks} tasks assigned")
        } }
    }))
    .into_response()
}

async fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "status": "fail", "message": "You do not have permission to perform this action" })),
    )
        .into_response()
}

async fn unavailable() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "status": "error", "message": "Service temporarily unavailable" })),
    )
        .into_response()
}

fn layout_path(screen: &Screen) -> &'static str {
    screen.layout().expect("expected the dashboard layout").route.path
}

// ─────────────────────────────────────────────────────────────────────────────
// Startup
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn shows_loading_before_start() {
    let srv = TestServer::spawn().await;
    let mut dashboard = srv.dashboard(MemoryTokenStore::with_token(token("manager-token")));

    let screen = dashboard.navigate("/dashboard").await.unwrap();

    assert_eq!(screen, Screen::Loading);
    assert_eq!(dashboard.status(), SessionStatus::Loading);
}

#[tokio::test]
async fn signed_out_visitor_is_sent_to_login() {
    let srv = TestServer::spawn().await;
    let mut dashboard = srv.dashboard(MemoryTokenStore::new());

    assert_eq!(dashboard.start().await.unwrap(), SessionStatus::Unauthenticated);
    let screen = dashboard.navigate("/salary").await.unwrap();

    assert_eq!(screen, Screen::Login);
    assert_eq!(dashboard.location(), "/login");
}

// ─────────────────────────────────────────────────────────────────────────────
// Role routing
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn executive_is_redirected_from_manager_page() {
    let srv = TestServer::spawn().await;
    let mut dashboard = srv.dashboard(MemoryTokenStore::with_token(token("exec-token")));
    dashboard.start().await.unwrap();

    let screen = dashboard.navigate("/team-members").await.unwrap();

    assert_eq!(layout_path(&screen), "/my-projects");
    assert_eq!(dashboard.location(), "/my-projects");

    let layout = screen.layout().unwrap();
    assert_eq!(layout.profile.role, "Executive");
    assert_eq!(layout.navigation.active().map(|i| i.path), Some("/my-projects"));
    match &layout.page {
        PageState::Ready(PageContent::Projects(projects)) => {
            assert_eq!(projects.len(), 1);
            assert_eq!(projects[0].company_name, "Acme");
        }
        other => panic!("unexpected page state: {other:?}"),
    }
}

#[tokio::test]
async fn team_lead_alias_gets_team_lead_menu() {
    let srv = TestServer::spawn().await;
    let mut dashboard = srv.dashboard(MemoryTokenStore::with_token(token("lead-token")));
    dashboard.start().await.unwrap();

    let screen = dashboard.navigate("/help").await.unwrap();
    let layout = screen.layout().unwrap();

    let expected: Vec<&str> = RoutePermissionTable::standard_ref()
        .for_role(Role::TeamLead)
        .paths()
        .collect();
    assert_eq!(layout.navigation.paths().collect::<Vec<_>>(), expected);
    assert_eq!(layout.page, PageState::Ready(PageContent::Help));
    assert_eq!(dashboard.navigation("/help"), layout.navigation);
}

#[tokio::test]
async fn unknown_role_is_logged_out() {
    let srv = TestServer::spawn().await;
    let tokens = MemoryTokenStore::with_token(token("intern-token"));
    let mut dashboard = srv.dashboard(tokens.clone());
    assert_eq!(dashboard.start().await.unwrap(), SessionStatus::Authenticated);

    let screen = dashboard.navigate("/dashboard").await.unwrap();

    assert_eq!(screen, Screen::Login);
    assert_eq!(dashboard.status(), SessionStatus::Unauthenticated);
    assert_eq!(tokens.current(), None);
    assert!(dashboard.navigation("/dashboard").is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Login / logout
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_lands_on_default_page_with_loaded_data() {
    let srv = TestServer::spawn().await;
    let tokens = MemoryTokenStore::new();
    let mut dashboard = srv.dashboard(tokens.clone());
    dashboard.start().await.unwrap();

    let request = LoginRequest::new("nisha@graphura.in", "secret").unwrap();
    let screen = dashboard.login(&request).await.unwrap();

    assert_eq!(layout_path(&screen), "/dashboard");
    assert_eq!(tokens.current(), Some(token("manager-token")));
    match &screen.layout().unwrap().page {
        PageState::Ready(PageContent::Dashboard(stats)) => {
            assert_eq!(stats.total_projects, 12);
            assert_eq!(stats.current_projects, 5);
            assert_eq!(stats.completed_projects, 0);
            assert_eq!(stats.total_income, 1500.5);
        }
        other => panic!("unexpected page state: {other:?}"),
    }
}

#[tokio::test]
async fn failed_login_keeps_visitor_signed_out() {
    let srv = TestServer::spawn().await;
    let tokens = MemoryTokenStore::new();
    let mut dashboard = srv.dashboard(tokens.clone());
    dashboard.start().await.unwrap();

    let request = LoginRequest::new("nisha@graphura.in", "nope").unwrap();
    let err = dashboard.login(&request).await.unwrap_err();

    assert_eq!(err.to_string(), "Incorrect email or password");
    assert_eq!(dashboard.status(), SessionStatus::Unauthenticated);
    assert_eq!(tokens.current(), None);
}

#[tokio::test]
async fn logout_returns_to_login() {
    let srv = TestServer::spawn().await;
    let tokens = MemoryTokenStore::with_token(token("manager-token"));
    let mut dashboard = srv.dashboard(tokens.clone());
    dashboard.start().await.unwrap();

    dashboard.logout();
    dashboard.logout();
    let screen = dashboard.navigate("/dashboard").await.unwrap();

    assert_eq!(screen, Screen::Login);
    assert_eq!(tokens.current(), None);
}

// ─────────────────────────────────────────────────────────────────────────────
// Page failures
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn page_failure_does_not_end_session() {
    let srv = TestServer::spawn().await;
    let mut dashboard = srv.dashboard(MemoryTokenStore::with_token(token("manager-token")));
    dashboard.start().await.unwrap();

    let screen = dashboard.navigate("/transfer-data").await.unwrap();

    assert_eq!(layout_path(&screen), "/transfer-data");
    assert_eq!(
        screen.layout().unwrap().page,
        PageState::Failed {
            message: "You do not have permission to perform this action".into(),
            retryable: false,
        }
    );
    assert_eq!(dashboard.status(), SessionStatus::Authenticated);
    assert!(screen.to_string().contains("Error: You do not have permission"));
    assert!(!screen.to_string().contains("try again"));
}

#[tokio::test]
async fn server_failure_offers_retry() {
    let srv = TestServer::spawn().await;
    let mut dashboard = srv.dashboard(MemoryTokenStore::with_token(token("lead-token")));
    dashboard.start().await.unwrap();

    let screen = dashboard.navigate("/team").await.unwrap();
    let page = &screen.layout().unwrap().page;

    assert!(page.can_retry());
    assert_eq!(dashboard.status(), SessionStatus::Authenticated);
    assert!(screen.to_string().contains("(temporary failure; try again)"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Page filters
// ─────────────────────────────────────────────────────────────────────────────

fn salary_ids(screen: &Screen) -> Vec<String> {
    match &screen.layout().unwrap().page {
        PageState::Ready(PageContent::Salary { records, .. }) => records.iter().map(|r| r.id.clone()).collect(),
        other => panic!("unexpected page state: {other:?}"),
    }
}

#[tokio::test]
async fn salary_month_comes_from_query() {
    let srv = TestServer::spawn().await;
    let mut dashboard = srv.dashboard(MemoryTokenStore::with_token(token("manager-token")));
    dashboard.start().await.unwrap();

    let screen = dashboard.navigate("/salary?month=May").await.unwrap();

    assert_eq!(dashboard.location(), "/salary");
    assert_eq!(salary_ids(&screen), ["s-1", "s-3"]);
    match &screen.layout().unwrap().page {
        PageState::Ready(PageContent::Salary { records, team_leads }) => {
            assert_eq!(records[1].amount, 250.0);
            assert_eq!(team_leads.len(), 1);
        }
        other => panic!("unexpected page state: {other:?}"),
    }
}

#[tokio::test]
async fn salary_filtered_by_team_lead() {
    let srv = TestServer::spawn().await;
    let mut dashboard = srv.dashboard(MemoryTokenStore::with_token(token("manager-token")));
    dashboard.start().await.unwrap();

    let filters = PageFilters {
        team_lead: Some(UserId::new("t-2").unwrap()),
        ..PageFilters::default()
    };
    let screen = dashboard.open("/salary", &filters).await.unwrap();

    assert_eq!(salary_ids(&screen), ["s-2", "s-3"]);

    let unfiltered = dashboard.navigate("/salary").await.unwrap();
    assert_eq!(salary_ids(&unfiltered), ["s-1", "s-2", "s-3"]);
}

#[tokio::test]
async fn team_lead_reviews_send_month_and_day() {
    let srv = TestServer::spawn().await;
    let mut dashboard = srv.dashboard(MemoryTokenStore::with_token(token("lead-token")));
    dashboard.start().await.unwrap();

    let screen = dashboard.navigate("/tlreview?month=May&day=12").await.unwrap();

    match &screen.layout().unwrap().page {
        PageState::Ready(PageContent::TeamLeadReviews(reviews)) => {
            assert_eq!(reviews.len(), 1);
            assert_eq!(reviews[0].comment.as_deref(), Some("month=May&day=12"));
        }
        other => panic!("unexpected page state: {other:?}"),
    }

    let plain = dashboard.navigate("/tlreview").await.unwrap();
    match &plain.layout().unwrap().page {
        PageState::Ready(PageContent::TeamLeadReviews(reviews)) => assert_eq!(reviews[0].comment, None),
        other => panic!("unexpected page state: {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Page actions
// ─────────────────────────────────────────────────────────────────────────────

async fn signed_in(srv: &TestServer, raw: &str) -> Dashboard<MemoryTokenStore> {
    let mut dashboard = srv.dashboard(MemoryTokenStore::with_token(token(raw)));
    dashboard.start().await.unwrap();
    dashboard
}

#[tokio::test]
async fn manager_approves_review() {
    let srv = TestServer::spawn().await;
    let dashboard = signed_in(&srv, "manager-token").await;

    let review = dashboard
        .decide_review(&ReviewId::new("rv-1").unwrap(), ReviewStatus::Approved)
        .await
        .unwrap();

    assert_eq!(review.id, ReviewId::new("rv-1").unwrap());
    assert_eq!(review.status, ReviewStatus::Approved);
}

#[tokio::test]
async fn executive_cannot_decide_reviews() {
    let srv = TestServer::spawn().await;
    let dashboard = signed_in(&srv, "exec-token").await;

    let err = dashboard
        .decide_review(&ReviewId::new("rv-1").unwrap(), ReviewStatus::Rejected)
        .await
        .unwrap_err();

    assert!(matches!(err, DashboardError::NotPermitted("Review")));
    assert_eq!(err.to_string(), "Review is not available to your role");
}

#[tokio::test]
async fn actions_need_a_session() {
    let srv = TestServer::spawn().await;
    let mut dashboard = srv.dashboard(MemoryTokenStore::new());
    dashboard.start().await.unwrap();

    let err = dashboard.remove_member(&UserId::new("e-7").unwrap()).await.unwrap_err();

    assert!(matches!(err, DashboardError::SignedOut));
}

#[tokio::test]
async fn manager_adds_and_removes_members() {
    let srv = TestServer::spawn().await;
    let dashboard = signed_in(&srv, "manager-token").await;

    let request = SignupRequest::new(
        "Meera",
        Email::parse("meera@graphura.in").unwrap(),
        "REF-7",
        Role::Executive,
        "Sales",
        PasswordPair::new("secret", "secret").unwrap(),
    )
    .unwrap();
    let member = dashboard.add_member(&request).await.unwrap();

    assert_eq!(member.id, UserId::new("u-9").unwrap());
    assert_eq!(member.name, "Meera");
    assert_eq!(member.role, RoleClaim::Known(Role::Executive));

    dashboard.remove_member(&member.id).await.unwrap();
    let err = dashboard.remove_member(&UserId::new("missing").unwrap()).await.unwrap_err();
    assert_eq!(err.to_string(), "No user found with that ID");
}

#[tokio::test]
async fn team_lead_cannot_manage_members() {
    let srv = TestServer::spawn().await;
    let dashboard = signed_in(&srv, "lead-token").await;

    let err = dashboard.remove_member(&UserId::new("e-7").unwrap()).await.unwrap_err();

    assert!(matches!(err, DashboardError::NotPermitted("Team Members")));
}

#[tokio::test]
async fn team_report_lists_member_projects() {
    let srv = TestServer::spawn().await;
    let dashboard = signed_in(&srv, "lead-token").await;

    let projects = dashboard.member_projects(&UserId::new("e-1").unwrap()).await.unwrap();

    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].id, ProjectId::new("p-e-1").unwrap());
}

#[tokio::test]
async fn team_lead_assigns_tasks() {
    let srv = TestServer::spawn().await;
    let dashboard = signed_in(&srv, "lead-token").await;

    let tasks = vec![
        TaskAssignment {
            name: "Keyword research".into(),
            user_id: UserId::new("e-1").unwrap(),
        },
        TaskAssignment {
            name: "Backlinks".into(),
            user_id: UserId::new("e-2").unwrap(),
        },
    ];
    let project = dashboard
        .assign_tasks(&ProjectId::new("p-1").unwrap(), &tasks)
        .await
        .unwrap();

    assert_eq!(project.id, ProjectId::new("p-1").unwrap());
    assert_eq!(project.status.as_deref(), Some("2 tasks assigned"));

    let executive = signed_in(&srv, "exec-token").await;
    let err = executive.assign_tasks(&ProjectId::new("p-1").unwrap(), &tasks).await.unwrap_err();
    assert!(matches!(err, DashboardError::NotPermitted("Total Projects")));
}

#[tokio::test]
async fn profile_update_keeps_session_role() {
    let srv = TestServer::spawn().await;
    let tokens = MemoryTokenStore::with_token(token("manager-token"));
    let mut dashboard = srv.dashboard(tokens.clone());
    dashboard.start().await.unwrap();

    let update = ProfileUpdate {
        name: Some("Nisha K".into()),
        ..ProfileUpdate::default()
    };
    let user = dashboard.update_profile(&update).await.unwrap();

    assert_eq!(user.name, "Nisha K");
    assert_eq!(user.role, RoleClaim::Known(Role::Manager));
    assert_eq!(dashboard.session().role(), Some(&RoleClaim::Known(Role::Manager)));
    assert_eq!(tokens.current(), Some(token("manager-token")));

    let screen = dashboard.navigate("/team-members").await.unwrap();
    assert_eq!(layout_path(&screen), "/team-members");
}

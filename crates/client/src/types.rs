//! Request and response shapes of the Graphura REST API.
//!
//! Response types are lenient: optional fields default, unknown fields are
//! ignored, and dates that are not RFC 3339 degrade to `None` instead of
//! failing the whole page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use graphura_auth::{AuthToken, Role, RoleClaim, User};
use graphura_core::{DomainError, Email, PasswordPair, ProjectId, ReviewId, TeamId, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// Envelopes
// ─────────────────────────────────────────────────────────────────────────────

/// `{ "status": "success", "data": ... }`
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserData {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UsersData<T> {
    #[serde(default = "Vec::new")]
    pub users: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectsData {
    #[serde(default)]
    pub projects: Vec<Project>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectData {
    pub project: Project,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PayoutsData {
    #[serde(default)]
    pub payouts: Vec<Payout>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TeamsData {
    #[serde(default)]
    pub teams: Vec<Team>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewsData {
    #[serde(default)]
    pub reviews: Vec<Review>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewData {
    pub review: Review,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SalariesData {
    #[serde(default)]
    pub salaries: Vec<SalaryRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReceivedData {
    #[serde(default)]
    pub data: Vec<ReceivedRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginEnvelope {
    pub token: AuthToken,
    pub data: UserData,
}

/// Error body: `{ "status": "fail", "message": "..." }`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: Email,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: &str, password: impl Into<String>) -> Result<Self, DomainError> {
        let password = password.into();
        if password.is_empty() {
            return Err(DomainError::validation("Please enter your password."));
        }
        Ok(Self {
            email: Email::parse(email)?,
            password,
        })
    }
}

/// A successful sign-in: the user and the token that proves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub user: User,
    pub token: AuthToken,
}

/// Body of `POST /api/auth/signup` (also used to add a team member).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: Email,
    pub ref_id: String,
    pub role: Role,
    pub department: String,
    pub password: String,
    pub password_confirm: String,
}

impl SignupRequest {
    pub fn new(
        name: impl Into<String>,
        email: Email,
        ref_id: impl Into<String>,
        role: Role,
        department: impl Into<String>,
        passwords: PasswordPair,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("Please enter a name."));
        }
        Ok(Self {
            name,
            email,
            ref_id: ref_id.into(),
            role,
            department: department.into(),
            password: passwords.password().to_string(),
            password_confirm: passwords.confirm().to_string(),
        })
    }
}

/// Body of `PATCH /api/users/updateMe`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Body of `PATCH /api/users/updateMyPassword`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordUpdate {
    pub password_current: String,
    pub password: String,
    pub password_confirm: String,
}

impl PasswordUpdate {
    pub fn new(current: impl Into<String>, new: PasswordPair) -> Self {
        Self {
            password_current: current.into(),
            password: new.password().to_string(),
            password_confirm: new.confirm().to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Team administration
// ─────────────────────────────────────────────────────────────────────────────

/// A user as listed by `GET /api/users`, with payroll details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: RoleClaim,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default, with = "lenient_date")]
    pub joining_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub account_no: Option<String>,
    #[serde(default)]
    pub ifsc_code: Option<String>,
    #[serde(default)]
    pub upi_id: Option<String>,
    #[serde(default)]
    pub current_month_payout: Option<f64>,
    #[serde(default)]
    pub total_payout: Option<f64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Projects
// ─────────────────────────────────────────────────────────────────────────────

/// Filter for `GET /api/projects?status=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    Current,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Current => "Current",
            ProjectStatus::Completed => "Completed",
        }
    }
}

/// Who a project is assigned to: either a bare id or an expanded user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Assignee {
    Member {
        #[serde(rename = "_id")]
        id: UserId,
        #[serde(default)]
        name: String,
    },
    Id(UserId),
}

impl Assignee {
    pub fn id(&self) -> &UserId {
        match self {
            Assignee::Member { id, .. } | Assignee::Id(id) => id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Assignee::Member { name, .. } if !name.is_empty() => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: ProjectId,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, with = "lenient_date")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient_date")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assigned_to: Option<Assignee>,
}

/// One task handed to one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignment {
    pub name: String,
    pub user_id: UserId,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignTasksBody<'a> {
    pub tasks: &'a [TaskAssignment],
}

/// A payment to an executive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_number::amount")]
    pub amount: f64,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default, with = "lenient_date")]
    pub date_paid: Option<DateTime<Utc>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Teams and reports
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMemberRef {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "_id")]
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub executives: Vec<TeamMemberRef>,
}

/// `data` of `GET /api/reports/team-report`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamReport {
    #[serde(default)]
    pub team_report: Option<TeamReportBody>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamReportBody {
    #[serde(default)]
    pub team_member_projects: Vec<Project>,
}

impl TeamReport {
    pub fn projects(&self) -> &[Project] {
        self.team_report
            .as_ref()
            .map(|body| body.team_member_projects.as_slice())
            .unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reviews
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
    Other(String),
}

impl From<String> for ReviewStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "pending" => ReviewStatus::Pending,
            "approved" => ReviewStatus::Approved,
            "rejected" => ReviewStatus::Rejected,
            _ => ReviewStatus::Other(value),
        }
    }
}

impl From<ReviewStatus> for String {
    fn from(value: ReviewStatus) -> Self {
        match value {
            ReviewStatus::Pending => "pending".to_string(),
            ReviewStatus::Approved => "approved".to_string(),
            ReviewStatus::Rejected => "rejected".to_string(),
            ReviewStatus::Other(raw) => raw,
        }
    }
}

/// A review awaiting (or past) a manager's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: ReviewId,
    pub status: ReviewStatus,
    #[serde(default)]
    pub project: Option<Project>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReviewUpdate<'a> {
    pub status: &'a ReviewStatus,
}

/// A client review as listed for a team lead (`GET /api/tl/reviews`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLeadReview {
    #[serde(rename = "_id")]
    pub id: ReviewId,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub invoice_no: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub project_file: Option<String>,
    #[serde(default, with = "lenient_date")]
    pub date: Option<DateTime<Utc>>,
}

/// Query of `GET /api/tl/reviews`; empty fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamLeadReviewFilter {
    pub month: Option<String>,
    pub day: Option<String>,
}

impl TeamLeadReviewFilter {
    pub(crate) fn query(&self) -> Vec<(&'static str, &str)> {
        let mut query = Vec::new();
        if let Some(month) = self.month.as_deref().filter(|m| !m.is_empty()) {
            query.push(("month", month));
        }
        if let Some(day) = self.day.as_deref().filter(|d| !d.is_empty()) {
            query.push(("day", day));
        }
        query
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Payroll, dashboard, received data
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tl_id: Option<UserId>,
    #[serde(default)]
    pub tl_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default, deserialize_with = "lenient_number::amount")]
    pub amount: f64,
}

/// Aggregate counters of `GET /api/dashboard/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    #[serde(deserialize_with = "lenient_number::count")]
    pub total_projects: u64,
    #[serde(deserialize_with = "lenient_number::count")]
    pub current_projects: u64,
    #[serde(deserialize_with = "lenient_number::count")]
    pub completed_projects: u64,
    #[serde(deserialize_with = "lenient_number::count")]
    pub remaining_projects: u64,
    #[serde(deserialize_with = "lenient_number::count")]
    pub total_employees: u64,
    #[serde(deserialize_with = "lenient_number::count")]
    pub total_team_leads: u64,
    #[serde(deserialize_with = "lenient_number::amount")]
    pub total_income: f64,
    #[serde(deserialize_with = "lenient_number::amount")]
    pub last_month_income: f64,
    #[serde(deserialize_with = "lenient_number::count")]
    pub total_clients_received: u64,
    #[serde(deserialize_with = "lenient_number::count")]
    pub delayed_projects: u64,
    #[serde(deserialize_with = "lenient_number::amount")]
    pub feedback_dept_total_income: f64,
    #[serde(deserialize_with = "lenient_number::count")]
    pub total_imported_data: u64,
}

/// A lead imported from the feedback department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default, with = "lenient_date")]
    pub end_date: Option<DateTime<Utc>>,
}

/// Dates arrive as RFC 3339 timestamps or bare `YYYY-MM-DD`; anything else is
/// treated as missing.
pub(crate) mod lenient_date {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }
}

/// Counters and amounts as the API sends them: integers, floats, numeric
/// strings or `null`. Anything unusable reads as zero.
pub(crate) mod lenient_number {
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Float(f64),
        Text(String),
        Other(IgnoredAny),
    }

    fn value<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<Raw> = Option::deserialize(deserializer)?;
        let value = match raw {
            Some(Raw::Int(n)) => Some(n as f64),
            Some(Raw::Float(f)) => Some(f),
            Some(Raw::Text(text)) => text.trim().parse().ok(),
            Some(Raw::Other(_)) | None => None,
        };
        Ok(value.filter(|v| v.is_finite()))
    }

    pub fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(value(deserializer)?
            .filter(|v| *v > 0.0)
            .map(|v| v.round() as u64)
            .unwrap_or(0))
    }

    pub fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(value(deserializer)?.unwrap_or(0.0))
    }
}

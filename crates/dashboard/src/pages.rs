//! Page data: what each routed page fetches and how it is tabulated.
//!
//! Pages only read through the API client. A failed load becomes
//! [`PageState::Failed`] and never touches the session.

use chrono::{DateTime, Utc};
use serde::Serialize;

use graphura_auth::{PageId, Role, User};
use graphura_client::{ApiClient, ApiError};
use graphura_client::types::{
    Assignee, DashboardStats, Payout, Project, ProjectStatus, ReceivedRecord, Review, ReviewStatus, SalaryRecord, Team,
    TeamLeadReview, TeamLeadReviewFilter, TeamMember,
};
use graphura_core::UserId;

/// Fetched data of one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "page", content = "data", rename_all = "snake_case")]
pub enum PageContent {
    Dashboard(DashboardStats),
    /// Any project listing (all, working, mine, completed).
    Projects(Vec<Project>),
    TeamMembers(Vec<TeamMember>),
    ManagerReport(Vec<Project>),
    TeamReport {
        members: Vec<MemberWorkload>,
        /// Filter options; only loaded for managers.
        team_leads: Vec<TeamMember>,
    },
    TransferData(Vec<ReceivedRecord>),
    Reviews(Vec<Review>),
    Salary {
        records: Vec<SalaryRecord>,
        team_leads: Vec<TeamMember>,
    },
    Settings(User),
    MyTeam(Vec<Team>),
    TeamLeadReviews(Vec<TeamLeadReview>),
    Payouts(Vec<Payout>),
    Help,
}

/// Lifecycle of a page load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PageState {
    Loading,
    Ready(PageContent),
    Failed { message: String, retryable: bool },
}

impl PageState {
    /// A failed load that may succeed if fetched again.
    pub fn can_retry(&self) -> bool {
        matches!(self, PageState::Failed { retryable: true, .. })
    }
}

impl From<Result<PageContent, ApiError>> for PageState {
    fn from(result: Result<PageContent, ApiError>) -> Self {
        match result {
            Ok(content) => PageState::Ready(content),
            Err(err) => PageState::Failed {
                message: err.to_string(),
                retryable: err.is_retryable(),
            },
        }
    }
}

/// Narrowing accepted by the Salary and team-lead Reviews pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageFilters {
    pub month: Option<String>,
    /// Day of month, as typed (`"12"`).
    pub day: Option<String>,
    pub team_lead: Option<UserId>,
}

impl PageFilters {
    /// Read `month`, `day` and `team_lead` from a query string, with or
    /// without the leading `?`. Unknown keys and blank values are ignored.
    pub fn from_query(query: &str) -> Self {
        let mut filters = Self::default();

        for pair in query.trim_start_matches('?').split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = value.replace('+', " ");
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key {
                "month" => filters.month = Some(value.to_string()),
                "day" => filters.day = Some(value.to_string()),
                "team_lead" => filters.team_lead = UserId::new(value).ok(),
                _ => {}
            }
        }

        filters
    }

    /// Filters carried in the query part of `path`.
    pub fn from_path(path: &str) -> Self {
        let before_fragment = path.split('#').next().unwrap_or_default();
        match before_fragment.split_once('?') {
            Some((_, query)) => Self::from_query(query),
            None => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.month.is_none() && self.day.is_none() && self.team_lead.is_none()
    }
}

/// Fetch the data `page` shows to `viewer`, narrowed by `filters` where the
/// page supports it.
pub async fn load_page(
    api: &ApiClient,
    page: PageId,
    viewer: &User,
    filters: &PageFilters,
) -> Result<PageContent, ApiError> {
    tracing::debug!(page = page.title(), ?filters, "loading page");

    let content = match page {
        PageId::Dashboard => PageContent::Dashboard(api.dashboard_stats().await?),
        PageId::TotalProjects => PageContent::Projects(api.projects(None).await?),
        PageId::WorkingProjects => PageContent::Projects(api.projects(Some(ProjectStatus::Current)).await?),
        PageId::TeamMembers => PageContent::TeamMembers(api.list_users(&[]).await?),
        PageId::ManagerReport => PageContent::ManagerReport(api.team_report().await?.projects().to_vec()),
        PageId::TeamReport => {
            let report = api.team_report().await?;
            let members = aggregate_team_report(report.projects(), Utc::now());
            let team_leads = if viewer.role() == Some(Role::Manager) {
                api.list_users(&[Role::TeamLead]).await?
            } else {
                Vec::new()
            };
            PageContent::TeamReport { members, team_leads }
        }
        PageId::TransferData => PageContent::TransferData(api.received_data().await?),
        PageId::Review => PageContent::Reviews(pending_reviews(api.reviews().await?)),
        PageId::Salary => {
            let all = api.salaries().await?;
            let records = filter_salaries(&all, filters.month.as_deref(), filters.team_lead.as_ref())
                .into_iter()
                .cloned()
                .collect();
            PageContent::Salary {
                records,
                team_leads: api.list_users(&[Role::TeamLead]).await?,
            }
        }
        PageId::Settings => PageContent::Settings(viewer.clone()),
        PageId::MyTeam => PageContent::MyTeam(api.teams().await?),
        PageId::TeamLeadReviews => {
            let filter = TeamLeadReviewFilter {
                month: filters.month.clone(),
                day: filters.day.clone(),
            };
            PageContent::TeamLeadReviews(api.team_lead_reviews(&filter).await?)
        }
        PageId::MyProjects => PageContent::Projects(api.my_projects().await?),
        PageId::CompletedProjects => PageContent::Projects(api.completed_projects().await?),
        PageId::MyPayout => PageContent::Payouts(api.my_payout().await?),
        PageId::Help => PageContent::Help,
    };

    Ok(content)
}

// ─────────────────────────────────────────────────────────────────────────────
// Page helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Per-assignee project counts of the team report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberWorkload {
    pub user_id: UserId,
    pub name: String,
    pub current_projects: u32,
    pub completed_projects: u32,
    /// Not derivable from the report; always zero.
    pub delayed_projects: u32,
}

/// Group projects by expanded assignee, in order of first appearance.
///
/// A project whose end date has passed counts as completed; one without an
/// end date counts as current. Projects with no expanded assignee are skipped.
pub fn aggregate_team_report(projects: &[Project], now: DateTime<Utc>) -> Vec<MemberWorkload> {
    let mut members: Vec<MemberWorkload> = Vec::new();

    for project in projects {
        let Some(Assignee::Member { id, name }) = &project.assigned_to else {
            continue;
        };

        let idx = match members.iter().position(|m| &m.user_id == id) {
            Some(idx) => idx,
            None => {
                members.push(MemberWorkload {
                    user_id: id.clone(),
                    name: name.clone(),
                    current_projects: 0,
                    completed_projects: 0,
                    delayed_projects: 0,
                });
                members.len() - 1
            }
        };

        match project.end_date {
            Some(end) if end < now => members[idx].completed_projects += 1,
            _ => members[idx].current_projects += 1,
        }
    }

    members
}

/// Salary rows matching a month (case-insensitive) and/or a team lead.
/// `None` or blank filters match everything.
pub fn filter_salaries<'a>(
    records: &'a [SalaryRecord],
    month: Option<&str>,
    team_lead: Option<&UserId>,
) -> Vec<&'a SalaryRecord> {
    let month = month.map(str::trim).filter(|m| !m.is_empty());

    records
        .iter()
        .filter(|r| match month {
            Some(month) => r.month.as_deref().is_some_and(|m| m.eq_ignore_ascii_case(month)),
            None => true,
        })
        .filter(|r| match team_lead {
            Some(tl) => r.tl_id.as_ref() == Some(tl),
            None => true,
        })
        .collect()
}

/// Reviews still awaiting a decision.
pub fn pending_reviews(reviews: Vec<Review>) -> Vec<Review> {
    reviews
        .into_iter()
        .filter(|r| r.status == ReviewStatus::Pending)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tabular view
// ─────────────────────────────────────────────────────────────────────────────

/// Column headers plus rows of display strings, shared by the terminal and
/// web renderers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageTable {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl PageTable {
    fn new(columns: &[&'static str]) -> Self {
        Self {
            columns: columns.to_vec(),
            rows: Vec::new(),
        }
    }

    fn row(&mut self, cells: impl IntoIterator<Item = String>) {
        self.rows.push(cells.into_iter().collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn date(value: &Option<DateTime<Utc>>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn text(value: &Option<String>) -> String {
    value.clone().filter(|v| !v.is_empty()).unwrap_or_else(|| "N/A".to_string())
}

fn amount(value: f64) -> String {
    format!("₹{value:.2}")
}

impl PageContent {
    pub fn table(&self) -> PageTable {
        match self {
            PageContent::Dashboard(stats) => {
                let mut t = PageTable::new(&["Metric", "Value"]);
                let counts = [
                    ("Total Projects", stats.total_projects),
                    ("Current Projects", stats.current_projects),
                    ("Completed Projects", stats.completed_projects),
                    ("Remaining Projects", stats.remaining_projects),
                    ("Total Employees", stats.total_employees),
                    ("Total TLs", stats.total_team_leads),
                    ("Total Clients Received", stats.total_clients_received),
                    ("Delayed Projects", stats.delayed_projects),
                    ("Total Imported Data", stats.total_imported_data),
                ];
                for (label, value) in counts {
                    t.row([label.to_string(), value.to_string()]);
                }
                t.row(["Total Income".to_string(), amount(stats.total_income)]);
                t.row(["Last Month Income".to_string(), amount(stats.last_month_income)]);
                t.row(["Feedback Dept Income".to_string(), amount(stats.feedback_dept_total_income)]);
                t
            }
            PageContent::Projects(projects) | PageContent::ManagerReport(projects) => {
                let mut t = PageTable::new(&["Company", "Service", "Assigned To", "Start", "End", "Status"]);
                for p in projects {
                    let assignee = p
                        .assigned_to
                        .as_ref()
                        .map(|a| a.name().unwrap_or(a.id().as_str()).to_string())
                        .unwrap_or_else(|| "Unassigned".to_string());
                    t.row([
                        p.company_name.clone(),
                        p.service_name.clone(),
                        assignee,
                        date(&p.start_date),
                        date(&p.end_date),
                        text(&p.status),
                    ]);
                }
                t
            }
            PageContent::TeamMembers(members) => {
                let mut t = PageTable::new(&["Name", "Email", "Role", "Contact", "Location"]);
                for m in members {
                    t.row([
                        m.name.clone(),
                        m.email.clone(),
                        m.role.display_name(),
                        text(&m.contact),
                        text(&m.location),
                    ]);
                }
                t
            }
            PageContent::TeamReport { members, .. } => {
                let mut t = PageTable::new(&["Name", "Current Projects", "Completed Projects", "Delayed Projects"]);
                for m in members {
                    t.row([
                        m.name.clone(),
                        m.current_projects.to_string(),
                        m.completed_projects.to_string(),
                        m.delayed_projects.to_string(),
                    ]);
                }
                t
            }
            PageContent::TransferData(records) => {
                let mut t = PageTable::new(&["Company", "Client", "Service", "Email", "Contact", "End"]);
                for r in records {
                    t.row([
                        r.company_name.clone(),
                        text(&r.client_name),
                        text(&r.service_name),
                        text(&r.email),
                        text(&r.contact_number),
                        date(&r.end_date),
                    ]);
                }
                t
            }
            PageContent::Reviews(reviews) => {
                let mut t = PageTable::new(&["Company", "Service", "Status"]);
                for r in reviews {
                    let (company, service) = r
                        .project
                        .as_ref()
                        .map(|p| (p.company_name.clone(), p.service_name.clone()))
                        .unwrap_or_else(|| ("N/A".to_string(), "N/A".to_string()));
                    t.row([company, service, String::from(r.status.clone())]);
                }
                t
            }
            PageContent::Salary { records, .. } => {
                let mut t = PageTable::new(&["Name", "Team Lead", "Email", "Month", "Amount"]);
                for r in records {
                    t.row([
                        r.name.clone(),
                        text(&r.tl_name),
                        text(&r.email),
                        text(&r.month),
                        amount(r.amount),
                    ]);
                }
                t
            }
            PageContent::Settings(user) => {
                let mut t = PageTable::new(&["Field", "Value"]);
                t.row(["Name".to_string(), user.name.clone()]);
                t.row(["Email".to_string(), user.email.clone()]);
                t.row(["Role".to_string(), user.role.display_name()]);
                t.row(["Contact".to_string(), text(&user.profile.contact)]);
                t.row(["Location".to_string(), text(&user.profile.location)]);
                t.row(["Department".to_string(), text(&user.profile.department)]);
                t
            }
            PageContent::MyTeam(teams) => {
                let mut t = PageTable::new(&["Team", "Member", "Email"]);
                for team in teams {
                    for member in &team.executives {
                        t.row([team.name.clone(), member.name.clone(), member.email.clone()]);
                    }
                }
                t
            }
            PageContent::TeamLeadReviews(reviews) => {
                let mut t = PageTable::new(&["Company", "Service", "Invoice", "Comment", "Date"]);
                for r in reviews {
                    t.row([
                        r.company_name.clone(),
                        r.service_name.clone(),
                        text(&r.invoice_no),
                        text(&r.comment),
                        date(&r.date),
                    ]);
                }
                t
            }
            PageContent::Payouts(payouts) => {
                let mut t = PageTable::new(&["Month", "Amount", "Paid On"]);
                for p in payouts {
                    t.row([text(&p.month), amount(p.amount), date(&p.date_paid)]);
                }
                t
            }
            PageContent::Help => {
                let mut t = PageTable::new(&["Help & Support"]);
                t.row(["Frequently Asked Questions".to_string()]);
                t.row(["Still need help? Contact your manager.".to_string()]);
                t
            }
        }
    }
}

//! Subcommands of the `graphura` binary.
//!
//! Each invocation is a fresh process: the session is restored once from the
//! token file, then the command runs against it.

use anyhow::Context;
use clap::{Parser, Subcommand};

use graphura_auth::Role;
use graphura_client::ApiClient;
use graphura_client::types::{
    LoginRequest, PasswordUpdate, ProfileUpdate, ReviewStatus, SignupRequest, TaskAssignment,
};
use graphura_core::{Email, PasswordPair, ProjectId, ReviewId, UserId};
use graphura_dashboard::{Dashboard, DashboardConfig, PageContent, PageFilters, navigation_text};

#[derive(Parser)]
#[command(name = "graphura")]
#[command(author, version, about = "Graphura dashboard in the terminal")]
pub struct Cli {
    /// API base URL (overrides GRAPHURA_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and open your default page
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        /// Referral id given by your manager
        #[arg(long)]
        ref_id: String,

        /// `manager`, `team_lead` or `executive`
        #[arg(short, long, value_parser = Role::parse)]
        role: Role,

        #[arg(short, long)]
        department: String,

        #[arg(short, long)]
        password: String,

        #[arg(long)]
        confirm: String,
    },
    /// Sign out and forget the stored token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Print the menu for the current session
    Nav {
        /// Path to highlight (default: your landing page)
        #[arg(long)]
        path: Option<String>,
    },
    /// Open a page, following redirects
    Open {
        path: String,

        /// Salary and Reviews pages: month name, e.g. `May`
        #[arg(long)]
        month: Option<String>,

        /// Reviews page: day of month
        #[arg(long)]
        day: Option<String>,

        /// Salary page: team lead id
        #[arg(long)]
        team_lead: Option<String>,
    },
    /// Show the route guard's decision for a path and why
    Explain { path: String },
    /// Edit your profile
    Profile {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        contact: Option<String>,

        #[arg(long)]
        location: Option<String>,
    },
    /// Change your password
    Password {
        #[arg(long)]
        current: String,

        #[arg(long)]
        new: String,

        #[arg(long)]
        confirm: String,
    },
    /// Add or remove team members
    Members {
        #[command(subcommand)]
        action: MemberAction,
    },
    /// Approve or reject a pending review
    Review {
        #[command(subcommand)]
        action: ReviewAction,
    },
    /// Team report details
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },
    /// Assign a project's tasks to team members
    Assign {
        project: String,

        /// `<task name>=<user id>`, repeatable
        #[arg(long = "task", value_parser = parse_task, required = true)]
        tasks: Vec<TaskAssignment>,
    },
}

#[derive(Subcommand)]
enum MemberAction {
    /// Create an account for a new member
    Add {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(long)]
        ref_id: String,

        #[arg(short, long, value_parser = Role::parse)]
        role: Role,

        #[arg(short, long)]
        department: String,

        #[arg(short, long)]
        password: String,

        #[arg(long)]
        confirm: String,
    },
    /// Delete a member's account
    Remove { id: String },
}

#[derive(Subcommand)]
enum ReviewAction {
    Approve { id: String },
    Reject { id: String },
}

#[derive(Subcommand)]
enum ReportAction {
    /// List the projects of one member
    Member { user_id: String },
}

fn parse_task(raw: &str) -> Result<TaskAssignment, String> {
    let (name, user) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected <task name>=<user id>, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("task name is empty".to_string());
    }
    let user_id = UserId::new(user.trim()).map_err(|e| e.to_string())?;
    Ok(TaskAssignment {
        name: name.to_string(),
        user_id,
    })
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = DashboardConfig::from_env().context("invalid configuration")?;
    if let Some(url) = cli.api_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }

    let tokens = config.token_store().context("cannot locate token storage")?;
    tracing::debug!(api_url = %config.api_url, token_path = %tokens.path().display(), "starting");

    let api = ApiClient::new(&config.api_url);
    let mut dashboard = Dashboard::new(api, tokens, config.permissions);

    match cli.command {
        Command::Login { email, password } => {
            let request = LoginRequest::new(&email, password)?;
            let screen = dashboard.login(&request).await?;
            print!("{screen}");
        }
        Command::Signup {
            name,
            email,
            ref_id,
            role,
            department,
            password,
            confirm,
        } => {
            let request = SignupRequest::new(
                name,
                Email::parse(email)?,
                ref_id,
                role,
                department,
                PasswordPair::new(password, confirm)?,
            )?;
            let user = dashboard.api().signup(&request).await?;
            println!(
                "Account created for {} ({}). Run `graphura login` to sign in.",
                user.name,
                user.role.display_name()
            );
        }
        Command::Logout => {
            dashboard.logout();
            println!("Signed out.");
        }
        Command::Whoami => {
            dashboard.start().await?;
            match dashboard.session().user() {
                Some(user) => println!("{} <{}> ({})", user.name, user.email, user.role.display_name()),
                None => println!("Not signed in."),
            }
        }
        Command::Nav { path } => {
            dashboard.start().await?;
            let current = path
                .or_else(|| dashboard.guard().landing_path(dashboard.session()).map(str::to_string))
                .unwrap_or_default();
            let navigation = dashboard.navigation(&current);
            if navigation.is_empty() {
                println!("No menu: not signed in.");
            } else {
                print!("{}", navigation_text(&navigation));
            }
        }
        Command::Open {
            path,
            month,
            day,
            team_lead,
        } => {
            dashboard.start().await?;
            let mut filters = PageFilters::from_path(&path);
            if month.is_some() {
                filters.month = month;
            }
            if day.is_some() {
                filters.day = day;
            }
            if let Some(team_lead) = team_lead {
                filters.team_lead = Some(UserId::new(team_lead)?);
            }
            let screen = dashboard.open(&path, &filters).await?;
            print!("{screen}");
        }
        Command::Explain { path } => {
            dashboard.start().await?;
            let explanation = dashboard.guard().explain(dashboard.session(), &path);
            println!("{}", serde_json::to_string_pretty(&explanation)?);
        }
        Command::Profile {
            name,
            email,
            contact,
            location,
        } => {
            dashboard.start().await?;
            let update = ProfileUpdate {
                name,
                email: email.map(Email::parse).transpose()?,
                contact,
                location,
            };
            let user = dashboard.update_profile(&update).await?;
            println!("Profile updated for {}.", user.name);
        }
        Command::Password { current, new, confirm } => {
            dashboard.start().await?;
            let update = PasswordUpdate::new(current, PasswordPair::new(new, confirm)?);
            dashboard.change_password(&update).await?;
            println!("Password updated.");
        }
        Command::Members { action } => {
            dashboard.start().await?;
            match action {
                MemberAction::Add {
                    name,
                    email,
                    ref_id,
                    role,
                    department,
                    password,
                    confirm,
                } => {
                    let request = SignupRequest::new(
                        name,
                        Email::parse(email)?,
                        ref_id,
                        role,
                        department,
                        PasswordPair::new(password, confirm)?,
                    )?;
                    let member = dashboard.add_member(&request).await?;
                    println!("Added {} ({}) as {}.", member.name, member.id, member.role.display_name());
                }
                MemberAction::Remove { id } => {
                    dashboard.remove_member(&UserId::new(id)?).await?;
                    println!("Member removed.");
                }
            }
        }
        Command::Review { action } => {
            dashboard.start().await?;
            let (id, status) = match action {
                ReviewAction::Approve { id } => (id, ReviewStatus::Approved),
                ReviewAction::Reject { id } => (id, ReviewStatus::Rejected),
            };
            let review = dashboard.decide_review(&ReviewId::new(id)?, status).await?;
            println!("Review {} is now {}.", review.id, String::from(review.status));
        }
        Command::Report {
            action: ReportAction::Member { user_id },
        } => {
            dashboard.start().await?;
            let projects = dashboard.member_projects(&UserId::new(user_id)?).await?;
            print!("{}", PageContent::Projects(projects).table());
        }
        Command::Assign { project, tasks } => {
            dashboard.start().await?;
            let project = dashboard.assign_tasks(&ProjectId::new(project)?, &tasks).await?;
            println!("Assigned {} task(s) on {}.", tasks.len(), project.company_name);
        }
    }

    Ok(())
}

//! `graphura-dashboard`
//!
//! **Responsibility:** the role-gated dashboard itself.
//!
//! This crate provides:
//! - Configuration (API URL, token location, landing overrides)
//! - Page loaders and the page helpers of the reports and payroll screens
//! - The Shell (`Dashboard`), which turns a session and a path into a screen
//! - A Leptos frontend, compiled only for `wasm32`
//!
//! Client-side gating only decides what is shown. The API authorizes every
//! request on its own.

pub mod config;
pub mod pages;
pub mod shell;

#[cfg(target_arch = "wasm32")]
pub mod frontend;

pub use config::{ConfigError, DashboardConfig};
pub use pages::{MemberWorkload, PageContent, PageFilters, PageState, PageTable, load_page};
pub use shell::{APP_TITLE, Dashboard, DashboardError, Layout, ProfileBlock, Screen, navigation_text};

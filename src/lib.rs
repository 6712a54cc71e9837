//! Customer portal client for managed Odoo hosting.
//!
//! Loads the plan catalog and the caller's trial verdict, renders plans with
//! trial invisibility applied, and assembles and submits instance provisioning
//! requests against the billing and instance services.

pub mod actions;
pub mod api;
pub mod billing;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod page;
pub mod provision;
pub mod scope;
pub mod session;
pub mod subdomain;
pub mod trial;

pub use api::{PortalBackend, PortalClient};
pub use config::Config;
pub use error::{PortalError, PortalErrorCode, Result};
pub use page::CreateInstancePage;

//! Core library for atlassian-mcp
//!
//! This crate implements the **Functional Core** of the atlassian-mcp server,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`atlassian_mcp_core`** (this crate): validation, query construction and
//!   response normalization with zero I/O
//! - **`atlassian-mcp`**: configuration, HTTP, the MCP tool server and the CLI
//!   (the Imperative Shell)
//!
//! The shell fetches raw JSON and hands it here. Everything in this crate is a
//! pure function of its arguments and can be tested with fixture data.
//!
//! # Module Organization
//!
//! - [`atlassian::jira`]: issue search options, JQL, the canonical issue
//! - [`atlassian::confluence`]: content search options, CQL, page normalization
//!   across API generations, the links-only projection
//! - [`search`]: the result envelope shared by both
//! - [`error`]: the error taxonomy
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use atlassian_mcp_core::atlassian::jira::{build_jql, SearchArgs, TeamDirectory};
//!
//! let options = SearchArgs::from_value(serde_json::json!({
//!     "assignee": "a@x.com",
//!     "project": "TEST",
//!     "status": ["To Do", "In Progress"]
//! }))?
//! .validate(&TeamDirectory::default())?;
//!
//! assert_eq!(
//!     build_jql(&options),
//!     r#"assignee = "a@x.com" AND project = "TEST" AND status IN ("To Do", "In Progress")"#
//! );
//! ```

pub mod atlassian;
pub mod error;
pub mod search;
pub mod validate;

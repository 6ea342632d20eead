//! jira-notify: build and deployment events for Jira
//!
//! A library for delivering CI build and deployment payloads to a Jira
//! site's webhook, optionally signed as an HS256 JWT with the site's
//! shared secret.

pub mod config;
pub mod notify;
pub mod site;
pub mod time;
pub mod webhook;

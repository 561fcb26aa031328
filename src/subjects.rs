// Copyright (c) 2025 - Cowboy AI, Inc.

//! NATS subject conventions for resource lifecycle messages
//!
//! Inbound subjects follow the pattern:
//!
//! ```text
//! {resource}.{action}[.{anything}]
//! ```
//!
//! The first segment selects the resource handler, the second names the
//! lifecycle action. Handlers answer on the inbound subject suffixed with
//! the outcome:
//!
//! ```text
//! instance.create       -> instance.create.done
//! firewall.delete       -> firewall.delete.error
//! ```
//!
//! # Examples
//!
//! ```rust
//! use cim_resource_connector::subjects::{completion_subject, routing_key, Action, Outcome};
//!
//! assert_eq!(routing_key("networks.create"), Some("networks"));
//! assert_eq!(Action::from_subject("vpc.delete"), Some(Action::Delete));
//! assert_eq!(
//!     completion_subject("instance.create", Outcome::Done),
//!     "instance.create.done"
//! );
//! ```

use std::fmt;

/// Separator between subject tokens
pub const SUBJECT_SEPARATOR: char = '.';

/// Separator used by comma-delimited subject lists in configuration
pub const LIST_SEPARATOR: char = ',';

/// Extract the routing key (first token) of a subject.
///
/// Returns `None` for an empty subject or one starting with a separator.
pub fn routing_key(subject: &str) -> Option<&str> {
    subject
        .split(SUBJECT_SEPARATOR)
        .next()
        .filter(|segment| !segment.is_empty())
}

/// Lifecycle actions a resource handler can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Provision a new resource
    Create,
    /// Modify an existing resource
    Update,
    /// Tear a resource down
    Delete,
    /// Read a single resource
    Get,
    /// Search for resources
    Find,
}

impl Action {
    /// Every action, in declaration order
    pub const ALL: [Action; 5] = [
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::Get,
        Action::Find,
    ];

    /// Canonical subject token
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Get => "get",
            Action::Find => "find",
        }
    }

    /// Parse a single subject token
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == token)
    }

    /// Read the action from the second token of a subject
    pub fn from_subject(subject: &str) -> Option<Self> {
        subject
            .split(SUBJECT_SEPARATOR)
            .nth(1)
            .and_then(Self::from_token)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome suffix appended to a subject when answering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The action completed
    Done,
    /// The action failed
    Error,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Done => write!(f, "done"),
            Outcome::Error => write!(f, "error"),
        }
    }
}

/// Build the answer subject for an inbound subject
pub fn completion_subject(subject: &str, outcome: Outcome) -> String {
    format!("{}{}{}", subject, SUBJECT_SEPARATOR, outcome)
}

/// Split a comma-delimited list, trimming whitespace and dropping blanks.
///
/// `""`, `" , "` and `","` all yield an empty list.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

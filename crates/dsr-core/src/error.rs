// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use std::fmt;

/// Error type shared by every dsr crate.
///
/// Expected validation outcomes are values, not errors; this type covers
/// misuse of the API surface and numeric breakdowns only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DsrError {
    /// Caller-supplied data or configuration is malformed.
    InvalidInput(String),
    /// A computation produced a non-finite or otherwise unusable value.
    NumericalIssue(String),
    /// An internal counter or allocation limit was exceeded.
    ResourceLimit(String),
    /// A violation that no correction tier is permitted to repair.
    Unrepairable(String),
}

impl DsrError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn numerical_issue(message: impl Into<String>) -> Self {
        Self::NumericalIssue(message.into())
    }

    pub fn resource_limit(message: impl Into<String>) -> Self {
        Self::ResourceLimit(message.into())
    }

    pub fn unrepairable(message: impl Into<String>) -> Self {
        Self::Unrepairable(message.into())
    }
}

impl fmt::Display for DsrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::NumericalIssue(message) => write!(f, "numerical issue: {message}"),
            Self::ResourceLimit(message) => write!(f, "resource limit exceeded: {message}"),
            Self::Unrepairable(message) => write!(f, "unrepairable violation: {message}"),
        }
    }
}

impl std::error::Error for DsrError {}

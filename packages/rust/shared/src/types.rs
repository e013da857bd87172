//! Core domain types for the personnel/office listing.

use serde::{Deserialize, Deserializer, Serialize};

/// Office code used whenever no real code can be determined.
pub const PLACEHOLDER_OFFICE: &str = "B1.3.XXX";

// ---------------------------------------------------------------------------
// Directory API payload
// ---------------------------------------------------------------------------

/// A person as returned by the directory API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PersonRecord {
    /// Display name (`cn`).
    #[serde(rename = "cn", default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Email addresses (`mail`), in the order the API lists them.
    #[serde(rename = "mail", default, deserialize_with = "null_as_default")]
    pub emails: Vec<String>,
}

/// Top-level body of the personnel query endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonnelResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<PersonRecord>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// ResolvedEntry
// ---------------------------------------------------------------------------

/// A name paired with the office it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEntry {
    pub name: String,
    pub office: String,
}

impl ResolvedEntry {
    pub fn new(name: impl Into<String>, office: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            office: office.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// OfficeLookup
// ---------------------------------------------------------------------------

/// Outcome of looking up one person's profile page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfficeLookup {
    /// The page was fetched. Holds the extracted code, which is the
    /// placeholder when the page contained no code at all.
    Resolved(String),
    /// The page could not be fetched.
    Failed {
        /// URL that was requested.
        url: String,
        /// Rendered transport or status error.
        error: String,
    },
}

impl OfficeLookup {
    /// The office code to record for this lookup. Never empty.
    pub fn office(&self) -> &str {
        match self {
            Self::Resolved(code) if !code.is_empty() => code,
            _ => PLACEHOLDER_OFFICE,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

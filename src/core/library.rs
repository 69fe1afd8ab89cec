use std::fmt;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum LibraryError {
    // Construction-time or state-rule violations, e.g. blank identifiers
    // or a write against an immutable ledger record.
    Validation {
        message: String,
        reason_code: Option<String>,
    },
    DuplicateKey {
        message: String,
    },
    NotFound {
        message: String,
    },
    // The book is held by another patron, or an optimistic version check
    // lost against a concurrent update. The caller can retry after the
    // state changes; nothing is retried internally.
    CurrentlyUnavailable {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    // A return was attempted for a loan the patron never had.
    NotBorrowed {
        message: String,
    },
    // Internal diagnostic: the ledger disagrees with itself, e.g. two open
    // records for one (book, patron) pair.
    LedgerInconsistency {
        message: String,
    },
    Serialization {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
}

impl LibraryError {
    pub fn validation(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Validation { message: message.to_string(), reason_code }
    }

    pub fn duplicate_key(message: &str) -> LibraryError {
        LibraryError::DuplicateKey { message: message.to_string() }
    }

    pub fn not_found(message: &str) -> LibraryError {
        LibraryError::NotFound { message: message.to_string() }
    }

    pub fn unavailable(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::CurrentlyUnavailable { message: message.to_string(), reason_code, retryable }
    }

    pub fn not_borrowed(message: &str) -> LibraryError {
        LibraryError::NotBorrowed { message: message.to_string() }
    }

    pub fn ledger_inconsistency(message: &str) -> LibraryError {
        LibraryError::LedgerInconsistency { message: message.to_string() }
    }

    pub fn serialization(message: &str) -> LibraryError {
        LibraryError::Serialization { message: message.to_string() }
    }

    pub fn runtime(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Runtime { message: message.to_string(), reason_code }
    }

    pub fn retryable(&self) -> bool {
        match self {
            LibraryError::Validation { .. } => { false }
            LibraryError::DuplicateKey { .. } => { false }
            LibraryError::NotFound { .. } => { false }
            LibraryError::CurrentlyUnavailable { retryable, .. } => { *retryable }
            LibraryError::NotBorrowed { .. } => { false }
            LibraryError::LedgerInconsistency { .. } => { false }
            LibraryError::Serialization { .. } => { false }
            LibraryError::Runtime { .. } => { false }
        }
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::serialization(
            format!("serde json parsing {:?}", err).as_str())
    }
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::Validation { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            LibraryError::DuplicateKey { message } => {
                write!(f, "{}", message)
            }
            LibraryError::NotFound { message } => {
                write!(f, "{}", message)
            }
            LibraryError::CurrentlyUnavailable { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            LibraryError::NotBorrowed { message } => {
                write!(f, "{}", message)
            }
            LibraryError::LedgerInconsistency { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Serialization { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Runtime { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
        }
    }
}

/// A specialized Result type for circulation operations.
pub type LibraryResult<T> = Result<T, LibraryError>;

// It defines abstraction for paginated result
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    // The page number or token
    pub page: Option<String>,
    // page size
    pub page_size: usize,
    // Next page if available
    pub next_page: Option<String>,
    // list of records
    pub records: Vec<T>,
}

impl<T> PaginatedResult<T> {
    pub(crate) fn new(page: Option<&str>, page_size: usize,
                      next_page: Option<String>, records: Vec<T>) -> Self {
        PaginatedResult {
            page: page.map(str::to_string),
            page_size,
            next_page,
            records,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum CheckoutStatus {
    CheckedOut,
    Returned,
}

impl From<String> for CheckoutStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "CheckedOut" => CheckoutStatus::CheckedOut,
            "Returned" => CheckoutStatus::Returned,
            _ => CheckoutStatus::CheckedOut,
        }
    }
}

impl Display for CheckoutStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            CheckoutStatus::CheckedOut => write!(f, "CheckedOut"),
            CheckoutStatus::Returned => write!(f, "Returned"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum HoldStatus {
    OnHold,
    Notified,
    Canceled,
}

impl From<String> for HoldStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "OnHold" => HoldStatus::OnHold,
            "Notified" => HoldStatus::Notified,
            "Canceled" => HoldStatus::Canceled,
            _ => HoldStatus::OnHold,
        }
    }
}

impl Display for HoldStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            HoldStatus::OnHold => write!(f, "OnHold"),
            HoldStatus::Notified => write!(f, "Notified"),
            HoldStatus::Canceled => write!(f, "Canceled"),
        }
    }
}

// SearchKind selects the matcher applied by the search service; a sum type
// dispatched per call rather than a strategy-object hierarchy.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum SearchKind {
    ByTitle,
    ByAuthor,
    ByIsbn,
}

impl From<String> for SearchKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ByTitle" => SearchKind::ByTitle,
            "ByAuthor" => SearchKind::ByAuthor,
            "ByIsbn" => SearchKind::ByIsbn,
            _ => SearchKind::ByTitle,
        }
    }
}

impl Display for SearchKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            SearchKind::ByTitle => write!(f, "ByTitle"),
            SearchKind::ByAuthor => write!(f, "ByAuthor"),
            SearchKind::ByIsbn => write!(f, "ByIsbn"),
        }
    }
}

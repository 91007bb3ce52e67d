//! URL handling module for onyx-harvest
//!
//! This module provides URL normalization and the link scope policy the
//! documentation crawler uses to stay on its site.

mod normalize;
mod scope;

pub use normalize::{normalize_http_url, normalize_url};
pub use scope::{classify_link, LinkDecision, RejectReason, ScopePolicy};

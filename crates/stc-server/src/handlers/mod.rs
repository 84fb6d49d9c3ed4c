//! HTTP request handlers.

pub(crate) mod catalog;
pub(crate) mod content;

//! Pagination traits
//!
//! The minimal capabilities a list request and a list response must offer to
//! be driven by a [`Pager`](super::Pager). Every other field (parent, filter,
//! page size) is opaque and carried unchanged from page to page.

/// A list request that can be re-issued with a continuation cursor
pub trait PagedRequest: Clone {
    /// Current page token (empty for the first page)
    fn page_token(&self) -> &str;

    /// Replace the page token, leaving every other field untouched
    fn set_page_token(&mut self, token: String);
}

/// One page of a list response
pub trait PagedResponse {
    /// Result item carried by the page
    type Item;

    /// Items on this page, in server order
    fn items(&self) -> &[Self::Item];

    /// Consume the page and return its items
    fn into_items(self) -> Vec<Self::Item>;

    /// Continuation cursor; empty means this is the last page
    fn next_page_token(&self) -> &str;
}

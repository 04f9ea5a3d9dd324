//! Pagination module
//!
//! Presents a list RPC whose results are spread across an unknown number of
//! remote pages as one lazily advancing sequence.
//!
//! # Overview
//!
//! A [`Pager`] is built from an already fetched first page plus a fetch
//! operation able to repeat the call. It forwards the `next_page_token` of
//! page *N* verbatim as the `page_token` of request *N+1* and stops as soon as
//! a response carries an empty token. Tokens are never inspected.
//!
//! Two views are offered: [`Pager::pages`] yields whole responses and
//! [`Pager::items`] yields the individual results. Both fetch on demand, one
//! page at a time, on the task that polls them.

mod pager;
mod types;

pub use pager::Pager;
pub use types::{PagedRequest, PagedResponse};

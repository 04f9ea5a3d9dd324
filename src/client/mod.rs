//! ConfigServiceV2 client
//!
//! Entry point for callers: builds a transport from client options (or
//! accepts one), applies per-method call defaults and routing headers, and
//! wraps list calls in pagers.

mod options;
mod service;

pub use options::{routing_header, CallOptions, Rpc};
pub use service::{
    ClientBuilder, ConfigServiceV2Client, ListBucketsPager, ListExclusionsPager, ListSinksPager,
    ListViewsPager, TransportSelection,
};

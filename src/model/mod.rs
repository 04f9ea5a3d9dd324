//! ConfigServiceV2 data model
//!
//! Resources, requests and responses of the Cloud Logging configuration API.
//! Resources round-trip through proto3 JSON (camelCase field names, RFC 3339
//! timestamps, enum value names); output-only fields are skipped when unset so
//! they are never sent back on create or update.

mod bucket;
mod cmek;
mod exclusion;
mod field_mask;
mod sink;
mod view;

pub use bucket::{
    CreateBucketRequest, DeleteBucketRequest, GetBucketRequest, LifecycleState,
    ListBucketsRequest, ListBucketsResponse, LogBucket, UndeleteBucketRequest,
    UpdateBucketRequest,
};
pub use cmek::{CmekSettings, GetCmekSettingsRequest, UpdateCmekSettingsRequest};
pub use exclusion::{
    CreateExclusionRequest, DeleteExclusionRequest, GetExclusionRequest, ListExclusionsRequest,
    ListExclusionsResponse, LogExclusion, UpdateExclusionRequest,
};
pub use field_mask::FieldMask;
pub use sink::{
    BigQueryOptions, CreateSinkRequest, DeleteSinkRequest, GetSinkRequest, ListSinksRequest,
    ListSinksResponse, LogSink, UpdateSinkRequest, VersionFormat,
};
pub use view::{
    CreateViewRequest, DeleteViewRequest, GetViewRequest, ListViewsRequest, ListViewsResponse,
    LogView, UpdateViewRequest,
};

use crate::pagination::{PagedRequest, PagedResponse};

/// Wire a list request/response pair into the pager traits
macro_rules! paged_list {
    ($request:ty, $response:ty, $item:ty, $items:ident) => {
        impl PagedRequest for $request {
            fn page_token(&self) -> &str {
                &self.page_token
            }

            fn set_page_token(&mut self, token: String) {
                self.page_token = token;
            }
        }

        impl PagedResponse for $response {
            type Item = $item;

            fn items(&self) -> &[$item] {
                &self.$items
            }

            fn into_items(self) -> Vec<$item> {
                self.$items
            }

            fn next_page_token(&self) -> &str {
                &self.next_page_token
            }
        }
    };
}

paged_list!(ListBucketsRequest, ListBucketsResponse, LogBucket, buckets);
paged_list!(ListViewsRequest, ListViewsResponse, LogView, views);
paged_list!(ListSinksRequest, ListSinksResponse, LogSink, sinks);
paged_list!(ListExclusionsRequest, ListExclusionsResponse, LogExclusion, exclusions);

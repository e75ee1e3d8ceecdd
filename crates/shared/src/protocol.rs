use serde::{Deserialize, Serialize};

use crate::domain::PostId;

/// Nanoseconds per millisecond; the service records creation time at
/// nanosecond resolution, clients display at millisecond resolution.
pub const NANOS_PER_MILLI: i64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPayload {
    pub post_id: PostId,
    pub title: String,
    pub body: String,
    pub author: String,
    /// Creation time assigned by the service, nanoseconds since epoch.
    pub timestamp_ns: i64,
}

impl PostPayload {
    /// Display-resolution creation time. Integer division truncates
    /// sub-millisecond precision.
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp_ns / NANOS_PER_MILLI
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub body: String,
    pub author: String,
}

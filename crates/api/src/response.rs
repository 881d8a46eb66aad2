//! Response envelopes.
//!
//! Every success body is an object with a `data` key. List endpoints that
//! page through `?limit=&offset=` use [`ListResponse`], which also echoes the
//! window that was applied after clamping.

use serde::Serialize;

/// `{ "data": T }`.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "data": [T], "limit": n, "offset": n, "has_more": bool }`.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub data: Vec<T>,
    pub limit: i64,
    pub offset: i64,
    /// A full page came back, so the next offset may hold more rows.
    pub has_more: bool,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(data: Vec<T>, limit: i64, offset: i64) -> Self {
        let has_more = i64::try_from(data.len()).is_ok_and(|n| n >= limit);
        Self {
            data,
            limit,
            offset,
            has_more,
        }
    }
}

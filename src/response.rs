//! Standard response envelope helpers.

use serde::Serialize;

#[derive(Serialize)]
pub struct SuccessOne<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

#[derive(Serialize)]
pub struct SuccessMany<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

/// List metadata: `count` is the page size, `total` the full match count.
#[derive(Serialize)]
pub struct PageMeta {
    pub count: u64,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

pub fn success_one<T: Serialize>(data: T) -> SuccessOne<T> {
    SuccessOne { data, meta: None }
}

pub fn success_many<T: Serialize>(data: Vec<T>, total: u64, limit: u32, offset: u32) -> SuccessMany<T> {
    let count = data.len() as u64;
    SuccessMany {
        data,
        meta: PageMeta {
            count,
            total,
            limit,
            offset,
        },
    }
}

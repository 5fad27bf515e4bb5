//! Success envelopes: `{"data": ..}` for one value, `{"data": [..], "meta": {"count": n}}` for listings.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct Data<T> {
    pub data: T,
}

#[derive(Serialize)]
pub struct Listing<T> {
    pub data: Vec<T>,
    pub meta: ListingMeta,
}

#[derive(Serialize)]
pub struct ListingMeta {
    pub count: usize,
}

/// Delete confirmation.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<Data<T>>) {
    (StatusCode::CREATED, Json(Data { data }))
}

pub fn ok<T: Serialize>(data: T) -> Json<Data<T>> {
    Json(Data { data })
}

pub fn listing<T: Serialize>(data: Vec<T>) -> Json<Listing<T>> {
    let count = data.len();
    Json(Listing {
        data,
        meta: ListingMeta { count },
    })
}

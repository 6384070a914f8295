//! HTTP client layer: `DaisyHttp` over a pluggable [`Transport`].

pub mod client;
pub mod query;
pub mod transport;

pub use client::{DaisyHttp, HttpResponse};
pub use query::encode_query;
pub use transport::{HttpRequest, Method, RawResponse, ReqwestTransport, Transport};

//! 传输层：基于 reqwest 的 HTTP 访问（多部分上传、流式响应、导出）。

pub mod http;

pub use http::{HttpTransport, TransportError};

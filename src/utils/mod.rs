pub mod http;
pub mod utf8;

pub use http::http_client;
pub use utf8::Utf8Decoder;

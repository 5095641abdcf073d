pub mod client;
pub mod decode;
pub mod errors;
pub mod types;

pub use client::{Agent, FetchOptions, Fetcher};
pub use errors::FetchError;
pub use types::{Charset, PageResponse};

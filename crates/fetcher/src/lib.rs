//! Remote config and catalog retrieval
//!
//! Each build flavor has its own [`ConfigSource`]: the global build asks a
//! version-check endpoint for its catalog, the Japan build decrypts the server
//! info URL shipped in the client. Both end in one GET whose JSON is written
//! to the data directory.

pub mod http;
pub mod source;
pub mod global;
pub mod japan;
pub mod persist;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use global::GlobalCatalogSource;
pub use http::JsonClient;
pub use japan::{ExternalDecryptor, JapanConfigSource};
pub use persist::write_json;
pub use source::{ConfigSource, JsonDocument, ResolvedConfig};

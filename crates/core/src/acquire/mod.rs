//! Download-and-cache orchestration.
//!
//! Data flows one direction: locator → resolved path → cache decision →
//! (fetch) → local path. The orchestrator composes the pure path
//! resolver, the cache probe, and the fetcher into a single
//! "ensure local file" operation.

/// Pure destination-path arithmetic.
pub mod path;
/// Cache reuse/replace decisions.
pub mod probe;
/// Byte-transfer collaborators.
pub mod transport;

mod fetcher;
mod orchestrator;

pub use fetcher::Fetcher;
pub use orchestrator::AssetAcquirer;
pub use probe::CacheDecision;
pub use transport::{HttpTransport, TransferInfo, Transport};

#![warn(clippy::all, missing_docs)]

//! Core download-and-cache orchestration for remote render assets.
//!
//! This crate guarantees that a remote texture or 3D-model file is
//! present on local durable storage exactly once, then hands the local
//! path to an injected conversion step that turns bytes into an
//! in-memory resource. Rendering, scene graphs, and the conversion
//! itself live in the host application.

pub mod acquire;
pub mod config;
pub mod error;
pub mod loader;
pub mod locator;

pub use acquire::{AssetAcquirer, CacheDecision, HttpTransport, TransferInfo, Transport};
pub use config::AppConfig;
pub use error::AcquireError;
pub use loader::ResourceLoader;
pub use locator::{AcquireOutcome, CachePolicy, Destination, LocalAsset, SourceLocator};

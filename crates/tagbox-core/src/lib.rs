//! Tagbox Core - Embeddable image tagging library.
//!
//! Tagbox attaches free-text and structured (character/setting/action)
//! tags to images, persisted as sidecar files beside each image. On top
//! of the sidecar layer it provides a tag classifier backed by a local
//! text model, a WD tagger scoring a fixed vocabulary against an image,
//! and a clipping tool that crops tagged sub-regions out of images.
//!
//! # Architecture
//!
//! ```text
//! Session (directory + model handles)
//!   ├── sidecar    <stem>.txt / <stem>.json read/write
//!   ├── classify   tag -> {character, setting, action}
//!   ├── wd         image -> (tag, probability) pairs
//!   └── clip       display rect -> crop file + tag sidecar
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use tagbox_core::{Config, Session};
//!
//! let config = Config::load()?;
//! let mut session = Session::load("./photos", config)?;
//! let tags = session.wd_tagger()?.tag_file(&path, &session.config().wd_tagger)?;
//! ```

// Module declarations
pub mod caption;
pub mod classify;
pub mod clip;
pub mod config;
pub mod error;
pub mod session;
pub mod sidecar;
pub mod types;
pub mod wd;

// Re-exports for convenient access
pub use config::Config;
pub use error::{
    ClipError, ConfigError, ModelError, ParseError, Result, SidecarError, TagboxError,
};
pub use session::Session;
pub use types::{Category, ImageRecord, ScoredTag, StructuredTag, TagSet};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

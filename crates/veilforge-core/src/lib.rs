//! # VeilForge Core API
//!
//! Hides encrypted payloads in images, audio, video and documents. A carrier
//! can hold several layers, every hide appends one more.
//!
//! There are 3 builders exposed via [`api`]
//! - [`api::hide`] for hiding a message, a file or a metadata record
//! - [`api::unveil`] for reading one layer back
//! - [`api::layers`] for listing layers and capacity without a password
//!
//! The builders are thin wrappers around the functions in [`engine`].
//!
//! # Usage Examples
//!
//! ## Hide data inside a text document and read it back
//!
//! ```rust
//! use veilforge_core::{CipherMode, CipherOptions, EngineOptions, KdfParams, Payload};
//!
//! let options = EngineOptions::default()
//!     .with_cipher(CipherOptions::new(CipherMode::Aead, KdfParams::interactive()));
//! let carrier: String = (0..300).map(|i| format!("line {i}\n")).collect();
//!
//! let concealed = veilforge_core::api::hide::prepare()
//!     .with_carrier_bytes(carrier.into_bytes(), Some("notes.txt"))
//!     .with_message("Hello, World!")  // will hide this message as a new layer
//!     .with_password("SuperSecret42") // will encrypt the layer with this password
//!     .with_options(options.clone())
//!     .execute()
//!     .expect("Failed to hide message in text");
//!
//! let revealed = veilforge_core::api::unveil::prepare()
//!     .from_secret_bytes(concealed.carrier, Some("notes.txt"))
//!     .using_password("SuperSecret42")
//!     .with_options(options)
//!     .execute()
//!     .expect("Failed to unveil message from text");
//!
//! assert_eq!(revealed.payload, Payload::text("Hello, World!"));
//! ```

#![warn(clippy::redundant_else)]

pub mod api;
pub mod capacity;
pub mod compression;
pub mod content;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod layers;
pub mod media;
pub mod report;
pub mod result;

pub use veilforge_cipher::{
    generate_password, CipherMode, CipherOptions, KdfParams, PasswordStrength,
    DEFAULT_PASSWORD_LEN,
};

pub use crate::capacity::CapacityReport;
pub use crate::content::{ContentKind, MetadataRecord, Payload};
pub use crate::engine::{conceal, reveal, Concealed, EngineOptions, Revealed};
pub use crate::error::{ErrorKind, VeilError};
pub use crate::layers::{LayerListing, LayerSelector, LayerSlot, LayerStatus, LayerWarning};
pub use crate::media::{
    AudioOptions, Carrier, CarrierFormat, Concealer, ImageOptions, MediaFamily, VideoOptions,
};
pub use crate::report::OperationReport;
pub use crate::result::Result;

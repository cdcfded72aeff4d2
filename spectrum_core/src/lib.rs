//! # Spectrum Core
//!
//! Computes the centered 2D DFT of a grayscale image, stores its magnitude
//! and phase spectra as 8-bit images, and reconstructs the image from those
//! two images plus a pair of recorded log-magnitude bounds.
//!
//! ## Quick Start
//!
//! ```rust
//! use spectrum_core::{pipeline, DisplayScaling, Raster};
//!
//! let image = Raster::from_vec(4, 4, (0..16).collect()).unwrap();
//! let pair = pipeline::analyze(&image).unwrap();
//! println!("mag bounds: {:?}", pair.metadata);
//!
//! let restored = pipeline::reconstruct(&pair, DisplayScaling::Preserve).unwrap();
//! assert_eq!(restored.dim(), (4, 4));
//! ```
//!
//! ## Core Modules
//!
//! - [`transform`] - Forward/inverse 2D FFT with exact quadrant shifts
//! - [`codec`] - Spectrum ↔ magnitude/phase images and [`CodecMetadata`]
//! - [`pipeline`] - Forward and inverse orchestration over a [`StorageAdapter`]
//! - [`storage`] - Filesystem and in-memory adapters
//! - [`config`] - Tool configuration via TOML
//! - [`logging`] - JSON line-delimited run journal

pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod raster;
pub mod storage;
pub mod transform;

pub use codec::{CodecMetadata, EncodedSpectrumPair};
pub use config::{ConfigError, LoggingConfig, PipelineConfig, SpectrumConfig, StorageConfig};
pub use error::{SpectrumError, SpectrumResult};
pub use logging::{LogFormat, RunJournal, RunLogEntry};
pub use pipeline::{DisplayScaling, ForwardReport, InverseReport, OutputKeys, Pipeline};
pub use raster::Raster;
pub use storage::{FileSystemStorage, MemoryStorage, StorageAdapter, StoredObject};
pub use transform::{Complex64, ComplexSpectrum};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

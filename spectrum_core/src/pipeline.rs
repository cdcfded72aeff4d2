//! Forward (image → spectra) and inverse (spectra → image) orchestration.
//!
//! A [`Pipeline`] owns an injected [`StorageAdapter`] and runs each path as a
//! strict sequence: fetch, decode, transform, encode, then store. Every
//! output is fully encoded before the first store call, and a report is only
//! returned once all stores have succeeded.
//!
//! ```
//! use spectrum_core::{Pipeline, PipelineConfig, MemoryStorage, Raster};
//!
//! let storage = MemoryStorage::new();
//! let image = Raster::from_vec(4, 4, (0..16).collect()).unwrap();
//! storage.insert("input/ramp.png", image.encode_png().unwrap());
//!
//! let pipeline = Pipeline::new(&storage, PipelineConfig::default());
//! let report = pipeline.forward_derived("input/ramp.png", None).unwrap();
//! assert_eq!(report.magnitude_key, "output/ramp_magnitude.png");
//!
//! let restored = pipeline
//!     .inverse(&report.magnitude_key, &report.phase_key, "output/ramp.png", None)
//!     .unwrap();
//! assert_eq!((restored.height, restored.width), (4, 4));
//! ```

use std::io;
use std::path::Path;
use std::str::FromStr;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::codec::{self, CodecMetadata, EncodedSpectrumPair};
use crate::config::PipelineConfig;
use crate::error::{SpectrumError, SpectrumResult};
use crate::logging::{RunJournal, RunLogEntry};
use crate::raster::Raster;
use crate::storage::{StorageAdapter, StoredObject};
use crate::transform;

/// Peak-to-peak spans at or below this many intensity levels count as a
/// constant image.
pub const DEGENERATE_SPAN_EPSILON: f64 = 1e-6;

/// Mapping from reconstructed real samples to 8-bit output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayScaling {
    /// Stretch `[min, max]` onto `[0, 255]`; constant images become all zero.
    #[default]
    MinMax,
    /// Round and clamp to `[0, 255]`, keeping absolute intensity levels.
    Preserve,
}

impl FromStr for DisplayScaling {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "min_max" | "minmax" => Ok(DisplayScaling::MinMax),
            "preserve" => Ok(DisplayScaling::Preserve),
            other => Err(format!(
                "unknown display scaling '{}', expected 'min_max' or 'preserve'",
                other
            )),
        }
    }
}

/// Storage keys of the two spectrum images derived from one input key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputKeys {
    pub magnitude: String,
    pub phase: String,
}

impl OutputKeys {
    /// `input/forest.png` with prefix `output/` becomes
    /// `output/forest_magnitude.png` and `output/forest_phase.png`.
    pub fn derive(input_key: &str, prefix: &str) -> SpectrumResult<Self> {
        let stem = Path::new(input_key)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| {
                SpectrumError::invalid_input(
                    format!("derive output keys for '{}'", input_key),
                    "key has no file name",
                )
            })?;

        Ok(Self {
            magnitude: format!("{}{}_magnitude.png", prefix, stem),
            phase: format!("{}{}_phase.png", prefix, stem),
        })
    }
}

/// Outcome of a completed forward run.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardReport {
    pub input_key: String,
    pub magnitude_key: String,
    pub phase_key: String,
    pub metadata_key: Option<String>,
    pub height: usize,
    pub width: usize,
    pub metadata: CodecMetadata,
}

/// Outcome of a completed inverse run.
#[derive(Debug, Clone, PartialEq)]
pub struct InverseReport {
    pub magnitude_key: String,
    pub phase_key: String,
    pub output_key: String,
    pub height: usize,
    pub width: usize,
    pub metadata: CodecMetadata,
    pub scaling: DisplayScaling,
}

/// Sequences decode, transform, encode and persistence for one storage backend.
pub struct Pipeline<S> {
    storage: S,
    config: PipelineConfig,
    journal: Option<RunJournal>,
}

impl<S: StorageAdapter> Pipeline<S> {
    pub fn new(storage: S, config: PipelineConfig) -> Self {
        Self {
            storage,
            config,
            journal: None,
        }
    }

    /// Records every completed run in `journal`.
    pub fn with_journal(mut self, journal: RunJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Image under `input_key` → magnitude and phase images under the given
    /// keys, plus an optional standalone JSON metadata record.
    pub fn forward(
        &self,
        input_key: &str,
        magnitude_key: &str,
        phase_key: &str,
        metadata_key: Option<&str>,
    ) -> SpectrumResult<ForwardReport> {
        let _span = info_span!("forward", input = input_key).entered();

        if !self.config.attach_metadata && metadata_key.is_none() {
            return Err(SpectrumError::invalid_input(
                "forward pipeline",
                "metadata attachment is disabled and no metadata record key was given; \
                 the magnitude image could never be inverted",
            ));
        }

        let input = self.fetch_image(input_key)?;
        let raster = Raster::decode(&input.bytes, input_key)?;
        let (height, width) = raster.dim();
        debug!(height, width, "decoded input image");

        let pair = analyze(&raster)?;
        let metadata = pair.metadata;
        debug!(mag_min = metadata.mag_min, mag_max = metadata.mag_max, "encoded spectra");
        if metadata.is_degenerate() {
            warn!("log-magnitude range is empty; magnitude image is uniform");
        }

        let attached = if self.config.attach_metadata {
            metadata.to_key_values()
        } else {
            Default::default()
        };
        let magnitude = StoredObject::new(pair.magnitude.encode_png()?).with_metadata(attached.clone());
        let phase = StoredObject::new(pair.phase.encode_png()?).with_metadata(attached);
        let record = metadata_key
            .map(|key| metadata.to_json().map(|json| (key, StoredObject::new(json))))
            .transpose()?;

        // Record first: spectra never exist without their bounds.
        if let Some((key, object)) = record {
            self.storage.store(key, object)?;
        }
        self.storage.store(magnitude_key, magnitude)?;
        self.storage.store(phase_key, phase)?;

        let report = ForwardReport {
            input_key: input_key.to_string(),
            magnitude_key: magnitude_key.to_string(),
            phase_key: phase_key.to_string(),
            metadata_key: metadata_key.map(str::to_string),
            height,
            width,
            metadata,
        };
        info!(
            magnitude = %report.magnitude_key,
            phase = %report.phase_key,
            mag_min = metadata.mag_min,
            mag_max = metadata.mag_max,
            "forward transform complete"
        );
        self.journal_entry(RunLogEntry::forward(&report));
        Ok(report)
    }

    /// Forward run with output keys derived from the input key and
    /// `output_prefix`.
    pub fn forward_derived(
        &self,
        input_key: &str,
        metadata_key: Option<&str>,
    ) -> SpectrumResult<ForwardReport> {
        let keys = OutputKeys::derive(input_key, &self.config.output_prefix)?;
        self.forward(input_key, &keys.magnitude, &keys.phase, metadata_key)
    }

    /// Magnitude and phase images → reconstructed image under `output_key`.
    ///
    /// Bounds come from the record under `metadata_key` when given, otherwise
    /// from the magnitude object's own metadata. Neither present is a
    /// [`SpectrumError::MissingMetadata`] failure; no defaults are assumed.
    pub fn inverse(
        &self,
        magnitude_key: &str,
        phase_key: &str,
        output_key: &str,
        metadata_key: Option<&str>,
    ) -> SpectrumResult<InverseReport> {
        let _span = info_span!("inverse", magnitude = magnitude_key, phase = phase_key).entered();

        let magnitude_object = self.fetch_image(magnitude_key)?;
        let metadata = self.resolve_metadata(magnitude_key, &magnitude_object, metadata_key)?;
        let magnitude = Raster::decode(&magnitude_object.bytes, magnitude_key)?;

        let phase_object = self.fetch_image(phase_key)?;
        let phase = Raster::decode(&phase_object.bytes, phase_key)?;
        if phase.dim() != magnitude.dim() {
            return Err(SpectrumError::dimension_mismatch(
                magnitude.dim(),
                phase.dim(),
                format!("phase image '{}'", phase_key),
            ));
        }

        let pair = EncodedSpectrumPair {
            magnitude,
            phase,
            metadata,
        };
        let image = reconstruct(&pair, self.config.scaling)?;
        let (height, width) = image.dim();
        self.storage
            .store(output_key, StoredObject::new(image.encode_png()?))?;

        let report = InverseReport {
            magnitude_key: magnitude_key.to_string(),
            phase_key: phase_key.to_string(),
            output_key: output_key.to_string(),
            height,
            width,
            metadata,
            scaling: self.config.scaling,
        };
        info!(output = %report.output_key, scaling = ?report.scaling, "reconstruction complete");
        self.journal_entry(RunLogEntry::inverse(&report));
        Ok(report)
    }

    /// An absent image is bad input to this run, not a storage failure.
    fn fetch_image(&self, key: &str) -> SpectrumResult<StoredObject> {
        self.storage.fetch(key).map_err(|err| match err {
            SpectrumError::Storage { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                SpectrumError::invalid_input(
                    format!("decode '{}'", key),
                    format!("image does not exist: {}", source),
                )
            }
            other => other,
        })
    }

    fn resolve_metadata(
        &self,
        magnitude_key: &str,
        magnitude_object: &StoredObject,
        metadata_key: Option<&str>,
    ) -> SpectrumResult<CodecMetadata> {
        if let Some(key) = metadata_key {
            let record = self.storage.fetch(key).map_err(|err| match err {
                SpectrumError::Storage { source, .. } => SpectrumError::missing_metadata(
                    key,
                    format!("metadata record could not be read: {}", source),
                ),
                other => other,
            })?;
            return CodecMetadata::from_json(&record.bytes, key);
        }

        if CodecMetadata::present_in(&magnitude_object.metadata) {
            return CodecMetadata::from_key_values(&magnitude_object.metadata, magnitude_key);
        }

        Err(SpectrumError::missing_metadata(
            magnitude_key,
            "no mag_min/mag_max attached to the magnitude image and no metadata record given",
        ))
    }

    fn journal_entry(&self, entry: RunLogEntry) {
        if let Some(journal) = &self.journal {
            if let Err(err) = journal.record(&entry) {
                warn!(
                    journal = %journal.path().display(),
                    "failed to append run journal entry: {}",
                    err
                );
            }
        }
    }
}

/// Image → encoded spectrum pair, entirely in memory.
pub fn analyze(raster: &Raster) -> SpectrumResult<EncodedSpectrumPair> {
    let spectrum = transform::forward_raster(raster)?;
    codec::encode(&spectrum)
}

/// Encoded spectrum pair → real-valued reconstruction before display scaling.
pub fn reconstruct_grid(pair: &EncodedSpectrumPair) -> SpectrumResult<Array2<f64>> {
    let spectrum = codec::decode(pair)?;
    Ok(transform::inverse(&spectrum))
}

/// Encoded spectrum pair → displayable 8-bit image.
pub fn reconstruct(pair: &EncodedSpectrumPair, scaling: DisplayScaling) -> SpectrumResult<Raster> {
    to_display(&reconstruct_grid(pair)?, scaling)
}

/// Maps real samples to 8-bit intensities.
pub fn to_display(grid: &Array2<f64>, scaling: DisplayScaling) -> SpectrumResult<Raster> {
    if grid.iter().any(|v| !v.is_finite()) {
        return Err(SpectrumError::invalid_input(
            "display scaling",
            "reconstruction contains non-finite samples",
        ));
    }

    let samples = match scaling {
        DisplayScaling::Preserve => grid.mapv(|v| v.round().clamp(0.0, 255.0) as u8),
        DisplayScaling::MinMax => {
            let (min, max) = grid
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                });
            let span = max - min;
            if span <= DEGENERATE_SPAN_EPSILON {
                Array2::zeros(grid.dim())
            } else {
                grid.mapv(|v| (255.0 * (v - min) / span).round().clamp(0.0, 255.0) as u8)
            }
        }
    };
    Raster::from_array(samples)
}

//! Log-magnitude bounds that travel with every magnitude image.
//!
//! Without these two numbers an 8-bit magnitude image cannot be mapped back
//! to coefficient magnitudes, so every path that reads them validates first
//! and fails with [`SpectrumError::MissingMetadata`] instead of guessing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{SpectrumError, SpectrumResult};

/// Key under which the lower bound is stored in object metadata.
pub const MAG_MIN_KEY: &str = "mag_min";
/// Key under which the upper bound is stored in object metadata.
pub const MAG_MAX_KEY: &str = "mag_max";

/// Minimum and maximum of `log1p(|c|)` observed when the magnitude image was
/// encoded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CodecMetadata {
    pub mag_min: f64,
    pub mag_max: f64,
}

impl CodecMetadata {
    pub fn new(mag_min: f64, mag_max: f64) -> Self {
        Self { mag_min, mag_max }
    }

    /// Width of the stored log-magnitude range.
    pub fn span(&self) -> f64 {
        self.mag_max - self.mag_min
    }

    /// True when every coefficient had the same log-magnitude.
    pub fn is_degenerate(&self) -> bool {
        self.mag_max == self.mag_min
    }

    /// Rejects bounds no encoder could have produced.
    ///
    /// `key` names the object the bounds belong to and is only used in the
    /// error message.
    pub fn validate(&self, key: &str) -> SpectrumResult<()> {
        if !self.mag_min.is_finite() || !self.mag_max.is_finite() {
            return Err(SpectrumError::missing_metadata(
                key,
                format!(
                    "bounds must be finite, got mag_min={} mag_max={}",
                    self.mag_min, self.mag_max
                ),
            ));
        }
        if self.mag_min < 0.0 {
            return Err(SpectrumError::missing_metadata(
                key,
                format!(
                    "log1p magnitudes are never negative, got mag_min={}",
                    self.mag_min
                ),
            ));
        }
        if self.mag_max < self.mag_min {
            return Err(SpectrumError::missing_metadata(
                key,
                format!(
                    "mag_max={} is below mag_min={}",
                    self.mag_max, self.mag_min
                ),
            ));
        }
        Ok(())
    }

    /// Pretty JSON document, the co-located sidecar format.
    pub fn to_json(&self) -> SpectrumResult<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|err| SpectrumError::invalid_input("metadata serialization", err.to_string()))
    }

    /// Parses and validates a JSON sidecar document.
    pub fn from_json(bytes: &[u8], key: &str) -> SpectrumResult<Self> {
        let metadata: Self = serde_json::from_slice(bytes)
            .map_err(|err| SpectrumError::missing_metadata(key, err.to_string()))?;
        metadata.validate(key)?;
        Ok(metadata)
    }

    /// String key-value form for object stores that only carry text metadata.
    ///
    /// `f64` formatting is shortest-round-trip, so parsing the values back
    /// yields bit-identical bounds.
    pub fn to_key_values(&self) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        values.insert(MAG_MIN_KEY.to_string(), self.mag_min.to_string());
        values.insert(MAG_MAX_KEY.to_string(), self.mag_max.to_string());
        values
    }

    /// Reads and validates bounds from object metadata.
    pub fn from_key_values(values: &BTreeMap<String, String>, key: &str) -> SpectrumResult<Self> {
        let mag_min = parse_bound(values, MAG_MIN_KEY, key)?;
        let mag_max = parse_bound(values, MAG_MAX_KEY, key)?;
        let metadata = Self::new(mag_min, mag_max);
        metadata.validate(key)?;
        Ok(metadata)
    }

    /// True when object metadata carries at least one of the bound keys.
    pub fn present_in(values: &BTreeMap<String, String>) -> bool {
        values.contains_key(MAG_MIN_KEY) || values.contains_key(MAG_MAX_KEY)
    }
}

fn parse_bound(values: &BTreeMap<String, String>, name: &str, key: &str) -> SpectrumResult<f64> {
    let raw = values
        .get(name)
        .ok_or_else(|| SpectrumError::missing_metadata(key, format!("no '{}' entry", name)))?;
    raw.trim().parse::<f64>().map_err(|err| {
        SpectrumError::missing_metadata(key, format!("'{}' = '{}' is not a number: {}", name, raw, err))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_values_are_bit_exact() {
        let metadata = CodecMetadata::new(1.0e-15, 4.795790545596741);
        let values = metadata.to_key_values();
        assert_eq!(values.len(), 2);
        let parsed = CodecMetadata::from_key_values(&values, "mag.png").unwrap();
        assert_eq!(parsed, metadata);
    }

    #[test]
    fn test_missing_key_is_missing_metadata() {
        let mut values = BTreeMap::new();
        values.insert(MAG_MIN_KEY.to_string(), "0.5".to_string());
        let err = CodecMetadata::from_key_values(&values, "mag.png").unwrap_err();
        assert!(err.is_missing_metadata());
        assert!(err.to_string().contains("mag_max"));
    }

    #[test]
    fn test_unparsable_value_is_missing_metadata() {
        let mut values = CodecMetadata::new(0.0, 3.0).to_key_values();
        values.insert(MAG_MAX_KEY.to_string(), "three".to_string());
        let err = CodecMetadata::from_key_values(&values, "mag.png").unwrap_err();
        assert!(err.is_missing_metadata());
    }

    #[test]
    fn test_swapped_bounds_rejected() {
        let err = CodecMetadata::new(5.0, 1.0).validate("mag.png").unwrap_err();
        assert!(err.is_missing_metadata());
    }

    #[test]
    fn test_negative_and_non_finite_bounds_rejected() {
        assert!(CodecMetadata::new(-0.5, 1.0).validate("k").is_err());
        assert!(CodecMetadata::new(0.0, f64::NAN).validate("k").is_err());
        assert!(CodecMetadata::new(0.0, f64::INFINITY).validate("k").is_err());
    }

    #[test]
    fn test_degenerate_bounds_are_valid() {
        let metadata = CodecMetadata::new(2.0, 2.0);
        assert!(metadata.validate("k").is_ok());
        assert!(metadata.is_degenerate());
        assert_eq!(metadata.span(), 0.0);
    }

    #[test]
    fn test_json_sidecar_round_trip() {
        let metadata = CodecMetadata::new(0.25, 7.5);
        let json = metadata.to_json().unwrap();
        let text = String::from_utf8(json.clone()).unwrap();
        assert!(text.contains("\"mag_min\""));
        assert_eq!(CodecMetadata::from_json(&json, "meta.json").unwrap(), metadata);
    }

    #[test]
    fn test_json_sidecar_without_bounds_rejected() {
        let err = CodecMetadata::from_json(br#"{"mag_min": 1.0}"#, "meta.json").unwrap_err();
        assert!(err.is_missing_metadata());
        assert!(err.to_string().contains("meta.json"));
    }

    #[test]
    fn test_present_in() {
        assert!(!CodecMetadata::present_in(&BTreeMap::new()));
        assert!(CodecMetadata::present_in(&CodecMetadata::new(0.0, 1.0).to_key_values()));
    }
}

//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document is a valid configuration:
//!
//! ```toml
//! node_size = 16
//! coincident_tolerance_m = 1e-6
//!
//! [origin]
//! lat = -23.5505
//! lon = -46.6333
//!
//! [region]
//! min_lat = -24.0
//! min_lon = -47.0
//! max_lat = -23.0
//! max_lon = -46.0
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GeoAnalysisError, Result};
use crate::projection::{GeoBounds, LatLon};

/// Tuning and session-wide settings for an [`AnalysisSession`][crate::AnalysisSession].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of points in a k-d tree leaf bucket. `1` gives one point per node.
    pub node_size: u16,
    /// Fixed projection origin. When unset the centroid of the first bulk insert is used.
    pub origin: Option<LatLon>,
    /// Records outside this region are rejected at ingestion.
    pub region: Option<GeoBounds>,
    /// Points closer than this (in metres) are merged before triangulation.
    pub coincident_tolerance_m: f64,
    /// Margin added around the input extent when clipping Voronoi cells, as a fraction of the
    /// larger side.
    pub voronoi_margin_ratio: f64,
    /// Default grid cell size for density analysis, in metres.
    pub density_cell_size_m: f64,
    /// Maximum number of points used by distribution analysis.
    pub analysis_sample_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            node_size: 16,
            origin: None,
            region: None,
            coincident_tolerance_m: 1e-6,
            voronoi_margin_ratio: 0.1,
            density_cell_size_m: 500.0,
            analysis_sample_size: 5000,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from a TOML document and validate it.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| GeoAnalysisError::Config(e.to_string()))?;
        config.validate()
    }

    /// Check every value is in range.
    pub fn validate(self) -> Result<Self> {
        if self.node_size == 0 {
            return Err(GeoAnalysisError::Config(
                "node_size must be at least 1".to_string(),
            ));
        }
        if let Some(origin) = self.origin {
            origin
                .validate()
                .map_err(|e| GeoAnalysisError::Config(format!("origin: {}", e)))?;
        }
        if let Some(region) = self.region {
            region
                .validate()
                .map_err(|e| GeoAnalysisError::Config(format!("region: {}", e)))?;
        }
        if !(self.coincident_tolerance_m.is_finite() && self.coincident_tolerance_m >= 0.0) {
            return Err(GeoAnalysisError::Config(format!(
                "coincident_tolerance_m must be a non-negative number, got {}",
                self.coincident_tolerance_m
            )));
        }
        if !(self.voronoi_margin_ratio.is_finite() && self.voronoi_margin_ratio >= 0.0) {
            return Err(GeoAnalysisError::Config(format!(
                "voronoi_margin_ratio must be a non-negative number, got {}",
                self.voronoi_margin_ratio
            )));
        }
        if !(self.density_cell_size_m.is_finite() && self.density_cell_size_m > 0.0) {
            return Err(GeoAnalysisError::Config(format!(
                "density_cell_size_m must be positive, got {}",
                self.density_cell_size_m
            )));
        }
        if self.analysis_sample_size == 0 {
            return Err(GeoAnalysisError::Config(
                "analysis_sample_size must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn parses_origin_and_region() {
        let config = EngineConfig::from_toml_str(
            r#"
            node_size = 4
            density_cell_size_m = 250.0

            [origin]
            lat = -23.5505
            lon = -46.6333

            [region]
            min_lat = -24.0
            min_lon = -47.0
            max_lat = -23.0
            max_lon = -46.0
            "#,
        )
        .unwrap();
        assert_eq!(config.node_size, 4);
        assert_eq!(config.density_cell_size_m, 250.0);
        assert_eq!(config.origin, Some(LatLon::new(-23.5505, -46.6333)));
        assert_eq!(
            config.region,
            Some(GeoBounds::new(-24.0, -47.0, -23.0, -46.0))
        );
        assert_eq!(config.analysis_sample_size, 5000);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(matches!(
            EngineConfig::from_toml_str("node_size = 0"),
            Err(GeoAnalysisError::Config(_))
        ));
        assert!(EngineConfig::from_toml_str("density_cell_size_m = -1.0").is_err());
        assert!(EngineConfig::from_toml_str("[origin]\nlat = 100.0\nlon = 0.0").is_err());
        assert!(EngineConfig::from_toml_str("node_size = \"big\"").is_err());
    }
}

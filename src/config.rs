use anyhow::{Context, Result};
use geo::LineString;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::models::{LocationProfile, ReferencePoint};
use crate::registry::LocationRegistry;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub locations: Vec<LocationConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocationConfig {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    pub lon: f64,
    pub lat: f64,
    pub near_radius_m: f64,
    pub outside_tolerance_m: f64,
    pub inside_tolerance_m: f64,
    /// Fence boundary as [lon, lat] pairs
    #[serde(default)]
    pub boundary: Vec<[f64; 2]>,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        content.parse()
    }

    /// Register every location and build the fences that have a boundary.
    pub fn build_registry(&self) -> Result<LocationRegistry> {
        let mut registry = LocationRegistry::new();

        for location in &self.locations {
            let profile = location
                .profile()
                .with_context(|| format!("Invalid location '{}'", location.id))?;
            registry.add_location(profile)?;
        }

        let boundaries: Vec<(String, LineString<f64>)> = self
            .locations
            .iter()
            .filter_map(|l| l.boundary().map(|b| (l.id.clone(), b)))
            .collect();

        let ids: Vec<String> = boundaries.iter().map(|(id, _)| id.clone()).collect();
        for (id, handle) in ids.iter().zip(registry.build_all(boundaries)) {
            handle.with_context(|| format!("Failed to build fence for '{}'", id))?;
        }

        info!(
            "Loaded {} locations, {} with fences",
            registry.len(),
            registry.fences().len()
        );

        Ok(registry)
    }
}

impl std::str::FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).context("Failed to parse config file")?;
        Ok(config)
    }
}

impl LocationConfig {
    pub fn profile(&self) -> crate::error::Result<LocationProfile> {
        LocationProfile::new(
            self.id.clone(),
            self.label.clone().unwrap_or_else(|| self.id.clone()),
            ReferencePoint::new(self.lon, self.lat),
            self.near_radius_m,
            self.outside_tolerance_m,
            self.inside_tolerance_m,
        )
    }

    pub fn boundary(&self) -> Option<LineString<f64>> {
        if self.boundary.is_empty() {
            return None;
        }
        let coords: Vec<(f64, f64)> = self.boundary.iter().map(|[lon, lat]| (*lon, *lat)).collect();
        Some(LineString::from(coords))
    }
}

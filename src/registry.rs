//! Location registry: profiles looked up by id and the fences built for them.

use geo::{LineString, Point};
use hashbrown::HashMap;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{GeofenceError, Result};
use crate::fence::{self, Classification, FenceReport};
use crate::models::{LocationProfile, PolarFence};

/// Where a registered fence lives in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FenceHandle {
    pub location_index: usize,
    pub fence_index: usize,
}

/// Holds location profiles and the fences registered for them
#[derive(Debug, Default)]
pub struct LocationRegistry {
    locations: Vec<LocationProfile>,
    by_id: HashMap<String, usize>,
    fences: Vec<PolarFence>,
}

impl LocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a location and return all registered locations.
    pub fn add_location(&mut self, profile: LocationProfile) -> Result<&[LocationProfile]> {
        if self.by_id.contains_key(profile.id()) {
            return Err(GeofenceError::DuplicateLocation(profile.id().to_string()));
        }

        info!("Adding location {} ({})", profile.id(), profile.label());
        self.by_id
            .insert(profile.id().to_string(), self.locations.len());
        self.locations.push(profile);

        Ok(&self.locations)
    }

    /// Drop every location along with their fences, returning how many locations there were.
    pub fn remove_all_locations(&mut self) -> usize {
        let count = self.locations.len();
        self.locations.clear();
        self.by_id.clear();
        self.fences.clear();
        info!("Removed {} locations", count);
        count
    }

    /// Index of the location with `id`
    pub fn lookup_location(&self, id: &str) -> Result<usize> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| GeofenceError::UnknownLocation(id.to_string()))
    }

    pub fn location(&self, index: usize) -> Result<&LocationProfile> {
        self.locations
            .get(index)
            .ok_or(GeofenceError::LocationIndexOutOfRange(index))
    }

    pub fn locations(&self) -> &[LocationProfile] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Build a fence for `boundary` around the location at `reference_index`.
    pub fn build_fence(
        &self,
        boundary: &LineString<f64>,
        reference_index: usize,
    ) -> Result<PolarFence> {
        self.build_fence_with_report(boundary, reference_index)
            .map(|report| report.fence)
    }

    /// Like [`LocationRegistry::build_fence`], keeping the fold diagnostics.
    pub fn build_fence_with_report(
        &self,
        boundary: &LineString<f64>,
        reference_index: usize,
    ) -> Result<FenceReport> {
        let location = self.location(reference_index)?;
        debug!("Building fence for {}", location.id());
        fence::build_fence_with_report(boundary, location.reference())
    }

    /// Store `fence` as the fence of location `id`.
    ///
    /// A previously registered fence stays in the list but is no longer
    /// referenced by the location.
    pub fn add_fence(&mut self, id: &str, fence: PolarFence) -> Result<FenceHandle> {
        let location_index = self.lookup_location(id)?;
        let fence_index = self.fences.len();

        self.fences.push(fence);
        self.locations[location_index].set_fence_index(Some(fence_index));

        info!("Registered fence {} for location {}", fence_index, id);

        Ok(FenceHandle {
            location_index,
            fence_index,
        })
    }

    /// Drop all fences, returning how many there were.
    pub fn clear_fences(&mut self) -> usize {
        let count = self.fences.len();
        self.fences.clear();
        for location in &mut self.locations {
            location.set_fence_index(None);
        }
        info!("Cleared {} fences", count);
        count
    }

    pub fn fence(&self, index: usize) -> Option<&PolarFence> {
        self.fences.get(index)
    }

    pub fn fences(&self) -> &[PolarFence] {
        &self.fences
    }

    /// Fence currently registered for the location at `location_index`
    pub fn fence_for(&self, location_index: usize) -> Result<&PolarFence> {
        let location = self.location(location_index)?;
        let fence_index = location
            .fence_index()
            .ok_or_else(|| GeofenceError::NoFence(location.id().to_string()))?;
        self.fences
            .get(fence_index)
            .ok_or(GeofenceError::FenceIndexOutOfRange(fence_index))
    }

    /// Build and register fences for many locations.
    ///
    /// Fences are built in parallel; registration happens afterwards in
    /// input order, so fence indices follow the order of `boundaries`.
    pub fn build_all(
        &mut self,
        boundaries: Vec<(String, LineString<f64>)>,
    ) -> Vec<Result<FenceHandle>> {
        info!("Building {} fences...", boundaries.len());

        let built: Vec<(String, Result<PolarFence>)> = boundaries
            .into_par_iter()
            .map(|(id, boundary)| {
                let fence = self
                    .lookup_location(&id)
                    .and_then(|index| self.build_fence(&boundary, index));
                (id, fence)
            })
            .collect();

        built
            .into_iter()
            .map(|(id, fence)| match fence {
                Ok(fence) => self.add_fence(&id, fence),
                Err(e) => {
                    warn!("Could not build fence for {}: {}", id, e);
                    Err(e)
                }
            })
            .collect()
    }

    /// Whether `point` is within the near radius of the location at `location_index`
    pub fn is_near(&self, location_index: usize, point: Point<f64>) -> Result<bool> {
        let location = self.location(location_index)?;
        Ok(fence::is_near(location, point))
    }

    /// Classify `point` against `fence` using the thresholds of the location at `location_index`.
    pub fn classify(
        &self,
        location_index: usize,
        fence: &PolarFence,
        point: Point<f64>,
    ) -> Result<Classification> {
        let location = self.location(location_index)?;
        Ok(fence::classify(point, location, fence))
    }

    /// Classify `point` against the fence registered for the location.
    pub fn classify_registered(
        &self,
        location_index: usize,
        point: Point<f64>,
    ) -> Result<Classification> {
        let fence = self.fence_for(location_index)?;
        self.classify(location_index, fence, point)
    }
}

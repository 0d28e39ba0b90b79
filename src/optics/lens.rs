// src/optics/lens.rs
// Lens prescription data: optical interfaces and the assembly around the aperture stop
// RELEVANT FILES: src/optics/ray_transfer.rs, src/config/mod.rs

use serde::{Deserialize, Serialize};

use crate::error::{FlareError, FlareResult};

/// Refractive index of air at standard conditions
pub const REFRACTIVE_INDEX_AIR: f64 = 1.000293;

/// Default distance from the system entrance to the first interface
pub const DEFAULT_ENTRANCE_DISTANCE: f64 = 1.0;

/// Default gap between the aperture stop and the next interface
pub const DEFAULT_APERTURE_GAP: f64 = 10.0;

/// Shape of an optical surface
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Surface {
    Flat,
    /// Spherical surface; positive radius has its centre behind the surface.
    Curved { radius: f64 },
}

/// Medium filling the gap between an interface and the next one
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Medium {
    Air,
    Glass { refractive_index: f64 },
}

impl Medium {
    pub fn refractive_index(self) -> f64 {
        match self {
            Medium::Air => REFRACTIVE_INDEX_AIR,
            Medium::Glass { refractive_index } => refractive_index,
        }
    }
}

/// One optical surface plus the medium behind it
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LensInterface {
    pub distance_to_next: f64,
    pub surface: Surface,
    pub medium: Medium,
}

impl LensInterface {
    pub const fn flat(distance_to_next: f64, medium: Medium) -> Self {
        Self {
            distance_to_next,
            surface: Surface::Flat,
            medium,
        }
    }

    pub const fn curved(distance_to_next: f64, radius: f64, medium: Medium) -> Self {
        Self {
            distance_to_next,
            surface: Surface::Curved { radius },
            medium,
        }
    }

    /// Flat air-filled surface standing in for the aperture stop
    pub const fn aperture_stop(distance_to_next: f64) -> Self {
        Self::flat(distance_to_next, Medium::Air)
    }

    #[inline]
    pub fn is_flat(&self) -> bool {
        matches!(self.surface, Surface::Flat)
    }

    #[inline]
    pub fn refractive_index(&self) -> f64 {
        self.medium.refractive_index()
    }

    /// Reject values that would turn into infinities or NaNs further down.
    pub fn validate(&self, index: usize) -> FlareResult<()> {
        if !self.distance_to_next.is_finite() || self.distance_to_next < 0.0 {
            return Err(FlareError::InvalidDistance {
                index,
                value: self.distance_to_next,
            });
        }
        if let Surface::Curved { radius } = self.surface {
            if radius == 0.0 || !radius.is_finite() {
                return Err(FlareError::ZeroCurvatureRadius { index });
            }
        }
        let n = self.refractive_index();
        if !n.is_finite() || n < 1.0 {
            return Err(FlareError::InvalidRefractiveIndex { index, value: n });
        }
        Ok(())
    }
}

/// Complete lens system: interfaces before the stop, the stop, interfaces after it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LensAssembly {
    /// Distance from the system entrance to the first interface
    #[serde(default = "LensAssembly::default_entrance_distance")]
    pub entrance_distance: f64,
    #[serde(default)]
    pub before_aperture: Vec<LensInterface>,
    /// Gap between the aperture stop and the following interface
    #[serde(default = "LensAssembly::default_aperture_gap")]
    pub aperture_gap: f64,
    #[serde(default)]
    pub after_aperture: Vec<LensInterface>,
}

impl Default for LensAssembly {
    fn default() -> Self {
        Self::reference_prescription()
    }
}

impl LensAssembly {
    fn default_entrance_distance() -> f64 {
        DEFAULT_ENTRANCE_DISTANCE
    }

    fn default_aperture_gap() -> f64 {
        DEFAULT_APERTURE_GAP
    }

    pub fn new(before_aperture: Vec<LensInterface>, after_aperture: Vec<LensInterface>) -> Self {
        Self {
            entrance_distance: DEFAULT_ENTRANCE_DISTANCE,
            before_aperture,
            aperture_gap: DEFAULT_APERTURE_GAP,
            after_aperture,
        }
    }

    /// Assembly holding nothing but the aperture stop
    pub fn stop_only(entrance_distance: f64, aperture_gap: f64) -> Self {
        Self {
            entrance_distance,
            before_aperture: Vec::new(),
            aperture_gap,
            after_aperture: Vec::new(),
        }
    }

    /// Eight-surface prescription with the stop between the fifth and sixth surface.
    pub fn reference_prescription() -> Self {
        let glass = |n| Medium::Glass { refractive_index: n };
        Self {
            entrance_distance: 10.0,
            before_aperture: vec![
                LensInterface::curved(7.7, 30.0, glass(1.652)),
                LensInterface::curved(1.85, -89.35, glass(1.602)),
                LensInterface::curved(3.52, 580.38, Medium::Air),
                LensInterface::curved(1.85, -80.63, glass(1.643)),
                LensInterface::curved(4.18, 28.34, Medium::Air),
            ],
            aperture_gap: 3.0,
            after_aperture: vec![
                LensInterface::flat(1.85, glass(1.581)),
                LensInterface::curved(7.27, 32.19, glass(1.694)),
                LensInterface::curved(81.857, -52.99, Medium::Air),
            ],
        }
    }

    /// Index of the synthesized aperture interface
    #[inline]
    pub fn aperture_index(&self) -> usize {
        self.before_aperture.len()
    }

    #[inline]
    pub fn interface_count(&self) -> usize {
        self.before_aperture.len() + self.after_aperture.len() + 1
    }

    pub fn aperture_interface(&self) -> LensInterface {
        LensInterface::aperture_stop(self.aperture_gap)
    }

    /// Full ordered interface list with the aperture stop spliced in
    pub fn interfaces(&self) -> Vec<LensInterface> {
        let mut all = Vec::with_capacity(self.interface_count());
        all.extend_from_slice(&self.before_aperture);
        all.push(self.aperture_interface());
        all.extend_from_slice(&self.after_aperture);
        all
    }

    pub fn validate(&self) -> FlareResult<()> {
        if !self.entrance_distance.is_finite() || self.entrance_distance < 0.0 {
            return Err(FlareError::config(format!(
                "lens.entrance_distance {} must be finite and >= 0",
                self.entrance_distance
            )));
        }
        for (index, interface) in self.interfaces().iter().enumerate() {
            interface.validate(index)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_count_includes_aperture() {
        let lens = LensAssembly::reference_prescription();
        assert_eq!(lens.interface_count(), 5 + 3 + 1);
        assert_eq!(lens.aperture_index(), 5);

        let all = lens.interfaces();
        assert_eq!(all.len(), lens.interface_count());
        let stop = all[lens.aperture_index()];
        assert!(stop.is_flat());
        assert_eq!(stop.medium, Medium::Air);
        assert_eq!(stop.distance_to_next, 3.0);
    }

    #[test]
    fn test_zero_radius_rejected() {
        let lens = LensAssembly::new(
            vec![
                LensInterface::curved(1.0, 20.0, Medium::Glass { refractive_index: 1.5 }),
                LensInterface::curved(1.0, 0.0, Medium::Air),
            ],
            Vec::new(),
        );
        assert_eq!(lens.validate(), Err(FlareError::ZeroCurvatureRadius { index: 1 }));
    }

    #[test]
    fn test_flat_interface_ignores_radius() {
        let lens = LensAssembly::new(vec![LensInterface::flat(1.0, Medium::Air)], Vec::new());
        assert!(lens.validate().is_ok());
    }

    #[test]
    fn test_invalid_refractive_index_rejected() {
        let lens = LensAssembly::new(
            Vec::new(),
            vec![LensInterface::flat(1.0, Medium::Glass { refractive_index: -1.5 })],
        );
        // the stop sits at index 0, so the first post-stop surface is index 1
        assert_eq!(
            lens.validate(),
            Err(FlareError::InvalidRefractiveIndex { index: 1, value: -1.5 })
        );
    }

    #[test]
    fn test_negative_distance_rejected() {
        let lens = LensAssembly::new(vec![LensInterface::flat(-2.0, Medium::Air)], Vec::new());
        assert!(matches!(
            lens.validate(),
            Err(FlareError::InvalidDistance { index: 0, .. })
        ));
    }
}

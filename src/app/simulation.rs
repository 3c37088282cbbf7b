//! Placeholder crop simulation. The metrics are random draws around a fixed
//! formula, not an agronomic model.

use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::rng::RngExt;

pub const DEFAULT_IRRIGATION: f64 = 3.0;
pub const DEFAULT_FERTILIZER: f64 = 80.0;
pub const IRRIGATION_RANGE: RangeInclusive<f64> = 0.0..=10.0;
pub const FERTILIZER_RANGE: RangeInclusive<f64> = 0.0..=200.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Crop {
    #[default]
    Maize,
    Wheat,
    Soy,
    Sorghum,
}

impl Crop {
    pub const ALL: [Crop; 4] = [Crop::Maize, Crop::Wheat, Crop::Soy, Crop::Sorghum];

    pub fn label(self) -> &'static str {
        match self {
            Crop::Maize => "Maize",
            Crop::Wheat => "Wheat",
            Crop::Soy => "Soy",
            Crop::Sorghum => "Sorghum",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationParams {
    irrigation: f64,
    fertilizer: f64,
    crop: Crop,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            irrigation: DEFAULT_IRRIGATION,
            fertilizer: DEFAULT_FERTILIZER,
            crop: Crop::default(),
        }
    }
}

impl SimulationParams {
    pub fn new(irrigation: f64, fertilizer: f64, crop: Crop) -> Self {
        let mut params = Self {
            crop,
            ..Self::default()
        };
        params.set_irrigation(irrigation);
        params.set_fertilizer(fertilizer);
        params
    }

    pub fn irrigation(&self) -> f64 {
        self.irrigation
    }

    pub fn fertilizer(&self) -> f64 {
        self.fertilizer
    }

    pub fn crop(&self) -> Crop {
        self.crop
    }

    /// Clamps into the slider range; non-finite input is ignored.
    pub fn set_irrigation(&mut self, value: f64) -> bool {
        clamp_into(&mut self.irrigation, value, &IRRIGATION_RANGE)
    }

    pub fn set_fertilizer(&mut self, value: f64) -> bool {
        clamp_into(&mut self.fertilizer, value, &FERTILIZER_RANGE)
    }

    pub fn set_crop(&mut self, crop: Crop) {
        self.crop = crop;
    }
}

fn clamp_into(slot: &mut f64, value: f64, range: &RangeInclusive<f64>) -> bool {
    if !value.is_finite() {
        return false;
    }
    *slot = value.clamp(*range.start(), *range.end());
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EcoImpact {
    Low,
    Moderate,
    High,
}

impl EcoImpact {
    pub fn from_fertilizer(fertilizer: f64) -> Self {
        if fertilizer > 100.0 {
            EcoImpact::High
        } else if fertilizer > 50.0 {
            EcoImpact::Moderate
        } else {
            EcoImpact::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EcoImpact::Low => "Low",
            EcoImpact::Moderate => "Moderate",
            EcoImpact::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationResult {
    /// Tonnes per hectare, one decimal.
    pub yield_t_per_ha: f64,
    /// Cubic metres, whole number.
    pub water_m3: f64,
    pub eco_impact: EcoImpact,
    pub score: i64,
}

/// Runs one simulation. Draws are taken in the order yield, water, score.
pub fn simulate<R: Rng + ?Sized>(params: &SimulationParams, rng: &mut R) -> SimulationResult {
    let irrigation = params.irrigation;
    let fertilizer = params.fertilizer;

    let yield_t_per_ha = (rng.random_f64(5.0, 15.0) * 10.0).round() / 10.0;
    let water_m3 = (irrigation * 15.0 + rng.random_f64(0.0, 20.0)).round();
    let score =
        (100.0 - fertilizer / 2.0 + irrigation * 3.0 + rng.random_f64(0.0, 20.0)).floor() as i64;

    SimulationResult {
        yield_t_per_ha,
        water_m3,
        eco_impact: EcoImpact::from_fertilizer(fertilizer),
        score,
    }
}

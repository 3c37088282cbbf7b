use serde::Serialize;

use super::{
    activity::ActivityLog,
    simulation::{Crop, SimulationParams, SimulationResult},
};
use crate::geodata::GeoData;

pub const PROMPT_LABEL: &str = "Click the map to select";
pub const OCEAN_LABEL: &str = "Ocean or undetermined zone";
pub const NO_DATA_SUMMARY: &str = "No data for the selected area";
pub const EMPTY_RESULT: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoDataStatus {
    Pending,
    Ready,
    Failed,
}

impl From<&GeoData> for GeoDataStatus {
    fn from(data: &GeoData) -> Self {
        match data {
            GeoData::Pending => GeoDataStatus::Pending,
            GeoData::Ready(_) => GeoDataStatus::Ready,
            GeoData::Failed(_) => GeoDataStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsPanel {
    #[serde(rename = "yield")]
    pub yield_value: String,
    pub water: String,
    pub eco: String,
    pub score: String,
}

impl Default for ResultsPanel {
    fn default() -> Self {
        Self {
            yield_value: EMPTY_RESULT.to_string(),
            water: EMPTY_RESULT.to_string(),
            eco: EMPTY_RESULT.to_string(),
            score: EMPTY_RESULT.to_string(),
        }
    }
}

impl From<&SimulationResult> for ResultsPanel {
    fn from(result: &SimulationResult) -> Self {
        Self {
            yield_value: format!("{:.1} t/ha", result.yield_t_per_ha),
            water: format!("{:.0} m³", result.water_m3),
            eco: result.eco_impact.label().to_string(),
            score: result.score.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub id: u64,
    pub message: String,
}

/// Everything the browser renders, pushed as one frame after each event.
#[derive(Debug, Clone, Serialize)]
pub struct ViewState {
    pub irrigation: f64,
    pub fertilizer: f64,
    pub crop: Crop,
    pub selected_label: String,
    pub data_summary: String,
    pub results: ResultsPanel,
    pub banner: Option<Banner>,
    pub geodata: GeoDataStatus,
    pub country_count: usize,
    pub log: ActivityLog,
}

impl ViewState {
    pub fn new(log: ActivityLog) -> Self {
        let params = SimulationParams::default();
        Self {
            irrigation: params.irrigation(),
            fertilizer: params.fertilizer(),
            crop: params.crop(),
            selected_label: PROMPT_LABEL.to_string(),
            data_summary: NO_DATA_SUMMARY.to_string(),
            results: ResultsPanel::default(),
            banner: None,
            geodata: GeoDataStatus::Pending,
            country_count: 0,
            log,
        }
    }

    pub fn sync_params(&mut self, params: &SimulationParams) {
        self.irrigation = params.irrigation();
        self.fertilizer = params.fertilizer();
        self.crop = params.crop();
    }

    pub fn sync_geodata(&mut self, data: &GeoData) {
        self.geodata = data.into();
        self.country_count = data.ready().map_or(0, |c| c.len());
    }
}

//! Application controller.
//!
//! `App` owns every piece of session state: the geodata slot, the current
//! selection, the simulation inputs and the rendered view. Events are fed in
//! one at a time through [`App::handle`], which mutates state and returns the
//! effects the runtime must carry out (publish a frame, arm a timer).

pub mod activity;
pub mod runtime;
pub mod selection;
pub mod simulation;
pub mod view;

use std::{sync::Arc, time::Duration};

use rand::Rng;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    config::AppConfig,
    geodata::{CountryCollection, GeoData, GeoPoint, LoadError},
    resolver::{DataNotReady, PointResolver},
};

pub use activity::{ActivityLog, LogEntry};
pub use runtime::Controller;
pub use selection::{CountryName, Selection, Transition};
pub use simulation::{simulate, Crop, EcoImpact, SimulationParams, SimulationResult};
pub use view::{Banner, GeoDataStatus, ResultsPanel, ViewState};

pub const NO_SELECTION_MESSAGE: &str = "Please select a country on the map first";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to load geodata: {0}")]
    Load(#[from] LoadError),
    #[error(transparent)]
    DataNotReady(#[from] DataNotReady),
    #[error("{0}")]
    Validation(String),
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    GeoDataLoaded(Result<Arc<CountryCollection>, LoadError>),
    MapClicked(GeoPoint),
    IrrigationChanged(f64),
    FertilizerChanged(f64),
    CropChanged(Crop),
    RunSimulation,
    Reset,
    DataSummaryReady(CountryName),
    SimulationCompleted(SimulationResult),
    DismissBanner(u64),
}

#[derive(Debug, Clone)]
pub enum Effect {
    Render,
    Schedule { after: Duration, event: AppEvent },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub summary_delay: Duration,
    pub simulation_delay: Duration,
    pub banner_ttl: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            summary_delay: Duration::from_millis(800),
            simulation_delay: Duration::from_millis(1500),
            banner_ttl: Duration::from_secs(5),
        }
    }
}

impl Timings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            summary_delay: Duration::from_millis(config.simulation.summary_delay_ms),
            simulation_delay: Duration::from_millis(config.simulation.simulation_delay_ms),
            banner_ttl: Duration::from_secs(config.ui.banner_secs),
        }
    }
}

pub fn data_summary(country: &CountryName) -> String {
    format!("Data for {country}: temperature 15-28°C, precipitation 45-120mm")
}

pub struct App<R> {
    geodata: GeoData,
    resolver: PointResolver,
    selection: Selection,
    params: SimulationParams,
    view: ViewState,
    timings: Timings,
    rng: R,
    next_banner_id: u64,
}

impl<R: Rng> App<R> {
    pub fn new(rng: R, timings: Timings, log_capacity: usize) -> Self {
        Self {
            geodata: GeoData::Pending,
            resolver: PointResolver::new(),
            selection: Selection::Unselected,
            params: SimulationParams::default(),
            view: ViewState::new(ActivityLog::with_capacity(log_capacity)),
            timings,
            rng,
            next_banner_id: 0,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn frame(&self) -> ViewState {
        self.view.clone()
    }

    pub fn handle(&mut self, event: AppEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        let outcome = match event {
            AppEvent::GeoDataLoaded(result) => self.on_geodata(result),
            AppEvent::MapClicked(point) => self.on_map_click(point, &mut effects),
            AppEvent::IrrigationChanged(value) => {
                self.set_input("Irrigation", |params| params.set_irrigation(value))
            }
            AppEvent::FertilizerChanged(value) => {
                self.set_input("Fertilizer", |params| params.set_fertilizer(value))
            }
            AppEvent::CropChanged(crop) => {
                self.params.set_crop(crop);
                self.view.sync_params(&self.params);
                Ok(())
            }
            AppEvent::RunSimulation => self.on_run_simulation(&mut effects),
            AppEvent::Reset => {
                self.reset();
                Ok(())
            }
            AppEvent::DataSummaryReady(country) => {
                self.view.data_summary = data_summary(&country);
                self.log(format!("Climate data loaded for {country}"));
                Ok(())
            }
            AppEvent::SimulationCompleted(result) => {
                self.view.results = ResultsPanel::from(&result);
                self.log(format!("Simulation finished. Score: {}", result.score));
                Ok(())
            }
            AppEvent::DismissBanner(id) => {
                if self.view.banner.as_ref().is_some_and(|b| b.id == id) {
                    self.view.banner = None;
                }
                Ok(())
            }
        };

        if let Err(err) = outcome {
            self.report(err, &mut effects);
        }
        effects.push(Effect::Render);
        effects
    }

    fn on_geodata(
        &mut self,
        result: Result<Arc<CountryCollection>, LoadError>,
    ) -> Result<(), AppError> {
        match result {
            Ok(collection) => {
                self.geodata = GeoData::Ready(collection);
                self.view.sync_geodata(&self.geodata);
                self.log("Geodata loaded successfully");
                Ok(())
            }
            Err(err) => {
                self.geodata = GeoData::Failed(err.to_string());
                self.view.sync_geodata(&self.geodata);
                Err(err.into())
            }
        }
    }

    fn on_map_click(&mut self, point: GeoPoint, effects: &mut Vec<Effect>) -> Result<(), AppError> {
        let hit = self
            .resolver
            .resolve(&self.geodata, point)?
            .and_then(|feature| CountryName::new(feature.name.clone()));

        match self.selection.apply_click(hit) {
            Transition::Entered(country) => {
                self.view.selected_label = format!("🌍 {country}");
                self.log(format!("Selected country: {country}"));
                effects.push(Effect::Schedule {
                    after: self.timings.summary_delay,
                    event: AppEvent::DataSummaryReady(country),
                });
            }
            Transition::Cleared => {
                self.view.selected_label = view::OCEAN_LABEL.to_string();
                self.log("Ocean zone selected - no data available");
            }
        }
        Ok(())
    }

    fn set_input(
        &mut self,
        field: &str,
        apply: impl FnOnce(&mut SimulationParams) -> bool,
    ) -> Result<(), AppError> {
        if !apply(&mut self.params) {
            return Err(AppError::Validation(format!("{field} must be a number")));
        }
        self.view.sync_params(&self.params);
        Ok(())
    }

    fn on_run_simulation(&mut self, effects: &mut Vec<Effect>) -> Result<(), AppError> {
        let country = self
            .selection
            .country()
            .cloned()
            .ok_or_else(|| AppError::Validation(NO_SELECTION_MESSAGE.to_string()))?;
        let snapshot = self.params;

        self.log(format!(
            "Starting simulation for {country}, crop: {}",
            snapshot.crop().label()
        ));
        self.log(format!(
            "Irrigation: {} l/m², Fertilizer: {} units/ha",
            snapshot.irrigation(),
            snapshot.fertilizer()
        ));

        let result = simulate(&snapshot, &mut self.rng);
        effects.push(Effect::Schedule {
            after: self.timings.simulation_delay,
            event: AppEvent::SimulationCompleted(result),
        });
        Ok(())
    }

    fn reset(&mut self) {
        self.params = SimulationParams::default();
        self.selection.clear();
        self.view.sync_params(&self.params);
        self.view.selected_label = view::PROMPT_LABEL.to_string();
        self.view.data_summary = view::NO_DATA_SUMMARY.to_string();
        self.view.results = ResultsPanel::default();
        self.log("Parameters reset to defaults");
    }

    fn report(&mut self, err: AppError, effects: &mut Vec<Effect>) {
        let message = err.to_string();
        error!(error = %message, "user-facing error");
        self.view.log.push(message.clone());

        self.next_banner_id += 1;
        let id = self.next_banner_id;
        self.view.banner = Some(Banner { id, message });
        effects.push(Effect::Schedule {
            after: self.timings.banner_ttl,
            event: AppEvent::DismissBanner(id),
        });
    }

    fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{message}");
        self.view.log.push(message);
    }
}

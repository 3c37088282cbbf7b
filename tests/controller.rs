mod common;

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use agromap::{
    app::{
        data_summary, view, App, AppEvent, Controller, CountryName, Crop, Effect, GeoDataStatus,
        ResultsPanel, Selection, Timings, ViewState, NO_SELECTION_MESSAGE,
    },
    geodata::{GeoPoint, LoadError},
};
use rand::rngs::mock::StepRng;
use tokio::sync::mpsc;

fn pinned_app() -> App<StepRng> {
    App::new(StepRng::new(0, 0), Timings::default(), 10)
}

fn loaded_app() -> App<StepRng> {
    let mut app = pinned_app();
    app.handle(AppEvent::GeoDataLoaded(Ok(common::mini_world())));
    app
}

fn scheduled(effects: &[Effect]) -> Vec<(Duration, AppEvent)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Schedule { after, event } => Some((*after, event.clone())),
            Effect::Render => None,
        })
        .collect()
}

#[test]
fn click_on_country_selects_it_and_schedules_summary() {
    let mut app = loaded_app();
    let effects = app.handle(AppEvent::MapClicked(GeoPoint::new(5.0, 5.0)));

    let westland = CountryName::new("Westland").unwrap();
    assert_eq!(app.selection(), &Selection::Selected(westland.clone()));
    assert_eq!(app.view().selected_label, "🌍 Westland");
    assert_eq!(
        app.view().log.latest().map(|e| e.message.as_str()),
        Some("Selected country: Westland")
    );

    let timers = scheduled(&effects);
    assert_eq!(timers.len(), 1);
    assert_eq!(timers[0].0, Duration::from_millis(800));
    assert!(matches!(&timers[0].1, AppEvent::DataSummaryReady(name) if *name == westland));
    assert!(matches!(effects.last(), Some(Effect::Render)));
}

#[test]
fn ocean_click_clears_selection() {
    let mut app = loaded_app();
    app.handle(AppEvent::MapClicked(GeoPoint::new(5.0, 5.0)));
    let effects = app.handle(AppEvent::MapClicked(GeoPoint::new(15.0, 5.0)));

    assert_eq!(app.selection(), &Selection::Unselected);
    assert_eq!(app.view().selected_label, view::OCEAN_LABEL);
    assert!(scheduled(&effects).is_empty());
}

#[test]
fn clicking_another_country_switches_selection() {
    let mut app = loaded_app();
    app.handle(AppEvent::MapClicked(GeoPoint::new(5.0, 5.0)));
    app.handle(AppEvent::MapClicked(GeoPoint::new(25.0, 5.0)));
    assert_eq!(
        app.selection().country().map(CountryName::as_str),
        Some("Eastland")
    );
}

#[test]
fn click_before_load_reports_data_not_ready() {
    let mut app = pinned_app();
    let effects = app.handle(AppEvent::MapClicked(GeoPoint::new(5.0, 5.0)));

    assert_eq!(app.selection(), &Selection::Unselected);
    let banner = app.view().banner.clone().expect("banner shown");
    assert_eq!(banner.message, "Geodata is not loaded yet");
    assert_eq!(
        app.view().log.latest().map(|e| e.message.as_str()),
        Some("Geodata is not loaded yet")
    );

    let timers = scheduled(&effects);
    assert_eq!(timers.len(), 1);
    assert_eq!(timers[0].0, Duration::from_secs(5));
    assert!(matches!(timers[0].1, AppEvent::DismissBanner(id) if id == banner.id));
}

#[test]
fn failed_load_is_reported_and_blocks_resolution() {
    let mut app = pinned_app();
    app.handle(AppEvent::GeoDataLoaded(Err(LoadError::Status(404))));
    assert_eq!(app.view().geodata, GeoDataStatus::Failed);
    assert_eq!(
        app.view().banner.as_ref().map(|b| b.message.as_str()),
        Some("Failed to load geodata: server responded with status 404")
    );

    app.handle(AppEvent::MapClicked(GeoPoint::new(5.0, 5.0)));
    assert_eq!(
        app.view().banner.as_ref().map(|b| b.message.as_str()),
        Some("Geodata is not loaded yet")
    );
}

#[test]
fn successful_load_updates_status() {
    let app = loaded_app();
    assert_eq!(app.view().geodata, GeoDataStatus::Ready);
    assert_eq!(app.view().country_count, 8);
    assert_eq!(
        app.view().log.latest().map(|e| e.message.as_str()),
        Some("Geodata loaded successfully")
    );
}

#[test]
fn simulation_without_selection_is_rejected_and_leaves_results_alone() {
    let mut app = loaded_app();
    let effects = app.handle(AppEvent::RunSimulation);

    assert_eq!(app.view().results, ResultsPanel::default());
    assert_eq!(
        app.view().banner.as_ref().map(|b| b.message.as_str()),
        Some(NO_SELECTION_MESSAGE)
    );
    let timers = scheduled(&effects);
    assert_eq!(timers.len(), 1);
    assert!(matches!(timers[0].1, AppEvent::DismissBanner(_)));
}

#[test]
fn simulation_with_pinned_randomness_scores_69() {
    let mut app = loaded_app();
    app.handle(AppEvent::MapClicked(GeoPoint::new(5.0, 5.0)));
    let effects = app.handle(AppEvent::RunSimulation);

    assert_eq!(app.view().results, ResultsPanel::default());
    let messages: Vec<_> = app.view().log.entries().map(|e| e.message.clone()).collect();
    assert_eq!(messages[0], "Irrigation: 3 l/m², Fertilizer: 80 units/ha");
    assert_eq!(messages[1], "Starting simulation for Westland, crop: Maize");

    let timers = scheduled(&effects);
    assert_eq!(timers.len(), 1);
    assert_eq!(timers[0].0, Duration::from_millis(1500));
    let AppEvent::SimulationCompleted(result) = timers[0].1.clone() else {
        panic!("expected a completion event");
    };
    assert_eq!(result.score, 69);

    app.handle(AppEvent::SimulationCompleted(result));
    assert_eq!(app.view().results.score, "69");
    assert_eq!(app.view().results.yield_value, "5.0 t/ha");
    assert_eq!(app.view().results.water, "45 m³");
    assert_eq!(app.view().results.eco, "Moderate");
    assert_eq!(
        app.view().log.latest().map(|e| e.message.as_str()),
        Some("Simulation finished. Score: 69")
    );
}

#[test]
fn input_changes_are_clamped_and_shown() {
    let mut app = pinned_app();
    app.handle(AppEvent::IrrigationChanged(7.0));
    app.handle(AppEvent::FertilizerChanged(500.0));
    app.handle(AppEvent::CropChanged(Crop::Sorghum));

    assert_eq!(app.params().irrigation(), 7.0);
    assert_eq!(app.params().fertilizer(), 200.0);
    assert_eq!(app.view().irrigation, 7.0);
    assert_eq!(app.view().fertilizer, 200.0);
    assert_eq!(app.view().crop, Crop::Sorghum);
}

#[test]
fn reset_restores_defaults_from_any_state() {
    let mut app = loaded_app();
    app.handle(AppEvent::MapClicked(GeoPoint::new(5.0, 5.0)));
    app.handle(AppEvent::IrrigationChanged(9.0));
    app.handle(AppEvent::FertilizerChanged(150.0));
    app.handle(AppEvent::CropChanged(Crop::Wheat));
    app.handle(AppEvent::DataSummaryReady(CountryName::new("Westland").unwrap()));
    app.handle(AppEvent::RunSimulation);
    let effects = app.handle(AppEvent::Reset);

    assert!(scheduled(&effects).is_empty());
    assert_eq!(app.params().irrigation(), 3.0);
    assert_eq!(app.params().fertilizer(), 80.0);
    assert_eq!(app.params().crop(), Crop::Maize);
    assert_eq!(app.selection(), &Selection::Unselected);
    assert_eq!(app.view().selected_label, view::PROMPT_LABEL);
    assert_eq!(app.view().data_summary, view::NO_DATA_SUMMARY);
    assert_eq!(app.view().results, ResultsPanel::default());
    assert_eq!(
        app.view().log.latest().map(|e| e.message.as_str()),
        Some("Parameters reset to defaults")
    );

    // reset on a fresh app behaves the same
    let mut fresh = pinned_app();
    fresh.handle(AppEvent::Reset);
    assert_eq!(fresh.params(), app.params());
    assert_eq!(fresh.view().results, ResultsPanel::default());
}

#[test]
fn activity_log_is_capped_newest_first() {
    let mut app = loaded_app();
    for i in 0..15 {
        let lng = if i % 2 == 0 { 5.0 } else { 25.0 };
        app.handle(AppEvent::MapClicked(GeoPoint::new(lng, 5.0)));
    }
    assert_eq!(app.view().log.len(), 10);
    assert_eq!(
        app.view().log.latest().map(|e| e.message.as_str()),
        Some("Selected country: Westland")
    );
}

fn spawn_controller(
    app: App<StepRng>,
) -> (
    mpsc::Sender<AppEvent>,
    Arc<Mutex<Vec<ViewState>>>,
    tokio::task::JoinHandle<App<StepRng>>,
) {
    let (tx, rx) = mpsc::channel(16);
    let frames = Arc::new(Mutex::new(Vec::new()));
    let sink = frames.clone();
    let controller = Controller::new(app, &tx, rx, move |frame: &ViewState| {
        sink.lock().unwrap().push(frame.clone());
    });
    (tx, frames, tokio::spawn(controller.run()))
}

#[tokio::test(start_paused = true)]
async fn controller_fires_scheduled_events() {
    let (tx, frames, handle) = spawn_controller(pinned_app());

    tx.send(AppEvent::GeoDataLoaded(Ok(common::mini_world())))
        .await
        .unwrap();
    tx.send(AppEvent::MapClicked(GeoPoint::new(5.0, 5.0)))
        .await
        .unwrap();
    tx.send(AppEvent::RunSimulation).await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    drop(tx);

    let app = handle.await.unwrap();
    let westland = CountryName::new("Westland").unwrap();
    assert_eq!(app.view().data_summary, data_summary(&westland));
    assert_eq!(app.view().results.score, "69");

    // initial frame plus one per handled event (3 sent, 2 timers)
    assert_eq!(frames.lock().unwrap().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn late_simulation_result_overwrites_reset() {
    let (tx, _frames, handle) = spawn_controller(pinned_app());

    tx.send(AppEvent::GeoDataLoaded(Ok(common::mini_world())))
        .await
        .unwrap();
    tx.send(AppEvent::MapClicked(GeoPoint::new(5.0, 5.0)))
        .await
        .unwrap();
    tx.send(AppEvent::RunSimulation).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    tx.send(AppEvent::Reset).await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    drop(tx);

    let app = handle.await.unwrap();
    assert_eq!(app.selection(), &Selection::Unselected);
    assert_eq!(app.view().results.score, "69");
    // the summary timer armed before the reset also lands
    assert_ne!(app.view().data_summary, view::NO_DATA_SUMMARY);
}

#[tokio::test(start_paused = true)]
async fn banner_is_dismissed_after_ttl() {
    let (tx, frames, handle) = spawn_controller(pinned_app());

    tx.send(AppEvent::RunSimulation).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(frames
        .lock()
        .unwrap()
        .last()
        .is_some_and(|frame| frame.banner.is_some()));

    tokio::time::sleep(Duration::from_secs(5)).await;
    drop(tx);
    let app = handle.await.unwrap();
    assert!(app.view().banner.is_none());
}

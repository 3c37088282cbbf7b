#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use agromap::geodata::CountryCollection;

pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/mini_world.geojson")
}

pub fn fixture_text() -> String {
    std::fs::read_to_string(fixture_path()).expect("fixture readable")
}

pub fn mini_world() -> Arc<CountryCollection> {
    Arc::new(CountryCollection::parse(&fixture_text()).expect("fixture parses"))
}

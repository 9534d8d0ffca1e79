#![allow(dead_code)]

use std::path::PathBuf;

use gtfs_graph::prelude::*;

/// In-memory feed, one table per file name; putting a table twice replaces it.
#[derive(Default, Clone)]
pub struct MockFeed {
    tables: Vec<RawTable>,
}

impl MockFeed {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn put_lines(mut self, name: &str, header: &str, lines: &[&str]) -> Self {
        let table = RawTable::from_lines(name, header, lines);
        match self.tables.iter_mut().find(|table| table.name == name) {
            Some(existing) => *existing = table,
            None => self.tables.push(table),
        }
        self
    }

    pub fn put_agency(self) -> Self {
        self.put_lines(
            "agency",
            "agency_id,agency_name,agency_url,agency_timezone",
            &["a0,Agency,http://agency.gov/,America/Los_Angeles"],
        )
    }

    /// One agency, one route, two stops and a trip between them.
    pub fn put_minimal(self) -> Self {
        self.put_agency()
            .put_lines(
                "routes",
                "route_id,route_short_name,route_long_name,route_type",
                &["r0,10,The Ten,3"],
            )
            .put_lines(
                "stops",
                "stop_id,stop_name,stop_lat,stop_lon",
                &["s0,Stop Zero,47.668422,-122.290149", "s1,Stop One,47.670962,-122.309157"],
            )
            .put_lines(
                "trips",
                "route_id,service_id,trip_id",
                &["r0,sid0,t0"],
            )
            .put_lines(
                "stop_times",
                "trip_id,arrival_time,departure_time,stop_id,stop_sequence",
                &["t0,01:00:00,01:05:00,s0,0", "t0,01:30:00,01:30:00,s1,1"],
            )
    }

    pub fn feed(&self) -> Feed {
        self.tables.clone().into()
    }

    pub fn load(&self, agency_id: &str) -> Result<Repository, Error> {
        self.load_with(Config::default().with_agency_id(agency_id))
    }

    pub fn load_with(&self, config: Config) -> Result<Repository, Error> {
        Repository::load(&Schema::standard(), &config, &self.feed())
    }
}

pub fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

pub fn load_directory(name: &str, agency_id: &str) -> Repository {
    let reader = GtfsReader::new(Config::default().with_agency_id(agency_id))
        .from_directory(data_path(name));
    Repository::load_gtfs(&Schema::standard(), &reader).unwrap()
}

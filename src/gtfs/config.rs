pub struct Config {
    /// Scope for every composite id in the feed. Taken from the first
    /// agency row when unset.
    pub default_agency_id: Option<String>,
    pub table_extension: String,
    pub locations_file_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_agency_id: None,
            table_extension: ".txt".into(),
            locations_file_name: "locations.geojson".into(),
        }
    }
}

impl Config {
    pub fn with_agency_id(mut self, agency_id: impl Into<String>) -> Self {
        self.default_agency_id = Some(agency_id.into());
        self
    }

    /// Maps an archive entry to the table it holds, `None` for files the
    /// loader does not read.
    pub fn table_for_file<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        let file_name = file_name.rsplit('/').next().unwrap_or(file_name);
        if file_name == self.locations_file_name {
            return Some(LOCATIONS_TABLE);
        }
        file_name
            .strip_suffix(self.table_extension.as_str())
            .filter(|name| !name.is_empty())
    }
}

pub const LOCATIONS_TABLE: &str = "locations";

#[test]
fn maps_files_to_tables() {
    let config = Config::default();
    assert_eq!(config.table_for_file("stops.txt"), Some("stops"));
    assert_eq!(config.table_for_file("feed/fare_leg_rules.txt"), Some("fare_leg_rules"));
    assert_eq!(config.table_for_file("locations.geojson"), Some("locations"));
    assert_eq!(config.table_for_file("README.md"), None);
    assert_eq!(config.table_for_file(".txt"), None);
}

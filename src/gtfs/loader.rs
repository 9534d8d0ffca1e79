use crate::gtfs::{self, Config, Feed, LOCATIONS_TABLE, Row, Table, models::GtfsLocations};
use csv::{ReaderBuilder, Trim};
use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};
use tracing::{debug, warn};

#[derive(Default)]
pub enum StorageType {
    #[default]
    None,
    Zip(PathBuf),
    Directory(PathBuf),
}

/// Reads the files of a feed into raw tables.
///
/// This is only the I/O edge: no value is interpreted here, every field is
/// kept as the string found in the file.
#[derive(Default)]
pub struct GtfsReader {
    config: Config,
    storage: StorageType,
}

impl GtfsReader {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            storage: Default::default(),
        }
    }

    pub fn from_zip<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.storage = StorageType::Zip(path.as_ref().to_path_buf());
        self
    }

    pub fn from_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.storage = StorageType::Directory(path.as_ref().to_path_buf());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn read(&self) -> Result<Feed, gtfs::Error> {
        let now = Instant::now();
        let feed = match &self.storage {
            StorageType::None => Feed::new(),
            StorageType::Zip(path) => self.read_zip(path)?,
            StorageType::Directory(path) => self.read_directory(path)?,
        };
        debug!("Reading feed took {:?}", now.elapsed());
        Ok(feed)
    }

    fn read_zip(&self, path: &Path) -> Result<Feed, gtfs::Error> {
        let file = fs::File::open(path)?;
        let mut archive = zip::ZipArchive::new(file)?;
        let mut feed = Feed::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            match self.config.table_for_file(&name) {
                Some(table) => feed.push(read_table(table, &mut file)?),
                None => warn!("Skipping {name}"),
            }
        }
        Ok(feed)
    }

    fn read_directory(&self, path: &Path) -> Result<Feed, gtfs::Error> {
        if !path.is_dir() {
            return Err(gtfs::Error::FileNotFound(path.display().to_string()));
        }
        let mut entries: Vec<PathBuf> = fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_file())
            .collect();
        // Directory listing order is platform dependent
        entries.sort();

        let mut feed = Feed::new();
        for entry in entries {
            let Some(name) = entry.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            match self.config.table_for_file(name) {
                Some(table) => {
                    let mut file = fs::File::open(&entry)?;
                    feed.push(read_table(table, &mut file)?);
                }
                None => warn!("Skipping {name}"),
            }
        }
        Ok(feed)
    }
}

fn read_table<R: Read>(name: &str, reader: &mut R) -> Result<Table, gtfs::Error> {
    debug!("Reading {name}...");
    let rows = if name == LOCATIONS_TABLE {
        parse_geojson(reader)?
    } else {
        parse_csv(reader)?
    };
    debug!("Read {} rows from {name}", rows.len());
    Ok(Table::new(name, rows))
}

fn parse_csv<R: Read>(reader: &mut R) -> Result<Vec<Row>, gtfs::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<Arc<str>> = rdr
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').into())
        .collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row: Row = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn parse_geojson<R: Read>(reader: &mut R) -> Result<Vec<Row>, gtfs::Error> {
    let locations: GtfsLocations = serde_json::from_reader(reader)?;
    Ok(locations.features.into_iter().map(Row::from).collect())
}

#[test]
fn csv_with_bom_and_padding() {
    let mut data = "\u{feff}fare_product_id, amount ,currency\nfare_1, 5 ,EUR\n".as_bytes();
    let rows = parse_csv(&mut data).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("fare_product_id"), Some("fare_1"));
    assert_eq!(rows[0].get("amount"), Some("5"));
}

#[test]
fn short_records_leave_columns_absent() {
    let mut data = "stop_id,stop_name,stop_desc\na,Alpha\n".as_bytes();
    let rows = parse_csv(&mut data).unwrap();
    assert_eq!(rows[0].get("stop_name"), Some("Alpha"));
    assert_eq!(rows[0].get("stop_desc"), None);
}

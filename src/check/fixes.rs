use anyhow::{Context, Result};
use csv::ReaderBuilder;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// One GPS fix for a location
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub location: String,
    pub lon: f64,
    pub lat: f64,
}

/// Load fixes from a CSV file (optionally gzipped)
pub fn load_fixes(path: &Path) -> Result<Vec<Fix>> {
    info!("Loading fixes from {}", path.display());

    let file = File::open(path).context("Failed to open fixes file")?;
    let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    read_fixes(reader)
}

//schema

//location,lon,lat
//psa_1,103.7700,1.2800
//psa_1,103.7702,1.2801
pub fn read_fixes<R: Read>(reader: R) -> Result<Vec<Fix>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();

    // Find column indices
    let location_idx = headers
        .iter()
        .position(|h| h == "location")
        .context("Column 'location' not found")?;
    let lon_idx = headers
        .iter()
        .position(|h| h == "lon")
        .context("Column 'lon' not found")?;
    let lat_idx = headers
        .iter()
        .position(|h| h == "lat")
        .context("Column 'lat' not found")?;

    let mut fixes = Vec::new();

    for (line, result) in csv_reader.records().enumerate() {
        let record = result?;

        match (record[lon_idx].parse::<f64>(), record[lat_idx].parse::<f64>()) {
            (Ok(lon), Ok(lat)) => fixes.push(Fix {
                location: record[location_idx].to_string(),
                lon,
                lat,
            }),
            _ => warn!("Skipping unparseable fix on row {}", line + 1),
        }
    }

    info!("Loaded {} fixes", fixes.len());
    Ok(fixes)
}

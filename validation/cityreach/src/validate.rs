//! Cross-validation against reference scenario outputs.
//!
//! Reads JSON scenarios produced by the reference implementation from
//! `../output/reference`, runs the engine on each, and writes the computed
//! scores, attendance, and KPI tables to `../output/cityreach` for
//! side-by-side comparison.

use cityreach::prelude::*;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    #[serde(default)]
    notes: String,
    config: ConfigData,
    units: Vec<UnitData>,
    demand: Vec<LocationData>,
}

#[derive(Debug, Deserialize)]
struct ConfigData {
    cutoff: f64,
    clip_level: f64,
    attendance_correction: bool,
}

#[derive(Debug, Deserialize)]
struct UnitData {
    category: String,
    #[serde(default)]
    name: String,
    id: u64,
    lat: f64,
    lon: f64,
    capacity: Option<f64>,
    catchments: Vec<CatchmentData>,
}

#[derive(Debug, Deserialize)]
struct CatchmentData {
    band: String,
    #[serde(default)]
    shape: Option<String>,
    #[serde(default)]
    amplitude: Option<f64>,
    lengthscale: f64,
}

#[derive(Debug, Deserialize)]
struct LocationData {
    zone: u32,
    lat: f64,
    lon: f64,
    /// Residents per age band, in band order.
    population: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct Output {
    name: String,
    notes: String,
    attendance: Vec<Option<f64>>,
    scores: Vec<ScoreBlock>,
    kpis: Vec<KpiBlock>,
}

#[derive(Debug, Serialize)]
struct ScoreBlock {
    category: String,
    band: String,
    values: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct KpiBlock {
    category: String,
    zone: u32,
    values: Vec<f64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let input_dir = Path::new("../output/reference");
    let output_dir = Path::new("../output/cityreach");

    if !input_dir.exists() {
        eprintln!(
            "Input directory {:?} does not exist. Export reference scenarios first.",
            input_dir
        );
        return Ok(());
    }

    fs::create_dir_all(output_dir)?;

    for entry in fs::read_dir(input_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            info!(file = ?path.file_name(), "processing scenario");
            process_file(&path, output_dir)?;
        }
    }

    Ok(())
}

fn process_file(input_path: &Path, output_dir: &Path) -> Result<(), Box<dyn Error>> {
    let file = fs::File::open(input_path)?;
    let scenario: Scenario = serde_json::from_reader(file)?;

    let model = Reach::new()
        .cutoff(scenario.config.cutoff)
        .correction_clip(scenario.config.clip_level)
        .attendance_correction(scenario.config.attendance_correction)
        .build()?;

    let mut units = scenario
        .units
        .iter()
        .map(build_unit)
        .collect::<Result<Vec<_>, _>>()?;

    let rows = scenario
        .demand
        .iter()
        .map(|location| {
            let mut row = DemandLocation::new(location.zone, location.lat, location.lon);
            for (band, &count) in AgeBand::ALL.iter().zip(location.population.iter()) {
                row = row.with_population(*band, count);
            }
            row
        })
        .collect();
    let demand = DemandTable::new(rows)?;

    let evaluation = model.evaluate(&mut units, &demand)?;
    let kpis = model.weight_by_population(&evaluation, &demand)?;

    let mut scores = Vec::new();
    let mut kpi_blocks = Vec::new();
    for category in ServiceCategory::ALL {
        for &band in category.demand_bands() {
            if let Some(values) = evaluation.band_scores(category, band) {
                scores.push(ScoreBlock {
                    category: category.label().to_string(),
                    band: band.label().to_string(),
                    values: values.to_vec(),
                });
            }
        }
        if let Some(rows) = kpis.rows(category) {
            for row in rows {
                kpi_blocks.push(KpiBlock {
                    category: category.label().to_string(),
                    zone: row.zone,
                    values: row.values.to_vec(),
                });
            }
        }
    }

    let output = Output {
        name: scenario.name.clone(),
        notes: scenario.notes,
        attendance: evaluation.attendance().to_vec(),
        scores,
        kpis: kpi_blocks,
    };

    let file_name = input_path.file_name().ok_or("missing file name")?;
    let out = fs::File::create(output_dir.join(file_name))?;
    serde_json::to_writer_pretty(out, &output)?;
    println!("Wrote {:?} for scenario '{}'", file_name, scenario.name);
    Ok(())
}

fn build_unit(data: &UnitData) -> Result<ServiceUnit<f64>, Box<dyn Error>> {
    let category = parse_category(&data.category)?;
    let mut builder = ServiceUnitBuilder::new(category)
        .name(data.name.clone())
        .unit_id(data.id)
        .position(data.lat, data.lon);
    if let Some(capacity) = data.capacity {
        builder = builder.capacity(capacity);
    }
    for catchment in &data.catchments {
        let band = parse_band(&catchment.band)?;
        let mut kernel = match catchment.shape.as_deref() {
            Some("exponential") => Catchment::exponential(catchment.lengthscale),
            _ => Catchment::gaussian(catchment.lengthscale),
        };
        if let Some(amplitude) = catchment.amplitude {
            kernel = kernel.with_amplitude(amplitude);
        }
        builder = builder.catchment(band, kernel);
    }
    Ok(builder.build()?)
}

fn parse_category(label: &str) -> Result<ServiceCategory, Box<dyn Error>> {
    match label {
        "school" => Ok(School),
        "library" => Ok(Library),
        "transit_stop" => Ok(TransitStop),
        "pharmacy" => Ok(Pharmacy),
        "urban_green" => Ok(UrbanGreen),
        other => Err(format!("unknown category: {other}").into()),
    }
}

fn parse_band(label: &str) -> Result<AgeBand, Box<dyn Error>> {
    AgeBand::ALL
        .into_iter()
        .find(|band| band.label() == label)
        .ok_or_else(|| format!("unknown age band: {label}").into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category_covers_the_catalog() {
        for (label, expected) in [
            ("school", School),
            ("library", Library),
            ("transit_stop", TransitStop),
            ("pharmacy", Pharmacy),
            ("urban_green", UrbanGreen),
        ] {
            assert_eq!(parse_category(label).unwrap(), expected);
        }
    }

    #[test]
    fn test_unknown_labels_are_errors_not_panics() {
        assert!(parse_category("hospital").is_err());
        assert!(parse_band("Toddler").is_err());
    }
}

//! Pipeline steps shared by the commands: fetch, load and clip, derive,
//! aggregate, report.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use bestplace_algorithms::constraint::{aggregate, BestPlace, BestPlaceResult};
use bestplace_algorithms::vector::{area, clip_collection, dissolve, perimeter};
use bestplace_core::io::{read_geojson, write_geojson, CONSTRAINT_NAME_PROPERTY};
use bestplace_core::{ConstraintRecord, ConstraintSet, FeatureCollection};
use bestplace_fetch::blocking::FetcherBlocking;
use bestplace_fetch::{DatasetCache, FetcherOptions};
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::spinner;

pub fn open_fetcher(config: &RunConfig) -> Result<FetcherBlocking> {
    FetcherBlocking::new(
        config.wfs.clone(),
        DatasetCache::new(&config.data_dir),
        FetcherOptions::default(),
    )
    .context("Failed to set up the dataset fetcher")
}

/// Ensure every configured dataset is cached.
pub fn fetch_all(config: &RunConfig, fetcher: &FetcherBlocking) -> Result<()> {
    for type_name in config.type_names() {
        let pb = spinner(&format!("Fetching {}...", type_name));
        let outcome = fetcher
            .ensure(type_name)
            .with_context(|| format!("Failed to fetch {}", type_name))?;
        pb.finish_and_clear();
        let state = if outcome.downloaded { "downloaded" } else { "cached" };
        println!("{:<45} {:<10} {}", type_name, state, outcome.path.display());
    }
    Ok(())
}

/// Load and clip one dataset.
fn load_clipped(
    config: &RunConfig,
    fetcher: &FetcherBlocking,
    type_name: &str,
) -> Result<FeatureCollection> {
    let pb = spinner(&format!("Reading {}...", type_name));
    let layer = fetcher
        .load(type_name)
        .with_context(|| format!("Failed to load {}", type_name))?;
    pb.finish_and_clear();

    let clipped = clip_collection(&layer, &config.bbox);
    info!(
        dataset = type_name,
        features = layer.len(),
        kept = clipped.len(),
        "clipped to bbox"
    );
    Ok(clipped)
}

/// Load every constraint source and derive the constraint set.
pub fn build_constraints(config: &RunConfig, fetcher: &FetcherBlocking) -> Result<ConstraintSet> {
    let mut layers = HashMap::new();
    for dataset in &config.datasets {
        let layer = load_clipped(config, fetcher, &dataset.type_name)?;
        layers.insert(dataset.type_name.clone(), layer);
    }

    let set = config
        .rule_table()
        .derive_set(&layers, &config.crs())
        .context("Failed to derive constraint layers")?;
    debug!(records = set.len(), names = ?set.names(), "constraint set ready");
    Ok(set)
}

/// Clip the context layers and write them next to the results.
pub fn export_context(config: &RunConfig, fetcher: &FetcherBlocking, dir: &Path) -> Result<()> {
    for type_name in &config.context_layers {
        let layer = load_clipped(config, fetcher, type_name)?;
        let path = dir
            .join(DatasetCache::file_name(type_name))
            .with_extension("geojson");
        write_layer(&layer, &path)?;
        println!("Context layer saved to: {}", path.display());
    }
    Ok(())
}

pub fn read_constraints(path: &Path) -> Result<ConstraintSet> {
    let pb = spinner("Reading constraints...");
    let collection = read_geojson(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    pb.finish_and_clear();
    ConstraintSet::from_feature_collection(collection).context("Not a constraint layer")
}

pub fn run_aggregate(config: &RunConfig, set: &ConstraintSet) -> Result<BestPlaceResult> {
    let pb = spinner("Aggregating constraints...");
    let result = aggregate(set, config.aggregate.params()).context("Aggregation failed")?;
    pb.finish_and_clear();
    Ok(result)
}

pub fn write_layer(collection: &FeatureCollection, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    write_geojson(collection, path).context("Failed to write output")?;
    pb.finish_and_clear();
    Ok(())
}

/// Human-readable outcome line for a result.
pub fn describe(result: &BestPlaceResult) -> String {
    match &result.region {
        BestPlace::Unset => "no constraints applied".to_string(),
        BestPlace::Empty => "no overlap".to_string(),
        BestPlace::Region(mp) => format!(
            "{} polygon(s), total area {:.1} m² ({:.3} km²)",
            mp.0.len(),
            result.area(),
            result.area() / 1e6
        ),
    }
}

pub fn report(result: &BestPlaceResult) {
    println!("Best place: {}", describe(result));
    println!("  Applied: {}", result.applied.join(", "));
    if !result.skipped.is_empty() {
        println!("  Skipped (no geometry): {}", result.skipped.join(", "));
    }
}

/// Per-constraint totals of an exported layer
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayerSummary {
    pub records: usize,
    /// Area covered by the dissolved constraint; overlaps count once
    pub area: f64,
    /// Outline length of the dissolved constraint
    pub perimeter: f64,
}

/// Dissolve the features of a layer by constraint name and measure each
/// region. Features without a name are ignored; features without areal
/// geometry only count as records.
pub fn summarize(collection: &FeatureCollection) -> BTreeMap<String, LayerSummary> {
    let mut summary: BTreeMap<String, LayerSummary> = BTreeMap::new();
    let mut shapes = Vec::new();
    for feature in collection.iter() {
        let Some(name) = feature
            .get_property(CONSTRAINT_NAME_PROPERTY)
            .and_then(|v| v.as_text())
        else {
            continue;
        };
        summary.entry(name.clone()).or_default().records += 1;
        let record = feature
            .geometry
            .clone()
            .and_then(|g| ConstraintRecord::from_geometry(name.clone(), g).ok());
        if let Some(geometry) = record.and_then(|r| r.geometry) {
            shapes.push((name, geometry));
        }
    }

    for (name, region) in dissolve(&shapes) {
        if let Some(entry) = summary.get_mut(&name) {
            entry.area = area(&region.clone().into());
            entry.perimeter = perimeter(&region.into());
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use bestplace_algorithms::constraint::{ConstraintRule, DatasetRules, FeatureFilter};
    use bestplace_algorithms::vector::BoundingBox;
    use bestplace_fetch::WfsSource;

    const SERVICES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"service_ids": "663"},
             "geometry": {"type": "Point", "coordinates": [1000.0, 1000.0]}},
            {"type": "Feature", "properties": {"service_ids": 662},
             "geometry": {"type": "Point", "coordinates": [1300.0, 1000.0]}},
            {"type": "Feature", "properties": {"service_ids": "663"},
             "geometry": {"type": "Point", "coordinates": [90000.0, 90000.0]}}
        ]
    }"#;

    fn offline_config(dir: &Path) -> RunConfig {
        let service = |code: &str| FeatureFilter::attribute_equals("service_ids", code);
        RunConfig {
            data_dir: dir.to_path_buf(),
            context_layers: vec![],
            wfs: WfsSource::new("http://127.0.0.1:9/wfs"),
            bbox: BoundingBox::new(0.0, 0.0, 5000.0, 5000.0),
            datasets: vec![DatasetRules::new(
                "avoindata:Toimipisterekisteri_palvelut",
                vec![
                    ConstraintRule::new("daycare", service("663"), 500.0),
                    ConstraintRule::new("upper_school", service("662"), 500.0),
                ],
            )],
            ..RunConfig::default()
        }
    }

    fn seeded(dir: &Path) -> (RunConfig, FetcherBlocking) {
        let config = offline_config(dir);
        let fetcher = open_fetcher(&config).unwrap();
        fetcher
            .cache()
            .store("avoindata:Toimipisterekisteri_palvelut", SERVICES.as_bytes())
            .unwrap();
        (config, fetcher)
    }

    #[test]
    fn test_pipeline_on_cached_data() {
        let dir = tempfile::tempdir().unwrap();
        let (config, fetcher) = seeded(dir.path());

        let set = build_constraints(&config, &fetcher).unwrap();
        // The far point is clipped away
        assert_eq!(set.len(), 2);
        assert_eq!(set.names(), vec!["daycare", "upper_school"]);

        let result = run_aggregate(&config, &set).unwrap();
        assert!(matches!(result.region, BestPlace::Region(_)));
        // Two r=500 circles 300 apart overlap in a lens narrower than either
        assert!(result.area() > 0.0);
        assert!(result.area() < std::f64::consts::PI * 500.0 * 500.0);
        assert_eq!(result.applied, vec!["daycare", "upper_school"]);
    }

    #[test]
    fn test_exported_constraints_reload() {
        let dir = tempfile::tempdir().unwrap();
        let (config, fetcher) = seeded(dir.path());
        let set = build_constraints(&config, &fetcher).unwrap();

        let path = dir.path().join("out").join("constraints.geojson");
        write_layer(&set.to_feature_collection(), &path).unwrap();
        let reloaded = read_constraints(&path).unwrap();
        assert_eq!(reloaded.names(), set.names());

        let summary = summarize(&set.to_feature_collection());
        let daycare = summary["daycare"];
        assert_eq!(daycare.records, 1);
        // 32-gon inscribed in a r=500 circle
        assert!(daycare.area > 0.95 * std::f64::consts::PI * 250_000.0);
        assert!(daycare.perimeter > 0.0 && daycare.perimeter < 2.0 * std::f64::consts::PI * 500.0);
    }

    #[test]
    fn test_summary_dissolves_overlaps() {
        let layer = bestplace_core::io::parse_geojson(
            r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"constraint_name": "big_park"},
                 "geometry": {"type": "Polygon",
                              "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]}},
                {"type": "Feature", "properties": {"constraint_name": "big_park"},
                 "geometry": {"type": "Polygon",
                              "coordinates": [[[5,0],[15,0],[15,10],[5,10],[5,0]]]}},
                {"type": "Feature", "properties": {"constraint_name": "sea"},
                 "geometry": null}
            ]
        }"#,
        )
        .unwrap();

        let summary = summarize(&layer);
        let park = summary["big_park"];
        assert_eq!(park.records, 2);
        // Two 10x10 squares overlapping by half: one 15x10 outline
        assert!((park.area - 150.0).abs() < 1e-9);
        assert!((park.perimeter - 50.0).abs() < 1e-9);
        assert_eq!(summary["sea"].records, 1);
        assert_eq!(summary["sea"].area, 0.0);
    }

    #[test]
    fn test_describe_degenerate_results() {
        let mut result = BestPlaceResult {
            region: BestPlace::Unset,
            applied: vec![],
            skipped: vec!["sea".into()],
            crs: bestplace_core::CRS::etrs_gk25(),
        };
        assert_eq!(describe(&result), "no constraints applied");
        result.region = BestPlace::Empty;
        assert_eq!(describe(&result), "no overlap");
    }
}

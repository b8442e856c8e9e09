//! Integration tests for the dataset fetcher.
//!
//! Tests marked `#[ignore]` require network access to the Helsinki WFS.
//! Run with: `cargo test -p bestplace-fetch -- --ignored`

use bestplace_fetch::blocking::FetcherBlocking;
use bestplace_fetch::{DatasetCache, FetcherOptions, WfsSource};

/// Download the sea area layer and check that a second call hits the cache.
#[test]
#[ignore]
fn test_download_sea_area_from_helsinki() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = FetcherBlocking::new(
        WfsSource::helsinki(),
        DatasetCache::new(dir.path()),
        FetcherOptions::default(),
    )
    .expect("failed to build fetcher");

    let first = fetcher.ensure("avoindata:Maavesi_merialue").expect("download failed");
    assert!(first.downloaded);
    assert!(first.path.is_file());

    let second = fetcher.ensure("avoindata:Maavesi_merialue").unwrap();
    assert!(!second.downloaded);
    assert_eq!(first.path, second.path);

    let fc = fetcher.load("avoindata:Maavesi_merialue").unwrap();
    assert!(!fc.is_empty(), "sea layer should have features");
    println!("Maavesi_merialue: {} features, CRS {}", fc.len(), fc.crs);
}

/// Pre-seeded cache files are used without touching the network.
#[test]
fn test_blocking_fetcher_uses_seeded_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache = DatasetCache::new(dir.path());
    let body = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"service_ids": "663"},
            "geometry": {"type": "Point", "coordinates": [25496000.0, 6672000.0]}
        }]
    }"#;
    cache.store("avoindata:Toimipisterekisteri_palvelut", body.as_bytes()).unwrap();

    let fetcher = FetcherBlocking::new(
        WfsSource::new("http://127.0.0.1:9/wfs"),
        cache,
        FetcherOptions::default(),
    )
    .unwrap();

    let outcomes = fetcher
        .ensure_all(["avoindata:Toimipisterekisteri_palvelut"])
        .unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].downloaded);

    let fc = fetcher.load("avoindata:Toimipisterekisteri_palvelut").unwrap();
    assert_eq!(fc.len(), 1);
}

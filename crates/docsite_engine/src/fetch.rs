/* Benchmark data fetcher.

Offline job that mirrors the published benchmark assets: the bucket's
assets.json lists every key; allow-listed JSON results go into the api
directory, everything else (charts, images) into the public directory.
Downloads run concurrently, one thread per asset. */

use std::io::Write;
use std::thread;
use std::time::Instant;

use tracing::{debug, info, instrument};

use docsite_base::{DocsiteError, DocsiteResult, FilePath, PalHandle, err};

use crate::config::Config;

/// JSON assets the site consumes; other JSON keys in the bucket are
/// intermediate artifacts and are skipped.
const PERF_JSONS: [&str; 2] = ["checksum.json", "latest-results-parsed.json"];

const ASSETS_KEY: &str = "assets.json";

/// Download the latest benchmark results and assets.
///
/// All-or-nothing: the first failed download fails the whole job, leaving
/// retry to the caller (or the next scheduled run).
#[instrument(skip(pal, config))]
pub fn fetch_perf_data(pal: &PalHandle, config: &Config) -> DocsiteResult<()> {
    let start = Instant::now();
    let base_url = config.assets_base_url.trim_end_matches('/');

    let listing = pal.fetch_object(&format!("{base_url}/{ASSETS_KEY}"))?;
    let keys: Vec<String> = serde_json::from_slice(&listing)
        .map_err(|e| Box::new(DocsiteError::fetch(format!("{base_url}/{ASSETS_KEY}"), e.to_string())))?;

    let api_dir = config.api_dir();
    let public_dir = config.public_dir();
    pal.create_directory_all(&api_dir)?;
    pal.create_directory_all(&public_dir)?;

    let downloads: Vec<(String, FilePath)> = keys
        .into_iter()
        .filter_map(|key| {
            let is_json = key.ends_with(".json");
            if is_json && !PERF_JSONS.contains(&key.as_str()) {
                debug!(%key, "skipping non-published JSON asset");
                return None;
            }
            let dir = if is_json { &api_dir } else { &public_dir };
            Some((key.clone(), dir.join(key)))
        })
        .collect();

    thread::scope(|scope| {
        let handles: Vec<_> = downloads
            .iter()
            .map(|(key, target)| {
                scope.spawn(move || fetch_one(pal, base_url, key, target))
            })
            .collect();
        for handle in handles {
            handle
                .join()
                .map_err(|_| err!("download thread panicked"))??;
        }
        Ok::<(), Box<DocsiteError>>(())
    })?;

    info!(
        assets = downloads.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "fetched benchmark data"
    );
    Ok(())
}

fn fetch_one(pal: &PalHandle, base_url: &str, key: &str, target: &FilePath) -> DocsiteResult<()> {
    let bytes = pal.fetch_object(&format!("{base_url}/{key}"))?;
    let mut writer = pal.create_file(target)?;
    writer
        .write_all(&bytes)
        .map_err(|e| Box::new(DocsiteError::file(target.as_path().to_path_buf(), e)))?;
    debug!(%key, size = bytes.len(), "asset written");
    Ok(())
}

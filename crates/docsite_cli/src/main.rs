/* The CLI is intentionally minimal: one positional mode, no flags, no
argument-parsing dependency. It always reads `docsite.toml` from the
current directory (every key has a default, so the file is optional).

Modes:
- `serve` (default): start the docs site server and run until killed
- `generate`: regenerate the per-service descriptor JSON and the index
- `fetch-perf`: download the latest published benchmark data

Exit codes: 0 on success, 1 on any failure. */

use std::env;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use docsite_base::tracing::init_tracing;
use docsite_base::{DocsiteResult, FilePath, HttpServerConfig, PalHandle, RealPal};
use docsite_engine::{
    ApiService, CacheHandle, Config, PageRenderer, ServiceAssembler, UnboundedCache,
    fetch_perf_data, generate_plugin_data, load_config,
};

/// Analytics payloads are only enabled in production deploys.
const ENV_VAR: &str = "DOCSITE_ENV";

fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("Error: Failed to initialize tracing: {}", e);
        process::exit(1);
    }

    let mode = env::args().nth(1).unwrap_or_else(|| "serve".to_string());

    let current_dir = env::current_dir().unwrap_or_else(|e| {
        eprintln!("Error: Failed to get current directory: {}", e);
        process::exit(1);
    });
    let pal = PalHandle::new(RealPal::new(current_dir));

    let config = match load_config(&pal, &FilePath::from("docsite.toml")) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config from docsite.toml: {}", e);
            process::exit(1);
        }
    };

    let result = match mode.as_str() {
        "serve" => serve(&pal, &config),
        "generate" => generate_plugin_data(&pal, &config),
        "fetch-perf" => fetch_perf_data(&pal, &config),
        other => {
            eprintln!("Error: Unknown mode '{}'", other);
            eprintln!("Usage: docsite [serve|generate|fetch-perf]");
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn serve(pal: &PalHandle, config: &Config) -> DocsiteResult<()> {
    let analytics = env::var(ENV_VAR).is_ok_and(|v| v == "production");

    let assembler = ServiceAssembler::new(
        pal.clone(),
        config.template_path(),
        config.data_dir(),
        config.package_scope.clone(),
    );
    let renderer = PageRenderer::new(
        pal.clone(),
        config,
        assembler,
        CacheHandle::new(UnboundedCache::new()),
        analytics,
    );
    let service = ApiService::new(Arc::new(renderer));

    let mut server_config = HttpServerConfig::new(config.host.clone());
    if let Some(port) = config.port {
        server_config = server_config.with_port(port);
    }
    let handle = pal.start_http_server(Box::new(service), server_config)?;

    println!("{} listening on http://{}:{}", config.title, config.host, handle.port());

    // The accept loop runs on its own thread; park here until killed
    loop {
        std::thread::sleep(Duration::from_secs(3600));
    }
}

pub mod api;
pub mod assemble;
pub mod cache;
pub mod config;
pub mod datagen;
pub mod fetch;
pub mod methods;
pub mod model;
pub mod perf;
pub mod render;
pub mod site;

pub use api::ApiService;
pub use assemble::{AssembledPage, ServiceAssembler};
pub use cache::{BoundedCache, CacheHandle, CachedPage, PageCache, UnboundedCache};
pub use config::{Config, load_config};
pub use datagen::generate_plugin_data;
pub use fetch::fetch_perf_data;
pub use methods::generate_methods;
pub use model::{
    DocLink, MethodDescriptor, MethodEntry, ParamDescriptor, ParamType, ServiceDescriptor,
    ServiceIndexEntry, TypeSpec, load_service,
};
pub use perf::{Checksum, PerfStats, interpolate_perf_page, stats_tables};
pub use render::{RenderedDoc, render_markdown};
pub use site::{PageRenderer, PageResponse, PageStatus};

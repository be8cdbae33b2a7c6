/* The Platform Abstraction Layer (PAL) is a trait-based abstraction over
filesystem access, object-storage fetches and the HTTP server. Code depends
on the Pal trait, not on a concrete implementation, so the whole request
path and both offline jobs can run against MockPal in unit tests without
touching the real filesystem or the network. */

mod file_path;
pub mod http;
pub mod mock;
pub mod real_pal;
mod traits;

pub use file_path::FilePath;
pub use mock::MockPal;
pub use real_pal::RealPal;
pub use traits::{Pal, PalHandle, ReadSeek};

// Link resolution - clients, orchestration, and payload normalization

pub mod clients;
pub mod errors;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod traits;

pub use clients::{PlatformClient, WideClient};
pub use errors::ResolveError;
pub use models::{Backend, MediaFormat, ResolveMode, ResolvedMedia, ResolverConfig};
pub use normalize::normalize;
pub use orchestrator::{extract_url, Resolver};
pub use traits::ResolverClient;

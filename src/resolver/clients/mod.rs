// Upstream resolver clients

pub mod platform;
pub mod wide;

pub use platform::PlatformClient;
pub use wide::WideClient;

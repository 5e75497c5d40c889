pub mod api;
pub mod config;
pub mod device;

pub use config::Config;
pub use device::SharedTv;
pub use device::TvControl;

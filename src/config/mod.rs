pub mod credentials;
pub mod loader;
pub mod schema;

pub use loader::{CONFIG_PATH_ENV, load_config, read_config, resolve_config_path};
pub use schema::{Config, GatewayConfig, HttpConfig, LineConfig, RakutenConfig};

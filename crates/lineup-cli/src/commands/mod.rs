pub mod config;
pub mod lookup;
pub mod migrate;
pub mod review;
pub mod status;
pub mod validate;

pub use config::run_config;
pub use lookup::run_lookup;
pub use migrate::run_migrate;
pub use review::run_review;
pub use status::show_status;
pub use validate::run_validate;

//! Price monitor over two DEX venues
//!
//! Loads [`dexarb_core::Settings`], resolves the watched pair on both venues
//! and polls their prices, quoting a round trip when the gap passes the
//! configured threshold.

pub mod monitor;
pub mod settings;

pub use monitor::{PriceMonitor, Snapshot, Venue};
pub use settings::{load_settings, ENV_PREFIX};

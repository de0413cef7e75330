//! Pipeline entry points for scraper operations.
//!
//! - `run_listing_phase`: walk the paginated public listing
//! - `run_detail_phase`: synchronize stale projects via the detail API
//! - `derive_red_flags`: reconcile compliance flags for one snapshot
//! - `run_pipeline`: full mode-driven run, listing then detail

pub mod crawl;
pub mod flags;
pub mod pipeline;
pub mod sync;

pub use crawl::{ListingOptions, run_listing_phase};
pub use flags::{derive_red_flags, evaluate_red_flags};
pub use pipeline::{ScrapeMode, run_pipeline};
pub use sync::run_detail_phase;

pub mod activity;
pub mod ingest;
pub mod status;
pub mod totals;

pub use activity::show as show_activity;
pub use ingest::run as run_ingest;
pub use status::status;
pub use totals::{summary, totals};

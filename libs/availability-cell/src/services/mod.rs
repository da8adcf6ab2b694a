pub mod availability;
pub mod expander;
pub mod generator;
pub mod pruner;
pub mod rewriter;

pub use availability::AvailabilityService;
pub use expander::{expand_template, localize, start_of_local_day};
pub use generator::generate_horizon;
pub use pruner::{prune_boundary, prune_free_slots};
pub use rewriter::rewrite_availability;

pub mod granary;

pub use granary::default_granary_dir;

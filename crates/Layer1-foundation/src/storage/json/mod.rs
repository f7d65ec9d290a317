mod store;

pub use store::{JsonStore, HOOKS_CONFIG_FILE};

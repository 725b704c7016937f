mod settings;

pub use settings::{Action, Config, Settings};

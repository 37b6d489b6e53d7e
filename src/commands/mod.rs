pub mod food_cmd;

pub use food_cmd::{ScanPipeline, TerminalNavigator};

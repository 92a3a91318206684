pub mod constants;
pub mod coordinates;
pub mod logging;
pub mod paths;
pub mod progress;

pub use constants::*;
pub use coordinates::{parse_coordinate, validate_coordinates};
pub use logging::init_logging;
pub use paths::{entity_dir, entity_file_path, parent_dir, parent_file_path, series_file_name};
pub use progress::ProgressReporter;

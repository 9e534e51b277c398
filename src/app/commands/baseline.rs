//! Print the embedded baseline fragment.

use crate::app::commands::build::{self, OutputFormat};
use crate::domain::AppError;
use crate::services::baseline::load_baseline;

/// Render the unshaped baseline fragment, for inspection.
pub fn execute(format: OutputFormat) -> Result<String, AppError> {
    let template = load_baseline()?;
    build::render(&template.to_value()?, format)
}

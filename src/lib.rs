use std::path::Path;

use crate::api::scheduler_dto::SchedulerDto;
use crate::domain::scheduler::scheduler::Scheduler;
use crate::error::Result;
use crate::loader::parser::parse_json_file;

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Builds a scheduler from a JSON configuration file, with all configured tasks admitted.
pub fn generate_scheduler(file_path: impl AsRef<Path>) -> Result<Scheduler> {
    let root_dto: SchedulerDto = parse_json_file(file_path.as_ref())?;
    log::info!("Configuration '{}' parsed successfully.", file_path.as_ref().display());

    let scheduler = Scheduler::try_from(root_dto)?;
    log::info!("Scheduler constructed successfully.");

    Ok(scheduler)
}

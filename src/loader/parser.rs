use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Reads `file_path` and deserializes its JSON content into `T`.
///
/// I/O failures become `Error::IoError`, malformed documents `Error::DeserializationError`.
pub fn parse_json_file<T: DeserializeOwned>(file_path: impl AsRef<Path>) -> Result<T> {
    let path = file_path.as_ref();

    let data = fs::read_to_string(path)?;
    log::debug!("Read {} bytes from '{}'.", data.len(), path.display());

    Ok(serde_json::from_str(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::scheduler_dto::SchedulerDto;
    use crate::error::Error;

    #[test]
    fn malformed_json_is_a_deserialization_error() {
        let path = std::env::temp_dir().join(format!("grid_task_scheduler_malformed_{}.json", std::process::id()));
        fs::write(&path, r#"{ "nodes": [ { "id": "Node-0", "totalMemory": "#).unwrap();

        let result: Result<SchedulerDto> = parse_json_file(&path);
        fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(Error::DeserializationError(_))));
    }
}

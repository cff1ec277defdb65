//! Flow definition loading.
//!
//! Flows are YAML or JSON documents in a directory; files with any other
//! extension are skipped. Files load in name order so trigger
//! classification (which scans flows in load order) is deterministic.

use std::path::Path;

use crate::errors::FlowLoadError;
use crate::types::Flow;

/// Load every `.yaml`/`.yml`/`.json` flow in `dir`.
pub fn load_flows_from_dir(dir: impl AsRef<Path>) -> Result<Vec<Flow>, FlowLoadError> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir).map_err(|e| FlowLoadError::Io {
        path: dir.display().to_string(),
        message: e.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FlowLoadError::Io {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        paths.push(entry.path());
    }
    paths.sort();

    let mut flows = Vec::new();
    for path in paths {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !matches!(ext, "yaml" | "yml" | "json") {
            continue;
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| FlowLoadError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let flow: Flow = if ext == "json" {
            serde_json::from_str(&contents).map_err(|e| FlowLoadError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        } else {
            serde_yaml::from_str(&contents).map_err(|e| FlowLoadError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        };

        tracing::debug!(slug = %flow.slug, path = %path.display(), "loaded flow");
        flows.push(flow);
    }
    Ok(flows)
}

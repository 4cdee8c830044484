//! Machine-readable run summary for `--json`.

use filmgrain_core::{CacheStatus, CompositeSummary};
use serde::Serialize;

#[derive(Serialize)]
pub(crate) struct JsonSummary {
    input: String,
    output: String,
    width: u32,
    height: u32,
    working_width: u32,
    working_height: u32,
    mask_cache: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_warning: Option<String>,
    output_hash: String,
    duration_ms: u64,
}

impl From<&CompositeSummary> for JsonSummary {
    fn from(summary: &CompositeSummary) -> Self {
        let (mask_cache, cache_warning) = match &summary.cache_status {
            CacheStatus::Hit => ("hit", None),
            CacheStatus::Generated => ("generated", None),
            CacheStatus::GeneratedUnsaved(reason) => ("generated-unsaved", Some(reason.clone())),
        };
        Self {
            input: summary.input.display().to_string(),
            output: summary.output.display().to_string(),
            width: summary.width,
            height: summary.height,
            working_width: summary.working_width,
            working_height: summary.working_height,
            mask_cache,
            cache_warning,
            output_hash: summary.output_hash.clone(),
            duration_ms: summary.elapsed.as_millis() as u64,
        }
    }
}

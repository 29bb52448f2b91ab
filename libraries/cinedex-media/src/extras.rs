/// Probe-derived extras for catalog records
use cinedex_core::types::ProbeResult;
use cinedex_core::Result;
use serde_json::{Map, Value};

/// Categorised probe attributes stored in a record's `extras`
///
/// `format` holds container fields and tags, `streams` one object per stream
/// with codec, resolution, frame rate, bitrate and disposition.
pub fn build_extras(probe: &ProbeResult) -> Result<Map<String, Value>> {
    let mut extras = Map::new();
    extras.insert("format".to_string(), serde_json::to_value(&probe.format)?);
    extras.insert("streams".to_string(), serde_json::to_value(&probe.streams)?);
    Ok(extras)
}

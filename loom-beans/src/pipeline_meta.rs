use base64::Engine;
use flate2::read::ZlibDecoder;
use serde::Deserialize;
use std::io::Read;

/// Global metadata that pySCENIC leaves in the loom file
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineMetadata {
    #[serde(rename = "regulonThresholds")]
    pub regulon_thresholds: Vec<RegulonThreshold>,

    /// everything else (embeddings, cluster annotations, ...)
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegulonThreshold {
    pub regulon: String,

    #[serde(rename = "defaultThresholdValue", default)]
    pub default_threshold_value: Option<f64>,

    #[serde(rename = "defaultThresholdName", default)]
    pub default_threshold_name: Option<String>,

    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// Read pipeline metadata from the stored blob.
///
/// The blob is `base64(zlib(json))`. A blob that is already plain json
/// (starts with `{`) is parsed as is.
pub fn read_pipeline_metadata(blob: &str) -> anyhow::Result<PipelineMetadata> {
    let blob = blob.trim();

    if blob.is_empty() {
        return Err(anyhow::anyhow!("empty metadata blob"));
    }

    let json = if blob.starts_with('{') {
        blob.to_string()
    } else {
        let compact: String = blob.chars().filter(|c| !c.is_whitespace()).collect();

        let compressed = base64::engine::general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| anyhow::anyhow!("metadata blob is not valid base64: {}", e))?;

        let mut json = String::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_string(&mut json)
            .map_err(|e| anyhow::anyhow!("failed to inflate the metadata blob: {}", e))?;
        json
    };

    serde_json::from_str::<PipelineMetadata>(&json)
        .map_err(|e| anyhow::anyhow!("failed to parse the metadata json: {}", e))
}

use reviewlens::AnalysisReport;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The payload of both analyze routes, as JSON or as a urlencoded form.
#[derive(Debug, Deserialize, Default)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub product_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis_id: Uuid,
    #[serde(flatten)]
    pub report: AnalysisReport,
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRequest<'a> {
    pub init_data: &'a str,
}

/// Preferred shape of an error body. Anything else is shown as raw text.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

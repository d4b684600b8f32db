use serde::Serialize;

#[derive(Serialize)]
pub struct ApiError {
    pub error: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSendSuccess {
    pub success: bool,
    pub message: &'static str,
    pub message_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMissingFields {
    pub error: &'static str,
    pub missing_fields: Vec<&'static str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiInvalidEmail {
    pub error: &'static str,
    pub received_email: String,
}

#[derive(Serialize)]
pub struct ApiFieldTooLong {
    pub error: &'static str,
    pub length: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRateLimited {
    pub error: &'static str,
    /// Seconds until the client may retry, as a decimal string.
    pub retry_after: String,
}

#[derive(Serialize)]
pub struct ApiServerError {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

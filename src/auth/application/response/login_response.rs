use serde::Deserialize;

/// Envelope of a successful `POST /access/ticket`.
#[derive(Deserialize)]
pub struct LoginResponse {
    pub data: LoginResponseData,
}

/// The session granted to the user. Other fields (`username`, `cap`) are ignored.
#[derive(Deserialize)]
pub struct LoginResponseData {
    pub ticket: String,
    #[serde(rename = "CSRFPreventionToken")]
    pub csrf_token: String,
}

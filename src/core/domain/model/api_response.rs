use serde::Deserialize;

/// The `{"data": ...}` envelope every `/api2/json` response is wrapped in.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

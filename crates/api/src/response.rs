//! Success envelope for API handlers.
//!
//! Every 2xx body is `{ "data": ... }`. Handlers wrap their payload in
//! [`DataResponse`] rather than building the envelope with `json!`, so the
//! payload type stays visible in the handler signature.

use serde::Serialize;

/// The `{ "data": T }` success envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: requests }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

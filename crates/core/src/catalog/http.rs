//! Response handling shared by the HTTP adapters.

use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::warn;

use super::CatalogError;

/// Map error statuses to [`CatalogError`] and decode a JSON body.
///
/// `what` names the requested resource in errors.
pub(crate) async fn read_json<T: DeserializeOwned>(
    catalog: &str,
    response: Response,
    what: &str,
) -> Result<T, CatalogError> {
    let status = response.status();
    if status == 429 {
        warn!(catalog, "Rate limit exceeded");
        return Err(CatalogError::RateLimitExceeded);
    }
    if status == 404 {
        return Err(CatalogError::NotFound(what.to_string()));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CatalogError::ApiError {
            status: status.as_u16(),
            message: body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| CatalogError::ParseError(format!("Failed to parse {}: {}", what, e)))
}

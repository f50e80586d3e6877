use serde_json::Value;
use thiserror::Error;

/// Errors returned by client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Base URL is not a valid absolute URL.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// Endpoint path could not be joined to the base URL.
    #[error("invalid endpoint path '{0}'")]
    InvalidPath(String),

    /// A required parameter was absent or empty. Raised before any network
    /// I/O; the request is never sent.
    #[error("endpoint '{endpoint}' requires a non-empty '{parameter}' parameter")]
    MissingParameter {
        endpoint: &'static str,
        parameter: &'static str,
    },

    /// Neither `location` nor both of `latitude`/`longitude` were supplied to
    /// an endpoint that needs a search area. Raised before any network I/O.
    #[error("endpoint '{endpoint}' requires 'location' or both 'latitude' and 'longitude'")]
    MissingLocation { endpoint: &'static str },

    /// HTTP transport-layer failure (connection, DNS, timeout).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body could not be parsed as JSON, e.g. an HTML error page.
    #[error("response body is not valid JSON ({source}): {snippet}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
        snippet: String,
    },

    /// The token endpoint answered without an `access_token`.
    #[error("token endpoint response did not include 'access_token'")]
    MissingAccessToken,

    /// The API reported a failure in its response payload.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// An error reported by the API itself, normalized from the response payload.
///
/// The two variants correspond to the two historical error payload shapes.
/// Callers match on the variant (or use [`ApiError::code`]) rather than
/// inspecting message text.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Fusion-era shape: `{"error": {"code": ..., "description": ...}}`.
    #[error("{code}: {description}")]
    Fusion { code: String, description: String },

    /// Legacy shape: `{"error": {"id": ..., "text": ..., "field": ...}}`.
    /// `field`, when present, names the offending input parameter.
    #[error("{}", legacy_message(.text, .field.as_deref()))]
    Legacy {
        id: String,
        text: String,
        field: Option<String>,
    },
}

impl ApiError {
    /// Builds an [`ApiError`] from the payload's top-level `error` value.
    ///
    /// An object carrying `id` or `text` is the legacy shape; everything else
    /// is read as the Fusion shape, with the raw error value standing in for
    /// a missing `description`.
    pub(crate) fn from_error_value(error: &Value) -> Self {
        if error.get("id").is_some() || error.get("text").is_some() {
            Self::Legacy {
                id: error.get("id").map(scalar_string).unwrap_or_default(),
                text: error.get("text").map(scalar_string).unwrap_or_default(),
                field: error.get("field").map(scalar_string),
            }
        } else {
            Self::Fusion {
                code: error.get("code").map(scalar_string).unwrap_or_default(),
                description: error
                    .get("description")
                    .map(scalar_string)
                    .unwrap_or_else(|| error.to_string()),
            }
        }
    }

    /// Machine-readable error identifier: `code` for the Fusion shape, `id`
    /// for the legacy shape.
    pub fn code(&self) -> &str {
        match self {
            Self::Fusion { code, .. } => code,
            Self::Legacy { id, .. } => id,
        }
    }
}

fn legacy_message(text: &str, field: Option<&str>) -> String {
    match field {
        Some(field) => format!("{text} [field={field}]"),
        None => text.to_owned(),
    }
}

/// Renders a JSON scalar without quoting strings; non-scalars fall back to
/// their JSON text.
fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Returns the payload unchanged unless it carries a top-level `error` key,
/// in which case the normalized [`ApiError`] is raised instead. Error-shaped
/// payloads never reach the caller as success values.
pub(crate) fn interpret_payload(payload: Value) -> Result<Value, Error> {
    match payload.get("error") {
        Some(error) => Err(Error::Api(ApiError::from_error_value(error))),
        None => Ok(payload),
    }
}

/// Wraps a JSON parse failure with a short excerpt of the offending body.
pub(crate) fn invalid_json(source: serde_json::Error, body: &str) -> Error {
    const SNIPPET_LEN: usize = 120;
    let snippet = if body.len() <= SNIPPET_LEN {
        body.to_owned()
    } else {
        let mut end = SNIPPET_LEN;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body[..end].to_owned()
    };
    Error::InvalidJson { source, snippet }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ApiError, Error, interpret_payload, invalid_json};

    #[test]
    fn fusion_error_message_is_code_colon_description() {
        let error = ApiError::from_error_value(&json!({
            "code": "VALIDATION_ERROR",
            "description": "Please specify a location or a latitude and longitude",
        }));
        assert_eq!(
            error.to_string(),
            "VALIDATION_ERROR: Please specify a location or a latitude and longitude"
        );
        assert_eq!(error.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn fusion_numeric_code_renders_unquoted() {
        let error = ApiError::from_error_value(&json!({
            "code": 400,
            "description": "bad request",
        }));
        assert_eq!(error.to_string(), "400: bad request");
    }

    #[test]
    fn legacy_error_message_appends_field_when_present() {
        let error = ApiError::from_error_value(&json!({
            "id": "INVALID_PARAMETER",
            "text": "One or more parameters are invalid in request",
            "field": "sort",
        }));
        assert_eq!(
            error.to_string(),
            "One or more parameters are invalid in request [field=sort]"
        );
        assert_eq!(error.code(), "INVALID_PARAMETER");
    }

    #[test]
    fn legacy_error_message_omits_field_when_absent() {
        let error = ApiError::from_error_value(&json!({
            "id": "UNAVAILABLE_FOR_LOCATION",
            "text": "Information is unavailable for this location",
        }));
        assert_eq!(
            error.to_string(),
            "Information is unavailable for this location"
        );
        assert_eq!(error.code(), "UNAVAILABLE_FOR_LOCATION");
    }

    #[test]
    fn interpret_payload_passes_success_through_unchanged() {
        let payload = json!({"businesses": [], "total": 0});
        let result = interpret_payload(payload.clone()).expect("success payload");
        assert_eq!(result, payload);
    }

    #[test]
    fn interpret_payload_raises_on_error_key() {
        let payload = json!({
            "error": {"code": "TOKEN_INVALID", "description": "Invalid token"},
            "businesses": [],
        });
        let error = interpret_payload(payload).expect_err("error payload");
        match error {
            Error::Api(api) => assert_eq!(api.code(), "TOKEN_INVALID"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_json_keeps_a_bounded_snippet() {
        let body = "<html>".repeat(100);
        let source = serde_json::from_str::<serde_json::Value>(&body).expect_err("not JSON");
        match invalid_json(source, &body) {
            Error::InvalidJson { snippet, .. } => assert!(snippet.len() <= 120),
            other => panic!("unexpected error: {other}"),
        }
    }
}

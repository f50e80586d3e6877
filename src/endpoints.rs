use url::form_urlencoded::byte_serialize;

use crate::{Error, Params};

/// Metadata for one API endpoint.
///
/// The endpoint set is fixed by the vendor, so the registry is a static
/// table. Path templates use `{param}` placeholders for URL-embedded
/// resource identifiers.
#[derive(Clone, Copy, Debug)]
pub struct EndpointDefinition {
    /// Stable endpoint name, used in error messages and CLI listings.
    pub name: &'static str,
    /// Path relative to the base URL, potentially with `{param}` placeholders.
    pub path_template: &'static str,
    /// Required path parameter names extracted from `path_template`.
    pub path_params: &'static [&'static str],
    /// Query parameters that must be present and non-empty.
    pub required_params: &'static [&'static str],
    /// Whether the endpoint needs `location` or a latitude/longitude pair.
    pub requires_location: bool,
}

pub(crate) const SEARCH: EndpointDefinition = EndpointDefinition {
    name: "search",
    path_template: "v3/businesses/search",
    path_params: &[],
    required_params: &[],
    requires_location: true,
};

pub(crate) const PHONE_SEARCH: EndpointDefinition = EndpointDefinition {
    name: "phone_search",
    path_template: "v3/businesses/search/phone",
    path_params: &[],
    required_params: &["phone"],
    requires_location: false,
};

pub(crate) const BUSINESS: EndpointDefinition = EndpointDefinition {
    name: "business",
    path_template: "v3/businesses/{id}",
    path_params: &["id"],
    required_params: &[],
    requires_location: false,
};

pub(crate) const REVIEWS: EndpointDefinition = EndpointDefinition {
    name: "reviews",
    path_template: "v3/businesses/{id}/reviews",
    path_params: &["id"],
    required_params: &[],
    requires_location: false,
};

pub(crate) const AUTOCOMPLETE: EndpointDefinition = EndpointDefinition {
    name: "autocomplete",
    path_template: "v3/autocomplete",
    path_params: &[],
    required_params: &["text"],
    requires_location: false,
};

pub(crate) const TRANSACTION_SEARCH: EndpointDefinition = EndpointDefinition {
    name: "transaction_search",
    path_template: "v3/transactions/{transaction_type}/search",
    path_params: &["transaction_type"],
    required_params: &[],
    requires_location: true,
};

pub(crate) const BUSINESS_MATCH: EndpointDefinition = EndpointDefinition {
    name: "business_match",
    path_template: "v3/businesses/matches",
    path_params: &[],
    required_params: &["name", "address1", "city", "state", "country"],
    requires_location: false,
};

pub(crate) const EVENT: EndpointDefinition = EndpointDefinition {
    name: "event",
    path_template: "v3/events/{id}",
    path_params: &["id"],
    required_params: &[],
    requires_location: false,
};

pub(crate) const EVENT_SEARCH: EndpointDefinition = EndpointDefinition {
    name: "event_search",
    path_template: "v3/events",
    path_params: &[],
    required_params: &[],
    requires_location: false,
};

pub(crate) const FEATURED_EVENT: EndpointDefinition = EndpointDefinition {
    name: "featured_event",
    path_template: "v3/events/featured",
    path_params: &[],
    required_params: &[],
    requires_location: true,
};

const ENDPOINTS: &[EndpointDefinition] = &[
    SEARCH,
    PHONE_SEARCH,
    BUSINESS,
    REVIEWS,
    AUTOCOMPLETE,
    TRANSACTION_SEARCH,
    BUSINESS_MATCH,
    EVENT,
    EVENT_SEARCH,
    FEATURED_EVENT,
];

/// Returns all supported endpoints.
pub fn endpoints() -> &'static [EndpointDefinition] {
    ENDPOINTS
}

/// Checks the endpoint's required query parameters against `params`.
///
/// All-or-nothing gate: any failure means no request is built. A parameter
/// present with an empty string counts as missing.
pub(crate) fn validate(endpoint: &EndpointDefinition, params: &Params) -> Result<(), Error> {
    for &parameter in endpoint.required_params {
        if !params.has_value(parameter) {
            return Err(Error::MissingParameter {
                endpoint: endpoint.name,
                parameter,
            });
        }
    }

    if endpoint.requires_location
        && !params.has_value("location")
        && !(params.has_value("latitude") && params.has_value("longitude"))
    {
        return Err(Error::MissingLocation {
            endpoint: endpoint.name,
        });
    }

    Ok(())
}

/// Renders the endpoint path, substituting `{param}` placeholders.
///
/// Every placeholder must have a matching, non-empty argument; values are
/// percent-encoded before substitution.
pub(crate) fn render_path(
    endpoint: &EndpointDefinition,
    path_args: &[(&'static str, &str)],
) -> Result<String, Error> {
    let mut rendered = endpoint.path_template.to_owned();

    for &required_param in endpoint.path_params {
        let value = path_args
            .iter()
            .find(|(name, _)| *name == required_param)
            .map(|(_, value)| *value)
            .filter(|value| !value.is_empty())
            .ok_or(Error::MissingParameter {
                endpoint: endpoint.name,
                parameter: required_param,
            })?;

        let placeholder = format!("{{{required_param}}}");
        rendered = rendered.replace(&placeholder, &encode_path_segment(value));
    }

    Ok(rendered)
}

fn encode_path_segment(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

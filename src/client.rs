use std::time::Duration;

use reqwest::Url;
use serde_json::Value;

use crate::endpoints;
use crate::error::{interpret_payload, invalid_json};
use crate::{Error, Params};

/// Production API host. Overridable per client for tests and proxies.
pub const DEFAULT_BASE_URL: &str = "https://api.yelp.com/";

pub(crate) const TOKEN_PATH: &str = "oauth2/token";

/// Async Yelp Fusion client.
///
/// Holds the bearer credential, the optional per-request timeout, and one
/// reusable HTTP connection pool. Construct once and share; every endpoint
/// method is an independent request with no state between calls.
#[derive(Clone, Debug)]
pub struct YelpClient {
    base_url: Url,
    api_key: String,
    timeout: Option<Duration>,
    http: reqwest::Client,
}

impl YelpClient {
    /// Creates a client authenticated with a static Fusion API key.
    ///
    /// No network call is made; the key is sent as `Authorization: Bearer`
    /// on every request.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            api_key: api_key.into(),
            timeout: None,
            http: reqwest::Client::new(),
        }
    }

    /// Creates a client by exchanging OAuth2 client credentials for a bearer
    /// token. Exactly one POST to the token endpoint happens here; the
    /// returned client makes no further auth calls.
    pub async fn from_client_credentials(
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self, Error> {
        Self::from_client_credentials_at(DEFAULT_BASE_URL, client_id, client_secret).await
    }

    /// Token-exchange constructor against an explicit base URL.
    pub async fn from_client_credentials_at(
        base_url: impl AsRef<str>,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self, Error> {
        let client = Self::new(String::new()).with_base_url(base_url)?;
        let url = client.build_url(TOKEN_PATH)?;
        let response = client
            .http
            .post(url)
            .form(&token_request_form(client_id, client_secret))
            .send()
            .await?;
        let body = response.text().await?;
        let token = extract_access_token(&body)?;
        Ok(Self {
            api_key: token,
            ..client
        })
    }

    /// Returns a new client targeting a different base URL.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self, Error> {
        let parsed = Url::parse(base_url.as_ref())
            .map_err(|_| Error::InvalidBaseUrl(base_url.as_ref().to_owned()))?;
        self.base_url = ensure_trailing_slash(parsed);
        Ok(self)
    }

    /// Returns a new client whose requests each fail after `timeout`.
    ///
    /// Without this, requests block until the transport gives up on its own.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Searches for businesses by term, location, category and other filters.
    ///
    /// Requires `location` or both `latitude` and `longitude` in `params`.
    pub async fn search(&self, params: &Params) -> Result<Value, Error> {
        endpoints::validate(&endpoints::SEARCH, params)?;
        self.query(endpoints::SEARCH.path_template, params).await
    }

    /// Looks up businesses by phone number. Requires `phone` in `params`.
    pub async fn phone_search(&self, params: &Params) -> Result<Value, Error> {
        endpoints::validate(&endpoints::PHONE_SEARCH, params)?;
        self.query(endpoints::PHONE_SEARCH.path_template, params)
            .await
    }

    /// Fetches one business by its Yelp id.
    pub async fn business(&self, id: &str, params: &Params) -> Result<Value, Error> {
        let path = endpoints::render_path(&endpoints::BUSINESS, &[("id", id)])?;
        self.query(&path, params).await
    }

    /// Fetches review excerpts for one business.
    pub async fn reviews(&self, id: &str, params: &Params) -> Result<Value, Error> {
        let path = endpoints::render_path(&endpoints::REVIEWS, &[("id", id)])?;
        self.query(&path, params).await
    }

    /// Suggests completions for partial search text. Requires `text`.
    pub async fn autocomplete(&self, params: &Params) -> Result<Value, Error> {
        endpoints::validate(&endpoints::AUTOCOMPLETE, params)?;
        self.query(endpoints::AUTOCOMPLETE.path_template, params)
            .await
    }

    /// Searches businesses supporting a transaction type (e.g. `delivery`).
    ///
    /// The transaction type is a path segment; `params` still needs
    /// `location` or a latitude/longitude pair.
    pub async fn transaction_search(
        &self,
        transaction_type: &str,
        params: &Params,
    ) -> Result<Value, Error> {
        let path = endpoints::render_path(
            &endpoints::TRANSACTION_SEARCH,
            &[("transaction_type", transaction_type)],
        )?;
        endpoints::validate(&endpoints::TRANSACTION_SEARCH, params)?;
        self.query(&path, params).await
    }

    /// Matches a known business against Yelp's records.
    ///
    /// Requires `name`, `address1`, `city`, `state` and `country`.
    pub async fn business_match(&self, params: &Params) -> Result<Value, Error> {
        endpoints::validate(&endpoints::BUSINESS_MATCH, params)?;
        self.query(endpoints::BUSINESS_MATCH.path_template, params)
            .await
    }

    /// Fetches one event by id.
    pub async fn event(&self, id: &str, params: &Params) -> Result<Value, Error> {
        let path = endpoints::render_path(&endpoints::EVENT, &[("id", id)])?;
        self.query(&path, params).await
    }

    /// Searches events. No required parameters.
    pub async fn event_search(&self, params: &Params) -> Result<Value, Error> {
        endpoints::validate(&endpoints::EVENT_SEARCH, params)?;
        self.query(endpoints::EVENT_SEARCH.path_template, params)
            .await
    }

    /// Fetches the featured event for an area.
    ///
    /// Requires `location` or both `latitude` and `longitude`.
    pub async fn featured_event(&self, params: &Params) -> Result<Value, Error> {
        endpoints::validate(&endpoints::FEATURED_EVENT, params)?;
        self.query(endpoints::FEATURED_EVENT.path_template, params)
            .await
    }

    /// Sends one authenticated GET and normalizes the response.
    ///
    /// This is the single choke point for network access: every endpoint
    /// method routes through it, so auth-header attachment and error
    /// normalization happen exactly once. The HTTP status code is not
    /// consulted; API errors arrive as JSON payloads with an `error` key and
    /// are raised as [`Error::Api`] regardless of status.
    pub async fn query(&self, path: &str, params: &Params) -> Result<Value, Error> {
        let url = self.build_url(path)?;
        let mut request = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(&self.api_key);

        let query = params.to_query();
        if !query.is_empty() {
            request = request.query(&query);
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let body = request.send().await?.text().await?;
        let payload =
            serde_json::from_str(&body).map_err(|source| invalid_json(source, &body))?;
        interpret_payload(payload)
    }

    fn build_url(&self, path: &str) -> Result<Url, Error> {
        let relative = path.trim_start_matches('/');
        self.base_url
            .join(relative)
            .map_err(|_| Error::InvalidPath(path.to_owned()))
    }
}

fn default_base_url() -> Url {
    // The constant is a valid absolute URL; parsing cannot fail.
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

pub(crate) fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let mut path = url.path().to_owned();
        path.push('/');
        url.set_path(&path);
    }
    url
}

pub(crate) fn token_request_form(
    client_id: &str,
    client_secret: &str,
) -> [(&'static str, String); 3] {
    [
        ("grant_type", "client_credentials".to_owned()),
        ("client_id", client_id.to_owned()),
        ("client_secret", client_secret.to_owned()),
    ]
}

/// Pulls `access_token` out of a token-endpoint response body.
///
/// Error payloads are normalized first, so an API-reported failure surfaces
/// as [`Error::Api`] rather than a missing-token error.
pub(crate) fn extract_access_token(body: &str) -> Result<String, Error> {
    let payload: Value =
        serde_json::from_str(body).map_err(|source| invalid_json(source, body))?;
    let payload = interpret_payload(payload)?;
    payload
        .get("access_token")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(Error::MissingAccessToken)
}

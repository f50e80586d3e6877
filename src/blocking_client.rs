use std::time::Duration;

use reqwest::Url;
use serde_json::Value;

use crate::client::{
    DEFAULT_BASE_URL, TOKEN_PATH, ensure_trailing_slash, extract_access_token,
    token_request_form,
};
use crate::endpoints;
use crate::error::{interpret_payload, invalid_json};
use crate::{Error, Params};

/// Blocking Yelp Fusion client.
///
/// This is the synchronous counterpart of [`crate::YelpClient`]; each call
/// suspends the calling thread for one round trip.
#[derive(Clone, Debug)]
pub struct BlockingYelpClient {
    base_url: Url,
    api_key: String,
    timeout: Option<Duration>,
    http: reqwest::blocking::Client,
}

impl BlockingYelpClient {
    /// Creates a client authenticated with a static Fusion API key.
    ///
    /// No network call is made; the key is sent as `Authorization: Bearer`
    /// on every request.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            api_key: api_key.into(),
            timeout: None,
            http: reqwest::blocking::Client::new(),
        }
    }

    /// Creates a client by exchanging OAuth2 client credentials for a bearer
    /// token. Exactly one POST to the token endpoint happens here; the
    /// returned client makes no further auth calls.
    pub fn from_client_credentials(client_id: &str, client_secret: &str) -> Result<Self, Error> {
        Self::from_client_credentials_at(DEFAULT_BASE_URL, client_id, client_secret)
    }

    /// Token-exchange constructor against an explicit base URL.
    pub fn from_client_credentials_at(
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
            .send()?;
        let body = response.text()?;
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
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Searches for businesses by term, location, category and other filters.
    ///
    /// Requires `location` or both `latitude` and `longitude` in `params`.
    pub fn search(&self, params: &Params) -> Result<Value, Error> {
        endpoints::validate(&endpoints::SEARCH, params)?;
        self.query(endpoints::SEARCH.path_template, params)
    }

    /// Looks up businesses by phone number. Requires `phone` in `params`.
    pub fn phone_search(&self, params: &Params) -> Result<Value, Error> {
        endpoints::validate(&endpoints::PHONE_SEARCH, params)?;
        self.query(endpoints::PHONE_SEARCH.path_template, params)
    }

    /// Fetches one business by its Yelp id.
    pub fn business(&self, id: &str, params: &Params) -> Result<Value, Error> {
        let path = endpoints::render_path(&endpoints::BUSINESS, &[("id", id)])?;
        self.query(&path, params)
    }

    /// Fetches review excerpts for one business.
    pub fn reviews(&self, id: &str, params: &Params) -> Result<Value, Error> {
        let path = endpoints::render_path(&endpoints::REVIEWS, &[("id", id)])?;
        self.query(&path, params)
    }

    /// Suggests completions for partial search text. Requires `text`.
    pub fn autocomplete(&self, params: &Params) -> Result<Value, Error> {
        endpoints::validate(&endpoints::AUTOCOMPLETE, params)?;
        self.query(endpoints::AUTOCOMPLETE.path_template, params)
    }

    /// Searches businesses supporting a transaction type (e.g. `delivery`).
    pub fn transaction_search(
        &self,
        transaction_type: &str,
        params: &Params,
    ) -> Result<Value, Error> {
        let path = endpoints::render_path(
            &endpoints::TRANSACTION_SEARCH,
            &[("transaction_type", transaction_type)],
        )?;
        endpoints::validate(&endpoints::TRANSACTION_SEARCH, params)?;
        self.query(&path, params)
    }

    /// Matches a known business against Yelp's records.
    ///
    /// Requires `name`, `address1`, `city`, `state` and `country`.
    pub fn business_match(&self, params: &Params) -> Result<Value, Error> {
        endpoints::validate(&endpoints::BUSINESS_MATCH, params)?;
        self.query(endpoints::BUSINESS_MATCH.path_template, params)
    }

    /// Fetches one event by id.
    pub fn event(&self, id: &str, params: &Params) -> Result<Value, Error> {
        let path = endpoints::render_path(&endpoints::EVENT, &[("id", id)])?;
        self.query(&path, params)
    }

    /// Searches events. No required parameters.
    pub fn event_search(&self, params: &Params) -> Result<Value, Error> {
        endpoints::validate(&endpoints::EVENT_SEARCH, params)?;
        self.query(endpoints::EVENT_SEARCH.path_template, params)
    }

    /// Fetches the featured event for an area.
    ///
    /// Requires `location` or both `latitude` and `longitude`.
    pub fn featured_event(&self, params: &Params) -> Result<Value, Error> {
        endpoints::validate(&endpoints::FEATURED_EVENT, params)?;
        self.query(endpoints::FEATURED_EVENT.path_template, params)
    }

    /// Sends one authenticated GET and normalizes the response.
    ///
    /// Single choke point for network access; see
    /// [`crate::YelpClient::query`] for the normalization rules.
    pub fn query(&self, path: &str, params: &Params) -> Result<Value, Error> {
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

        let body = request.send()?.text()?;
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

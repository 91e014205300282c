//! Purpose: Forward and reverse geocoding entry points.
//! Exports: `GeocodeRequest`, `ReverseGeocodeOptions`, `geocode`, `reverse_geocode`, and url-only variants.
//! Role: Runs normalize -> serialize -> one transport GET -> envelope interpretation.
//! Invariants: Input errors surface before any network I/O.
//! Invariants: Each call issues exactly one request through the context's transport.
//! Invariants: Parameter order: forward `key, address, components, bounds, region, language`;
//! reverse `key, latlng, result_type, location_type, language`.
#![allow(clippy::result_large_err)]

use serde_json::Value;
use tracing::debug;
use url::Url;

use super::context::Context;
use super::transport::RawResponse;
use crate::core::envelope;
use crate::core::error::{Error, ErrorKind};
use crate::core::params::{Bounds, ComponentFilter, LatLng, MultiValue, QueryParams};
use crate::core::query::{build_request_url, redact_key};

type ApiResult<T> = Result<T, Error>;

/// Inputs for forward geocoding. At least `address` or a non-empty `components` is required.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeocodeRequest {
    /// Free-form street address or place text.
    pub address: Option<String>,
    /// Restricts results to matching components; may be used without `address`.
    /// An empty filter is treated as absent.
    pub components: Option<ComponentFilter>,
    /// Viewport that biases, but does not restrict, the results.
    pub bounds: Option<Bounds>,
    /// ccTLD region code that biases results (e.g. `es`).
    pub region: Option<String>,
    /// Language for returned results.
    pub language: Option<String>,
}

impl GeocodeRequest {
    pub fn address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Self::default()
        }
    }

    pub fn components(components: ComponentFilter) -> Self {
        Self {
            components: Some(components),
            ..Self::default()
        }
    }

    pub fn with_components(mut self, components: ComponentFilter) -> Self {
        self.components = Some(components);
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    fn to_params(&self, key: &str) -> ApiResult<QueryParams> {
        if let Some(address) = &self.address {
            if address.trim().is_empty() {
                return Err(Error::new(ErrorKind::InvalidArgument)
                    .with_message("address must not be empty"));
            }
        }
        let components = match &self.components {
            Some(filter) => filter.to_query_value()?,
            None => None,
        };
        if self.address.is_none() && components.is_none() {
            return Err(Error::new(ErrorKind::InvalidArgument)
                .with_message("geocode requires an address or component filter")
                .with_hint("Provide an address, at least one component, or use reverse geocoding."));
        }

        let mut params = QueryParams::with_key(key);
        params.push_opt("address", self.address.as_deref());
        params.push_opt("components", components);
        params.push_opt(
            "bounds",
            self.bounds.as_ref().map(Bounds::to_query_value).transpose()?,
        );
        params.push_opt("region", self.region.as_deref());
        params.push_opt("language", self.language.as_deref());
        Ok(params)
    }
}

/// Optional filters for reverse geocoding.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReverseGeocodeOptions {
    /// Address types to keep (e.g. `street_address`); a list matches any of them.
    pub result_type: Option<MultiValue>,
    /// Location precisions to keep (e.g. `ROOFTOP`); a list matches any of them.
    pub location_type: Option<MultiValue>,
    /// Language for returned results.
    pub language: Option<String>,
}

impl ReverseGeocodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result_type(mut self, result_type: impl Into<MultiValue>) -> Self {
        self.result_type = Some(result_type.into());
        self
    }

    pub fn with_location_type(mut self, location_type: impl Into<MultiValue>) -> Self {
        self.location_type = Some(location_type.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    fn to_params(&self, key: &str, latlng: LatLng) -> ApiResult<QueryParams> {
        let mut params = QueryParams::with_key(key);
        params.push("latlng", latlng.to_query_value()?);
        params.push_opt(
            "result_type",
            self.result_type.as_ref().and_then(MultiValue::to_query_value),
        );
        params.push_opt(
            "location_type",
            self.location_type.as_ref().and_then(MultiValue::to_query_value),
        );
        params.push_opt("language", self.language.as_deref());
        Ok(params)
    }
}

/// Forward geocoding: address and/or components to result objects.
pub fn geocode(ctx: &Context, request: &GeocodeRequest) -> ApiResult<Vec<Value>> {
    let url = geocode_url(ctx, request)?;
    execute(ctx, &url)
}

/// Reverse geocoding: a coordinate to address candidates.
pub fn reverse_geocode(
    ctx: &Context,
    latlng: impl Into<LatLng>,
    options: &ReverseGeocodeOptions,
) -> ApiResult<Vec<Value>> {
    let url = reverse_geocode_url(ctx, latlng, options)?;
    execute(ctx, &url)
}

/// The exact url `geocode` would request, without issuing it.
pub fn geocode_url(ctx: &Context, request: &GeocodeRequest) -> ApiResult<Url> {
    let params = request.to_params(ctx.key())?;
    Ok(build_request_url(ctx.endpoint(), &params))
}

/// The exact url `reverse_geocode` would request, without issuing it.
pub fn reverse_geocode_url(
    ctx: &Context,
    latlng: impl Into<LatLng>,
    options: &ReverseGeocodeOptions,
) -> ApiResult<Url> {
    let params = options.to_params(ctx.key(), latlng.into())?;
    Ok(build_request_url(ctx.endpoint(), &params))
}

fn execute(ctx: &Context, url: &Url) -> ApiResult<Vec<Value>> {
    debug!(url = %redact_key(url), "geocoding request");
    let response = ctx.transport().get(url)?;
    debug!(
        http_status = response.status,
        bytes = response.body.len(),
        "geocoding response"
    );
    let results = interpret_response(&response)?;
    debug!(results = results.len(), "geocoding results");
    Ok(results)
}

fn interpret_response(response: &RawResponse) -> ApiResult<Vec<Value>> {
    match envelope::interpret(&response.body) {
        Ok(results) => Ok(results),
        Err(err) if err.kind() == ErrorKind::Decode && !response.is_success() => {
            Err(Error::new(ErrorKind::Transport)
                .with_message(format!(
                    "geocoding endpoint returned http status {}",
                    response.status
                ))
                .with_http_status(response.status)
                .with_source(err))
        }
        Err(err) => {
            if err.kind() == ErrorKind::Api {
                debug!(
                    status = err.api_status().unwrap_or("<missing>"),
                    "geocoding service rejected request"
                );
            }
            if response.is_success() {
                Err(err)
            } else {
                Err(err.with_http_status(response.status))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GeocodeRequest, ReverseGeocodeOptions, geocode_url, interpret_response, reverse_geocode_url};
    use crate::api::context::Context;
    use crate::api::transport::RawResponse;
    use crate::core::error::ErrorKind;
    use crate::core::params::{Bounds, Component, ComponentFilter};

    const PREFIX: &str = "https://maps.googleapis.com/maps/api/geocode/json?";

    fn ctx() -> Context {
        Context::new("AIzaasdf").expect("ctx")
    }

    fn query(url: &url::Url) -> &str {
        url.as_str().strip_prefix(PREFIX).expect("endpoint prefix")
    }

    #[test]
    fn forward_query_orders_parameters() {
        let request = GeocodeRequest::address("Winnetka")
            .with_components(ComponentFilter::new().with(Component::Country, "US"))
            .with_bounds(Bounds::new((34.172684, -118.604794), (34.236144, -118.500938)))
            .with_region("us")
            .with_language("en");
        let url = geocode_url(&ctx(), &request).expect("url");
        assert_eq!(
            query(&url),
            "key=AIzaasdf&address=Winnetka&components=country%3AUS\
             &bounds=34.172684%2C-118.604794%7C34.236144%2C-118.500938&region=us&language=en"
        );
    }

    #[test]
    fn components_only_query_is_valid() {
        let request = GeocodeRequest::components(ComponentFilter::new().with("postal_code", "96766"));
        let url = geocode_url(&ctx(), &request).expect("url");
        assert_eq!(query(&url), "key=AIzaasdf&components=postal_code%3A96766");
    }

    #[test]
    fn forward_requires_address_or_components() {
        let err = geocode_url(&ctx(), &GeocodeRequest::default()).expect_err("empty");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let request = GeocodeRequest::components(ComponentFilter::new()).with_region("es");
        let err = geocode_url(&ctx(), &request).expect_err("empty filter");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = geocode_url(&ctx(), &GeocodeRequest::address(" ")).expect_err("blank");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn empty_filter_alongside_address_is_omitted() {
        let request = GeocodeRequest::address("Toledo").with_components(ComponentFilter::new());
        let url = geocode_url(&ctx(), &request).expect("url");
        assert_eq!(query(&url), "key=AIzaasdf&address=Toledo");
    }

    #[test]
    fn reverse_query_orders_parameters() {
        let options = ReverseGeocodeOptions::new()
            .with_result_type(["street_address", "route"])
            .with_location_type("ROOFTOP");
        let url = reverse_geocode_url(&ctx(), (40.714224, -73.961452), &options).expect("url");
        assert_eq!(
            query(&url),
            "key=AIzaasdf&latlng=40.714224%2C-73.961452&result_type=street_address%7Croute\
             &location_type=ROOFTOP"
        );
    }

    #[test]
    fn reverse_rejects_non_finite_coordinate() {
        let err = reverse_geocode_url(&ctx(), (f64::NAN, 0.0), &ReverseGeocodeOptions::new())
            .expect_err("nan");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn http_error_with_envelope_keeps_api_status() {
        let response = RawResponse::new(403, r#"{"status":"REQUEST_DENIED","results":[]}"#);
        let err = interpret_response(&response).expect_err("denied");
        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.api_status(), Some("REQUEST_DENIED"));
        assert_eq!(err.http_status(), Some(403));
    }

    #[test]
    fn http_error_without_envelope_is_transport() {
        let response = RawResponse::new(502, "<html>Bad Gateway</html>");
        let err = interpret_response(&response).expect_err("gateway");
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.http_status(), Some(502));
    }

    #[test]
    fn success_with_garbage_is_decode() {
        let response = RawResponse::new(200, "not json");
        let err = interpret_response(&response).expect_err("decode");
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.http_status(), None);
    }
}

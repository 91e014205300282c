//! Purpose: Serialize normalized parameters into the request URL.
//! Exports: `DEFAULT_ENDPOINT`, `normalize_endpoint`, `encode_query`, `build_request_url`, `redact_key`.
//! Role: Query Serializer; form-urlencodes pairs in the order the normalizer produced them.
//! Invariants: Space encodes as `+`; `,` `|` `:` encode as `%2C` `%7C` `%3A`.
//! Invariants: Decoding the emitted query yields exactly the input pairs, in order.
use url::Url;
use url::form_urlencoded;

use super::error::{Error, ErrorKind};
use super::params::QueryParams;

pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

const REDACTED: &str = "REDACTED";

/// Parses an endpoint override; the path is kept, query and fragment are dropped.
pub fn normalize_endpoint(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw).map_err(|err| {
        Error::new(ErrorKind::InvalidArgument)
            .with_message("invalid geocoding endpoint url")
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::new(ErrorKind::InvalidArgument)
            .with_message("geocoding endpoint must use http or https scheme"));
    }
    if url.cannot_be_a_base() {
        return Err(Error::new(ErrorKind::InvalidArgument)
            .with_message("geocoding endpoint cannot be a base url"));
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

pub fn encode_query(params: &QueryParams) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in params.iter() {
        serializer.append_pair(name, value);
    }
    serializer.finish()
}

pub fn build_request_url(endpoint: &Url, params: &QueryParams) -> Url {
    let mut url = endpoint.clone();
    url.set_fragment(None);
    url.set_query(Some(&encode_query(params)));
    url
}

/// Renders a request url for logs and dry runs with the credential masked.
pub fn redact_key(url: &Url) -> String {
    if url.query().is_none() {
        return url.to_string();
    }
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(name, value)| {
            let value = if name == "key" {
                REDACTED.to_string()
            } else {
                value.into_owned()
            };
            (name.into_owned(), value)
        })
        .collect();
    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_ENDPOINT, build_request_url, encode_query, normalize_endpoint, redact_key};
    use crate::core::error::ErrorKind;
    use crate::core::params::{Bounds, ComponentFilter, LatLng, MultiValue, QueryParams};
    use url::form_urlencoded;

    fn decode(query: &str) -> Vec<(String, String)> {
        form_urlencoded::parse(query.as_bytes())
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect()
    }

    fn owned(params: &QueryParams) -> Vec<(String, String)> {
        params
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn encodes_simple_address() {
        let mut params = QueryParams::with_key("AIzaasdf");
        params.push("address", "Sydney");
        assert_eq!(encode_query(&params), "key=AIzaasdf&address=Sydney");
    }

    #[test]
    fn encodes_reserved_characters() {
        let mut params = QueryParams::with_key("AIzaasdf");
        params.push("address", "1600 Amphitheatre Parkway, Mountain View, CA");
        params.push("components", "administrative_area:TX|country:US");
        assert_eq!(
            encode_query(&params),
            "key=AIzaasdf&address=1600+Amphitheatre+Parkway%2C+Mountain+View%2C+CA\
             &components=administrative_area%3ATX%7Ccountry%3AUS"
        );
    }

    #[test]
    fn encoded_query_round_trips() {
        let mut forward = QueryParams::with_key("AIza key/with+odd=chars");
        forward.push("address", "Straße 1, Zürich");
        forward.push(
            "components",
            ComponentFilter::new()
                .with("route", "Annegatan")
                .with("administrative_area", "Helsinki")
                .with("country", "Finland")
                .to_query_value()
                .expect("components")
                .expect("non-empty"),
        );
        forward.push(
            "bounds",
            Bounds::new((34.172684, -118.604794), (34.236144, -118.500938))
                .to_query_value()
                .expect("bounds"),
        );
        forward.push("region", "es");

        let mut reverse = QueryParams::with_key("AIzaasdf");
        reverse.push(
            "latlng",
            LatLng::new(-33.8674869, 151.2069902)
                .to_query_value()
                .expect("latlng"),
        );
        reverse.push_opt(
            "result_type",
            MultiValue::from(["street_address", "route"]).to_query_value(),
        );
        reverse.push_opt("location_type", MultiValue::from("ROOFTOP").to_query_value());

        for params in [forward, reverse] {
            assert_eq!(decode(&encode_query(&params)), owned(&params));
        }
    }

    #[test]
    fn request_url_appends_query_to_endpoint() {
        let endpoint = normalize_endpoint(DEFAULT_ENDPOINT).expect("endpoint");
        let mut params = QueryParams::with_key("AIzaasdf");
        params.push("latlng", "40.714224,-73.961452");
        let url = build_request_url(&endpoint, &params);
        assert_eq!(
            url.as_str(),
            "https://maps.googleapis.com/maps/api/geocode/json?key=AIzaasdf&latlng=40.714224%2C-73.961452"
        );
    }

    #[test]
    fn normalize_endpoint_drops_query_and_fragment() {
        let url = normalize_endpoint("http://127.0.0.1:8080/maps/api/geocode/json?x=1#frag")
            .expect("endpoint");
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/maps/api/geocode/json");
    }

    #[test]
    fn normalize_endpoint_rejects_bad_input() {
        let err = normalize_endpoint("not a url").expect_err("parse");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = normalize_endpoint("ftp://example.com/geocode").expect_err("scheme");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn redact_key_masks_only_the_credential() {
        let endpoint = normalize_endpoint(DEFAULT_ENDPOINT).expect("endpoint");
        let mut params = QueryParams::with_key("secret");
        params.push("address", "Sydney");
        let url = build_request_url(&endpoint, &params);
        let redacted = redact_key(&url);
        assert!(!redacted.contains("secret"));
        assert!(redacted.ends_with("?key=REDACTED&address=Sydney"));
    }
}

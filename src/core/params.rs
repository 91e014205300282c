//! Purpose: Normalize typed geocoding inputs into flat query parameters.
//! Exports: `LatLng`, `Bounds`, `Component`, `ComponentFilter`, `MultiValue`, `QueryParams`.
//! Role: Pure, I/O-free layer between the public request types and the query encoder.
//! Invariants: Absent inputs never produce a pair; absent is not the empty string.
//! Invariants: Coordinates render with exactly six decimals (rounded, not truncated).
//! Invariants: Component filters and multi-value fields keep caller order.
use super::error::{Error, ErrorKind};

type ParamResult<T> = Result<T, Error>;

/// Latitude/longitude pair in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Renders `"<lat>,<lng>"` with six decimals each.
    pub fn to_query_value(&self) -> ParamResult<String> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(Error::new(ErrorKind::InvalidArgument)
                .with_message(format!(
                    "coordinate must be finite (got {}, {})",
                    self.lat, self.lng
                ))
                .with_hint("Pass latitude and longitude as decimal degrees."));
        }
        Ok(format!("{:.6},{:.6}", self.lat, self.lng))
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

/// Viewport used to bias forward geocoding results.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub southwest: LatLng,
    pub northeast: LatLng,
}

impl Bounds {
    pub fn new(southwest: impl Into<LatLng>, northeast: impl Into<LatLng>) -> Self {
        Self {
            southwest: southwest.into(),
            northeast: northeast.into(),
        }
    }

    pub fn to_query_value(&self) -> ParamResult<String> {
        Ok(format!(
            "{}|{}",
            self.southwest.to_query_value()?,
            self.northeast.to_query_value()?
        ))
    }
}

/// Component names understood by the geocoding service.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Component {
    Route,
    Locality,
    AdministrativeArea,
    PostalCode,
    Country,
}

impl Component {
    pub fn as_str(self) -> &'static str {
        match self {
            Component::Route => "route",
            Component::Locality => "locality",
            Component::AdministrativeArea => "administrative_area",
            Component::PostalCode => "postal_code",
            Component::Country => "country",
        }
    }
}

impl From<Component> for String {
    fn from(component: Component) -> Self {
        component.as_str().to_string()
    }
}

/// Ordered name to value restriction, serialized as `name:value|name:value`.
///
/// Iteration follows insertion order. Inserting a name that is already present
/// replaces its value and keeps its original position.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ComponentFilter {
    entries: Vec<(String, String)>,
}

impl ComponentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Returns `None` for an empty filter so the parameter is omitted.
    pub fn to_query_value(&self) -> ParamResult<Option<String>> {
        if self.entries.is_empty() {
            return Ok(None);
        }
        let mut segments = Vec::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            ensure_component(name, value)?;
            segments.push(format!("{name}:{value}"));
        }
        Ok(Some(segments.join("|")))
    }
}

impl<K, V> FromIterator<(K, V)> for ComponentFilter
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filter = Self::new();
        for (name, value) in iter {
            filter.insert(name, value);
        }
        filter
    }
}

fn ensure_component(name: &str, value: &str) -> ParamResult<()> {
    if name.is_empty() {
        return Err(Error::new(ErrorKind::InvalidArgument)
            .with_message("component filter name must not be empty"));
    }
    if name.contains([':', '|']) {
        return Err(Error::new(ErrorKind::InvalidArgument)
            .with_message(format!("component filter name {name:?} contains ':' or '|'")));
    }
    if value.contains('|') {
        return Err(Error::new(ErrorKind::InvalidArgument)
            .with_message(format!("component filter value {value:?} contains '|'"))
            .with_hint("Use one entry per component instead of joining values."));
    }
    Ok(())
}

/// A single enumerated value or an ordered list of them (`location_type`, `result_type`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MultiValue {
    One(String),
    Many(Vec<String>),
}

impl MultiValue {
    /// Scalars pass through verbatim; lists join with `|`. An empty list yields `None`.
    pub fn to_query_value(&self) -> Option<String> {
        match self {
            MultiValue::One(value) => Some(value.clone()),
            MultiValue::Many(values) if values.is_empty() => None,
            MultiValue::Many(values) => Some(values.join("|")),
        }
    }
}

impl From<&str> for MultiValue {
    fn from(value: &str) -> Self {
        MultiValue::One(value.to_string())
    }
}

impl From<String> for MultiValue {
    fn from(value: String) -> Self {
        MultiValue::One(value)
    }
}

impl<S: Into<String>> From<Vec<S>> for MultiValue {
    fn from(values: Vec<S>) -> Self {
        MultiValue::Many(values.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for MultiValue {
    fn from(values: [S; N]) -> Self {
        MultiValue::Many(values.into_iter().map(Into::into).collect())
    }
}

/// Normalized `(name, value)` pairs in emission order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    /// Starts a parameter set with the credential, which always leads.
    pub fn with_key(key: &str) -> Self {
        Self {
            pairs: vec![("key", key.to_string())],
        }
    }

    pub fn push(&mut self, name: &'static str, value: impl Into<String>) {
        self.pairs.push((name, value.into()));
    }

    pub fn push_opt(&mut self, name: &'static str, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.push(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.pairs.iter().map(|(name, value)| (*name, value.as_str()))
    }
}

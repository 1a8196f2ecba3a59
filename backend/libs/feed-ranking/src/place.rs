/// Place-name resolution and geotagging of new posts
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{RankingError, ResolveError, Result};
use crate::geohash::{encode, validate_coordinates, GeoCell, POST_PRECISION};

/// Name used when no better place name is available
pub const DEFAULT_LOCATION: &str = "Planet Earth";

/// Result types that identify a specific place rather than an area
pub const PRIORITY_POI_TYPES: [&str; 9] = [
    "point_of_interest",
    "establishment",
    "natural_feature",
    "cafe",
    "restaurant",
    "transit_station",
    "airport",
    "food",
    "park",
];

const LOCALITY_TYPES: [&str; 2] = ["locality", "administrative_area_level_2"];
const ADMIN_AREA_TYPES: [&str; 1] = ["administrative_area_level_1"];
const COUNTRY_TYPES: [&str; 1] = ["country"];

#[async_trait]
pub trait PlaceNameResolver: Send + Sync {
    /// Human-readable name for a coordinate pair
    async fn resolve(&self, latitude: f64, longitude: f64) -> std::result::Result<String, ResolveError>;
}

/// Resolver that always answers with the same name
#[derive(Debug, Clone)]
pub struct FixedPlaceNameResolver {
    name: String,
}

impl FixedPlaceNameResolver {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for FixedPlaceNameResolver {
    fn default() -> Self {
        Self::new(DEFAULT_LOCATION)
    }
}

#[async_trait]
impl PlaceNameResolver for FixedPlaceNameResolver {
    async fn resolve(&self, _latitude: f64, _longitude: f64) -> std::result::Result<String, ResolveError> {
        Ok(self.name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// One reverse-geocoding match
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

impl GeocodeResult {
    fn is_priority_place(&self) -> bool {
        self.place_id.is_some()
            && self
                .types
                .iter()
                .any(|t| PRIORITY_POI_TYPES.contains(&t.as_str()))
    }
}

/// Source of raw reverse-geocoding results (e.g. an HTTP geocoding API)
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn reverse(&self, latitude: f64, longitude: f64) -> std::result::Result<Vec<GeocodeResult>, ResolveError>;
}

/// First result naming a specific place, else the first result
pub fn select_result(results: &[GeocodeResult]) -> Option<&GeocodeResult> {
    results
        .iter()
        .find(|r| r.is_priority_place())
        .or_else(|| results.first())
}

fn component<'a>(components: &'a [AddressComponent], wanted: &[&str]) -> Option<&'a str> {
    let wanted: HashSet<&str> = wanted.iter().copied().collect();
    components
        .iter()
        .find(|c| c.types.iter().any(|t| wanted.contains(t.as_str())))
        .map(|c| c.long_name.as_str())
}

/// Format address components, most specific first:
/// "poi, region, country", "locality, region, country", "locality, country",
/// "region, country", "country", then [`DEFAULT_LOCATION`].
pub fn display_location(components: &[AddressComponent]) -> String {
    let locality = component(components, &LOCALITY_TYPES);
    let admin_area = component(components, &ADMIN_AREA_TYPES);
    let country = component(components, &COUNTRY_TYPES);
    let poi = component(components, &PRIORITY_POI_TYPES);

    match (poi, locality, admin_area, country) {
        (Some(poi), _, Some(admin), Some(country)) => format!("{}, {}, {}", poi, admin, country),
        (_, Some(locality), Some(admin), Some(country)) => {
            format!("{}, {}, {}", locality, admin, country)
        }
        (_, Some(locality), None, Some(country)) => format!("{}, {}", locality, country),
        (_, _, Some(admin), Some(country)) => format!("{}, {}", admin, country),
        (_, _, _, Some(country)) => country.to_string(),
        _ => DEFAULT_LOCATION.to_string(),
    }
}

/// Applies the display policy to any [`AddressLookup`]
pub struct AddressComponentResolver<L> {
    lookup: L,
}

impl<L: AddressLookup> AddressComponentResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl<L: AddressLookup> PlaceNameResolver for AddressComponentResolver<L> {
    async fn resolve(&self, latitude: f64, longitude: f64) -> std::result::Result<String, ResolveError> {
        let results = self.lookup.reverse(latitude, longitude).await?;
        let name = match select_result(&results) {
            Some(best) if !best.address_components.is_empty() => {
                display_location(&best.address_components)
            }
            _ => DEFAULT_LOCATION.to_string(),
        };
        Ok(name)
    }
}

/// Location fields stored with a new post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoTag {
    pub geo_cell: Option<GeoCell>,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

pub struct GeoTagger {
    resolver: Arc<dyn PlaceNameResolver>,
}

impl GeoTagger {
    pub fn new(resolver: Arc<dyn PlaceNameResolver>) -> Self {
        Self { resolver }
    }

    /// Geotag a post. With coordinates, the resolved place name replaces any
    /// client-supplied name; without them the post keeps its name and no cell.
    pub async fn tag(
        &self,
        latitude: Option<f64>,
        longitude: Option<f64>,
        location_name: Option<String>,
    ) -> Result<GeoTag> {
        let (latitude, longitude) = match (latitude, longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            (None, None) => {
                return Ok(GeoTag {
                    geo_cell: None,
                    location_name,
                    latitude: None,
                    longitude: None,
                })
            }
            _ => {
                return Err(RankingError::InvalidInput(
                    "latitude and longitude must be provided together".to_string(),
                ))
            }
        };

        validate_coordinates(latitude, longitude)?;
        let geo_cell = encode(latitude, longitude, POST_PRECISION)?;

        let name = match self.resolver.resolve(latitude, longitude).await {
            Ok(name) => name,
            Err(e) => {
                warn!(latitude, longitude, error = %e, "Place lookup failed, using default location");
                DEFAULT_LOCATION.to_string()
            }
        };
        debug!(geo_cell = %geo_cell, location = %name, "Geotagged post");

        Ok(GeoTag {
            geo_cell: Some(geo_cell),
            location_name: Some(name),
            latitude: Some(latitude),
            longitude: Some(longitude),
        })
    }
}

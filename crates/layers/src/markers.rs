use serde::Serialize;

use formats::{Feature, GeoPoint};
use foundation::bounds::Aabb2;
use foundation::math::Vec2;

/// Icon used when a feature has no `properties.icon`.
pub const DEFAULT_MARKER_ICON: &str = "https://cdn-icons-png.flaticon.com/512/854/854878.png";

/// A map pin for one feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    /// Index into the source collection.
    pub feature_index: usize,
    pub lon: f64,
    pub lat: f64,
    pub icon: String,
    pub tag: Option<String>,
}

impl Marker {
    /// `None` for features without a geometry.
    pub fn for_feature(feature_index: usize, feature: &Feature) -> Option<Self> {
        let GeoPoint { lon, lat, .. } = feature.anchor()?;
        Some(Self {
            feature_index,
            lon,
            lat,
            icon: feature.icon().unwrap_or(DEFAULT_MARKER_ICON).to_string(),
            tag: feature.tag(),
        })
    }
}

/// The markers currently on the map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerSet {
    markers: Vec<Marker>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole set, like swapping the map's marker layer.
    pub fn rebuild<'a>(&mut self, features: impl IntoIterator<Item = (usize, &'a Feature)>) {
        self.markers = features
            .into_iter()
            .filter_map(|(i, f)| Marker::for_feature(i, f))
            .collect();
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    /// Lon/lat box to fit the map view to; `None` when there is nothing shown.
    pub fn bounds(&self) -> Option<Aabb2> {
        let mut b = Aabb2::empty();
        for m in &self.markers {
            b.expand(Vec2::new(m.lon, m.lat));
        }
        if b.is_empty() { None } else { Some(b) }
    }
}

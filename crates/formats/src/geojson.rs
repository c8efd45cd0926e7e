use serde_json::{Map, Value};

use foundation::bounds::Aabb2;
use foundation::math::Vec2;

use crate::error::GeoJsonError;

/// A GeoJSON position. `alt` is kept when the source carries a third value.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
    pub alt: Option<f64>,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat, alt: None }
    }

    pub fn with_alt(lon: f64, lat: f64, alt: f64) -> Self {
        Self {
            lon,
            lat,
            alt: Some(alt),
        }
    }

    pub fn lon_lat(&self) -> Vec2 {
        Vec2::new(self.lon, self.lat)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    GeometryCollection,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(GeoPoint),
    MultiPoint(Vec<GeoPoint>),
    LineString(Vec<GeoPoint>),
    MultiLineString(Vec<Vec<GeoPoint>>),
    Polygon(Vec<Vec<GeoPoint>>),
    MultiPolygon(Vec<Vec<Vec<GeoPoint>>>),
    GeometryCollection(Vec<Geometry>),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Geometry::GeometryCollection(_) => GeometryKind::GeometryCollection,
        }
    }

    /// Visits every position in document order.
    pub fn for_each_position(&self, f: &mut impl FnMut(&GeoPoint)) {
        match self {
            Geometry::Point(p) => f(p),
            Geometry::MultiPoint(ps) | Geometry::LineString(ps) => ps.iter().for_each(f),
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter().flatten().for_each(f)
            }
            Geometry::MultiPolygon(polys) => polys.iter().flatten().flatten().for_each(f),
            Geometry::GeometryCollection(geoms) => {
                for g in geoms {
                    g.for_each_position(f);
                }
            }
        }
    }

    pub fn first_position(&self) -> Option<GeoPoint> {
        let mut first = None;
        self.for_each_position(&mut |p| {
            if first.is_none() {
                first = Some(*p);
            }
        });
        first
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<String>,
    /// `null` geometries are legal GeoJSON and stay `None`.
    pub geometry: Option<Geometry>,
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn geometry_kind(&self) -> Option<GeometryKind> {
        self.geometry.as_ref().map(Geometry::kind)
    }

    /// `properties.tag`, the playback filter key. Numbers and booleans are
    /// stringified so `"tag": 3` and `"tag": "3"` filter together.
    pub fn tag(&self) -> Option<String> {
        match self.properties.get("tag")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// `properties.icon`, a marker image URL.
    pub fn icon(&self) -> Option<&str> {
        self.properties.get("icon").and_then(Value::as_str)
    }

    /// Where a marker for this feature is placed: its first position.
    pub fn anchor(&self) -> Option<GeoPoint> {
        self.geometry.as_ref().and_then(Geometry::first_position)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Lon/lat extent over every position of every feature.
    pub fn bounds(&self) -> Option<Aabb2> {
        let mut b = Aabb2::empty();
        for feat in &self.features {
            if let Some(g) = &feat.geometry {
                g.for_each_position(&mut |p| b.expand(p.lon_lat()));
            }
        }
        if b.is_empty() { None } else { Some(b) }
    }

    pub fn from_geojson_str(payload: &str) -> Result<Self, GeoJsonError> {
        let payload = payload.strip_prefix('\u{feff}').unwrap_or(payload);
        let value: Value = serde_json::from_str(payload).map_err(|e| GeoJsonError::Json {
            reason: e.to_string(),
        })?;
        Self::from_geojson_value(&value)
    }

    /// Accepts a `FeatureCollection`, a single `Feature`, or a bare geometry
    /// object; the latter two are wrapped into a one-feature collection.
    pub fn from_geojson_value(value: &Value) -> Result<Self, GeoJsonError> {
        let obj = value.as_object().ok_or_else(|| GeoJsonError::InvalidRoot {
            reason: "GeoJSON root must be an object".to_string(),
        })?;
        let ty = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| GeoJsonError::InvalidRoot {
                reason: "GeoJSON root missing `type`".to_string(),
            })?;

        match ty {
            "FeatureCollection" => {
                let features_val = obj.get("features").and_then(Value::as_array).ok_or_else(
                    || GeoJsonError::InvalidRoot {
                        reason: "FeatureCollection must have a `features` array".to_string(),
                    },
                )?;
                let mut features = Vec::with_capacity(features_val.len());
                for (index, feat_val) in features_val.iter().enumerate() {
                    let feature = parse_feature(feat_val)
                        .map_err(|reason| GeoJsonError::InvalidFeature { index, reason })?;
                    features.push(feature);
                }
                Ok(Self { features })
            }
            "Feature" => {
                let feature = parse_feature(value)
                    .map_err(|reason| GeoJsonError::InvalidFeature { index: 0, reason })?;
                Ok(Self {
                    features: vec![feature],
                })
            }
            _ => {
                let geometry =
                    parse_geometry(value).map_err(|reason| GeoJsonError::InvalidRoot { reason })?;
                Ok(Self {
                    features: vec![Feature {
                        id: None,
                        geometry: Some(geometry),
                        properties: Map::new(),
                    }],
                })
            }
        }
    }

    /// Emits a GeoJSON FeatureCollection. Property ordering may differ from
    /// the original input.
    pub fn to_geojson_value(&self) -> Value {
        features_to_geojson_value(self.features.iter())
    }
}

/// Builds a FeatureCollection value from any subset of features.
pub fn features_to_geojson_value<'a>(features: impl Iterator<Item = &'a Feature>) -> Value {
    let mut root = Map::new();
    root.insert(
        "type".to_string(),
        Value::String("FeatureCollection".to_string()),
    );

    let features: Vec<Value> = features
        .map(|feat| {
            let mut fobj = Map::new();
            fobj.insert("type".to_string(), Value::String("Feature".to_string()));
            if let Some(id) = &feat.id {
                fobj.insert("id".to_string(), Value::String(id.clone()));
            }
            fobj.insert(
                "properties".to_string(),
                Value::Object(feat.properties.clone()),
            );
            fobj.insert(
                "geometry".to_string(),
                feat.geometry
                    .as_ref()
                    .map(geometry_to_geojson_value)
                    .unwrap_or(Value::Null),
            );
            Value::Object(fobj)
        })
        .collect();

    root.insert("features".to_string(), Value::Array(features));
    Value::Object(root)
}

fn parse_feature(value: &Value) -> Result<Feature, String> {
    let feat_obj = value
        .as_object()
        .ok_or("feature must be an object".to_string())?;

    let feat_type = feat_obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or("feature missing type".to_string())?;
    if feat_type != "Feature" {
        return Err(format!("unexpected feature type: {feat_type}"));
    }

    let id = match feat_obj.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Null) | None => None,
        Some(_) => return Err("feature id must be a string or number".to_string()),
    };

    let properties = match feat_obj.get("properties") {
        Some(Value::Object(map)) => map.clone(),
        Some(Value::Null) => Map::new(),
        Some(_) => return Err("feature properties must be an object or null".to_string()),
        None => return Err("feature missing properties".to_string()),
    };

    let geometry = match feat_obj.get("geometry") {
        Some(Value::Null) => None,
        Some(g) => Some(parse_geometry(g)?),
        None => return Err("feature missing geometry".to_string()),
    };

    Ok(Feature {
        id,
        geometry,
        properties,
    })
}

fn parse_geometry(value: &Value) -> Result<Geometry, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or("geometry missing type".to_string())?;

    if ty == "GeometryCollection" {
        let geoms = obj
            .get("geometries")
            .and_then(Value::as_array)
            .ok_or("GeometryCollection must have a `geometries` array".to_string())?;
        let mut out = Vec::with_capacity(geoms.len());
        for g in geoms {
            out.push(parse_geometry(g)?);
        }
        return Ok(Geometry::GeometryCollection(out));
    }

    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Point" => Ok(Geometry::Point(parse_position(coords)?)),
        "MultiPoint" => Ok(Geometry::MultiPoint(parse_positions(coords)?)),
        "LineString" => Ok(Geometry::LineString(parse_line(coords)?)),
        "MultiLineString" => Ok(Geometry::MultiLineString(parse_lines(coords)?)),
        "Polygon" => Ok(Geometry::Polygon(parse_polygon(coords)?)),
        "MultiPolygon" => Ok(Geometry::MultiPolygon(parse_multi_polygon(coords)?)),
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn parse_position(coords: &Value) -> Result<GeoPoint, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have at least [lon, lat]".to_string());
    }
    let mut nums = Vec::with_capacity(arr.len());
    for v in arr {
        nums.push(v.as_f64().ok_or("position values must be numbers".to_string())?);
    }
    Ok(GeoPoint {
        lon: nums[0],
        lat: nums[1],
        alt: nums.get(2).copied(),
    })
}

fn parse_positions(coords: &Value) -> Result<Vec<GeoPoint>, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        out.push(parse_position(item)?);
    }
    Ok(out)
}

fn parse_line(coords: &Value) -> Result<Vec<GeoPoint>, String> {
    let line = parse_positions(coords)?;
    if line.len() < 2 {
        return Err("LineString must have at least 2 positions".to_string());
    }
    Ok(line)
}

fn parse_lines(coords: &Value) -> Result<Vec<Vec<GeoPoint>>, String> {
    let arr = coords
        .as_array()
        .ok_or("MultiLineString coordinates must be an array".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for line in arr {
        out.push(parse_line(line)?);
    }
    Ok(out)
}

fn parse_ring(coords: &Value) -> Result<Vec<GeoPoint>, String> {
    let ring = parse_positions(coords)?;
    if ring.len() < 4 {
        return Err("linear ring must have at least 4 positions".to_string());
    }
    let (first, last) = (ring[0], ring[ring.len() - 1]);
    if first.lon != last.lon || first.lat != last.lat {
        return Err("linear ring must be closed".to_string());
    }
    Ok(ring)
}

fn parse_polygon(coords: &Value) -> Result<Vec<Vec<GeoPoint>>, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    let mut out = Vec::with_capacity(rings.len());
    for ring in rings {
        out.push(parse_ring(ring)?);
    }
    Ok(out)
}

fn parse_multi_polygon(coords: &Value) -> Result<Vec<Vec<Vec<GeoPoint>>>, String> {
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    let mut out = Vec::with_capacity(polys.len());
    for poly in polys {
        out.push(parse_polygon(poly)?);
    }
    Ok(out)
}

fn geometry_to_geojson_value(geom: &Geometry) -> Value {
    let mut obj = Map::new();
    let kind = match geom.kind() {
        GeometryKind::Point => "Point",
        GeometryKind::MultiPoint => "MultiPoint",
        GeometryKind::LineString => "LineString",
        GeometryKind::MultiLineString => "MultiLineString",
        GeometryKind::Polygon => "Polygon",
        GeometryKind::MultiPolygon => "MultiPolygon",
        GeometryKind::GeometryCollection => "GeometryCollection",
    };
    obj.insert("type".to_string(), Value::String(kind.to_string()));

    let rings = |rings: &Vec<Vec<GeoPoint>>| {
        Value::Array(
            rings
                .iter()
                .map(|ring| Value::Array(ring.iter().map(position_value).collect()))
                .collect(),
        )
    };

    match geom {
        Geometry::Point(p) => {
            obj.insert("coordinates".to_string(), position_value(p));
        }
        Geometry::MultiPoint(ps) | Geometry::LineString(ps) => {
            obj.insert(
                "coordinates".to_string(),
                Value::Array(ps.iter().map(position_value).collect()),
            );
        }
        Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
            obj.insert("coordinates".to_string(), rings(lines));
        }
        Geometry::MultiPolygon(polys) => {
            obj.insert(
                "coordinates".to_string(),
                Value::Array(polys.iter().map(rings).collect()),
            );
        }
        Geometry::GeometryCollection(geoms) => {
            obj.insert(
                "geometries".to_string(),
                Value::Array(geoms.iter().map(geometry_to_geojson_value).collect()),
            );
        }
    }
    Value::Object(obj)
}

fn position_value(p: &GeoPoint) -> Value {
    let mut coords = vec![Value::from(p.lon), Value::from(p.lat)];
    if let Some(alt) = p.alt {
        coords.push(Value::from(alt));
    }
    Value::Array(coords)
}

use scene::Field;
use serde_json::Value;

/// One raw building feature, parsed leniently.
///
/// Coordinates and area accept numbers or numeric strings; anything else
/// becomes `None` and the projector drops the record. Dirty municipal data
/// is expected: a malformed feature degrades to an empty record, it is
/// never an ingest error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildingRecord {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub area: Option<f64>,
    pub desc: Option<String>,
    pub zone: Option<Field>,
}

/// All building records from one GeoJSON-like payload, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingSet {
    pub records: Vec<BuildingRecord>,
}

#[derive(Debug)]
pub enum BuildingSetError {
    /// The payload has no `features` array.
    NotAFeatureCollection,
    Json(String),
}

impl std::fmt::Display for BuildingSetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildingSetError::NotAFeatureCollection => {
                write!(f, "expected a feature collection with a features array")
            }
            BuildingSetError::Json(reason) => write!(f, "JSON parse error: {reason}"),
        }
    }
}

impl std::error::Error for BuildingSetError {}

impl BuildingSet {
    pub fn from_geojson_str(payload: &str) -> Result<Self, BuildingSetError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| BuildingSetError::Json(e.to_string()))?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_value(value: &Value) -> Result<Self, BuildingSetError> {
        let features = value
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(BuildingSetError::NotAFeatureCollection)?;

        let records = features.iter().map(parse_record).collect();
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_record(feature: &Value) -> BuildingRecord {
    let Some(props) = feature.get("properties").and_then(|v| v.as_object()) else {
        return BuildingRecord::default();
    };

    BuildingRecord {
        x: lenient_f64(props.get("x_coord")),
        y: lenient_f64(props.get("y_coord")),
        area: lenient_f64(props.get("shape__area")),
        desc: props
            .get("bldg_code_desc")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string),
        // The zone label and the numeric building code are used
        // interchangeably as zoning.
        zone: field_value(props.get("zone")).or_else(|| field_value(props.get("bldg_code"))),
    }
}

/// Numbers pass through; numeric strings parse; everything else is `None`.
fn lenient_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn field_value(value: Option<&Value>) -> Option<Field> {
    match value? {
        Value::Number(n) => n.as_f64().map(Field::Number),
        Value::String(s) if !s.trim().is_empty() => Some(Field::text(s.clone())),
        _ => None,
    }
}

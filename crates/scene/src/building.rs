use foundation::BuildingId;
use foundation::math::Vec3;
use serde::{Serialize, Serializer};

use crate::field::Field;

/// Derived box dimensions for one building footprint.
///
/// Footprints are assumed roughly square; height is exaggerated 1.5x the
/// footprint edge for visual prominence. Stylization, not measurement.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct BoxDims {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl BoxDims {
    pub const DEPTH_RATIO: f64 = 0.8;
    pub const HEIGHT_RATIO: f64 = 1.5;

    pub fn from_area(area: f64) -> Self {
        let footprint = area.sqrt();
        Self {
            width: footprint,
            height: footprint * Self::HEIGHT_RATIO,
            depth: footprint * Self::DEPTH_RATIO,
        }
    }
}

/// Display and query metadata snapshot for one building.
///
/// `x`/`y` keep the raw plan coordinates; `x_display`/`y_display` are the
/// two-decimal renderings the tooltip shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingInfo {
    pub desc: String,
    pub area: f64,
    pub x: f64,
    pub y: f64,
    pub x_display: String,
    pub y_display: String,
    pub zone: Field,
}

impl BuildingInfo {
    pub const UNKNOWN: &'static str = "Unknown";

    pub fn new(desc: Option<String>, area: f64, x: f64, y: f64, zone: Option<Field>) -> Self {
        Self {
            desc: desc.unwrap_or_else(|| Self::UNKNOWN.to_string()),
            area,
            x,
            y,
            x_display: format!("{x:.2}"),
            y_display: format!("{y:.2}"),
            zone: zone.unwrap_or_else(|| Field::text(Self::UNKNOWN)),
        }
    }
}

/// Immutable render descriptor for one extruded building footprint.
///
/// The position's y component is half the box height, so the box rests on
/// the ground plane at y = 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingBox {
    #[serde(serialize_with = "id_as_u32")]
    pub id: BuildingId,
    #[serde(serialize_with = "vec3_as_array")]
    pub position: Vec3,
    pub dims: BoxDims,
    pub info: BuildingInfo,
}

impl BuildingBox {
    pub fn new(id: BuildingId, position: Vec3, dims: BoxDims, info: BuildingInfo) -> Self {
        Self {
            id,
            position,
            dims,
            info,
        }
    }
}

fn id_as_u32<S: Serializer>(id: &BuildingId, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u32(id.index())
}

fn vec3_as_array<S: Serializer>(v: &Vec3, serializer: S) -> Result<S::Ok, S::Error> {
    [v.x, v.y, v.z].serialize(serializer)
}

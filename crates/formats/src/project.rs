use foundation::BuildingId;
use foundation::math::{LocalFrame, Vec2, Vec3};
use scene::{BoxDims, BuildingBox, BuildingInfo};

use crate::buildings::BuildingRecord;

/// Projection policy.
///
/// Defaults reproduce the interactive dashboard behavior: 0.08
/// map-to-scene scale, every 100th surviving record, 50 boxes at most.
/// The stride keeps a representative sample at interactive frame rates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProjectorConfig {
    pub scale: f64,
    pub stride: usize,
    pub max_boxes: usize,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            scale: 0.08,
            stride: 100,
            max_boxes: 50,
        }
    }
}

/// Projects raw records into render boxes, taking the coordinate origin
/// from the first record in the sequence.
///
/// An unparseable origin degrades to NaN positions, which the renderer
/// drops; it is not an error. Everything else is `project_with_frame`.
pub fn project_buildings(records: &[BuildingRecord], config: &ProjectorConfig) -> Vec<BuildingBox> {
    let Some(first) = records.first() else {
        return Vec::new();
    };

    let base = Vec2::new(first.x.unwrap_or(f64::NAN), first.y.unwrap_or(f64::NAN));
    project_with_frame(records, &LocalFrame::new(base, config.scale), config)
}

/// Projects against an explicit plan frame. Pure: same input, same output.
///
/// Records whose coordinates or area fail the survival check contribute
/// nothing; survivors are decimated by `config.stride` and the output is
/// capped at `config.max_boxes`. Ids are survivor positions, so the
/// emitted ids are `0, stride, 2*stride, ...`.
pub fn project_with_frame(
    records: &[BuildingRecord],
    frame: &LocalFrame,
    config: &ProjectorConfig,
) -> Vec<BuildingBox> {
    let stride = config.stride.max(1);
    let mut out = Vec::new();
    let mut survivor = 0usize;

    for record in records {
        if out.len() >= config.max_boxes {
            break;
        }

        let Some((x, y, area)) = usable(record) else {
            continue;
        };

        if survivor % stride == 0 {
            let dims = BoxDims::from_area(area);
            let ground = frame.to_scene(Vec2::new(x, y));
            let position = Vec3::new(ground.x, dims.height / 2.0, ground.y);
            let info = BuildingInfo::new(record.desc.clone(), area, x, y, record.zone.clone());
            out.push(BuildingBox::new(
                BuildingId::new(survivor as u32),
                position,
                dims,
                info,
            ));
        }
        survivor += 1;
    }

    out
}

/// Survival check: `x`, `y`, `area` finite and `area` positive (a
/// non-positive area has no real footprint edge). Failing records are
/// dropped whole; no partial boxes.
fn usable(record: &BuildingRecord) -> Option<(f64, f64, f64)> {
    let x = record.x.filter(|v| v.is_finite())?;
    let y = record.y.filter(|v| v.is_finite())?;
    let area = record.area.filter(|v| v.is_finite() && *v > 0.0)?;
    Some((x, y, area))
}

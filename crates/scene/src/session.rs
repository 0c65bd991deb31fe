use foundation::BuildingId;

use crate::building::BuildingBox;
use crate::highlight::HighlightSet;

/// Per-page-load view state with explicit ownership.
///
/// - The render list is written once after ingest and read-only after.
/// - The highlight set is replaced wholesale per applied filter. When
///   responses to overlapping queries arrive out of order, the later
///   arrival wins; that race is accepted, not sequenced.
/// - The selected id only affects display.
///
/// The session starts with an empty render list, an empty highlight set
/// and no selection.
#[derive(Debug, Default)]
pub struct ViewSession {
    boxes: Vec<BuildingBox>,
    installed: bool,
    highlights: HighlightSet,
    selected: Option<BuildingId>,
}

impl ViewSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the projected render list. The first call wins; later
    /// calls are ignored and return `false`.
    pub fn install_boxes(&mut self, boxes: Vec<BuildingBox>) -> bool {
        if self.installed {
            return false;
        }
        self.boxes = boxes;
        self.installed = true;
        true
    }

    pub fn boxes(&self) -> &[BuildingBox] {
        &self.boxes
    }

    /// Replaces the highlight set wholesale.
    pub fn apply_highlights(&mut self, highlights: HighlightSet) {
        self.highlights = highlights;
    }

    pub fn highlights(&self) -> &HighlightSet {
        &self.highlights
    }

    pub fn select(&mut self, id: Option<BuildingId>) {
        self.selected = id;
    }

    pub fn selected(&self) -> Option<BuildingId> {
        self.selected
    }
}

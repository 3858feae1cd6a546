use serde::{Deserialize, Serialize};

/// Board side a component is placed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    #[default]
    Top,
    Bottom,
}

impl Layer {
    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Top => "Top",
            Layer::Bottom => "Bottom",
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a component on the sheet.
///
/// `rotation` is in degrees. Placements produced by the compiler or the
/// placer always carry one of 0, 90, 180 or 270; snapshot placements are taken
/// as reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub layer: Layer,
}

impl Placement {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            rotation: 0.0,
            layer: Layer::Top,
        }
    }

    /// Offset this placement by `(dx, dy)` and take the given orientation.
    pub fn offset(&self, dx: f64, dy: f64, rotation: f64, layer: Layer) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            rotation,
            layer,
        }
    }

    /// Same placement with the rotation snapped to a quarter turn.
    pub fn normalized(self) -> Self {
        Self {
            rotation: normalize_rotation(self.rotation),
            ..self
        }
    }
}

/// Snap an angle in degrees to the nearest of 0/90/180/270.
///
/// Ties (45, 135, ...) round half to even on the quarter count, so 45 → 0 and
/// 135 → 180.
pub fn normalize_rotation(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let quarters = (degrees.rem_euclid(360.0) / 90.0).round_ties_even();
    (quarters * 90.0).rem_euclid(360.0)
}

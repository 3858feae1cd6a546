// crates/ecop-autoplace/src/lib.rs

//! Deterministic grid placement for schematic components.
//!
//! [`GridPlacer::place_all`] assigns a grid-aligned, collision-free position
//! to every component that needs one. It is a pure function of its inputs:
//! the same parts and obstacles always produce the same coordinates.

use std::collections::BTreeMap;

use ecop_sch::position::{Layer, Placement, normalize_rotation};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PlacerConfigError {
    #[error("grid_step must be positive, got {0}")]
    GridStep(f64),

    #[error("margin must not be negative, got {0}")]
    Margin(f64),

    #[error("wrap_y_step must be positive, got {0}")]
    WrapYStep(f64),

    #[error("max_attempts must be at least 1")]
    MaxAttempts,
}

/// Tuning knobs for [`GridPlacer`]. Distances are in sheet units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlacerConfig {
    /// Grid cell size.
    pub grid_step: f64,
    /// Clearance kept around every placed component.
    pub margin: f64,
    /// X coordinate past which the scan wraps to a new row.
    pub sheet_max_x: f64,
    /// Row height used when wrapping.
    pub wrap_y_step: f64,
    /// Gap, in cells, between existing components and the first new column.
    pub column_gap_cells: u32,
    /// Scan positions tried before giving up on a free slot.
    pub max_attempts: usize,
}

impl Default for PlacerConfig {
    fn default() -> Self {
        Self {
            grid_step: 10.0,
            margin: 5.0,
            sheet_max_x: 500.0,
            wrap_y_step: 50.0,
            column_gap_cells: 6,
            max_attempts: 1000,
        }
    }
}

impl PlacerConfig {
    pub fn validate(&self) -> Result<(), PlacerConfigError> {
        if !(self.grid_step > 0.0) {
            return Err(PlacerConfigError::GridStep(self.grid_step));
        }
        if !(self.margin >= 0.0) {
            return Err(PlacerConfigError::Margin(self.margin));
        }
        if !(self.wrap_y_step > 0.0) {
            return Err(PlacerConfigError::WrapYStep(self.wrap_y_step));
        }
        if self.max_attempts == 0 {
            return Err(PlacerConfigError::MaxAttempts);
        }
        Ok(())
    }
}

/// Axis-aligned rectangle of occupied sheet space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Two rectangles intersect unless one entirely precedes the other on
    /// either axis. Touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.x + self.w <= other.x
            || other.x + other.w <= self.x
            || self.y + self.h <= other.y
            || other.y + other.h <= self.y)
    }

    /// Grow by `margin` on every side.
    pub fn padded(&self, margin: f64) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            w: self.w + 2.0 * margin,
            h: self.h + 2.0 * margin,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }
}

/// Relative placement request: `dx`/`dy` are in grid cells from the anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub refdes: String,
    pub dx: f64,
    pub dy: f64,
}

/// A component that needs a position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartToPlace {
    pub refdes: String,
    pub kind: Option<String>,
    pub anchor: Option<Anchor>,
    pub rotation: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl PartToPlace {
    pub fn new(refdes: impl Into<String>, kind: Option<&str>) -> Self {
        Self {
            refdes: refdes.into(),
            kind: kind.map(str::to_owned),
            ..Default::default()
        }
    }

    pub fn near(mut self, anchor_refdes: impl Into<String>, dx: f64, dy: f64) -> Self {
        self.anchor = Some(Anchor {
            refdes: anchor_refdes.into(),
            dx,
            dy,
        });
        self
    }
}

/// A component that already sits on the sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OccupiedComponent {
    pub refdes: String,
    pub x: f64,
    pub y: f64,
    pub kind: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl OccupiedComponent {
    pub fn new(refdes: impl Into<String>, x: f64, y: f64, kind: Option<&str>) -> Self {
        Self {
            refdes: refdes.into(),
            x,
            y,
            kind: kind.map(str::to_owned),
            ..Default::default()
        }
    }
}

/// Helper to estimate component size, in grid cells, from its kind.
pub fn estimate_size_cells(kind: Option<&str>) -> (u32, u32) {
    let kind = kind.unwrap_or_default().to_ascii_lowercase();
    match kind.as_str() {
        "resistor" | "capacitor" => (3, 1),
        "ic" | "microcontroller" | "mcu" => (6, 4),
        "connector" => (6, 2),
        "diode" | "transistor" | "mosfet" | "bjt" => (3, 2),
        _ => (3, 2),
    }
}

/// Relative placement from an already positioned anchor, in sheet units.
pub fn place_near(anchor: &Placement, dx: f64, dy: f64, rotation: f64, layer: Layer) -> Placement {
    anchor.offset(dx, dy, rotation, layer)
}

pub struct GridPlacer {
    config: PlacerConfig,
}

impl Default for GridPlacer {
    fn default() -> Self {
        Self::new(PlacerConfig::default())
    }
}

impl GridPlacer {
    pub fn new(config: PlacerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlacerConfig {
        &self.config
    }

    /// Snap a point to the grid, rounding half to even.
    ///
    /// With a step of 10, `(5, 5)` snaps to `(0, 0)` and `(25, 25)` to
    /// `(20, 20)`.
    pub fn snap_to_grid(&self, x: f64, y: f64) -> (f64, f64) {
        let step = self.config.grid_step;
        (
            (x / step).round_ties_even() * step,
            (y / step).round_ties_even() * step,
        )
    }

    /// Size in cells for a new part: explicit dimensions win over the kind table
    /// and are truncated, so a part thinner than one step is zero cells wide.
    fn part_size_cells(&self, part: &PartToPlace) -> (u32, u32) {
        match (part.width, part.height) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 => {
                let step = self.config.grid_step;
                ((w / step) as u32, (h / step) as u32)
            }
            _ => estimate_size_cells(part.kind.as_deref()),
        }
    }

    /// Padded rectangles for components already on the sheet.
    pub fn build_occupied(&self, existing: &[OccupiedComponent]) -> Vec<Rect> {
        let step = self.config.grid_step;
        existing
            .iter()
            .map(|comp| {
                let (w, h) = match (comp.width, comp.height) {
                    (Some(w), Some(h)) => (w, h),
                    _ => {
                        let (w_cells, h_cells) = estimate_size_cells(comp.kind.as_deref());
                        (f64::from(w_cells) * step, f64::from(h_cells) * step)
                    }
                };
                Rect::new(comp.x, comp.y, w, h).padded(self.config.margin)
            })
            .collect()
    }

    /// Scan the grid from `preferred` for a slot of `size` cells that does
    /// not intersect `occupied`.
    ///
    /// Falls back to the snapped preferred point when no slot is found within
    /// `max_attempts` positions.
    pub fn find_free_slot(
        &self,
        occupied: &[Rect],
        preferred: (f64, f64),
        size: (u32, u32),
    ) -> (f64, f64) {
        let step = self.config.grid_step;
        let width = f64::from(size.0) * step;
        let height = f64::from(size.1) * step;

        let (start_x, start_y) = self.snap_to_grid(preferred.0, preferred.1);
        let (mut x, mut y) = (start_x, start_y);

        for _ in 0..self.config.max_attempts {
            let candidate = Rect::new(x, y, width, height);
            if !occupied.iter().any(|occ| candidate.intersects(occ)) {
                return (x, y);
            }

            x += step;
            if x + width > self.config.sheet_max_x {
                x = start_x;
                y += self.config.wrap_y_step;
            }
        }

        warn!(
            "No free slot found near ({start_x}, {start_y}) after {} attempts, using preferred point",
            self.config.max_attempts
        );
        (start_x, start_y)
    }

    /// Place every part in `parts`, in order.
    ///
    /// Each placed part becomes an obstacle and a potential anchor for the
    /// parts after it. Anchors that cannot be resolved fall back to the
    /// default column to the right of everything already on the sheet.
    pub fn place_all(
        &self,
        parts: &[PartToPlace],
        existing: &[OccupiedComponent],
    ) -> BTreeMap<String, Placement> {
        let step = self.config.grid_step;
        let mut occupied = self.build_occupied(existing);

        let mut positions: BTreeMap<&str, (f64, f64)> = existing
            .iter()
            .map(|comp| (comp.refdes.as_str(), (comp.x, comp.y)))
            .collect();

        let max_x = occupied.iter().map(Rect::right).fold(0.0_f64, f64::max);
        let base = (max_x + f64::from(self.config.column_gap_cells) * step, 0.0);

        let mut placements = BTreeMap::new();
        for part in parts {
            let size = self.part_size_cells(part);

            let preferred = match part
                .anchor
                .as_ref()
                .and_then(|a| positions.get(a.refdes.as_str()).map(|pos| (a, *pos)))
            {
                Some((anchor, (ax, ay))) => (ax + anchor.dx * step, ay + anchor.dy * step),
                None => base,
            };

            let (x, y) = self.find_free_slot(&occupied, preferred, size);
            debug!("Placed {} at ({x}, {y})", part.refdes);

            placements.insert(
                part.refdes.clone(),
                Placement {
                    x,
                    y,
                    rotation: normalize_rotation(part.rotation),
                    layer: Layer::Top,
                },
            );

            let width = f64::from(size.0) * step;
            let height = f64::from(size.1) * step;
            occupied.push(Rect::new(x, y, width, height).padded(self.config.margin));
            positions.insert(part.refdes.as_str(), (x, y));
        }

        placements
    }
}

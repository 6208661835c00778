//! Engine-wide constants.
//!
//! Geometry thresholds are expressed in plan-space percentage units unless
//! noted otherwise; sizes used only for presentation are in surface pixels.

/// Minimum drag extent for a two-point gesture to persist. A pointer-up
/// where both axis deltas are below this is a click, not a drag, and the
/// gesture is discarded.
pub const MIN_DRAG_EXTENT: f64 = 1.0;

/// Minimum recorded points for a freehand or area gesture to persist.
pub const MIN_PATH_POINTS: usize = 3;

/// Minimum points required to draw an open polyline.
pub const MIN_POLYLINE_POINTS: usize = 2;

/// Hit-test tolerance band around segment geometry, plan-space units.
pub const HIT_TOLERANCE: f64 = 1.5;

/// Opacity applied to the in-progress gesture preview.
pub const PREVIEW_OPACITY: f64 = 0.5;

/// Side length of selection handles, surface pixels.
pub const HANDLE_SIZE: f64 = 8.0;

/// Endpoint cap radius on measurement segments, surface pixels.
pub const MEASURE_CAP_RADIUS: f64 = 3.0;

/// Arrowhead stroke length, surface pixels.
pub const ARROW_HEAD_LENGTH: f64 = 12.0;

/// Nominal width and height of a text label's hit box, plan-space units.
pub const TEXT_BOX_EXTENT: (f64, f64) = (12.0, 4.0);

/// Default annotation layer name.
pub const DEFAULT_LAYER: &str = "default";

/// Default stroke color token.
pub const DEFAULT_COLOR: &str = "#ef4444";

/// Default stroke width.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

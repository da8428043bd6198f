//! Shared numeric constants for the topology editor.

// ── Zoom ────────────────────────────────────────────────────────

/// Smallest scale the wheel or a pinch can reach.
pub const MIN_ZOOM: f64 = 0.1;

/// Largest scale the wheel or a pinch can reach.
pub const MAX_ZOOM: f64 = 10.0;

/// Smallest scale a snapshot fit may choose.
pub const MIN_FIT_SCALE: f64 = 0.10;

/// Largest scale a snapshot fit may choose.
pub const MAX_FIT_SCALE: f64 = 2.0;

/// Horizontal margin reserved around the fitted diagram, in pixels.
pub const FIT_MARGIN_X: f64 = 200.0;

/// Vertical margin reserved around the fitted diagram, in pixels.
pub const FIT_MARGIN_Y: f64 = 300.0;

/// Wheel delta that doubles the scale.
pub const WHEEL_STEP: f64 = 100.0;

// ── Mode ladder ─────────────────────────────────────────────────

/// At or below this scale the editor is in multi-site mode.
pub const MULTI_SITE_MAX_SCALE: f64 = 0.1;

/// At or below this scale (and above the multi-site bound) the editor is in site mode.
pub const SITE_MAX_SCALE: f64 = 0.5;

/// At or below this scale (and above the site bound) the editor is in rack mode.
pub const RACK_MAX_SCALE: f64 = 5.0;

// ── Device outlines ─────────────────────────────────────────────

/// Radius of the circle drawn for a router.
pub const ROUTER_RADIUS: f64 = 50.0;

/// Half width and half height of a switch.
pub const SWITCH_HALF_EXTENT: f64 = 50.0;

/// Half width of a host.
pub const HOST_HALF_WIDTH: f64 = 30.0;

/// Half height of a host.
pub const HOST_HALF_HEIGHT: f64 = 40.0;

/// Half extent of any other device kind.
pub const DEVICE_HALF_EXTENT: f64 = 50.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Distance from a link segment that still selects the link.
pub const LINK_HIT_PX: f64 = 10.0;

/// Slack added to an interface's anchor distance when testing the cursor.
pub const INTERFACE_HIT_SLACK_PX: f64 = 30.0;

/// Half size of the square around a group corner that arms a resize.
pub const CORNER_HIT_PX: f64 = 10.0;

/// Farthest a corner may be from the cursor and still be picked.
pub const CORNER_SELECT_PX: f64 = 30.0;

/// Width of the band around a group border that selects the group.
pub const GROUP_BORDER_PX: f64 = 10.0;

/// Groups narrower or shorter than this are discarded on creation.
pub const MIN_GROUP_SIZE: f64 = 10.0;

// ── Toolbox ─────────────────────────────────────────────────────

/// Vertical distance between toolbox items.
pub const TOOLBOX_SPACING: f64 = 100.0;

/// Height of the toolbox title strip above the first item.
pub const TOOLBOX_TITLE_HEIGHT: f64 = 50.0;

/// Width of a toolbox column.
pub const TOOLBOX_WIDTH: f64 = 150.0;

/// Default width of a pasted rack or site template.
pub const GROUP_TEMPLATE_WIDTH: f64 = 400.0;

/// Default height of a pasted rack or site template.
pub const GROUP_TEMPLATE_HEIGHT: f64 = 300.0;

//! Enclosure parameters.
//!
//! Everything the pipeline needs lives in one immutable [`EnclosureConfig`].
//! Only `pcb_dimensions` is mandatory; every other field has a default.
//! Configurations are usually loaded from TOML:
//!
//! ```toml
//! pcb_dimensions = [50, 30, 1.6]
//! wall_thickness = 2.0
//!
//! [[slots]]
//! side = "left"
//! corner1 = [5, 0]
//! corner2 = [10, 2]
//!
//! [[mount_posts]]
//! center = [4, 4]
//! diameter = 3
//! ```
//!
//! All feature positions are given in PCB coordinates: the PCB's lower-left
//! bottom corner is the origin and its top surface sits at
//! `z = pcb_dimensions.z`.

use crate::error::{CaseError, CaseResult};
use crate::geometry::Axis;
use nalgebra::{Vector2, Vector3};
use pcbcase_ir::{HAlign, VAlign};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One of the six enclosure faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Low X face.
    Left,
    /// High X face.
    Right,
    /// Low Y face.
    Front,
    /// High Y face.
    Rear,
    /// High Z face.
    Top,
    /// Low Z face.
    Bottom,
}

impl Side {
    /// All six sides.
    pub const ALL: [Side; 6] = [
        Side::Left,
        Side::Right,
        Side::Front,
        Side::Rear,
        Side::Top,
        Side::Bottom,
    ];

    /// The axis normal to this face.
    pub const fn through_axis(self) -> Axis {
        match self {
            Side::Left | Side::Right => Axis::X,
            Side::Front | Side::Rear => Axis::Y,
            Side::Top | Side::Bottom => Axis::Z,
        }
    }

    /// The two in-plane axes a slot rectangle on this face is expressed in.
    pub const fn plane_axes(self) -> [Axis; 2] {
        match self {
            Side::Left | Side::Right => [Axis::Y, Axis::Z],
            Side::Front | Side::Rear => [Axis::X, Axis::Z],
            Side::Top | Side::Bottom => [Axis::X, Axis::Y],
        }
    }

    /// True for the left, front and bottom faces.
    pub const fn is_low(self) -> bool {
        matches!(self, Side::Left | Side::Front | Side::Bottom)
    }

    /// True for the four vertical walls.
    pub const fn is_side_wall(self) -> bool {
        !matches!(self, Side::Top | Side::Bottom)
    }
}

/// Which solids a generation run emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportSelection {
    /// Top, bottom and text inserts.
    #[default]
    All,
    /// Top half only.
    Top,
    /// Bottom half only.
    Bottom,
    /// Text inserts only.
    Texts,
}

impl std::fmt::Display for ExportSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Top => write!(f, "top"),
            Self::Bottom => write!(f, "bottom"),
            Self::Texts => write!(f, "texts"),
        }
    }
}

impl std::str::FromStr for ExportSelection {
    type Err = CaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "texts" => Ok(Self::Texts),
            other => Err(CaseError::invalid(format!(
                "unknown export selection '{other}' (expected all, top, bottom or texts)"
            ))),
        }
    }
}

/// A rectangular wall opening.
///
/// The corners are in the face's plane axes (see [`Side::plane_axes`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Face the opening is cut through.
    pub side: Side,
    /// First corner of the rectangle.
    pub corner1: Vector2<f64>,
    /// Opposite corner of the rectangle.
    pub corner2: Vector2<f64>,
}

/// A stand-off through one of the PCB's mounting holes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MountPost {
    /// Hole center on the PCB.
    pub center: Vector2<f64>,
    /// Post diameter; must not exceed the PCB hole diameter.
    pub diameter: f64,
}

/// A volume where no post material may appear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MountPostRestriction {
    /// One corner.
    pub corner_a: Vector3<f64>,
    /// The opposite corner.
    pub corner_b: Vector3<f64>,
}

/// A press-through button over an on-board switch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Button {
    /// Switch center on the PCB.
    pub position: Vector2<f64>,
    /// Height of the released switch plunger above the PCB bottom.
    pub released_height: f64,
    /// Direction of the hinge tongue, degrees counter-clockwise from +X.
    #[serde(default)]
    pub rotation: f64,
}

/// Lettering recessed into the top face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDef {
    /// Text origin over the PCB.
    pub position: Vector2<f64>,
    /// The string.
    pub text: String,
    /// Font name handed to the text renderer (empty = renderer default).
    #[serde(default)]
    pub font: String,
    /// Nominal glyph size.
    #[serde(default = "defaults::text_size")]
    pub size: f64,
    /// Horizontal alignment.
    #[serde(default)]
    pub halign: HAlign,
    /// Vertical alignment.
    #[serde(default)]
    pub valign: VAlign,
    /// Rotation about the text origin, degrees.
    #[serde(default)]
    pub rotation: f64,
}

mod defaults {
    use nalgebra::Vector2;

    pub fn mount_posts_base_thickness_offset() -> f64 {
        1.0
    }
    pub fn pcb_offset() -> f64 {
        1.0
    }
    pub fn wall_thickness() -> f64 {
        2.0
    }
    pub fn tolerance() -> f64 {
        0.4
    }
    pub fn button_tolerance() -> f64 {
        0.2
    }
    pub fn outer_corner_radius() -> f64 {
        2.0
    }
    pub fn inner_corner_radius() -> f64 {
        1.0
    }
    pub fn lip_height() -> f64 {
        2.4
    }
    pub fn text_depth() -> f64 {
        0.4
    }
    pub fn button_diameter() -> f64 {
        10.0
    }
    pub fn button_hinge_dimensions() -> Vector2<f64> {
        Vector2::new(3.0, 2.0)
    }
    pub fn button_actuator_diameter() -> f64 {
        3.0
    }
    pub fn text_size() -> f64 {
        5.0
    }
    pub fn segments() -> u32 {
        48
    }
    pub fn assembled() -> bool {
        true
    }
    pub fn export_spacing() -> f64 {
        10.0
    }
}

/// All tunables and features of one enclosure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnclosureConfig {
    /// PCB footprint size and thickness.
    pub pcb_dimensions: Vector3<f64>,
    /// Corner points bounding the mounted components, in PCB coordinates.
    #[serde(default)]
    pub component_bounds: Vec<Vector3<f64>>,
    /// Wall openings.
    #[serde(default)]
    pub slots: Vec<Slot>,
    /// Mounting stand-offs.
    #[serde(default)]
    pub mount_posts: Vec<MountPost>,
    /// Keep-out volumes for post material.
    #[serde(default)]
    pub mount_post_restrictions: Vec<MountPostRestriction>,
    /// Press-through buttons.
    #[serde(default)]
    pub buttons: Vec<Button>,
    /// Top-face lettering.
    #[serde(default)]
    pub texts: Vec<TextDef>,

    /// Extra radius of the post bases beyond the post radius.
    #[serde(default = "defaults::mount_posts_base_thickness_offset")]
    pub mount_posts_base_thickness_offset: f64,
    /// Clearance between the board box and the inner wall, per side.
    #[serde(default = "defaults::pcb_offset")]
    pub pcb_offset: f64,
    /// Wall thickness.
    #[serde(default = "defaults::wall_thickness")]
    pub wall_thickness: f64,
    /// Fit clearance between mating parts.
    #[serde(default = "defaults::tolerance")]
    pub tolerance: f64,
    /// Gap around a button cap.
    #[serde(default = "defaults::button_tolerance")]
    pub button_tolerance: f64,
    /// Corner radius of the outer surface.
    #[serde(default = "defaults::outer_corner_radius")]
    pub outer_corner_radius: f64,
    /// Corner radius of the inner surface.
    #[serde(default = "defaults::inner_corner_radius")]
    pub inner_corner_radius: f64,
    /// Height of the interlocking lip.
    #[serde(default = "defaults::lip_height")]
    pub lip_height: f64,
    /// Depth of text recesses and inserts.
    #[serde(default = "defaults::text_depth")]
    pub text_depth: f64,
    /// Button cap diameter.
    #[serde(default = "defaults::button_diameter")]
    pub button_diameter: f64,
    /// Hinge tongue length and width.
    #[serde(default = "defaults::button_hinge_dimensions")]
    pub button_hinge_dimensions: Vector2<f64>,
    /// Diameter of the actuator pin under a button cap.
    #[serde(default = "defaults::button_actuator_diameter")]
    pub button_actuator_diameter: f64,

    /// Circle resolution handed to the mesher.
    #[serde(default = "defaults::segments")]
    pub segments: u32,
    /// Emit halves in assembled position instead of the print layout.
    #[serde(default = "defaults::assembled")]
    pub assembled: bool,
    /// Which solids to emit.
    #[serde(default)]
    pub export: ExportSelection,
    /// Gap between separated parts in the print layout.
    #[serde(default = "defaults::export_spacing")]
    pub export_spacing: f64,
}

impl EnclosureConfig {
    /// A configuration for a bare PCB with every other field defaulted.
    pub fn new(pcb_dimensions: Vector3<f64>) -> Self {
        Self {
            pcb_dimensions,
            component_bounds: Vec::new(),
            slots: Vec::new(),
            mount_posts: Vec::new(),
            mount_post_restrictions: Vec::new(),
            buttons: Vec::new(),
            texts: Vec::new(),
            mount_posts_base_thickness_offset: defaults::mount_posts_base_thickness_offset(),
            pcb_offset: defaults::pcb_offset(),
            wall_thickness: defaults::wall_thickness(),
            tolerance: defaults::tolerance(),
            button_tolerance: defaults::button_tolerance(),
            outer_corner_radius: defaults::outer_corner_radius(),
            inner_corner_radius: defaults::inner_corner_radius(),
            lip_height: defaults::lip_height(),
            text_depth: defaults::text_depth(),
            button_diameter: defaults::button_diameter(),
            button_hinge_dimensions: defaults::button_hinge_dimensions(),
            button_actuator_diameter: defaults::button_actuator_diameter(),
            segments: defaults::segments(),
            assembled: defaults::assembled(),
            export: ExportSelection::default(),
            export_spacing: defaults::export_spacing(),
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> CaseResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> CaseResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject clearly nonsensical parameters.
    ///
    /// Checks that need the resolved outer dimensions (corner radii) live in
    /// [`EnclosureConfig::validate_against`].
    pub fn validate(&self) -> CaseResult<()> {
        if self.pcb_dimensions.iter().any(|&d| !(d > 0.0)) {
            return Err(CaseError::invalid(format!(
                "pcb_dimensions must be positive, got [{}, {}, {}]",
                self.pcb_dimensions.x, self.pcb_dimensions.y, self.pcb_dimensions.z
            )));
        }
        for (name, value) in [
            ("wall_thickness", self.wall_thickness),
            ("tolerance", self.tolerance),
            ("button_tolerance", self.button_tolerance),
        ] {
            if value < 0.0 {
                return Err(CaseError::invalid(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }
        if !self.buttons.is_empty() && self.button_actuator_diameter >= self.button_diameter {
            return Err(CaseError::invalid(format!(
                "button_actuator_diameter ({}) must be smaller than button_diameter ({})",
                self.button_actuator_diameter, self.button_diameter
            )));
        }
        Ok(())
    }

    /// Reject corner radii that do not fit the resolved outer dimensions.
    pub fn validate_against(&self, outer_dim: &Vector3<f64>) -> CaseResult<()> {
        let half = outer_dim.min() / 2.0;
        for (name, radius) in [
            ("outer_corner_radius", self.outer_corner_radius),
            ("inner_corner_radius", self.inner_corner_radius),
        ] {
            if radius >= half {
                return Err(CaseError::invalid(format!(
                    "{name} ({radius}) must be smaller than half the smallest outer dimension ({half})"
                )));
            }
        }
        Ok(())
    }
}

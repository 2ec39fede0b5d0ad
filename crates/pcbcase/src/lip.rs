//! Split plane, interlocking lip and snap tabs.
//!
//! The Bottom half carries a thin vertical rim (the lip) standing on the
//! inner half of its wall, with one triangular snap tab per side. The Top
//! half has the matching cavity cut into the inner half of its wall, plus a
//! groove per tab. The radial gap between lip and cavity is exactly
//! `tolerance`.

use crate::config::{EnclosureConfig, Side};
use crate::geometry::EPSILON;
use crate::layout::LayoutFrame;
use crate::shell::rounded_rect;
use crate::Part;
use nalgebra::Vector2;
use tracing::{debug, warn};

/// Sides that carry a snap tab.
pub const TAB_SIDES: [Side; 4] = [Side::Right, Side::Rear, Side::Left, Side::Front];

/// Resolved lip dimensions, all in enclosure-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LipProfile {
    /// Distance from the inner wall surface to the lip's outer face.
    pub lip_offset: f64,
    /// Distance from the inner wall surface to the Top cavity's face.
    pub cavity_offset: f64,
    /// Height of the split plane.
    pub split_z: f64,
    /// Height of the lip's upper edge.
    pub lip_top_z: f64,
    /// Height of the cavity's ceiling.
    pub cavity_top_z: f64,
    /// How far a snap tab projects from the lip face.
    pub tab_depth: f64,
    /// Vertical extent of a snap tab.
    pub tab_height: f64,
}

impl LipProfile {
    /// Compute the profile for `config`.
    pub fn new(frame: &LayoutFrame, config: &EnclosureConfig) -> Self {
        let wall = config.wall_thickness;
        let tol = config.tolerance;
        let split_z = frame.split_z();
        let lip_top_z = split_z + config.lip_height;
        Self {
            lip_offset: wall / 2.0 - tol / 2.0,
            cavity_offset: wall / 2.0 + tol / 2.0,
            split_z,
            lip_top_z,
            cavity_top_z: lip_top_z + tol / 2.0,
            tab_depth: wall / 4.0,
            tab_height: config.lip_height / 2.0,
        }
    }

    /// Radial gap between the lip and the cavity.
    pub fn clearance(&self) -> f64 {
        self.cavity_offset - self.lip_offset
    }
}

/// The inner wall outline in local XY.
fn inner_outline(frame: &LayoutFrame, config: &EnclosureConfig) -> Part {
    let wall = config.wall_thickness;
    rounded_rect(
        "inner-outline",
        frame.inner_dim.xy(),
        config.inner_corner_radius,
    )
    .translate(wall, wall, 0.0)
}

/// Length of the tab on `side`, or `None` if the side is too short for one.
fn tab_length(frame: &LayoutFrame, config: &EnclosureConfig, side: Side) -> Option<f64> {
    let run = match side {
        Side::Left | Side::Right => frame.inner_dim.y,
        _ => frame.inner_dim.x,
    };
    let length = run - 4.0 * config.inner_corner_radius;
    if length > 0.0 {
        Some(length)
    } else {
        warn!(?side, length, "side too short for a snap tab, skipping");
        None
    }
}

/// A wedge of `length` pointing along +X with its base in the YZ plane at
/// `x = 0`, centered on Y, spanning `z` in `[0, height]`.
fn wedge(name: &str, depth: f64, height: f64, length: f64) -> Part {
    let profile = Part::polygon(
        name,
        &[
            Vector2::new(-EPSILON, 0.0),
            Vector2::new(depth, height / 2.0),
            Vector2::new(-EPSILON, height),
        ],
    );
    profile
        .linear_extrude(length)
        .translate(0.0, 0.0, -length / 2.0)
        .rotate(90.0, 0.0, 0.0)
}

/// Turn a +X-facing wedge to face out of `side` and move its base onto the
/// plane `inset` inside the outer surface, centered along the side.
fn place_on_side(part: &Part, frame: &LayoutFrame, side: Side, inset: f64, z: f64) -> Part {
    let outer = frame.outer_dim;
    let (angle, x, y) = match side {
        Side::Right => (0.0, outer.x - inset, outer.y / 2.0),
        Side::Rear => (90.0, outer.x / 2.0, outer.y - inset),
        Side::Left => (180.0, inset, outer.y / 2.0),
        _ => (270.0, outer.x / 2.0, inset),
    };
    part.rotate(0.0, 0.0, angle).translate(x, y, z)
}

/// The Bottom half's lip with its snap tabs.
pub fn lip(frame: &LayoutFrame, config: &EnclosureConfig) -> Part {
    let profile = LipProfile::new(frame, config);
    debug!(?profile, "lip profile");

    let inner = inner_outline(frame, config);
    let ring = inner.offset_radius(profile.lip_offset) - inner;
    let rim = ring
        .linear_extrude(config.lip_height + EPSILON)
        .translate(0.0, 0.0, profile.split_z - EPSILON);

    let face_inset = config.wall_thickness - profile.lip_offset;
    let tabs = TAB_SIDES.iter().filter_map(|&side| {
        let length = tab_length(frame, config, side)?;
        let tab = wedge("snap-tab", profile.tab_depth, profile.tab_height, length);
        Some(place_on_side(
            &tab,
            frame,
            side,
            face_inset,
            profile.lip_top_z - profile.tab_height,
        ))
    });

    Part::union_all("lip", std::iter::once(rim).chain(tabs))
}

/// The volume removed from the Top half to receive the lip and its tabs.
pub fn lip_cavity(frame: &LayoutFrame, config: &EnclosureConfig) -> Part {
    let profile = LipProfile::new(frame, config);
    let tol = config.tolerance;

    let bottom = profile.split_z - EPSILON;
    let pocket = inner_outline(frame, config)
        .offset_radius(profile.cavity_offset)
        .linear_extrude(profile.cavity_top_z - bottom)
        .translate(0.0, 0.0, bottom);

    let face_inset = config.wall_thickness - profile.cavity_offset;
    let grooves = TAB_SIDES.iter().filter_map(|&side| {
        let length = tab_length(frame, config, side)? + 2.0 * tol;
        let groove = wedge(
            "snap-groove",
            profile.tab_depth,
            profile.tab_height + tol,
            length,
        );
        Some(place_on_side(
            &groove,
            frame,
            side,
            face_inset,
            profile.lip_top_z - profile.tab_height - tol / 2.0,
        ))
    });

    Part::union_all("lip-cavity", std::iter::once(pocket).chain(grooves))
}

//! Hinged press-through buttons.
//!
//! A button is a round cap cut free from the Top's ceiling except for a
//! tongue (the hinge) on one side, with an actuator pin underneath that
//! reaches down to the switch on the PCB. The tongue points along the
//! button's rotation; a shallow groove across its root lets it flex.

use crate::config::{Button, EnclosureConfig};
use crate::geometry::EPSILON;
use crate::layout::LayoutFrame;
use crate::Part;
use tracing::{debug, warn};

/// Cutters and actuators of all buttons.
#[derive(Debug, Clone)]
pub struct ButtonParts {
    /// Added to the Top half.
    pub actuators: Vec<Part>,
    /// Subtracted from the Top half.
    pub cutouts: Vec<Part>,
}

/// Distance from the actuator axis to the cap center, along the hinge.
pub fn cap_offset(config: &EnclosureConfig) -> f64 {
    (config.button_diameter - config.button_actuator_diameter) / 2.0 - config.button_tolerance
}

/// The cap outline (circle plus tongue) centered on the origin, tongue
/// pointing along +X.
fn cap_outline(config: &EnclosureConfig) -> Part {
    let r = config.button_diameter / 2.0;
    let hinge = config.button_hinge_dimensions;
    let circle = Part::circle("button-cap", r, config.segments);
    let tongue = Part::square("button-tongue", r + hinge.x, hinge.y).translate(0.0, -hinge.y / 2.0, 0.0);
    circle + tongue
}

/// The separating gap around the cap in the button's own frame: the cap
/// outline grown by the button tolerance minus the outline, open at the
/// tongue's root, extruded through the ceiling, plus the hinge groove.
fn cap_cutter(frame: &LayoutFrame, config: &EnclosureConfig, i: usize) -> Part {
    let r = config.button_diameter / 2.0;
    let hinge = config.button_hinge_dimensions;
    let bt = config.button_tolerance;
    let wall = config.wall_thickness;

    let outline = cap_outline(config);
    let ring = outline.offset_radius(bt) - outline;

    let half_width = r.max(hinge.y / 2.0) + bt + 1.0;
    let x_min = -(r + bt + 1.0);
    let x_max = r + hinge.x;
    let keep = Part::square(format!("button{i}-keep"), x_max - x_min, 2.0 * half_width)
        .translate(x_min, -half_width, 0.0);

    let gap = (ring & keep)
        .linear_extrude(wall + 2.0 * EPSILON)
        .translate(0.0, 0.0, frame.inner_top_z() - EPSILON);

    let groove = Part::cylinder(format!("button{i}-hinge"), wall / 2.0, hinge.y, config.segments)
        .translate(0.0, 0.0, -hinge.y / 2.0)
        .rotate(90.0, 0.0, 0.0)
        .translate(x_max, 0.0, frame.outer_dim.z);

    gap + groove
}

fn actuator(frame: &LayoutFrame, config: &EnclosureConfig, button: &Button, i: usize) -> Option<Part> {
    let c = frame.to_local_xy(button.position);
    let start = frame.pcb_loc.z + button.released_height;
    let top = frame.inner_top_z() + EPSILON;
    if top <= start {
        warn!(index = i, start, "button released height is above the ceiling, no actuator");
        return None;
    }
    Some(
        Part::cylinder(
            format!("button{i}-actuator"),
            config.button_actuator_diameter / 2.0,
            top - start,
            config.segments,
        )
        .translate(c.x, c.y, start),
    )
}

/// Build actuators and cutters for every button in `config`.
pub fn buttons(frame: &LayoutFrame, config: &EnclosureConfig) -> ButtonParts {
    let offset = cap_offset(config);
    let mut parts = ButtonParts {
        actuators: Vec::new(),
        cutouts: Vec::new(),
    };
    for (i, button) in config.buttons.iter().enumerate() {
        let c = frame.to_local_xy(button.position);
        debug!(index = i, x = c.x, y = c.y, rotation = button.rotation, "button");
        parts.actuators.extend(actuator(frame, config, button, i));
        parts.cutouts.push(
            cap_cutter(frame, config, i)
                .translate(offset, 0.0, 0.0)
                .rotate(0.0, 0.0, button.rotation)
                .translate(c.x, c.y, 0.0),
        );
    }
    parts
}

//! Inlaid lettering on the top face.
//!
//! Each text entry produces a recess in the Top half and a loose insert of
//! the same glyphs that is printed separately (typically in a contrasting
//! color) and pressed into the recess.

use crate::config::{EnclosureConfig, TextDef};
use crate::geometry::EPSILON;
use crate::layout::LayoutFrame;
use crate::Part;
use tracing::debug;

/// Recesses and inserts of all text entries.
#[derive(Debug, Clone)]
pub struct TextParts {
    /// Subtracted from the Top half.
    pub recesses: Vec<Part>,
    /// Separate solids fitting the recesses, in assembled position.
    pub inserts: Vec<Part>,
}

fn glyphs(def: &TextDef, i: usize) -> Part {
    Part::text(
        format!("text{i}"),
        &def.text,
        &def.font,
        def.size,
        def.halign,
        def.valign,
    )
}

/// Rotate about the text origin and drop onto the top face, sunk by the
/// text depth.
fn place(part: Part, frame: &LayoutFrame, config: &EnclosureConfig, def: &TextDef) -> Part {
    let c = frame.to_local_xy(def.position);
    part.rotate(0.0, 0.0, def.rotation)
        .translate(c.x, c.y, frame.outer_dim.z - config.text_depth)
}

/// Build recesses and inserts for every text entry in `config`.
pub fn texts(frame: &LayoutFrame, config: &EnclosureConfig) -> TextParts {
    let depth = config.text_depth;
    let mut parts = TextParts {
        recesses: Vec::new(),
        inserts: Vec::new(),
    };
    for (i, def) in config.texts.iter().enumerate() {
        debug!(index = i, text = %def.text, "text");
        let recess = glyphs(def, i)
            .offset_radius(config.tolerance / 2.0)
            .linear_extrude(depth + EPSILON);
        let insert = glyphs(def, i).linear_extrude(depth);
        parts.recesses.push(place(recess, frame, config, def));
        parts.inserts.push(place(insert, frame, config, def));
    }
    parts
}

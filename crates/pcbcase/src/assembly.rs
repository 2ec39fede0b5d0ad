//! Assembly of the two halves and the output scene.

use crate::buttons::buttons;
use crate::config::{EnclosureConfig, ExportSelection};
use crate::error::CaseResult;
use crate::geometry::{BoundingBox, EPSILON};
use crate::layout::LayoutFrame;
use crate::lip::{lip, lip_cavity};
use crate::posts::mount_posts;
use crate::shell::shell;
use crate::slots::slot_cuts;
use crate::text::texts;
use crate::{Part, Scene};
use nalgebra::Vector3;
use pcbcase_ir::{Document, MaterialDef};
use tracing::{info, warn};

/// Material key of both enclosure halves.
pub const SHELL_MATERIAL: &str = "shell";
/// Material key of the text inserts.
pub const TEXT_MATERIAL: &str = "text";

/// A fully built enclosure in assembled position.
#[derive(Debug, Clone)]
pub struct Enclosure {
    /// The resolved frame every part was built in.
    pub layout: LayoutFrame,
    /// Upper half: ceiling, lip cavity, buttons, lettering recesses.
    pub top: Part,
    /// Lower half: floor, lip with snap tabs, post bases.
    pub bottom: Part,
    /// Union of all text inserts (empty when there is no text).
    pub text_inserts: Part,
    config: EnclosureConfig,
}

/// The region above the split plane, padded so it never shares a face
/// with the shell.
fn top_half_volume(frame: &LayoutFrame) -> Part {
    let o = frame.outer_dim;
    let bb = BoundingBox::from_corners(
        Vector3::new(-EPSILON, -EPSILON, frame.split_z()),
        Vector3::new(o.x + EPSILON, o.y + EPSILON, o.z + EPSILON),
    );
    Part::from_box("top-half", &bb)
}

/// The region below the split plane.
fn bottom_half_volume(frame: &LayoutFrame) -> Part {
    let o = frame.outer_dim;
    let bb = BoundingBox::from_corners(
        Vector3::new(-EPSILON, -EPSILON, -EPSILON),
        Vector3::new(o.x + EPSILON, o.y + EPSILON, frame.split_z()),
    );
    Part::from_box("bottom-half", &bb)
}

impl Enclosure {
    /// Validate `config`, resolve its layout and build every part.
    pub fn build(config: &EnclosureConfig) -> CaseResult<Self> {
        config.validate()?;
        let frame = LayoutFrame::resolve(config);
        config.validate_against(&frame.outer_dim)?;

        info!(
            outer = ?frame.outer_dim.as_slice(),
            slots = config.slots.len(),
            posts = config.mount_posts.len(),
            buttons = config.buttons.len(),
            texts = config.texts.len(),
            "building enclosure"
        );

        let shell = shell(&frame, config);
        let slots = slot_cuts(&frame, config);
        let posts = mount_posts(&frame, config);
        let buttons = buttons(&frame, config);
        let texts = texts(&frame, config);

        let top_cutters: Vec<Part> = std::iter::once(lip_cavity(&frame, config))
            .chain(slots.top_cutouts)
            .chain(texts.recesses)
            .chain(buttons.cutouts)
            .collect();
        let top_shell = (&shell & &top_half_volume(&frame)).difference_all(&top_cutters);
        let top = Part::union_all(
            "top",
            std::iter::once(top_shell)
                .chain(slots.top_fills)
                .chain(std::iter::once(posts.top))
                .chain(buttons.actuators),
        );

        let bottom_shell = (&shell & &bottom_half_volume(&frame)) + lip(&frame, config);
        let bottom = Part::union_all(
            "bottom",
            [bottom_shell.difference_all(&slots.bottom_cutouts), posts.bottom],
        );

        let text_inserts = Part::union_all("text-inserts", texts.inserts);

        Ok(Self {
            layout: frame,
            top,
            bottom,
            text_inserts,
            config: config.clone(),
        })
    }

    /// Arrange the parts selected by the configuration's `export` field,
    /// either assembled or laid out for printing.
    pub fn scene(&self) -> Scene {
        self.scene_for(self.config.export, self.config.assembled)
    }

    /// Arrange the parts for an explicit selection and layout.
    ///
    /// The print layout keeps the Bottom in place, flips the Top onto its
    /// outer face beside it and lays the text inserts flat in front.
    pub fn scene_for(&self, export: ExportSelection, assembled: bool) -> Scene {
        let o = self.layout.outer_dim;
        let gap = self.config.export_spacing;

        let mut scene = Scene::new("enclosure");
        let wants = |what: ExportSelection| export == ExportSelection::All || export == what;

        if wants(ExportSelection::Top) {
            let part = if assembled {
                self.top.clone()
            } else {
                self.top.rotate(180.0, 0.0, 0.0).translate(o.x + gap, o.y, o.z)
            };
            scene.add(part, SHELL_MATERIAL);
        }
        if wants(ExportSelection::Bottom) {
            scene.add(self.bottom.clone(), SHELL_MATERIAL);
        }
        if wants(ExportSelection::Texts) {
            if self.text_inserts.is_empty() {
                if export == ExportSelection::Texts {
                    warn!("text export requested but no texts are configured");
                }
            } else {
                let part = if assembled {
                    self.text_inserts.clone()
                } else {
                    self.text_inserts
                        .translate(0.0, -(o.y + gap), -(o.z - self.config.text_depth))
                };
                scene.add(part, TEXT_MATERIAL);
            }
        }

        let used = |key: &str| scene.nodes.iter().any(|n| n.material_key == key);
        let materials: Vec<MaterialDef> = [
            (SHELL_MATERIAL, [0.85, 0.85, 0.82]),
            (TEXT_MATERIAL, [0.1, 0.1, 0.1]),
        ]
        .into_iter()
        .filter(|(key, _)| used(*key))
        .map(|(key, color)| MaterialDef {
            name: key.to_string(),
            color,
            alpha: 1.0,
        })
        .collect();
        for m in materials {
            scene.add_material(m);
        }
        scene
    }

    /// The canonical document of [`Enclosure::scene`].
    pub fn to_document(&self) -> CaseResult<Document> {
        Ok(self.scene().to_canonical_document()?)
    }
}

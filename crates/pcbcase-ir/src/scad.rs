//! OpenSCAD source emission.
//!
//! Turns every scene entry of a [`Document`] into a block of OpenSCAD
//! statements so the tree can be meshed and exported by OpenSCAD itself.
//!
//! ```text
//! // top (material: shell)
//! color([0.9, 0.9, 0.9, 1])
//!   difference() {
//!     cube([56, 36, 7.6]);
//!     ...
//!   }
//! ```

use crate::{CsgOp, Document, IrError, NodeId, OffsetAmount, Vec3};
use std::collections::HashSet;
use std::fmt::Write as FmtWrite;

const INDENT: &str = "  ";

/// Emit OpenSCAD source for all scene entries of `doc`.
///
/// Shared subtrees are written out once per use; OpenSCAD has no notion of
/// node references.
pub fn to_scad(doc: &Document) -> Result<String, IrError> {
    let mut output = String::new();
    writeln!(output, "// pcbcase {}", doc.version)?;

    for entry in &doc.roots {
        let root = doc
            .nodes
            .get(&entry.root)
            .ok_or(IrError::MissingRoot(entry.root))?;
        writeln!(output)?;
        writeln!(
            output,
            "// {} (material: {})",
            root.name.as_deref().unwrap_or("unnamed"),
            entry.material
        )?;

        let mut depth = 0;
        if let Some(mat) = doc.materials.get(&entry.material) {
            writeln!(
                output,
                "color([{}, {}, {}, {}])",
                mat.color[0], mat.color[1], mat.color[2], mat.alpha
            )?;
            depth = 1;
        }
        let mut in_progress = HashSet::new();
        write_node(doc, entry.root, entry.root, depth, &mut in_progress, &mut output)?;
    }

    Ok(output)
}

fn write_node(
    doc: &Document,
    id: NodeId,
    parent: NodeId,
    depth: usize,
    in_progress: &mut HashSet<NodeId>,
    out: &mut String,
) -> Result<(), IrError> {
    let node = doc.node(parent, id)?;
    if !in_progress.insert(id) {
        return Err(IrError::Cycle(id));
    }
    let pad = INDENT.repeat(depth);

    match &node.op {
        CsgOp::Cube { size } => writeln!(out, "{pad}cube({});", vec3(size))?,
        CsgOp::Cylinder {
            radius,
            height,
            segments,
        } => writeln!(
            out,
            "{pad}cylinder(h = {height}, r = {radius}{});",
            fn_suffix(*segments)
        )?,
        CsgOp::Sphere { radius, segments } => {
            writeln!(out, "{pad}sphere(r = {radius}{});", fn_suffix(*segments))?
        }
        CsgOp::Square { size } => writeln!(out, "{pad}square([{}, {}]);", size.x, size.y)?,
        CsgOp::Circle { radius, segments } => {
            writeln!(out, "{pad}circle(r = {radius}{});", fn_suffix(*segments))?
        }
        CsgOp::Polygon { points } => {
            let pts: Vec<String> = points.iter().map(|p| format!("[{}, {}]", p.x, p.y)).collect();
            writeln!(out, "{pad}polygon([{}]);", pts.join(", "))?
        }
        CsgOp::Text {
            text,
            font,
            size,
            halign,
            valign,
        } => {
            write!(out, "{pad}text({}, size = {size}", quoted(text))?;
            if !font.is_empty() {
                write!(out, ", font = {}", quoted(font))?;
            }
            let halign = serde_json::to_string(halign)?;
            let valign = serde_json::to_string(valign)?;
            writeln!(out, ", halign = {halign}, valign = {valign});")?
        }
        CsgOp::Empty => writeln!(out, "{pad}union() {{}}")?,
        CsgOp::Union { .. } => write_block(doc, id, "union()", node, depth, in_progress, out)?,
        CsgOp::Difference { .. } => {
            write_block(doc, id, "difference()", node, depth, in_progress, out)?
        }
        CsgOp::Intersection { .. } => {
            write_block(doc, id, "intersection()", node, depth, in_progress, out)?
        }
        CsgOp::Hull { .. } => write_block(doc, id, "hull()", node, depth, in_progress, out)?,
        CsgOp::Translate { offset, .. } => {
            let head = format!("translate({})", vec3(offset));
            write_block(doc, id, &head, node, depth, in_progress, out)?
        }
        CsgOp::Rotate { angles, .. } => {
            let head = format!("rotate({})", vec3(angles));
            write_block(doc, id, &head, node, depth, in_progress, out)?
        }
        CsgOp::Scale { factor, .. } => {
            let head = format!("scale({})", vec3(factor));
            write_block(doc, id, &head, node, depth, in_progress, out)?
        }
        CsgOp::Mirror { normal, .. } => {
            let head = format!("mirror({})", vec3(normal));
            write_block(doc, id, &head, node, depth, in_progress, out)?
        }
        CsgOp::LinearExtrude { height, center, .. } => {
            let head = format!("linear_extrude(height = {height}, center = {center})");
            write_block(doc, id, &head, node, depth, in_progress, out)?
        }
        CsgOp::Offset { amount, .. } => {
            let head = match amount {
                OffsetAmount::Radius(r) => format!("offset(r = {r})"),
                OffsetAmount::Delta(d) => format!("offset(delta = {d})"),
            };
            write_block(doc, id, &head, node, depth, in_progress, out)?
        }
    }

    in_progress.remove(&id);
    Ok(())
}

/// Write `head { children }`.
fn write_block(
    doc: &Document,
    id: NodeId,
    head: &str,
    node: &crate::Node,
    depth: usize,
    in_progress: &mut HashSet<NodeId>,
    out: &mut String,
) -> Result<(), IrError> {
    let pad = INDENT.repeat(depth);
    writeln!(out, "{pad}{head} {{")?;
    for child in node.op.children() {
        write_node(doc, child, id, depth + 1, in_progress, out)?;
    }
    writeln!(out, "{pad}}}")?;
    Ok(())
}

fn vec3(v: &Vec3) -> String {
    format!("[{}, {}, {}]", v.x, v.y, v.z)
}

fn fn_suffix(segments: u32) -> String {
    if segments == 0 {
        String::new()
    } else {
        format!(", $fn = {segments}")
    }
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MaterialDef, Node, SceneEntry, Vec2};

    fn doc_with(nodes: Vec<(NodeId, CsgOp)>, root: NodeId) -> Document {
        let mut doc = Document::new();
        for (id, op) in nodes {
            doc.nodes.insert(
                id,
                Node {
                    id,
                    name: Some(format!("n{id}")),
                    op,
                },
            );
        }
        doc.roots.push(SceneEntry {
            root,
            material: "default".to_string(),
        });
        doc
    }

    #[test]
    fn plate_with_hole() {
        let doc = doc_with(
            vec![
                (
                    1,
                    CsgOp::Cube {
                        size: Vec3::new(50.0, 30.0, 5.0),
                    },
                ),
                (
                    2,
                    CsgOp::Cylinder {
                        radius: 2.5,
                        height: 10.0,
                        segments: 24,
                    },
                ),
                (
                    3,
                    CsgOp::Translate {
                        child: 2,
                        offset: Vec3::new(25.0, 15.0, -1.0),
                    },
                ),
                (4, CsgOp::Difference { left: 1, right: 3 }),
            ],
            4,
        );
        let scad = to_scad(&doc).unwrap();
        assert_eq!(
            scad,
            "// pcbcase 0.1

// n4 (material: default)
difference() {
  cube([50, 30, 5]);
  translate([25, 15, -1]) {
    cylinder(h = 10, r = 2.5, $fn = 24);
  }
}
"
        );
    }

    #[test]
    fn material_wraps_root_in_color() {
        let mut doc = doc_with(vec![(1, CsgOp::Sphere { radius: 1.0, segments: 0 })], 1);
        doc.roots[0].material = "text".to_string();
        doc.materials.insert(
            "text".to_string(),
            MaterialDef {
                name: "text".to_string(),
                color: [0.1, 0.2, 0.3],
                alpha: 0.5,
            },
        );
        let scad = to_scad(&doc).unwrap();
        assert!(scad.contains("color([0.1, 0.2, 0.3, 0.5])\n  sphere(r = 1);"));
    }

    #[test]
    fn text_and_offset() {
        let doc = doc_with(
            vec![
                (
                    1,
                    CsgOp::Text {
                        text: "say \"hi\"".to_string(),
                        font: "Liberation Sans:style=Bold".to_string(),
                        size: 5.0,
                        halign: crate::HAlign::Center,
                        valign: crate::VAlign::Baseline,
                    },
                ),
                (
                    2,
                    CsgOp::Offset {
                        child: 1,
                        amount: OffsetAmount::Delta(0.2),
                    },
                ),
                (
                    3,
                    CsgOp::LinearExtrude {
                        child: 2,
                        height: 0.4,
                        center: false,
                    },
                ),
            ],
            3,
        );
        let scad = to_scad(&doc).unwrap();
        assert!(scad.contains("linear_extrude(height = 0.4, center = false) {"));
        assert!(scad.contains("offset(delta = 0.2) {"));
        assert!(scad.contains(
            r#"text("say \"hi\"", size = 5, font = "Liberation Sans:style=Bold", halign = "center", valign = "baseline");"#
        ));
    }

    #[test]
    fn polygon_points() {
        let doc = doc_with(
            vec![(
                1,
                CsgOp::Polygon {
                    points: vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.5), Vec2::new(0.0, 1.0)],
                },
            )],
            1,
        );
        let scad = to_scad(&doc).unwrap();
        assert!(scad.contains("polygon([[0, 0], [1, 0.5], [0, 1]]);"));
    }

    #[test]
    fn dangling_child_is_an_error() {
        let doc = doc_with(vec![(1, CsgOp::Hull { children: vec![1, 9] })], 1);
        assert!(to_scad(&doc).is_err());
    }
}

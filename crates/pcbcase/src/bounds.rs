//! Conservative axis-aligned bounds of an IR subtree.
//!
//! Used by tests and diagnostics to reason about generated geometry without
//! meshing it. Differences keep the bounds of their left operand and text has
//! no known extent, so the result is an upper bound of the real solid.

use crate::geometry::{bounding_box_of, merge_boxes, BoundingBox};
use nalgebra::{Rotation3, Vector3};
use pcbcase_ir::{CsgOp, Node, NodeId, OffsetAmount};
use std::collections::HashMap;

pub(crate) fn node_bounds(nodes: &HashMap<NodeId, Node>, id: NodeId) -> Option<BoundingBox> {
    let node = nodes.get(&id)?;
    let child = |c: NodeId| node_bounds(nodes, c);

    match &node.op {
        CsgOp::Cube { size } => Some(BoundingBox::new(
            Vector3::zeros(),
            Vector3::new(size.x, size.y, size.z),
        )),
        CsgOp::Cylinder { radius, height, .. } => Some(BoundingBox::from_corners(
            Vector3::new(-radius, -radius, 0.0),
            Vector3::new(*radius, *radius, *height),
        )),
        CsgOp::Sphere { radius, .. } => Some(BoundingBox::from_corners(
            Vector3::repeat(-radius),
            Vector3::repeat(*radius),
        )),
        CsgOp::Square { size } => Some(BoundingBox::new(
            Vector3::zeros(),
            Vector3::new(size.x, size.y, 0.0),
        )),
        CsgOp::Circle { radius, .. } => Some(BoundingBox::from_corners(
            Vector3::new(-radius, -radius, 0.0),
            Vector3::new(*radius, *radius, 0.0),
        )),
        CsgOp::Polygon { points } => {
            if points.is_empty() {
                return None;
            }
            let pts: Vec<Vector3<f64>> = points.iter().map(|p| Vector3::new(p.x, p.y, 0.0)).collect();
            Some(bounding_box_of(&pts))
        }
        CsgOp::Text { .. } | CsgOp::Empty => None,

        CsgOp::Union { left, right } => merge_known([child(*left), child(*right)]),
        CsgOp::Hull { children } => merge_known(children.iter().map(|&c| child(c))),
        CsgOp::Difference { left, .. } => child(*left),
        CsgOp::Intersection { left, right } => match (child(*left), child(*right)) {
            (Some(a), Some(b)) => a.intersection(&b),
            (a, b) => a.or(b),
        },

        CsgOp::Translate { child: c, offset } => {
            child(*c).map(|b| b.translated(Vector3::new(offset.x, offset.y, offset.z)))
        }
        CsgOp::Rotate { child: c, angles } => {
            let rot = Rotation3::from_euler_angles(
                angles.x.to_radians(),
                angles.y.to_radians(),
                angles.z.to_radians(),
            );
            child(*c).map(|b| map_corners(&b, |p| rot * p))
        }
        CsgOp::Scale { child: c, factor } => {
            let f = Vector3::new(factor.x, factor.y, factor.z);
            child(*c).map(|b| map_corners(&b, |p| p.component_mul(&f)))
        }
        CsgOp::Mirror { child: c, normal } => {
            let n = Vector3::new(normal.x, normal.y, normal.z);
            let len2 = n.norm_squared();
            child(*c).map(|b| {
                if len2 == 0.0 {
                    b
                } else {
                    map_corners(&b, |p| p - n * (2.0 * p.dot(&n) / len2))
                }
            })
        }

        CsgOp::LinearExtrude {
            child: c,
            height,
            center,
        } => child(*c).map(|b| {
            let z0 = if *center { -height / 2.0 } else { 0.0 };
            BoundingBox::new(
                Vector3::new(b.origin.x, b.origin.y, z0),
                Vector3::new(b.size.x, b.size.y, *height),
            )
        }),
        CsgOp::Offset { child: c, amount } => {
            let d = match amount {
                OffsetAmount::Radius(r) => *r,
                OffsetAmount::Delta(d) => *d,
            };
            child(*c).map(|b| {
                BoundingBox::new(
                    b.origin - Vector3::new(d, d, 0.0),
                    b.size + Vector3::new(2.0 * d, 2.0 * d, 0.0),
                )
            })
        }
    }
}

fn merge_known(boxes: impl IntoIterator<Item = Option<BoundingBox>>) -> Option<BoundingBox> {
    let known: Vec<BoundingBox> = boxes.into_iter().flatten().collect();
    (!known.is_empty()).then(|| merge_boxes(&known))
}

fn map_corners(b: &BoundingBox, f: impl Fn(Vector3<f64>) -> Vector3<f64>) -> BoundingBox {
    let pts: Vec<Vector3<f64>> = b.corners().into_iter().map(f).collect();
    bounding_box_of(&pts)
}

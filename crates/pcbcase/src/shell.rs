//! Rounded hollow shell.

use crate::config::EnclosureConfig;
use crate::layout::LayoutFrame;
use crate::Part;
use nalgebra::{Vector2, Vector3};

/// A box of `size` with its minimum corner at the origin and every edge and
/// corner filleted with `radius`.
///
/// Built as the convex hull of eight spheres placed at the corners of the
/// box inset by `radius`. A non-positive radius gives a sharp cube.
pub fn rounded_box(name: &str, size: Vector3<f64>, radius: f64, segments: u32) -> Part {
    if radius <= 0.0 {
        return Part::cube(name, size.x, size.y, size.z);
    }
    let xs = [radius, size.x - radius];
    let ys = [radius, size.y - radius];
    let zs = [radius, size.z - radius];

    let mut spheres = Vec::with_capacity(8);
    for x in xs {
        for y in ys {
            for z in zs {
                spheres.push(
                    Part::sphere(format!("{name}-corner"), radius, segments).translate(x, y, z),
                );
            }
        }
    }
    Part::hull(name, &spheres)
}

/// A 2D rectangle of `size` with its minimum corner at the origin and corners
/// rounded with `radius`.
pub fn rounded_rect(name: &str, size: Vector2<f64>, radius: f64) -> Part {
    if radius <= 0.0 {
        return Part::square(name, size.x, size.y);
    }
    Part::square(name, size.x - 2.0 * radius, size.y - 2.0 * radius)
        .translate(radius, radius, 0.0)
        .offset_radius(radius)
}

/// The hollow shell: outer rounded box minus the inner cavity.
pub fn shell(frame: &LayoutFrame, config: &EnclosureConfig) -> Part {
    let wall = config.wall_thickness;
    let outer = rounded_box(
        "shell-outer",
        frame.outer_dim,
        config.outer_corner_radius,
        config.segments,
    );
    let inner = rounded_box(
        "shell-inner",
        frame.inner_dim,
        config.inner_corner_radius,
        config.segments,
    )
    .translate(wall, wall, wall);

    (outer - inner).named("shell")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pcbcase_ir::{CsgOp, OffsetAmount};

    #[test]
    fn test_rounded_box_hulls_eight_spheres() {
        let part = rounded_box("rb", Vector3::new(5.0, 3.0, 4.0), 1.0, 32);
        match part.root_op() {
            CsgOp::Hull { children } => assert_eq!(children.len(), 8),
            other => panic!("expected Hull, got {other:?}"),
        }
        let spheres = part
            .nodes_named("rb-corner")
            .filter(|n| matches!(n.op, CsgOp::Sphere { .. }))
            .count();
        assert_eq!(spheres, 8);
        let bb = part.bounding_box().unwrap();
        assert_relative_eq!(bb.origin, Vector3::zeros(), epsilon = 1e-9);
        assert_relative_eq!(bb.size, Vector3::new(5.0, 3.0, 4.0), epsilon = 1e-9);
    }

    #[test]
    fn test_zero_radius_is_a_cube() {
        let part = rounded_box("rb", Vector3::new(5.0, 3.0, 4.0), 0.0, 32);
        assert!(matches!(part.root_op(), CsgOp::Cube { .. }));
    }

    #[test]
    fn test_rounded_rect_bounds() {
        let part = rounded_rect("rr", Vector2::new(10.0, 6.0), 1.5);
        assert!(matches!(
            part.root_op(),
            CsgOp::Offset {
                amount: OffsetAmount::Radius(r),
                ..
            } if *r == 1.5
        ));
        let bb = part.bounding_box().unwrap();
        assert_relative_eq!(bb.origin, Vector3::zeros(), epsilon = 1e-9);
        assert_relative_eq!(bb.size, Vector3::new(10.0, 6.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn test_shell_matches_outer_envelope() {
        let cfg = EnclosureConfig::new(Vector3::new(50.0, 30.0, 1.6));
        let frame = LayoutFrame::resolve(&cfg);
        let part = shell(&frame, &cfg);
        assert!(matches!(part.root_op(), CsgOp::Difference { .. }));
        let bb = part.bounding_box().unwrap();
        assert_relative_eq!(bb.origin, Vector3::zeros(), epsilon = 1e-9);
        assert_relative_eq!(bb.size, frame.outer_dim, epsilon = 1e-12);

        let inner: Vec<_> = part.nodes_named("shell-inner").collect();
        assert_eq!(inner.len(), 2);
    }
}

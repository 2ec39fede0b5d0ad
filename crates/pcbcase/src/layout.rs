//! Layout resolution: the shared geometric frame of one enclosure.
//!
//! The [`LayoutFrame`] is computed once from the configuration and threaded
//! read-only through every component. Two coordinate systems are in play:
//!
//! - **PCB coordinates**: the PCB's own origin at its lower-left bottom
//!   corner. All user input (slots, posts, buttons, texts) is given here.
//! - **Enclosure-local coordinates**: the outer shell's minimum corner at the
//!   origin. All generated geometry lives here; `pcb_loc` maps one to the
//!   other.

use crate::config::{EnclosureConfig, Slot};
use crate::geometry::{bounding_box_of, merge_boxes, BoundingBox, BoxBuilder};
use nalgebra::{Vector2, Vector3};
use tracing::debug;

/// Derived dimensions and offsets shared by all geometry generators.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutFrame {
    /// Smallest box containing the PCB, the components and every slot (PCB coordinates).
    pub board_bb: BoundingBox,
    /// `board_bb.size`.
    pub board_dim: Vector3<f64>,
    /// Cavity size: `board_dim + 2 * pcb_offset`.
    pub inner_dim: Vector3<f64>,
    /// Shell size: `inner_dim + 2 * wall_thickness`.
    pub outer_dim: Vector3<f64>,
    /// Translation from PCB coordinates to enclosure-local coordinates.
    pub pcb_loc: Vector3<f64>,
    /// Per-axis wall reference planes in PCB coordinates.
    ///
    /// `slot_offsets[0]` holds the outer surface of the left, front and bottom
    /// walls; `slot_offsets[1]` the inner surface of the right, rear and top
    /// walls. A slot box on either wall spans one wall thickness in the
    /// positive direction from its plane.
    pub slot_offsets: [Vector3<f64>; 2],
}

impl LayoutFrame {
    /// Resolve the frame for `config`.
    ///
    /// Slots are first placed with a zero frame (in-plane extents only) so
    /// that they can grow the board box before the walls are known.
    pub fn resolve(config: &EnclosureConfig) -> Self {
        let wall = config.wall_thickness;
        let offset = config.pcb_offset;

        let pcb_bb = BoundingBox::new(Vector3::zeros(), config.pcb_dimensions);
        let comp_bb = bounding_box_of(&config.component_bounds);

        let bootstrap = [Vector3::zeros(), Vector3::zeros()];
        let mut boxes = vec![pcb_bb, comp_bb];
        boxes.extend(
            config
                .slots
                .iter()
                .map(|slot| slot_extent(slot, &bootstrap, 0.0)),
        );
        let board_bb = merge_boxes(&boxes);

        let board_dim = board_bb.size;
        let inner_dim = board_dim.add_scalar(2.0 * offset);
        let outer_dim = inner_dim.add_scalar(2.0 * wall);
        let pcb_loc = (-board_bb.origin).add_scalar(offset + wall);

        let slot_offsets = [
            board_bb.origin.add_scalar(-(wall + offset)),
            board_bb.max().add_scalar(offset),
        ];

        let frame = Self {
            board_bb,
            board_dim,
            inner_dim,
            outer_dim,
            pcb_loc,
            slot_offsets,
        };
        debug!(
            board = ?frame.board_dim.as_slice(),
            inner = ?frame.inner_dim.as_slice(),
            outer = ?frame.outer_dim.as_slice(),
            pcb_loc = ?frame.pcb_loc.as_slice(),
            "resolved layout frame"
        );
        frame
    }

    /// Height of the plane splitting top from bottom (the PCB's underside).
    pub fn split_z(&self) -> f64 {
        self.pcb_loc.z
    }

    /// Map a PCB-coordinate point into enclosure-local coordinates.
    pub fn to_local(&self, p: Vector3<f64>) -> Vector3<f64> {
        p + self.pcb_loc
    }

    /// Map a PCB-coordinate XY position into enclosure-local XY.
    pub fn to_local_xy(&self, p: Vector2<f64>) -> Vector2<f64> {
        p + self.pcb_loc.xy()
    }

    /// Map a PCB-coordinate box into enclosure-local coordinates.
    pub fn box_to_local(&self, b: &BoundingBox) -> BoundingBox {
        b.translated(self.pcb_loc)
    }

    /// Height of the inner surface of the top wall (local).
    pub fn inner_top_z(&self) -> f64 {
        self.outer_dim.z - self.wall_thickness()
    }

    /// Local height of the PCB's top surface.
    pub fn pcb_top_z(&self, config: &EnclosureConfig) -> f64 {
        self.pcb_loc.z + config.pcb_dimensions.z
    }

    /// Wall thickness implied by the inner and outer dimensions.
    pub fn wall_thickness(&self) -> f64 {
        (self.outer_dim.z - self.inner_dim.z) / 2.0
    }

    /// The exact slot box in PCB coordinates, one wall thick.
    pub fn slot_box(&self, slot: &Slot, wall_thickness: f64) -> BoundingBox {
        slot_extent(slot, &self.slot_offsets, wall_thickness)
    }
}

/// Promote a slot rectangle to a 3D box using the given reference planes.
///
/// The in-plane axes come from the rectangle; along the through axis the box
/// starts at the side's reference plane and spans `depth`.
pub fn slot_extent(slot: &Slot, offsets: &[Vector3<f64>; 2], depth: f64) -> BoundingBox {
    let [a, b] = slot.side.plane_axes();
    let through = slot.side.through_axis();

    let mut c1 = Vector3::zeros();
    let mut c2 = Vector3::zeros();
    c1[a.index()] = slot.corner1.x;
    c1[b.index()] = slot.corner1.y;
    c2[a.index()] = slot.corner2.x;
    c2[b.index()] = slot.corner2.y;
    let rect = BoundingBox::from_corners(c1, c2);

    let plane = offsets[usize::from(!slot.side.is_low())][through.index()];
    BoxBuilder::from_axes(&[rect], &[a, b])
        .override_low(through, plane)
        .override_high(through, plane + depth)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Side;
    use crate::geometry::Axis;
    use approx::assert_relative_eq;

    fn slot(side: Side, c1: (f64, f64), c2: (f64, f64)) -> Slot {
        Slot {
            side,
            corner1: Vector2::new(c1.0, c1.1),
            corner2: Vector2::new(c2.0, c2.1),
        }
    }

    #[test]
    fn test_bare_pcb_dimensions() {
        let cfg = EnclosureConfig::new(Vector3::new(50.0, 30.0, 1.6));
        let frame = LayoutFrame::resolve(&cfg);
        assert_relative_eq!(frame.board_dim, Vector3::new(50.0, 30.0, 1.6), epsilon = 1e-9);
        assert_relative_eq!(frame.inner_dim, Vector3::new(52.0, 32.0, 3.6), epsilon = 1e-12);
        assert_relative_eq!(frame.outer_dim, Vector3::new(56.0, 36.0, 7.6), epsilon = 1e-12);
        assert_relative_eq!(frame.pcb_loc, Vector3::new(3.0, 3.0, 3.0), epsilon = 1e-9);
        assert_relative_eq!(frame.split_z(), 3.0, epsilon = 1e-9);
        assert_relative_eq!(frame.inner_top_z(), 5.6, epsilon = 1e-12);
    }

    #[test]
    fn test_components_grow_board_box() {
        let mut cfg = EnclosureConfig::new(Vector3::new(50.0, 30.0, 1.6));
        cfg.component_bounds = vec![Vector3::new(-4.0, 2.0, -2.0), Vector3::new(20.0, 10.0, 12.0)];
        let frame = LayoutFrame::resolve(&cfg);
        assert_relative_eq!(frame.board_bb.origin, Vector3::new(-4.0, 0.0, -2.0), epsilon = 1e-9);
        assert_relative_eq!(frame.board_dim, Vector3::new(54.0, 30.0, 14.0), epsilon = 1e-9);
        assert_relative_eq!(frame.pcb_loc, Vector3::new(7.0, 3.0, 5.0), epsilon = 1e-9);
        // outer minimum corner maps to the local origin
        let outer_min = frame.board_bb.origin.add_scalar(-(cfg.pcb_offset + cfg.wall_thickness));
        assert_relative_eq!(frame.to_local(outer_min), Vector3::zeros(), epsilon = 1e-9);
    }

    #[test]
    fn test_slot_offsets_follow_walls() {
        let cfg = EnclosureConfig::new(Vector3::new(50.0, 30.0, 1.6));
        let frame = LayoutFrame::resolve(&cfg);
        assert_relative_eq!(frame.slot_offsets[0], Vector3::new(-3.0, -3.0, -3.0), epsilon = 1e-9);
        assert_relative_eq!(frame.slot_offsets[1], Vector3::new(51.0, 31.0, 2.6), epsilon = 1e-12);
        // the high plane is the inner wall: local inner wall = outer - wall
        let right_inner = frame.to_local(frame.slot_offsets[1]);
        assert_relative_eq!(right_inner.x, frame.outer_dim.x - cfg.wall_thickness, epsilon = 1e-9);
        assert_relative_eq!(right_inner.z, frame.outer_dim.z - cfg.wall_thickness, epsilon = 1e-12);
    }

    #[test]
    fn test_left_slot_on_low_x_face() {
        let mut cfg = EnclosureConfig::new(Vector3::new(50.0, 30.0, 1.6));
        cfg.slots.push(slot(Side::Left, (5.0, 0.0), (10.0, 2.0)));
        let frame = LayoutFrame::resolve(&cfg);
        let b = frame.slot_box(&cfg.slots[0], cfg.wall_thickness);
        assert_relative_eq!(b.low(Axis::Y), 5.0, epsilon = 1e-9);
        assert_relative_eq!(b.high(Axis::Y), 10.0, epsilon = 1e-9);
        assert_relative_eq!(b.low(Axis::Z), 0.0, epsilon = 1e-9);
        assert_relative_eq!(b.high(Axis::Z), 2.0, epsilon = 1e-9);
        assert_relative_eq!(b.low(Axis::X), frame.slot_offsets[0].x, epsilon = 1e-9);
        let local = frame.box_to_local(&b);
        assert_relative_eq!(local.low(Axis::X), 0.0, epsilon = 1e-9);
        assert_relative_eq!(local.high(Axis::X), cfg.wall_thickness, epsilon = 1e-9);
    }

    #[test]
    fn test_side_slots_stay_on_walls_when_components_overhang() {
        let mut cfg = EnclosureConfig::new(Vector3::new(50.0, 30.0, 1.6));
        cfg.component_bounds = vec![Vector3::new(-4.0, -2.0, 0.0), Vector3::new(52.0, 30.0, 6.0)];
        cfg.slots.push(slot(Side::Left, (5.0, 0.0), (10.0, 2.0)));
        cfg.slots.push(slot(Side::Right, (5.0, 0.0), (10.0, 2.0)));
        cfg.slots.push(slot(Side::Front, (5.0, 0.0), (10.0, 2.0)));
        let frame = LayoutFrame::resolve(&cfg);
        assert!(frame.board_bb.origin.x < 0.0);
        assert_relative_eq!(frame.slot_offsets[0].x, -4.0 - 3.0, epsilon = 1e-9);
        assert_relative_eq!(frame.slot_offsets[0].y, -2.0 - 3.0, epsilon = 1e-9);

        let wall = cfg.wall_thickness;
        let local = |i: usize| frame.box_to_local(&frame.slot_box(&cfg.slots[i], wall));
        let left = local(0);
        assert_relative_eq!(left.low(Axis::X), 0.0, epsilon = 1e-9);
        assert_relative_eq!(left.high(Axis::X), wall, epsilon = 1e-9);
        let right = local(1);
        assert_relative_eq!(right.low(Axis::X), frame.outer_dim.x - wall, epsilon = 1e-9);
        assert_relative_eq!(right.high(Axis::X), frame.outer_dim.x, epsilon = 1e-9);
        let front = local(2);
        assert_relative_eq!(front.low(Axis::Y), 0.0, epsilon = 1e-9);
        // the opening itself keeps its PCB-relative position
        assert_relative_eq!(left.low(Axis::Y), 5.0 + frame.pcb_loc.y, epsilon = 1e-9);
        assert_relative_eq!(front.low(Axis::X), 5.0 + frame.pcb_loc.x, epsilon = 1e-9);
    }

    #[test]
    fn test_slots_extend_board_box() {
        let mut cfg = EnclosureConfig::new(Vector3::new(50.0, 30.0, 1.6));
        cfg.slots.push(slot(Side::Front, (10.0, -1.0), (20.0, 6.0)));
        cfg.slots.push(slot(Side::Top, (45.0, 25.0), (58.0, 33.0)));
        let frame = LayoutFrame::resolve(&cfg);
        assert_relative_eq!(frame.board_bb.origin, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-9);
        assert_relative_eq!(frame.board_bb.max(), Vector3::new(58.0, 33.0, 6.0), epsilon = 1e-9);
        for s in &cfg.slots {
            let [a, b] = s.side.plane_axes();
            let placed = frame.slot_box(s, cfg.wall_thickness);
            assert!(placed.low(a) >= frame.board_bb.low(a));
            assert!(placed.high(b) <= frame.board_bb.high(b));
        }
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let mut cfg = EnclosureConfig::new(Vector3::new(50.0, 30.0, 1.6));
        cfg.slots.push(slot(Side::Rear, (1.0, 1.0), (8.0, 4.0)));
        assert_eq!(LayoutFrame::resolve(&cfg), LayoutFrame::resolve(&cfg));
    }
}

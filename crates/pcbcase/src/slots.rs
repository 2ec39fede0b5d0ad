//! Wall openings.
//!
//! Every slot is resolved into a [`SlotPlan`] of local boxes first, then
//! turned into cutters and fills for the two halves. A side-wall slot that
//! crosses the lip zone cuts the Bottom's lip a `tolerance` wider than the
//! opening and lets the Top refill the wall around the opening, so the seam
//! never shows inside the slot. Side-wall openings are cut half a
//! `tolerance` narrower than declared on each horizontal edge.

use crate::config::{EnclosureConfig, Slot};
use crate::geometry::{Axis, BoundingBox, BoxBuilder, EPSILON};
use crate::layout::LayoutFrame;
use crate::lip::LipProfile;
use crate::shell::rounded_box;
use crate::Part;
use tracing::{debug, warn};

/// Local boxes derived from one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotPlan {
    /// The opening exactly one wall thick.
    pub exact: BoundingBox,
    /// Material removed from the Top half.
    pub top_cutout: Option<BoundingBox>,
    /// Material removed from the Bottom half.
    pub bottom_cutout: Option<BoundingBox>,
    /// Lip material removed around the opening (Bottom half).
    pub lip_gap: Option<BoundingBox>,
    /// Wall restored around the opening in the lip zone (Top half).
    pub top_fill: Option<BoundingBox>,
}

impl SlotPlan {
    /// Resolve the boxes for `slot`, or `None` if its rectangle has no area.
    pub fn new(frame: &LayoutFrame, config: &EnclosureConfig, slot: &Slot) -> Option<Self> {
        let through = slot.side.through_axis();
        let exact = frame.box_to_local(&frame.slot_box(slot, config.wall_thickness));
        if slot.side.plane_axes().iter().any(|&a| exact.high(a) <= exact.low(a)) {
            warn!(side = ?slot.side, "slot rectangle has zero extent, skipping");
            return None;
        }
        let cutout = BoxBuilder::from_box(&exact).grow(through, EPSILON);

        if !slot.side.is_side_wall() {
            let cut = Some(cutout.build());
            let (top_cutout, bottom_cutout) = if slot.side.is_low() {
                (None, cut)
            } else {
                (cut, None)
            };
            return Some(Self {
                exact,
                top_cutout,
                bottom_cutout,
                lip_gap: None,
                top_fill: None,
            });
        }

        // side-wall openings lose half the tolerance on each horizontal edge
        let along = slot.side.plane_axes()[0];
        let width = exact.high(along) - exact.low(along);
        if width <= config.tolerance {
            warn!(side = ?slot.side, width, "slot narrower than the tolerance, skipping");
            return None;
        }
        let cutout = cutout.grow(along, -config.tolerance / 2.0);

        let lip = LipProfile::new(frame, config);
        let (z_lo, z_hi) = (exact.low(Axis::Z), exact.high(Axis::Z));

        let bottom_cutout = (z_lo < lip.lip_top_z).then(|| {
            cutout
                .clone()
                .override_high(Axis::Z, z_hi.min(lip.lip_top_z + EPSILON))
                .build()
        });
        let top_cutout = (z_hi > lip.split_z).then(|| {
            cutout
                .clone()
                .override_low(Axis::Z, z_lo.max(lip.split_z - EPSILON))
                .build()
        });

        let in_lip_zone = z_hi > lip.split_z && z_lo < lip.lip_top_z;
        let lip_gap = in_lip_zone.then(|| {
            BoxBuilder::from_box(&exact)
                .grow(through, EPSILON)
                .grow(along, config.tolerance)
                .override_low(Axis::Z, lip.split_z)
                .override_high(Axis::Z, lip.lip_top_z + EPSILON)
                .build()
        });
        let top_fill = in_lip_zone.then(|| {
            BoxBuilder::from_box(&exact)
                .override_low(Axis::Z, lip.split_z)
                .override_high(Axis::Z, lip.cavity_top_z)
                .build()
        });

        Some(Self {
            exact,
            top_cutout,
            bottom_cutout,
            lip_gap,
            top_fill,
        })
    }
}

/// Cutters and fills of all slots, grouped by the half they apply to.
#[derive(Debug, Clone)]
pub struct SlotCuts {
    /// Subtracted from the Top half.
    pub top_cutouts: Vec<Part>,
    /// Added to the Top half after cutting.
    pub top_fills: Vec<Part>,
    /// Subtracted from the Bottom half (openings and lip gaps).
    pub bottom_cutouts: Vec<Part>,
}

/// Build the cutters and fills for every slot in `config`.
pub fn slot_cuts(frame: &LayoutFrame, config: &EnclosureConfig) -> SlotCuts {
    let envelope = rounded_box(
        "slot-envelope",
        frame.outer_dim,
        config.outer_corner_radius,
        config.segments,
    );

    let mut cuts = SlotCuts {
        top_cutouts: Vec::new(),
        top_fills: Vec::new(),
        bottom_cutouts: Vec::new(),
    };
    for (i, slot) in config.slots.iter().enumerate() {
        let Some(plan) = SlotPlan::new(frame, config, slot) else {
            continue;
        };
        debug!(index = i, side = ?slot.side, ?plan, "slot plan");

        if let Some(b) = &plan.bottom_cutout {
            cuts.bottom_cutouts.push(Part::from_box(format!("slot{i}-bottom"), b));
        }
        if let Some(b) = &plan.lip_gap {
            cuts.bottom_cutouts.push(Part::from_box(format!("slot{i}-lip-gap"), b));
        }
        if let Some(b) = &plan.top_cutout {
            cuts.top_cutouts.push(Part::from_box(format!("slot{i}-top"), b));
        }
        if let Some(fill) = &plan.top_fill {
            let mut part = Part::from_box(format!("slot{i}-fill"), fill);
            if let Some(cut) = &plan.top_cutout {
                part = part - Part::from_box(format!("slot{i}-fill-cut"), cut);
            }
            cuts.top_fills.push(part & envelope.clone());
        }
    }
    cuts
}

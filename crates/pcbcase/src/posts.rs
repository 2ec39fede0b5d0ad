//! Mounting posts and their keep-out volumes.

use crate::config::{EnclosureConfig, MountPost};
use crate::geometry::{BoundingBox, EPSILON};
use crate::layout::LayoutFrame;
use crate::lip::LipProfile;
use crate::Part;
use tracing::{debug, warn};

/// Post material for both halves.
#[derive(Debug, Clone)]
pub struct PostParts {
    /// Bosses hanging from the Top's ceiling.
    pub top: Part,
    /// Bases and pins standing on the Bottom's floor.
    pub bottom: Part,
}

/// Radii used by one post.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostRadii {
    /// Structural base and boss.
    pub base: f64,
    /// Pin passing through the PCB hole.
    pub pin: f64,
    /// Hole in the Top boss receiving the pin.
    pub hole: f64,
}

impl PostRadii {
    /// Radii for `post` under `config`.
    pub fn new(post: &MountPost, config: &EnclosureConfig) -> Self {
        Self {
            base: post.diameter / 2.0 + config.mount_posts_base_thickness_offset,
            pin: (post.diameter - config.tolerance) / 2.0,
            hole: (post.diameter + config.tolerance) / 2.0,
        }
    }
}

/// Keep-out boxes in local coordinates.
pub fn restriction_boxes(frame: &LayoutFrame, config: &EnclosureConfig) -> Vec<BoundingBox> {
    config
        .mount_post_restrictions
        .iter()
        .map(|r| frame.box_to_local(&BoundingBox::from_corners(r.corner_a, r.corner_b)))
        .collect()
}

fn bottom_post(frame: &LayoutFrame, config: &EnclosureConfig, post: &MountPost, i: usize) -> Part {
    let radii = PostRadii::new(post, config);
    let lip = LipProfile::new(frame, config);
    let c = frame.to_local_xy(post.center);
    let floor = config.wall_thickness - EPSILON;

    let base = Part::cylinder(
        format!("post{i}-base"),
        radii.base,
        lip.split_z - floor,
        config.segments,
    );
    let pin = Part::cylinder(
        format!("post{i}-pin"),
        radii.pin,
        lip.lip_top_z - floor,
        config.segments,
    );
    (base + pin).translate(c.x, c.y, floor)
}

fn top_post(frame: &LayoutFrame, config: &EnclosureConfig, post: &MountPost, i: usize) -> Option<Part> {
    let radii = PostRadii::new(post, config);
    let c = frame.to_local_xy(post.center);
    let start = frame.pcb_top_z(config);
    let ceiling = frame.inner_top_z();
    if ceiling <= start {
        warn!(index = i, "no room for a boss above the PCB, skipping");
        return None;
    }

    let boss = Part::cylinder(
        format!("post{i}-boss"),
        radii.base,
        ceiling - start + EPSILON,
        config.segments,
    );
    let hole = Part::cylinder(
        format!("post{i}-hole"),
        radii.hole,
        ceiling - start + EPSILON,
        config.segments,
    )
    .translate(0.0, 0.0, -EPSILON);
    Some((boss - hole).translate(c.x, c.y, start))
}

/// Build the posts for both halves, truncated by every restriction box.
pub fn mount_posts(frame: &LayoutFrame, config: &EnclosureConfig) -> PostParts {
    let restrictions = restriction_boxes(frame, config);
    let keep_out: Vec<Part> = restrictions
        .iter()
        .enumerate()
        .map(|(i, b)| Part::from_box(format!("restriction{i}"), b))
        .collect();

    let mut top = Vec::new();
    let mut bottom = Vec::new();
    for (i, post) in config.mount_posts.iter().enumerate() {
        let b = bottom_post(frame, config, post, i);
        if let Some(bb) = b.bounding_box() {
            if restrictions.iter().any(|r| r.contains_box(&bb, 0.0)) {
                warn!(index = i, "post lies entirely inside a restriction box");
            }
        }
        debug!(index = i, center = ?post.center.as_slice(), "mount post");
        bottom.push(b);
        top.extend(top_post(frame, config, post, i));
    }

    let clip = |parts: Vec<Part>, name: &str| Part::union_all(name, parts).difference_all(&keep_out);
    PostParts {
        top: clip(top, "posts-top"),
        bottom: clip(bottom, "posts-bottom"),
    }
}

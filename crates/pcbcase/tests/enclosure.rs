//! End-to-end scenarios: configuration in, canonical CSG document out.

#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use nalgebra::{Vector2, Vector3};
use pcbcase::geometry::{Axis, BoundingBox};
use pcbcase::lip::LipProfile;
use pcbcase::slots::SlotPlan;
use pcbcase::{
    CaseError, Enclosure, EnclosureConfig, ExportSelection, LayoutFrame, Side, Slot,
};
use pcbcase_ir::{CsgOp, Document};

const FULL_CONFIG: &str = r#"
pcb_dimensions = [50, 30, 1.6]
component_bounds = [[0, 0, 0], [50, 30, 8]]

[[slots]]
side = "left"
corner1 = [5, 0]
corner2 = [10, 2]

[[slots]]
side = "rear"
corner1 = [20, 1]
corner2 = [30, 5]

[[slots]]
side = "top"
corner1 = [35, 5]
corner2 = [45, 12]

[[mount_posts]]
center = [4, 4]
diameter = 3

[[mount_posts]]
center = [46, 26]
diameter = 3

[[mount_post_restrictions]]
corner_a = [40, 20, 0]
corner_b = [50, 30, 10]

[[buttons]]
position = [25, 15]
released_height = 6
rotation = 90

[[texts]]
position = [10, 22]
text = "PWR"
halign = "center"
"#;

fn full_config() -> EnclosureConfig {
    EnclosureConfig::from_toml_str(FULL_CONFIG).unwrap()
}

mod layout {
    use super::*;

    #[test]
    fn example_dimensions() {
        let cfg = EnclosureConfig::from_toml_str("pcb_dimensions = [50, 30, 1.6]").unwrap();
        let enc = Enclosure::build(&cfg).unwrap();
        let frame = &enc.layout;
        assert_relative_eq!(frame.board_dim, Vector3::new(50.0, 30.0, 1.6), epsilon = 1e-9);
        assert_relative_eq!(frame.inner_dim, Vector3::new(52.0, 32.0, 3.6), epsilon = 1e-9);
        assert_relative_eq!(frame.outer_dim, Vector3::new(56.0, 36.0, 7.6), epsilon = 1e-9);
    }

    #[test]
    fn dimension_identities_hold() {
        let cfg = full_config();
        let frame = LayoutFrame::resolve(&cfg);
        let expected_inner = frame.board_dim.add_scalar(2.0 * cfg.pcb_offset);
        let expected_outer = expected_inner.add_scalar(2.0 * cfg.wall_thickness);
        assert_relative_eq!(frame.inner_dim, expected_inner, epsilon = 1e-9);
        assert_relative_eq!(frame.outer_dim, expected_outer, epsilon = 1e-9);
    }

    #[test]
    fn board_box_contains_everything() {
        let cfg = full_config();
        let frame = LayoutFrame::resolve(&cfg);
        let pcb = BoundingBox::new(Vector3::zeros(), cfg.pcb_dimensions);
        assert!(frame.board_bb.contains_box(&pcb, 1e-9));
        for p in &cfg.component_bounds {
            assert!(frame.board_bb.contains_box(&BoundingBox::new(*p, Vector3::zeros()), 1e-9));
        }

        // every feature lies inside the outer shell
        let shell = BoundingBox::new(Vector3::zeros(), frame.outer_dim);
        for slot in &cfg.slots {
            let local = frame.box_to_local(&frame.slot_box(slot, cfg.wall_thickness));
            assert!(shell.contains_box(&local, 1e-9), "{slot:?} escapes the shell");
        }
        for post in &cfg.mount_posts {
            let c = frame.to_local_xy(post.center);
            assert!(c.x > cfg.wall_thickness && c.x < frame.outer_dim.x - cfg.wall_thickness);
            assert!(c.y > cfg.wall_thickness && c.y < frame.outer_dim.y - cfg.wall_thickness);
        }
    }

    #[test]
    fn left_slot_lands_on_low_x_wall() {
        let mut cfg = EnclosureConfig::new(Vector3::new(50.0, 30.0, 1.6));
        let slot = Slot {
            side: Side::Left,
            corner1: Vector2::new(5.0, 0.0),
            corner2: Vector2::new(10.0, 2.0),
        };
        cfg.slots.push(slot);
        let frame = LayoutFrame::resolve(&cfg);
        let plan = SlotPlan::new(&frame, &cfg, &slot).unwrap();

        // y in [5, 10] and z in [0, 2] in PCB coordinates
        let pcb_box = plan.exact.translated(-frame.pcb_loc);
        assert_relative_eq!(pcb_box.low(Axis::Y), 5.0, epsilon = 1e-9);
        assert_relative_eq!(pcb_box.high(Axis::Y), 10.0, epsilon = 1e-9);
        assert_relative_eq!(pcb_box.low(Axis::Z), 0.0, epsilon = 1e-9);
        assert_relative_eq!(pcb_box.high(Axis::Z), 2.0, epsilon = 1e-9);
        assert_relative_eq!(pcb_box.low(Axis::X), frame.slot_offsets[0].x, epsilon = 1e-9);

        // on the low-x face of the shell
        assert_relative_eq!(plan.exact.low(Axis::X), 0.0, epsilon = 1e-9);
    }
}

mod fit {
    use super::*;

    #[test]
    fn clearance_grows_monotonically_with_tolerance() {
        let mut last = -1.0;
        for tol in [0.0, 0.1, 0.25, 0.4, 0.6] {
            let mut cfg = full_config();
            cfg.tolerance = tol;
            let enc = Enclosure::build(&cfg).unwrap();
            let clearance = LipProfile::new(&enc.layout, &cfg).clearance();
            assert_relative_eq!(clearance, tol, epsilon = 1e-9);
            assert!(clearance > last);
            last = clearance;
        }
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let mut cfg = full_config();
        cfg.tolerance = -0.1;
        assert!(matches!(
            Enclosure::build(&cfg),
            Err(CaseError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn halves_split_at_pcb_underside() {
        let enc = Enclosure::build(&full_config()).unwrap();
        let split = enc.layout.split_z();
        let top = enc.top.bounding_box().unwrap();
        let bottom = enc.bottom.bounding_box().unwrap();
        assert_relative_eq!(top.low(Axis::Z), split, epsilon = 1e-9);
        assert_relative_eq!(bottom.low(Axis::Z), 0.0, epsilon = 1e-9);
        // only the lip and the post pins rise above the split
        let lip_top = LipProfile::new(&enc.layout, &full_config()).lip_top_z;
        assert_relative_eq!(bottom.high(Axis::Z), lip_top, epsilon = 1e-9);
        // both halves stay inside the outer envelope footprint
        for bb in [top, bottom] {
            assert!(bb.low(Axis::X) >= -1e-9);
            assert!(bb.high(Axis::X) <= enc.layout.outer_dim.x + 1e-9);
        }
    }
}

mod validation {
    use super::*;

    #[test]
    fn rejects_nonsense() {
        let base = full_config();

        let mut cfg = base.clone();
        cfg.wall_thickness = -2.0;
        assert!(Enclosure::build(&cfg).is_err());

        let mut cfg = base.clone();
        cfg.pcb_dimensions = Vector3::new(0.0, 30.0, 1.6);
        assert!(Enclosure::build(&cfg).is_err());

        let mut cfg = base.clone();
        cfg.button_actuator_diameter = cfg.button_diameter;
        assert!(Enclosure::build(&cfg).is_err());

        let mut cfg = base.clone();
        cfg.inner_corner_radius = 100.0;
        let err = Enclosure::build(&cfg).unwrap_err();
        assert!(err.to_string().contains("inner_corner_radius"));
    }

    #[test]
    fn accepts_infeasible_geometry() {
        // a restriction swallowing a post only truncates it
        let mut cfg = full_config();
        cfg.mount_post_restrictions[0].corner_a = Vector3::new(-10.0, -10.0, -10.0);
        cfg.mount_post_restrictions[0].corner_b = Vector3::new(60.0, 40.0, 20.0);
        assert!(Enclosure::build(&cfg).is_ok());

        // a zero-area slot is skipped
        let mut cfg = full_config();
        cfg.slots[0].corner2 = cfg.slots[0].corner1;
        assert!(Enclosure::build(&cfg).is_ok());
    }

    #[test]
    fn config_errors() {
        let err = EnclosureConfig::from_toml_str("pcb_dimensions = \"big\"").unwrap_err();
        assert!(matches!(err, CaseError::Config(_)));

        let err = EnclosureConfig::from_toml_file("/nonexistent/pcbcase.toml").unwrap_err();
        assert!(matches!(err, CaseError::Io(_)));
    }

    #[test]
    fn loads_from_file() {
        let path = std::env::temp_dir().join(format!("pcbcase-{}.toml", std::process::id()));
        std::fs::write(&path, FULL_CONFIG).unwrap();
        let cfg = EnclosureConfig::from_toml_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(cfg, full_config());
        assert_eq!(cfg.slots.len(), 3);
        assert_eq!(cfg.buttons[0].rotation, 90.0);
    }
}

mod output {
    use super::*;

    fn roots(cfg: &EnclosureConfig) -> Vec<String> {
        let doc = Enclosure::build(cfg).unwrap().to_document().unwrap();
        doc.roots
            .iter()
            .map(|r| doc.nodes[&r.root].name.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn export_selection_controls_roots() {
        let mut cfg = full_config();
        assert_eq!(roots(&cfg), ["top", "bottom", "text-inserts"]);

        cfg.export = ExportSelection::Top;
        assert_eq!(roots(&cfg), ["top"]);

        cfg.export = ExportSelection::Bottom;
        assert_eq!(roots(&cfg), ["bottom"]);

        cfg.export = ExportSelection::Texts;
        assert_eq!(roots(&cfg).len(), 1);
    }

    #[test]
    fn no_text_means_two_roots() {
        let cfg = EnclosureConfig::new(Vector3::new(50.0, 30.0, 1.6));
        let doc = Enclosure::build(&cfg).unwrap().to_document().unwrap();
        assert_eq!(doc.roots.len(), 2);
        assert_eq!(doc.materials.len(), 1);
        assert!(doc.materials.contains_key("shell"));
    }

    #[test]
    fn separated_layout_differs_from_assembled() {
        let mut cfg = full_config();
        let assembled = Enclosure::build(&cfg).unwrap().to_document().unwrap();
        cfg.assembled = false;
        let separated = Enclosure::build(&cfg).unwrap().to_document().unwrap();
        assert_eq!(assembled.roots.len(), separated.roots.len());
        assert_ne!(assembled, separated);

        let top_root = &separated.nodes[&separated.roots[0].root];
        assert!(matches!(top_root.op, CsgOp::Translate { .. }));
    }

    #[test]
    fn generation_is_deterministic() {
        let cfg = full_config();
        let a = Enclosure::build(&cfg).unwrap().to_document().unwrap();
        let b = Enclosure::build(&cfg).unwrap().to_document().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
        assert_eq!(LayoutFrame::resolve(&cfg), Enclosure::build(&cfg).unwrap().layout);
    }

    #[test]
    fn json_round_trip() {
        let doc = Enclosure::build(&full_config()).unwrap().to_document().unwrap();
        let json = doc.to_json().unwrap();
        let back = Document::from_json(&json).unwrap();
        assert_eq!(doc, back);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], "0.1");
        assert_eq!(value["roots"].as_array().unwrap().len(), 3);
        assert!(json.contains("\"type\": \"Hull\""));
        assert!(json.contains("\"type\": \"Text\""));
    }

    #[test]
    fn scad_source_covers_every_root() {
        let doc = Enclosure::build(&full_config()).unwrap().to_document().unwrap();
        let scad = pcbcase_ir::scad::to_scad(&doc).unwrap();
        assert!(scad.starts_with("// pcbcase 0.1"));
        assert!(scad.contains("// top (material: shell)"));
        assert!(scad.contains("// bottom (material: shell)"));
        assert!(scad.contains("// text-inserts (material: text)"));
        assert!(scad.contains("hull() {"));
        assert!(scad.contains("text(\"PWR\""));
    }
}

//! Intermediate representation for the pcbcase enclosure generator.
//!
//! This crate defines the DAG-based CSG expression tree produced by the
//! enclosure pipeline. It is purely declarative: no mesh data, just a graph
//! of primitives, booleans and transforms. Meshing and file export are left
//! to whatever engine consumes the tree (see [`scad`] for an OpenSCAD
//! emitter).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

pub mod scad;

/// Unique identifier for a node in the IR graph.
pub type NodeId = u64;

/// Errors raised while walking or converting an IR document.
#[derive(Error, Debug)]
pub enum IrError {
    /// A node references a child that is not in the document.
    #[error("node {parent} references missing node {child}")]
    DanglingReference {
        /// The referencing node.
        parent: NodeId,
        /// The missing child.
        child: NodeId,
    },
    /// A scene entry references a node that is not in the document.
    #[error("scene root {0} is not in the document")]
    MissingRoot(NodeId),
    /// The graph is not acyclic.
    #[error("cycle detected at node {0}")]
    Cycle(NodeId),
    /// JSON (de)serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// Writing emitted source failed.
    #[error("format error: {0}")]
    Format(#[from] std::fmt::Error),
}

/// 2D vector with f64 components (millimeters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
}

impl Vec2 {
    /// Create a new Vec2.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 3D vector with f64 components (millimeters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new Vec3.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Horizontal text alignment relative to the text origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    /// Text starts at the origin.
    #[default]
    Left,
    /// Text is centered on the origin.
    Center,
    /// Text ends at the origin.
    Right,
}

/// Vertical text alignment relative to the text origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    /// Origin on the top edge.
    Top,
    /// Origin on the vertical center.
    Center,
    /// Origin on the baseline.
    #[default]
    Baseline,
    /// Origin on the bottom edge.
    Bottom,
}

/// Amount for a 2D offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum OffsetAmount {
    /// Rounded offset: every point moves by this radius, convex corners become arcs.
    Radius(f64),
    /// Sharp offset: edges move by this distance, corners stay mitered.
    Delta(f64),
}

/// CSG operation, the core building block of the IR DAG.
///
/// Each variant is either a leaf primitive or a combining/transform operation
/// that references child nodes by [`NodeId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CsgOp {
    /// Axis-aligned box with one corner at the origin.
    Cube {
        /// Size along each axis.
        size: Vec3,
    },
    /// Cylinder along the Z axis, base on the XY plane.
    Cylinder {
        /// Radius of the cylinder.
        radius: f64,
        /// Height of the cylinder.
        height: f64,
        /// Number of circular segments (0 = auto).
        segments: u32,
    },
    /// Sphere centered at origin.
    Sphere {
        /// Radius of the sphere.
        radius: f64,
        /// Number of circular segments (0 = auto).
        segments: u32,
    },
    /// 2D rectangle with one corner at the origin.
    Square {
        /// Size along X and Y.
        size: Vec2,
    },
    /// 2D circle centered at origin.
    Circle {
        /// Radius of the circle.
        radius: f64,
        /// Number of circular segments (0 = auto).
        segments: u32,
    },
    /// 2D simple polygon.
    Polygon {
        /// Outline, counter-clockwise.
        points: Vec<Vec2>,
    },
    /// 2D text outline; glyph rasterization belongs to the consumer.
    Text {
        /// The string to render.
        text: String,
        /// Font name, consumer-specific (empty = consumer default).
        font: String,
        /// Nominal glyph size.
        size: f64,
        /// Horizontal alignment.
        halign: HAlign,
        /// Vertical alignment.
        valign: VAlign,
    },
    /// Empty geometry (identity for union).
    Empty,
    /// Boolean union of two geometries.
    Union {
        /// Left operand.
        left: NodeId,
        /// Right operand.
        right: NodeId,
    },
    /// Boolean difference (left minus right).
    Difference {
        /// Left operand (base).
        left: NodeId,
        /// Right operand (subtracted).
        right: NodeId,
    },
    /// Boolean intersection of two geometries.
    Intersection {
        /// Left operand.
        left: NodeId,
        /// Right operand.
        right: NodeId,
    },
    /// Convex hull of all children.
    Hull {
        /// Hulled operands.
        children: Vec<NodeId>,
    },
    /// Translation by an offset vector.
    Translate {
        /// Child node to translate.
        child: NodeId,
        /// Translation offset.
        offset: Vec3,
    },
    /// Rotation by Euler angles in degrees (applied as X, then Y, then Z).
    Rotate {
        /// Child node to rotate.
        child: NodeId,
        /// Rotation angles in degrees.
        angles: Vec3,
    },
    /// Non-uniform scale.
    Scale {
        /// Child node to scale.
        child: NodeId,
        /// Scale factors per axis.
        factor: Vec3,
    },
    /// Reflection across the plane through the origin with the given normal.
    Mirror {
        /// Child node to mirror.
        child: NodeId,
        /// Plane normal (need not be unit length).
        normal: Vec3,
    },
    /// Extrude a 2D child along +Z.
    LinearExtrude {
        /// 2D child.
        child: NodeId,
        /// Extrusion height.
        height: f64,
        /// Center the extrusion on the XY plane instead of starting at z=0.
        center: bool,
    },
    /// Grow (positive) or shrink (negative) a 2D child.
    Offset {
        /// 2D child.
        child: NodeId,
        /// Offset kind and distance.
        amount: OffsetAmount,
    },
}

impl CsgOp {
    /// Child node references, in operand order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            CsgOp::Union { left, right }
            | CsgOp::Difference { left, right }
            | CsgOp::Intersection { left, right } => vec![*left, *right],
            CsgOp::Hull { children } => children.clone(),
            CsgOp::Translate { child, .. }
            | CsgOp::Rotate { child, .. }
            | CsgOp::Scale { child, .. }
            | CsgOp::Mirror { child, .. }
            | CsgOp::LinearExtrude { child, .. }
            | CsgOp::Offset { child, .. } => vec![*child],
            _ => vec![],
        }
    }

    /// Copy of this op with every child reference passed through `map`.
    pub fn remap(&self, map: impl Fn(NodeId) -> NodeId) -> CsgOp {
        let mut op = self.clone();
        match &mut op {
            CsgOp::Union { left, right }
            | CsgOp::Difference { left, right }
            | CsgOp::Intersection { left, right } => {
                *left = map(*left);
                *right = map(*right);
            }
            CsgOp::Hull { children } => {
                for c in children.iter_mut() {
                    *c = map(*c);
                }
            }
            CsgOp::Translate { child, .. }
            | CsgOp::Rotate { child, .. }
            | CsgOp::Scale { child, .. }
            | CsgOp::Mirror { child, .. }
            | CsgOp::LinearExtrude { child, .. }
            | CsgOp::Offset { child, .. } => *child = map(*child),
            _ => {}
        }
        op
    }
}

/// A node in the IR graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,
    /// Optional human-readable name.
    pub name: Option<String>,
    /// The operation this node represents.
    pub op: CsgOp,
}

/// Display material for a scene entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDef {
    /// Material name (e.g. "shell", "text").
    pub name: String,
    /// Base color as `[r, g, b]` in 0.0..1.0.
    pub color: [f64; 3],
    /// Opacity in 0.0..1.0 (previews render the shell translucent).
    pub alpha: f64,
}

/// An entry in the scene: a root node with an assigned material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntry {
    /// Root node of this scene part.
    pub root: NodeId,
    /// Material key referencing a [`MaterialDef::name`].
    pub material: String,
}

/// A pcbcase document.
///
/// Contains the full IR DAG, material definitions, and scene assembly.
/// Maps are ordered so that serialization is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Format version string (e.g. "0.1").
    pub version: String,
    /// All nodes in the graph, keyed by [`NodeId`].
    pub nodes: BTreeMap<NodeId, Node>,
    /// Material definitions, keyed by name.
    pub materials: BTreeMap<String, MaterialDef>,
    /// Scene entries (assembled parts with materials).
    pub roots: Vec<SceneEntry>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            nodes: BTreeMap::new(),
            materials: BTreeMap::new(),
            roots: Vec::new(),
        }
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, IrError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, IrError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up a node, reporting `parent` as the referrer when missing.
    pub fn node(&self, parent: NodeId, id: NodeId) -> Result<&Node, IrError> {
        self.nodes
            .get(&id)
            .ok_or(IrError::DanglingReference { parent, child: id })
    }

    /// Renumber every node reachable from the scene roots.
    ///
    /// Nodes are visited depth-first, children in operand order, and numbered
    /// in post-order starting at 1. Unreachable nodes are dropped. Two
    /// documents that describe the same trees canonicalize to equal values
    /// regardless of how their ids were allocated.
    pub fn canonicalize(&self) -> Result<Document, IrError> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut in_progress = HashSet::new();

        fn visit(
            doc: &Document,
            id: NodeId,
            visited: &mut HashSet<NodeId>,
            in_progress: &mut HashSet<NodeId>,
            order: &mut Vec<NodeId>,
        ) -> Result<(), IrError> {
            if visited.contains(&id) {
                return Ok(());
            }
            if !in_progress.insert(id) {
                return Err(IrError::Cycle(id));
            }
            let node = &doc.nodes[&id];
            for child in node.op.children() {
                doc.node(id, child)?;
                visit(doc, child, visited, in_progress, order)?;
            }
            in_progress.remove(&id);
            visited.insert(id);
            order.push(id);
            Ok(())
        }

        for entry in &self.roots {
            if !self.nodes.contains_key(&entry.root) {
                return Err(IrError::MissingRoot(entry.root));
            }
            visit(self, entry.root, &mut visited, &mut in_progress, &mut order)?;
        }

        let id_map: HashMap<NodeId, NodeId> = order
            .iter()
            .enumerate()
            .map(|(i, &old)| (old, i as NodeId + 1))
            .collect();

        let mut doc = Document {
            version: self.version.clone(),
            nodes: BTreeMap::new(),
            materials: self.materials.clone(),
            roots: Vec::with_capacity(self.roots.len()),
        };
        for old in &order {
            let node = &self.nodes[old];
            let id = id_map[old];
            doc.nodes.insert(
                id,
                Node {
                    id,
                    name: node.name.clone(),
                    op: node.op.remap(|c| id_map[&c]),
                },
            );
        }
        for entry in &self.roots {
            doc.roots.push(SceneEntry {
                root: id_map[&entry.root],
                material: entry.material.clone(),
            });
        }
        Ok(doc)
    }
}

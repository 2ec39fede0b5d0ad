#![warn(missing_docs)]

//! pcbcase: parametric snap-fit PCB enclosures
//!
//! Computes the two halves of a printable enclosure around a PCB (rounded
//! shell, interlocking lip with snap tabs, wall slots, mounting posts, hinged
//! buttons and inlaid text) as CSG expression trees. Meshing and file export
//! belong to whatever engine consumes the resulting [`pcbcase_ir::Document`].
//!
//! # Example
//!
//! ```rust
//! use nalgebra::Vector3;
//! use pcbcase::{Enclosure, EnclosureConfig};
//!
//! let config = EnclosureConfig::new(Vector3::new(50.0, 30.0, 1.6));
//! let enclosure = Enclosure::build(&config).unwrap();
//! assert_eq!(enclosure.layout.outer_dim.x, 56.0);
//! let doc = enclosure.to_document().unwrap();
//! assert_eq!(doc.roots.len(), 2);
//! ```

use nalgebra::{Vector2, Vector3};
use pcbcase_ir::{
    CsgOp, Document, HAlign, IrError, MaterialDef, Node, NodeId, OffsetAmount, SceneEntry,
    VAlign, Vec2 as IrVec2, Vec3 as IrVec3,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

pub mod assembly;
mod bounds;
pub mod buttons;
pub mod config;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod lip;
pub mod posts;
pub mod shell;
pub mod slots;
pub mod text;

pub use assembly::Enclosure;
pub use config::{
    Button, EnclosureConfig, ExportSelection, MountPost, MountPostRestriction, Side, Slot, TextDef,
};
pub use error::{CaseError, CaseResult};
pub use geometry::BoundingBox;
pub use layout::LayoutFrame;

/// Global atomic counter for unique IR node IDs.
///
/// Ids only need to be unique while parts are combined; documents are
/// renumbered by [`Document::canonicalize`] before they leave the crate.
static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a globally unique [`NodeId`].
fn alloc_node_id() -> NodeId {
    NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A named piece of geometry.
///
/// Create primitives with [`Part::cube`], [`Part::cylinder`],
/// [`Part::circle`], etc., then combine them with CSG operations
/// ([`Part::union`], [`Part::difference`], [`Part::intersection`],
/// [`Part::hull`]) or the operator shorthands (`+`, `-`, `&`).
///
/// A Part is nothing but the IR subtree recording its construction.
/// Extract it with [`Part::to_document`].
#[derive(Debug, Clone)]
pub struct Part {
    /// Human-readable name for this part (used as the IR node name).
    pub name: String,
    ir_node_id: NodeId,
    ir_nodes: HashMap<NodeId, Node>,
}

impl Part {
    // =========================================================================
    // Internal constructors
    // =========================================================================

    fn with_ir(name: String, ir_node_id: NodeId, ir_nodes: HashMap<NodeId, Node>) -> Self {
        Self {
            name,
            ir_node_id,
            ir_nodes,
        }
    }

    /// Create a leaf IR node (primitive or empty).
    fn leaf(name: impl Into<String>, op: CsgOp) -> Self {
        let name = name.into();
        let id = alloc_node_id();
        let mut nodes = HashMap::new();
        nodes.insert(
            id,
            Node {
                id,
                name: Some(name.clone()),
                op,
            },
        );
        Self::with_ir(name, id, nodes)
    }

    /// Build a node over several children, merging their IR maps.
    fn combine(name: String, children: &[&Part], op: CsgOp) -> Self {
        let id = alloc_node_id();
        let mut nodes = HashMap::new();
        for child in children {
            nodes.extend(child.ir_nodes.iter().map(|(&k, v)| (k, v.clone())));
        }
        nodes.insert(
            id,
            Node {
                id,
                name: Some(name.clone()),
                op,
            },
        );
        Self::with_ir(name, id, nodes)
    }

    /// Build a unary transform node keeping this part's name.
    fn wrap(&self, op_fn: impl FnOnce(NodeId) -> CsgOp) -> Self {
        Self::combine(self.name.clone(), &[self], op_fn(self.ir_node_id))
    }

    // =========================================================================
    // Public constructors
    // =========================================================================

    /// Create an empty part.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::leaf(name, CsgOp::Empty)
    }

    /// Create a box with one corner at the origin.
    pub fn cube(name: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self::leaf(
            name,
            CsgOp::Cube {
                size: IrVec3::new(x, y, z),
            },
        )
    }

    /// Create a box covering `bb`.
    pub fn from_box(name: impl Into<String>, bb: &BoundingBox) -> Self {
        Self::cube(name, bb.size.x, bb.size.y, bb.size.z).translate_vec(bb.origin)
    }

    /// Create a cylinder along Z with its base on the XY plane.
    pub fn cylinder(name: impl Into<String>, radius: f64, height: f64, segments: u32) -> Self {
        Self::leaf(
            name,
            CsgOp::Cylinder {
                radius,
                height,
                segments,
            },
        )
    }

    /// Create a sphere centered at origin.
    pub fn sphere(name: impl Into<String>, radius: f64, segments: u32) -> Self {
        Self::leaf(name, CsgOp::Sphere { radius, segments })
    }

    /// Create a 2D rectangle with one corner at the origin.
    pub fn square(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self::leaf(
            name,
            CsgOp::Square {
                size: IrVec2::new(x, y),
            },
        )
    }

    /// Create a 2D circle centered at origin.
    pub fn circle(name: impl Into<String>, radius: f64, segments: u32) -> Self {
        Self::leaf(name, CsgOp::Circle { radius, segments })
    }

    /// Create a 2D polygon from its outline.
    pub fn polygon(name: impl Into<String>, points: &[Vector2<f64>]) -> Self {
        Self::leaf(
            name,
            CsgOp::Polygon {
                points: points.iter().map(|p| IrVec2::new(p.x, p.y)).collect(),
            },
        )
    }

    /// Create a 2D text outline.
    pub fn text(
        name: impl Into<String>,
        text: &str,
        font: &str,
        size: f64,
        halign: HAlign,
        valign: VAlign,
    ) -> Self {
        Self::leaf(
            name,
            CsgOp::Text {
                text: text.to_string(),
                font: font.to_string(),
                size,
                halign,
                valign,
            },
        )
    }

    // =========================================================================
    // CSG operations
    // =========================================================================

    /// Boolean difference (self - other).
    pub fn difference(&self, other: &Part) -> Self {
        Self::combine(
            format!("{}-diff", self.name),
            &[self, other],
            CsgOp::Difference {
                left: self.ir_node_id,
                right: other.ir_node_id,
            },
        )
    }

    /// Boolean union (self + other).
    pub fn union(&self, other: &Part) -> Self {
        Self::combine(
            format!("{}-union", self.name),
            &[self, other],
            CsgOp::Union {
                left: self.ir_node_id,
                right: other.ir_node_id,
            },
        )
    }

    /// Boolean intersection.
    pub fn intersection(&self, other: &Part) -> Self {
        Self::combine(
            format!("{}-intersect", self.name),
            &[self, other],
            CsgOp::Intersection {
                left: self.ir_node_id,
                right: other.ir_node_id,
            },
        )
    }

    /// Convex hull of `parts`.
    pub fn hull(name: impl Into<String>, parts: &[Part]) -> Self {
        let refs: Vec<&Part> = parts.iter().collect();
        Self::combine(
            name.into(),
            &refs,
            CsgOp::Hull {
                children: parts.iter().map(|p| p.ir_node_id).collect(),
            },
        )
    }

    /// Union of all `parts`, skipping empty ones; empty input gives an empty part.
    pub fn union_all(name: impl Into<String>, parts: impl IntoIterator<Item = Part>) -> Self {
        let name = name.into();
        let mut acc: Option<Part> = None;
        for part in parts.into_iter().filter(|p| !p.is_empty()) {
            acc = Some(match acc {
                None => part,
                Some(a) => a.union(&part),
            });
        }
        match acc {
            Some(part) => part.named(name),
            None => Part::empty(name),
        }
    }

    /// Subtract every part in `cutters` (skipping empty ones) from self.
    ///
    /// An empty part stays empty.
    pub fn difference_all<'a>(&self, cutters: impl IntoIterator<Item = &'a Part>) -> Self {
        if self.is_empty() {
            return self.clone();
        }
        cutters
            .into_iter()
            .filter(|c| !c.is_empty())
            .fold(self.clone(), |acc, c| acc.difference(c))
    }

    /// Rename the part and its root IR node.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if let Some(node) = self.ir_nodes.get_mut(&self.ir_node_id) {
            node.name = Some(name.clone());
        }
        self.name = name;
        self
    }

    // =========================================================================
    // Transforms
    // =========================================================================

    /// Translate the part.
    pub fn translate(&self, x: f64, y: f64, z: f64) -> Self {
        self.wrap(|child| CsgOp::Translate {
            child,
            offset: IrVec3::new(x, y, z),
        })
    }

    /// Translate by vector.
    pub fn translate_vec(&self, v: Vector3<f64>) -> Self {
        self.translate(v.x, v.y, v.z)
    }

    /// Rotate the part (angles in degrees, applied X then Y then Z).
    pub fn rotate(&self, x_deg: f64, y_deg: f64, z_deg: f64) -> Self {
        self.wrap(|child| CsgOp::Rotate {
            child,
            angles: IrVec3::new(x_deg, y_deg, z_deg),
        })
    }

    /// Scale the part.
    pub fn scale(&self, x: f64, y: f64, z: f64) -> Self {
        self.wrap(|child| CsgOp::Scale {
            child,
            factor: IrVec3::new(x, y, z),
        })
    }

    /// Mirror across the plane through the origin with normal `(x, y, z)`.
    pub fn mirror(&self, x: f64, y: f64, z: f64) -> Self {
        self.wrap(|child| CsgOp::Mirror {
            child,
            normal: IrVec3::new(x, y, z),
        })
    }

    // =========================================================================
    // 2D operations
    // =========================================================================

    /// Extrude a 2D part along +Z from z=0.
    pub fn linear_extrude(&self, height: f64) -> Self {
        self.wrap(|child| CsgOp::LinearExtrude {
            child,
            height,
            center: false,
        })
    }

    /// Rounded 2D offset (grow for positive `r`, shrink for negative).
    pub fn offset_radius(&self, r: f64) -> Self {
        self.wrap(|child| CsgOp::Offset {
            child,
            amount: OffsetAmount::Radius(r),
        })
    }

    /// Mitered 2D offset.
    pub fn offset_delta(&self, delta: f64) -> Self {
        self.wrap(|child| CsgOp::Offset {
            child,
            amount: OffsetAmount::Delta(delta),
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Check if the part is the empty leaf.
    pub fn is_empty(&self) -> bool {
        matches!(self.root_op(), CsgOp::Empty)
    }

    /// The operation at the root of this part's tree.
    pub fn root_op(&self) -> &CsgOp {
        &self.ir_nodes[&self.ir_node_id].op
    }

    /// Number of IR nodes in this part's tree.
    pub fn node_count(&self) -> usize {
        self.ir_nodes.len()
    }

    /// All IR nodes whose name equals `name`.
    pub fn nodes_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.ir_nodes
            .values()
            .filter(move |n| n.name.as_deref() == Some(name))
    }

    /// Conservative axis-aligned bounds of the part, or `None` if nothing
    /// with a known extent is in the tree (empty parts, bare text).
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        bounds::node_bounds(&self.ir_nodes, self.ir_node_id)
    }

    /// Extract the IR document for this part.
    ///
    /// The document contains all nodes in this part's construction DAG
    /// with this part's root node as the single scene entry.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.nodes = self.ir_nodes.iter().map(|(&k, v)| (k, v.clone())).collect();
        doc.roots.push(SceneEntry {
            root: self.ir_node_id,
            material: "default".to_string(),
        });
        doc
    }
}

// =============================================================================
// Operator overloads for ergonomic CSG
// =============================================================================

/// Union: `&a + &b`
impl std::ops::Add for &Part {
    type Output = Part;
    fn add(self, rhs: &Part) -> Part {
        self.union(rhs)
    }
}

/// Union: `a + b`
impl std::ops::Add for Part {
    type Output = Part;
    fn add(self, rhs: Part) -> Part {
        self.union(&rhs)
    }
}

/// Difference: `&a - &b`
impl std::ops::Sub for &Part {
    type Output = Part;
    fn sub(self, rhs: &Part) -> Part {
        self.difference(rhs)
    }
}

/// Difference: `a - b`
impl std::ops::Sub for Part {
    type Output = Part;
    fn sub(self, rhs: Part) -> Part {
        self.difference(&rhs)
    }
}

/// Intersection: `&a & &b`
impl std::ops::BitAnd for &Part {
    type Output = Part;
    fn bitand(self, rhs: &Part) -> Part {
        self.intersection(rhs)
    }
}

/// Intersection: `a & b`
impl std::ops::BitAnd for Part {
    type Output = Part;
    fn bitand(self, rhs: Part) -> Part {
        self.intersection(&rhs)
    }
}

// =============================================================================
// Scene (multi-part output with materials)
// =============================================================================

/// A scene node containing a part with its material assignment.
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// The geometry for this node.
    pub part: Part,
    /// Key into the scene's materials for this node.
    pub material_key: String,
}

impl SceneNode {
    /// Create a new scene node with a part and material key.
    pub fn new(part: Part, material_key: impl Into<String>) -> Self {
        Self {
            part,
            material_key: material_key.into(),
        }
    }
}

/// A scene containing several parts with different materials.
///
/// Unlike [`Part::union`] which merges geometry into one solid, a Scene
/// keeps the enclosure halves and text inserts as separate solids.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Name of the scene.
    pub name: String,
    /// Ordered list of parts with their material assignments.
    pub nodes: Vec<SceneNode>,
    /// Material definitions referenced by the nodes.
    pub materials: Vec<MaterialDef>,
}

impl Scene {
    /// Create a new empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            materials: Vec::new(),
        }
    }

    /// Add a part with its material key.
    pub fn add(&mut self, part: Part, material_key: impl Into<String>) {
        self.nodes.push(SceneNode::new(part, material_key));
    }

    /// Register a material definition.
    pub fn add_material(&mut self, material: MaterialDef) {
        self.materials.push(material);
    }

    /// Get total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if scene is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find a node by part name.
    pub fn get(&self, name: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.part.name == name)
    }

    /// Extract the IR document for the full scene (multi-root).
    ///
    /// Each scene node becomes a root entry in the document with its
    /// assigned material key. All IR nodes from all parts are merged.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for scene_node in &self.nodes {
            doc.nodes.extend(
                scene_node
                    .part
                    .ir_nodes
                    .iter()
                    .map(|(&k, v)| (k, v.clone())),
            );
            doc.roots.push(SceneEntry {
                root: scene_node.part.ir_node_id,
                material: scene_node.material_key.clone(),
            });
        }
        for material in &self.materials {
            doc.materials.insert(material.name.clone(), material.clone());
        }
        doc
    }

    /// The scene document with nodes renumbered deterministically.
    pub fn to_canonical_document(&self) -> Result<Document, IrError> {
        self.to_document().canonicalize()
    }
}

use kurbo::{Point, Size};

use crate::{
    effects::EffectPipeline,
    error::{EaselError, EaselResult},
};

/// Stable arena id for a scene node.
///
/// Controllers hold ids, never references, so removing a node can never
/// leave a dangling alias behind.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId(pub u64);

/// Anchor point that `left`/`top` and rotation refer to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Origin {
    #[default]
    TopLeft,
    Center,
}

/// Kind-specific geometry of a node, in unscaled node-local units.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum NodeShape {
    Image { width: f64, height: f64 },
    Rect { width: f64, height: f64 },
    Circle { radius: f64 },
    Triangle { width: f64, height: f64 },
    Ellipse { rx: f64, ry: f64 },
    /// Second endpoint relative to (left, top).
    Line { dx: f64, dy: f64 },
    Text { content: String, font_size: f64, width: f64, height: f64 },
    /// Freehand stroke, points relative to (left, top).
    Stroke { points: Vec<Point> },
}

impl NodeShape {
    /// Unscaled bounding size of the shape.
    pub fn base_size(&self) -> Size {
        match self {
            NodeShape::Image { width, height }
            | NodeShape::Rect { width, height }
            | NodeShape::Triangle { width, height } => Size::new(*width, *height),
            NodeShape::Circle { radius } => Size::new(radius * 2.0, radius * 2.0),
            NodeShape::Ellipse { rx, ry } => Size::new(rx * 2.0, ry * 2.0),
            NodeShape::Line { dx, dy } => Size::new(dx.abs(), dy.abs()),
            NodeShape::Text { width, height, .. } => Size::new(*width, *height),
            NodeShape::Stroke { points } => {
                let mut max = Point::ZERO;
                for p in points {
                    max.x = max.x.max(p.x.abs());
                    max.y = max.y.max(p.y.abs());
                }
                Size::new(max.x, max.y)
            }
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeShape::Image { .. } => "image",
            NodeShape::Rect { .. } => "rect",
            NodeShape::Circle { .. } => "circle",
            NodeShape::Triangle { .. } => "triangle",
            NodeShape::Ellipse { .. } => "ellipse",
            NodeShape::Line { .. } => "line",
            NodeShape::Text { .. } => "text",
            NodeShape::Stroke { .. } => "stroke",
        }
    }
}

/// Fill/stroke styling. Colors are CSS-style strings as the UI hands them in.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeStyle {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
    pub stroke_dash: Option<Vec<f64>>,
    pub opacity: f64,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_width: 0.0,
            stroke_dash: None,
            opacity: 1.0,
        }
    }
}

/// One visual element of the scene.
///
/// In the live scene all geometry is in render space; in a persisted
/// [`Document`](crate::codec::Document) it is in canonical space. The
/// conversion happens only inside the persistence codec.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Role tag; clip-frame nodes are named with a `Frame` prefix.
    pub name: Option<String>,
    pub shape: NodeShape,
    pub left: f64,
    pub top: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Rotation in degrees around the origin point.
    pub angle: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    pub origin: Origin,
    pub style: NodeStyle,
    pub selectable: bool,
    pub absolutely_positioned: bool,
    /// Cached transformed corners, refreshed by [`Node::set_coords`].
    #[serde(skip)]
    coords: Option<[Point; 4]>,
}

impl Node {
    pub fn new(shape: NodeShape, left: f64, top: f64) -> Self {
        Self {
            id: NodeId(0),
            name: None,
            shape,
            left,
            top,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            flip_x: false,
            flip_y: false,
            origin: Origin::TopLeft,
            style: NodeStyle::default(),
            selectable: true,
            absolutely_positioned: false,
            coords: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_style(mut self, style: NodeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Bounding size after scale factors are applied.
    pub fn scaled_size(&self) -> Size {
        let base = self.shape.base_size();
        Size::new(base.width * self.scale_x, base.height * self.scale_y)
    }

    /// Recompute and cache the transformed corner coordinates.
    ///
    /// Mutating geometry leaves the cache stale; batch edits refresh each
    /// node afterwards, mirroring how the scene graph re-derives control
    /// coordinates.
    pub fn set_coords(&mut self) {
        self.coords = Some(crate::geom::corners(self));
    }

    pub fn cached_coords(&self) -> Option<[Point; 4]> {
        self.coords
    }

    pub fn has_name_prefix(&self, prefix: &str) -> bool {
        self.name.as_deref().is_some_and(|n| n.starts_with(prefix))
    }
}

// The coordinate cache is derived state and excluded from equality, so a
// node deserialized with a cold cache still equals the one that was saved.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.shape == other.shape
            && self.left == other.left
            && self.top == other.top
            && self.scale_x == other.scale_x
            && self.scale_y == other.scale_y
            && self.angle == other.angle
            && self.flip_x == other.flip_x
            && self.flip_y == other.flip_y
            && self.origin == other.origin
            && self.style == other.style
            && self.selectable == other.selectable
            && self.absolutely_positioned == other.absolutely_positioned
    }
}

/// Live editing scene: an ordered node arena (insertion order = z order)
/// plus the background raster, the optional clip frame, and the effect
/// pipeline applied to the background.
#[derive(Clone, Debug)]
pub struct Scene {
    nodes: Vec<Node>,
    next_id: u64,
    background: NodeId,
    clip_frame: Option<NodeId>,
    /// Authoritative pixel dimensions used for persistence. Changes only
    /// through [`Scene::resize_image`].
    canonical_size: Size,
    /// Dimensions the scene is currently edited at.
    rendered_size: Size,
    pub background_color: String,
    effects: EffectPipeline,
}

impl Scene {
    /// Create a scene from a freshly loaded raster of the given pixel size.
    ///
    /// The background node is centered on itself, non-selectable, and
    /// canonical and rendered dimensions both start at the image size.
    pub fn from_image(width: f64, height: f64) -> EaselResult<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(EaselError::validation("image dimensions must be > 0"));
        }
        let mut background =
            Node::new(NodeShape::Image { width, height }, width / 2.0, height / 2.0)
                .with_origin(Origin::Center);
        background.id = NodeId(1);
        background.selectable = false;
        background.set_coords();

        Ok(Self {
            nodes: vec![background],
            next_id: 2,
            background: NodeId(1),
            clip_frame: None,
            canonical_size: Size::new(width, height),
            rendered_size: Size::new(width, height),
            background_color: "#000".to_string(),
            effects: EffectPipeline::default(),
        })
    }

    /// Rebuild a scene from already-materialized nodes (document load path).
    pub(crate) fn from_parts(
        nodes: Vec<Node>,
        background: NodeId,
        clip_frame: Option<NodeId>,
        canonical_size: Size,
        rendered_size: Size,
        background_color: String,
        effects: EffectPipeline,
    ) -> EaselResult<Self> {
        let next_id = nodes.iter().map(|n| n.id.0).max().unwrap_or(0) + 1;
        let scene = Self {
            nodes,
            next_id,
            background,
            clip_frame,
            canonical_size,
            rendered_size,
            background_color,
            effects,
        };
        scene.validate()?;
        Ok(scene)
    }

    /// Insert a node at the top of the z order, assigning its id.
    pub fn add(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        node.id = id;
        node.set_coords();
        self.nodes.push(node);
        id
    }

    /// Remove a node. Clears the clip-frame reference when it pointed at
    /// the removed node. Removing the background is rejected.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        if id == self.background {
            return None;
        }
        let idx = self.nodes.iter().position(|n| n.id == id)?;
        if self.clip_frame == Some(id) {
            self.clip_frame = None;
        }
        Some(self.nodes.remove(idx))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn background_id(&self) -> NodeId {
        self.background
    }

    pub fn background(&self) -> &Node {
        // The background id is validated at construction and cannot be removed.
        self.nodes
            .iter()
            .find(|n| n.id == self.background)
            .unwrap_or(&self.nodes[0])
    }

    pub fn background_mut(&mut self) -> &mut Node {
        let id = self.background;
        let idx = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .unwrap_or_default();
        &mut self.nodes[idx]
    }

    pub fn clip_frame(&self) -> Option<NodeId> {
        self.clip_frame
    }

    pub(crate) fn set_clip_frame(&mut self, id: Option<NodeId>) {
        self.clip_frame = id;
    }

    pub fn canonical_size(&self) -> Size {
        self.canonical_size
    }

    pub fn rendered_size(&self) -> Size {
        self.rendered_size
    }

    /// Adopt the surface dimensions the scene is currently edited at.
    /// Node geometry is expressed in this space; callers that change it
    /// are responsible for the nodes already placed.
    pub fn set_rendered_size(&mut self, size: Size) {
        self.rendered_size = size;
    }

    /// Native pixel dimensions of the background raster.
    pub fn original_size(&self) -> Size {
        self.background().shape.base_size()
    }

    pub fn effects(&self) -> &EffectPipeline {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut EffectPipeline {
        &mut self.effects
    }

    /// First node whose name starts with `prefix`, in z order.
    pub fn find_by_name_prefix(&self, prefix: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.has_name_prefix(prefix))
    }

    /// Ids of every node whose name starts with `prefix`.
    pub fn ids_by_name_prefix(&self, prefix: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.has_name_prefix(prefix))
            .map(|n| n.id)
            .collect()
    }

    /// Count of nodes with the given shape kind name.
    pub fn count_kind(&self, kind: &str) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.shape.kind_name() == kind)
            .count()
    }

    /// The explicit resize operation: the only path that changes the
    /// canonical dimensions. The background is rescaled so it renders at
    /// the new size; with `keep_aspect` the height follows the width's
    /// ratio.
    pub fn resize_image(&mut self, width: f64, height: f64, keep_aspect: bool) -> EaselResult<()> {
        if !(width > 0.0 && height > 0.0) {
            return Err(EaselError::validation("resize dimensions must be > 0"));
        }
        let native = self.original_size();
        let height = if keep_aspect {
            (width / (native.width / native.height)).floor()
        } else {
            height
        };

        let bg = self.background_mut();
        bg.scale_x = width / native.width;
        bg.scale_y = height / native.height;
        bg.left = width / 2.0;
        bg.top = height / 2.0;
        bg.set_coords();

        self.canonical_size = Size::new(width, height);
        self.rendered_size = Size::new(width, height);
        Ok(())
    }

    /// Multiply the canonical dimensions, e.g. the 2x / 4x upscale actions.
    pub fn resize_image_by(&mut self, factor: f64) -> EaselResult<()> {
        let size = self.canonical_size;
        self.resize_image(size.width * factor, size.height * factor, false)
    }

    /// Reset the image to its native pixel dimensions.
    pub fn reset_image_size(&mut self) -> EaselResult<()> {
        let native = self.original_size();
        self.resize_image(native.width, native.height, false)
    }

    pub fn validate(&self) -> EaselResult<()> {
        if !(self.canonical_size.width > 0.0 && self.canonical_size.height > 0.0) {
            return Err(EaselError::validation("canonical size must be > 0"));
        }
        if !(self.rendered_size.width > 0.0 && self.rendered_size.height > 0.0) {
            return Err(EaselError::validation("rendered size must be > 0"));
        }

        let bg = self
            .nodes
            .iter()
            .find(|n| n.id == self.background)
            .ok_or_else(|| EaselError::validation("background node is missing"))?;
        if !matches!(bg.shape, NodeShape::Image { .. }) {
            return Err(EaselError::validation("background node must be an image"));
        }

        if let Some(frame) = self.clip_frame {
            if self.node(frame).is_none() {
                return Err(EaselError::validation(
                    "clip frame references a missing node",
                ));
            }
        }

        let mut seen = std::collections::BTreeSet::new();
        for n in &self.nodes {
            if !seen.insert(n.id) {
                return Err(EaselError::validation(format!(
                    "duplicate node id {}",
                    n.id.0
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_scene_centers_background() {
        let scene = Scene::from_image(800.0, 600.0).unwrap();
        let bg = scene.background();
        assert_eq!(bg.left, 400.0);
        assert_eq!(bg.top, 300.0);
        assert_eq!(bg.origin, Origin::Center);
        assert!(!bg.selectable);
        assert_eq!(scene.canonical_size(), Size::new(800.0, 600.0));
        assert_eq!(scene.rendered_size(), Size::new(800.0, 600.0));
    }

    #[test]
    fn add_assigns_monotonic_ids() {
        let mut scene = Scene::from_image(100.0, 100.0).unwrap();
        let a = scene.add(Node::new(
            NodeShape::Rect {
                width: 10.0,
                height: 10.0,
            },
            0.0,
            0.0,
        ));
        let b = scene.add(Node::new(NodeShape::Circle { radius: 5.0 }, 0.0, 0.0));
        assert!(b.0 > a.0);
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn remove_clears_clip_frame_reference() {
        let mut scene = Scene::from_image(100.0, 100.0).unwrap();
        let id = scene.add(
            Node::new(
                NodeShape::Rect {
                    width: 10.0,
                    height: 10.0,
                },
                0.0,
                0.0,
            )
            .with_name("Frame 1 rect"),
        );
        scene.set_clip_frame(Some(id));
        scene.remove(id);
        assert_eq!(scene.clip_frame(), None);
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn background_cannot_be_removed() {
        let mut scene = Scene::from_image(100.0, 100.0).unwrap();
        let bg = scene.background_id();
        assert!(scene.remove(bg).is_none());
    }

    #[test]
    fn resize_changes_canonical_size_and_background_scale() {
        let mut scene = Scene::from_image(1000.0, 800.0).unwrap();
        scene.resize_image(500.0, 999.0, true).unwrap();
        assert_eq!(scene.canonical_size(), Size::new(500.0, 400.0));
        let bg = scene.background();
        assert_eq!(bg.scale_x, 0.5);
        assert_eq!(bg.scale_y, 0.5);

        scene.resize_image_by(2.0).unwrap();
        assert_eq!(scene.canonical_size(), Size::new(1000.0, 800.0));

        scene.reset_image_size().unwrap();
        assert_eq!(scene.canonical_size(), Size::new(1000.0, 800.0));
        assert_eq!(scene.background().scale_x, 1.0);
    }

    #[test]
    fn name_prefix_lookup_finds_first_in_z_order() {
        let mut scene = Scene::from_image(100.0, 100.0).unwrap();
        let first = scene.add(
            Node::new(NodeShape::Circle { radius: 5.0 }, 0.0, 0.0).with_name("Frame 1 circle"),
        );
        scene.add(
            Node::new(
                NodeShape::Rect {
                    width: 4.0,
                    height: 4.0,
                },
                0.0,
                0.0,
            )
            .with_name("Frame 1 rect"),
        );
        assert_eq!(scene.find_by_name_prefix("Frame").unwrap().id, first);
        assert_eq!(scene.ids_by_name_prefix("Frame").len(), 2);
    }
}

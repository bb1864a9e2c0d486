//! Drag-to-size shape construction, freehand drawing, and text insertion.
//!
//! A gesture is pointer-down (1px draft), any number of pointer-moves
//! (resize with rounded absolute deltas, or point accumulation for a
//! freehand stroke), and pointer-up (finalize). The session stays in
//! `Dragging` for the whole gesture and exactly one modified record is
//! emitted at the end. Text is not a gesture; [`add_text`] inserts and
//! records in one step.

use kurbo::Point;

use crate::{
    activity::{ActivityEntry, ActivityLog},
    model::{Node, NodeId, NodeShape, NodeStyle, Origin, Scene},
    session::{Session, SessionMode},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DraftKind {
    Rect,
    Circle,
    Triangle,
    Line,
    Freehand,
}

/// An in-flight shape gesture. Holds the draft node's id and the
/// pointer-down anchor; consumed by [`ShapeDraft::finish`] or
/// [`ShapeDraft::cancel`].
#[derive(Debug)]
pub struct ShapeDraft {
    kind: DraftKind,
    node: NodeId,
    anchor: Point,
}

impl ShapeDraft {
    /// Pointer-down: insert a 1px draft at the pointer and enter
    /// `Dragging`. Circles are centered on the pointer.
    pub fn begin(
        kind: DraftKind,
        style: NodeStyle,
        scene: &mut Scene,
        session: &mut Session,
        at: Point,
    ) -> Self {
        session.set_mode(SessionMode::Dragging);

        let node = match kind {
            DraftKind::Rect => Node::new(
                NodeShape::Rect {
                    width: 1.0,
                    height: 1.0,
                },
                at.x,
                at.y,
            ),
            DraftKind::Triangle => Node::new(
                NodeShape::Triangle {
                    width: 1.0,
                    height: 1.0,
                },
                at.x,
                at.y,
            ),
            DraftKind::Circle => {
                Node::new(NodeShape::Circle { radius: 1.0 }, at.x, at.y).with_origin(Origin::Center)
            }
            DraftKind::Line => Node::new(NodeShape::Line { dx: 0.0, dy: 0.0 }, at.x, at.y),
            DraftKind::Freehand => Node::new(
                NodeShape::Stroke {
                    points: vec![Point::ZERO],
                },
                at.x,
                at.y,
            ),
        };
        let id = scene.add(node.with_style(style));

        Self {
            kind,
            node: id,
            anchor: at,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Pointer-move: resize the draft from the anchor to the pointer.
    /// Extents are rounded absolute deltas and never collapse below 1px;
    /// a freehand stroke appends the pointer as an anchor-relative point.
    pub fn update(&self, scene: &mut Scene, to: Point) {
        let dx = to.x - self.anchor.x;
        let dy = to.y - self.anchor.y;
        let Some(node) = scene.node_mut(self.node) else {
            return;
        };
        match (self.kind, &mut node.shape) {
            (DraftKind::Rect, NodeShape::Rect { width, height })
            | (DraftKind::Triangle, NodeShape::Triangle { width, height }) => {
                *width = dx.abs().round().max(1.0);
                *height = dy.abs().round().max(1.0);
            }
            (DraftKind::Circle, NodeShape::Circle { radius }) => {
                *radius = dy.abs().round().max(1.0);
            }
            (DraftKind::Line, NodeShape::Line { dx: ex, dy: ey }) => {
                *ex = dx.round();
                *ey = dy.round();
            }
            (DraftKind::Freehand, NodeShape::Stroke { points }) => {
                points.push(Point::new(dx, dy));
            }
            _ => {}
        }
    }

    /// Pointer-up: refresh coordinates, leave `Dragging`, and emit the
    /// gesture's single modified record.
    pub fn finish(self, scene: &mut Scene, session: &mut Session) -> NodeId {
        if let Some(node) = scene.node_mut(self.node) {
            node.set_coords();
        }
        session.set_mode(SessionMode::Idle);
        session.record_forced(Some(self.node), "object modified");
        self.node
    }

    /// Abandon the gesture, removing the draft without a record.
    pub fn cancel(self, scene: &mut Scene, session: &mut Session) {
        scene.remove(self.node);
        session.set_mode(SessionMode::Idle);
    }
}

/// Insert a text node at the pointer, recording it in the history and the
/// activity log. The box starts one line high; editing reflows it later.
pub fn add_text(
    content: impl Into<String>,
    font_size: f64,
    at: Point,
    style: NodeStyle,
    scene: &mut Scene,
    session: &mut Session,
    log: &mut ActivityLog,
) -> NodeId {
    let content = content.into();
    let node = Node::new(
        NodeShape::Text {
            content: content.clone(),
            font_size,
            width: 200.0,
            height: font_size * 1.2,
        },
        at.x,
        at.y,
    )
    .with_style(style);
    let id = scene.add(node);

    session.record(Some(id), "text added");
    log.push(
        ActivityEntry::new("text", "add", "click", "text added")
            .with_param(content)
            .with_obj_type("text"),
    );
    id
}

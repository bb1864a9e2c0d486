//! Clip-frame lifecycle: create a dashed candidate shape, apply it as the
//! background's mask, reset it, and purge abandoned drafts on teardown.

use crate::{
    activity::{ActivityEntry, ActivityLog},
    model::{Node, NodeId, NodeShape, NodeStyle, Scene},
    session::Session,
};

/// Name prefix that marks a node as a clip-frame candidate.
pub const FRAME_PREFIX: &str = "Frame";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    Rect,
    Circle,
    Triangle,
    Ellipse,
}

impl FrameKind {
    pub fn kind_name(self) -> &'static str {
        match self {
            FrameKind::Rect => "rect",
            FrameKind::Circle => "circle",
            FrameKind::Triangle => "triangle",
            FrameKind::Ellipse => "ellipse",
        }
    }

    /// Default geometry of a fresh candidate: (shape, left, top).
    fn starter(self) -> (NodeShape, f64, f64) {
        match self {
            FrameKind::Circle => (NodeShape::Circle { radius: 50.0 }, 50.0, 100.0),
            FrameKind::Rect => (
                NodeShape::Rect {
                    width: 100.0,
                    height: 60.0,
                },
                50.0,
                100.0,
            ),
            FrameKind::Triangle => (
                NodeShape::Triangle {
                    width: 60.0,
                    height: 60.0,
                },
                10.0,
                10.0,
            ),
            FrameKind::Ellipse => (NodeShape::Ellipse { rx: 50.0, ry: 30.0 }, 50.0, 50.0),
        }
    }
}

fn frame_style() -> NodeStyle {
    NodeStyle {
        fill: None,
        stroke: Some("red".to_string()),
        stroke_width: 1.0,
        stroke_dash: Some(vec![5.0, 5.0]),
        opacity: 1.0,
    }
}

/// Owns the currently selected frame candidate. At most one mask is active
/// at a time; candidates that were never applied are discarded.
#[derive(Clone, Debug, Default)]
pub struct ClipFrameController {
    selected: Option<NodeId>,
}

impl ClipFrameController {
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Add a dashed, unfilled candidate shape. The ordinal in its name
    /// counts existing shapes of the same kind and is diagnostic only.
    /// A previously selected candidate that was never applied is removed
    /// first.
    pub fn create_frame(
        &mut self,
        kind: FrameKind,
        scene: &mut Scene,
        session: &mut Session,
        log: &mut ActivityLog,
    ) -> NodeId {
        if let Some(prev) = self.selected.take() {
            if scene.clip_frame() != Some(prev) {
                scene.remove(prev);
            }
        }

        let ordinal = scene.count_kind(kind.kind_name()) + 1;
        let (shape, left, top) = kind.starter();
        let node = Node::new(shape, left, top)
            .with_name(format!("{FRAME_PREFIX} {ordinal} {}", kind.kind_name()))
            .with_style(frame_style());
        let id = scene.add(node);

        self.selected = Some(id);
        session.record(Some(id), "frame added");
        log.push(
            ActivityEntry::new("crop", "shape", "add", "frame candidate added")
                .with_param(kind.kind_name())
                .with_obj_type("frame"),
        );
        id
    }

    /// Attach the first `Frame`-named node as the background's mask. The
    /// node is pinned in place so the mask cannot drift with the image.
    /// No candidate is a no-op.
    pub fn apply_frame(
        &mut self,
        scene: &mut Scene,
        session: &mut Session,
        log: &mut ActivityLog,
    ) -> Option<NodeId> {
        let candidates = scene.ids_by_name_prefix(FRAME_PREFIX);
        if candidates.len() > 1 {
            tracing::warn!(
                count = candidates.len(),
                "multiple frame candidates; applying the first in z order"
            );
        }
        let id = *candidates.first()?;

        if let Some(node) = scene.node_mut(id) {
            node.absolutely_positioned = true;
            node.set_coords();
        }
        scene.set_clip_frame(Some(id));
        self.selected = Some(id);

        session.record(Some(id), "clip applied");
        log.push(ActivityEntry::new("crop", "shape", "click", "clip applied").with_obj_type("frame"));
        Some(id)
    }

    /// Detach the active mask and remove its shape from the scene,
    /// restoring the background's pre-mask bounds. Without an active mask
    /// this is a no-op.
    pub fn reset_frame(&mut self, scene: &mut Scene, session: &mut Session, log: &mut ActivityLog) {
        let Some(id) = scene.clip_frame() else {
            return;
        };
        scene.remove(id);
        if self.selected == Some(id) {
            self.selected = None;
        }

        session.record(Some(id), "clip reset");
        log.push(ActivityEntry::new("crop", "shape", "click", "clip reset").with_obj_type("frame"));
    }

    /// Panel teardown: an applied mask is load-bearing and survives with
    /// only the selection cleared; unapplied frame drafts are purged.
    pub fn teardown(&mut self, scene: &mut Scene) {
        self.selected = None;
        let applied = scene.clip_frame();
        for id in scene.ids_by_name_prefix(FRAME_PREFIX) {
            if Some(id) != applied {
                scene.remove(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Scene, Session, ActivityLog, ClipFrameController) {
        (
            Scene::from_image(400.0, 300.0).unwrap(),
            Session::default(),
            ActivityLog::default(),
            ClipFrameController::default(),
        )
    }

    #[test]
    fn frame_names_count_same_kind_shapes() {
        let (mut scene, mut session, mut log, mut ctl) = setup();
        scene.add(Node::new(NodeShape::Circle { radius: 3.0 }, 0.0, 0.0));
        let id = ctl.create_frame(FrameKind::Circle, &mut scene, &mut session, &mut log);
        assert_eq!(
            scene.node(id).unwrap().name.as_deref(),
            Some("Frame 2 circle")
        );
        let style = &scene.node(id).unwrap().style;
        assert_eq!(style.fill, None);
        assert_eq!(style.stroke_dash.as_deref(), Some(&[5.0, 5.0][..]));
    }

    #[test]
    fn new_candidate_discards_unapplied_predecessor() {
        let (mut scene, mut session, mut log, mut ctl) = setup();
        let first = ctl.create_frame(FrameKind::Rect, &mut scene, &mut session, &mut log);
        let second = ctl.create_frame(FrameKind::Ellipse, &mut scene, &mut session, &mut log);
        assert!(scene.node(first).is_none());
        assert_eq!(ctl.selected(), Some(second));
    }

    #[test]
    fn apply_pins_the_frame_and_sets_the_mask() {
        let (mut scene, mut session, mut log, mut ctl) = setup();
        let id = ctl.create_frame(FrameKind::Rect, &mut scene, &mut session, &mut log);
        let applied = ctl.apply_frame(&mut scene, &mut session, &mut log);
        assert_eq!(applied, Some(id));
        assert_eq!(scene.clip_frame(), Some(id));
        assert!(scene.node(id).unwrap().absolutely_positioned);
    }

    #[test]
    fn mask_toggle_is_reversible() {
        let (mut scene, mut session, mut log, mut ctl) = setup();
        let bbox = crate::geom::rotated_bounding_box(scene.background());

        ctl.create_frame(FrameKind::Circle, &mut scene, &mut session, &mut log);
        let id = ctl.apply_frame(&mut scene, &mut session, &mut log).unwrap();
        ctl.reset_frame(&mut scene, &mut session, &mut log);

        assert_eq!(scene.clip_frame(), None);
        assert!(scene.node(id).is_none());
        assert_eq!(ctl.selected(), None);
        assert_eq!(crate::geom::rotated_bounding_box(scene.background()), bbox);

        // Reset without a mask is a no-op.
        let records = session.history().len();
        ctl.reset_frame(&mut scene, &mut session, &mut log);
        assert_eq!(session.history().len(), records);
    }

    #[test]
    fn teardown_purges_drafts_but_keeps_applied_mask() {
        let (mut scene, mut session, mut log, mut ctl) = setup();
        ctl.create_frame(FrameKind::Rect, &mut scene, &mut session, &mut log);
        let applied = ctl.apply_frame(&mut scene, &mut session, &mut log).unwrap();
        // A stray draft someone named by hand.
        let stray = scene.add(
            Node::new(NodeShape::Circle { radius: 5.0 }, 0.0, 0.0).with_name("Frame 1 circle"),
        );
        ctl.teardown(&mut scene);
        assert!(scene.node(applied).is_some());
        assert!(scene.node(stray).is_none());
        assert_eq!(ctl.selected(), None);
    }
}

//! Corner and bounding-box math for transformed nodes.

use kurbo::{Affine, Point, Rect, Vec2};

use crate::model::{Node, Origin};

/// The four transformed corners of a node, clockwise from the logical
/// top-left, after scale, flips, and rotation about the origin point.
pub fn corners(node: &Node) -> [Point; 4] {
    let size = node.scaled_size();
    let (w, h) = (size.width, size.height);

    let anchor = Point::new(node.left, node.top);
    let offset = match node.origin {
        Origin::TopLeft => Vec2::ZERO,
        Origin::Center => Vec2::new(-w / 2.0, -h / 2.0),
    };

    let sx = if node.flip_x { -1.0 } else { 1.0 };
    let sy = if node.flip_y { -1.0 } else { 1.0 };

    let local = [
        Vec2::new(0.0, 0.0),
        Vec2::new(w, 0.0),
        Vec2::new(w, h),
        Vec2::new(0.0, h),
    ];

    let rot = Affine::rotate_about(node.angle.to_radians(), anchor);
    local.map(|c| {
        let v = offset + c;
        rot * (anchor + Vec2::new(v.x * sx, v.y * sy))
    })
}

/// Axis-aligned bounding box of the node's transformed corners. Reads
/// the coordinate cache when it is warm; mutations must refresh it with
/// [`Node::set_coords`] before the box is current.
pub fn rotated_bounding_box(node: &Node) -> Rect {
    let pts = node.cached_coords().unwrap_or_else(|| corners(node));
    let mut min = pts[0];
    let mut max = pts[0];
    for p in &pts[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Rect::new(min.x, min.y, max.x, max.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeShape;

    fn rect_node(w: f64, h: f64) -> Node {
        Node::new(
            NodeShape::Rect {
                width: w,
                height: h,
            },
            10.0,
            20.0,
        )
    }

    #[test]
    fn unrotated_corners_match_extent() {
        let node = rect_node(30.0, 40.0);
        let c = corners(&node);
        assert_eq!(c[0], Point::new(10.0, 20.0));
        assert_eq!(c[2], Point::new(40.0, 60.0));
    }

    #[test]
    fn quarter_turn_swaps_box_dimensions() {
        let mut node = rect_node(30.0, 40.0);
        node.angle = 90.0;
        let bb = rotated_bounding_box(&node);
        assert!((bb.width() - 40.0).abs() < 1e-9);
        assert!((bb.height() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn center_origin_straddles_anchor() {
        let mut node = rect_node(30.0, 40.0);
        node.origin = crate::model::Origin::Center;
        let bb = rotated_bounding_box(&node);
        assert!((bb.center().x - 10.0).abs() < 1e-9);
        assert!((bb.center().y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn bounding_box_reads_the_coordinate_cache() {
        let mut node = rect_node(30.0, 40.0);
        node.set_coords();
        let before = rotated_bounding_box(&node);

        // Stale cache until the owner refreshes it.
        node.scale_x = 2.0;
        assert_eq!(rotated_bounding_box(&node), before);

        node.set_coords();
        assert!((rotated_bounding_box(&node).width() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn scale_factors_grow_the_box() {
        let mut node = rect_node(30.0, 40.0);
        node.scale_x = 2.0;
        node.scale_y = 0.5;
        let bb = rotated_bounding_box(&node);
        assert!((bb.width() - 60.0).abs() < 1e-9);
        assert!((bb.height() - 20.0).abs() < 1e-9);
    }
}

//! Resolution-independent persistence.
//!
//! A scene is edited at whatever size the container dictates, but it is
//! always saved in canonical pixel space. `to_document` scales every node
//! into canonical space around the background anchor, snapshots, then
//! inverts the scaling with cached reciprocals of the exact factors it
//! applied, so saving is observation-free for the live scene.

use kurbo::{Rect, Size};
use serde_json::Value;

use crate::{
    activity::ActivityLog,
    effects::{EffectPipeline, parse_effect},
    error::{EaselError, EaselResult},
    frame::FRAME_PREFIX,
    model::{Node, NodeId, NodeShape, Origin, Scene},
    render::{SnapshotRenderer, encode_png},
    viewport::Viewport,
};

pub const DOCUMENT_VERSION: u32 = 1;

mod base64_bytes {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(de)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}

/// Persisted form of an editing session. All node geometry is in
/// canonical pixel space.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Document {
    pub version: u32,
    pub name: String,
    pub canonical_size: Size,
    /// Size the scene was edited at when saved; informational.
    pub rendered_size: Size,
    pub original_size: Size,
    pub background_color: String,
    pub nodes: Vec<Node>,
    pub background: NodeId,
    pub clip_frame: Option<NodeId>,
    /// Parallel lists: `effects[i]` is applied with `effect_params[i]`.
    pub effects: Vec<String>,
    pub effect_params: Vec<Value>,
    #[serde(with = "base64_bytes")]
    pub snapshot_png: Vec<u8>,
    pub logs: ActivityLog,
}

impl Document {
    pub fn validate(&self) -> EaselResult<()> {
        if self.version != DOCUMENT_VERSION {
            return Err(EaselError::document(format!(
                "unsupported document version {}",
                self.version
            )));
        }
        if !(self.canonical_size.width > 0.0 && self.canonical_size.height > 0.0) {
            return Err(EaselError::document("canonical size must be > 0"));
        }
        if self.effects.len() != self.effect_params.len() {
            return Err(EaselError::document(format!(
                "effect lists out of step: {} names, {} params",
                self.effects.len(),
                self.effect_params.len()
            )));
        }

        let bg = self
            .nodes
            .iter()
            .find(|n| n.id == self.background)
            .ok_or_else(|| EaselError::document("background id resolves to no node"))?;
        if !matches!(bg.shape, NodeShape::Image { .. }) {
            return Err(EaselError::document("background node must be an image"));
        }
        if let Some(frame) = self.clip_frame {
            if !self.nodes.iter().any(|n| n.id == frame) {
                return Err(EaselError::document("clip frame id resolves to no node"));
            }
        }
        Ok(())
    }
}

/// Serialize the scene in canonical space, with an embedded PNG snapshot.
///
/// The scaling applied on the way in is undone with cached reciprocals of
/// the same `sx`/`sy`, never with freshly computed divisors, so the live
/// scene comes back bit-identical up to one multiply.
#[tracing::instrument(skip_all, fields(name = %name))]
pub fn to_document<R: SnapshotRenderer>(
    scene: &mut Scene,
    renderer: &mut R,
    name: &str,
    log: &ActivityLog,
) -> EaselResult<Document> {
    scene.validate()?;

    let canonical = scene.canonical_size();
    let rendered = scene.rendered_size();
    let sx = canonical.width / rendered.width;
    let sy = canonical.height / rendered.height;
    let (rsx, rsy) = (sx.recip(), sy.recip());

    let anchor = scene.background_id();
    let anchor_cache = {
        let bg = scene.background();
        (bg.scale_x, bg.scale_y, bg.left, bg.top)
    };

    for node in scene.nodes_mut() {
        if node.id == anchor {
            continue;
        }
        node.scale_x *= sx;
        node.scale_y *= sy;
        node.left *= sx;
        node.top *= sy;
        node.set_coords();
    }

    // The anchor is written canonically from its native size rather than
    // scaled, so it defines the space instead of drifting inside it.
    let native = scene.original_size();
    {
        let bg = scene.background_mut();
        bg.scale_x = canonical.width / native.width;
        bg.scale_y = canonical.height / native.height;
        bg.left = canonical.width / 2.0;
        bg.top = canonical.height / 2.0;
        bg.set_coords();
    }
    scene.set_rendered_size(canonical);

    let bounds = Rect::new(0.0, 0.0, canonical.width, canonical.height);
    let snapshot = renderer.snapshot(scene, bounds).and_then(|img| encode_png(&img));

    let nodes = scene.nodes().to_vec();
    let (effects, effect_params) = scene.effects().names_and_params();

    // Invert before surfacing any snapshot error; the live scene must be
    // intact either way.
    for node in scene.nodes_mut() {
        if node.id == anchor {
            continue;
        }
        node.scale_x *= rsx;
        node.scale_y *= rsy;
        node.left *= rsx;
        node.top *= rsy;
        node.set_coords();
    }
    {
        let bg = scene.background_mut();
        (bg.scale_x, bg.scale_y, bg.left, bg.top) = anchor_cache;
        bg.set_coords();
    }
    scene.set_rendered_size(rendered);

    Ok(Document {
        version: DOCUMENT_VERSION,
        name: name.to_string(),
        canonical_size: canonical,
        rendered_size: rendered,
        original_size: native,
        background_color: scene.background_color.clone(),
        nodes,
        background: anchor,
        clip_frame: scene.clip_frame(),
        effects,
        effect_params,
        snapshot_png: snapshot?,
        logs: log.clone(),
    })
}

/// Reconstruct a scene and a fitted viewport from a document.
///
/// Validation is all-or-nothing: a malformed document loads nothing and
/// the caller falls back to a default scene. Unknown effect names are the
/// one tolerated flaw; they are skipped with a warning.
pub fn from_document(doc: &Document, container: Size) -> EaselResult<(Scene, Viewport)> {
    doc.validate()?;

    let canonical = doc.canonical_size;
    let mut nodes = doc.nodes.clone();
    for node in &mut nodes {
        if node.id == doc.background {
            node.selectable = false;
            node.origin = Origin::Center;
            node.left = canonical.width / 2.0;
            node.top = canonical.height / 2.0;
        }
        node.set_coords();
    }

    // Reattach the mask: trust the stored reference, fall back to the
    // naming convention for documents written before it was recorded.
    let clip_frame = doc.clip_frame.or_else(|| {
        nodes
            .iter()
            .find(|n| n.has_name_prefix(FRAME_PREFIX))
            .map(|n| n.id)
    });
    if let Some(id) = clip_frame {
        if let Some(node) = nodes.iter_mut().find(|n| n.id == id) {
            node.absolutely_positioned = true;
            node.set_coords();
        }
    }

    let mut effects = EffectPipeline::default();
    for (name, params) in doc.effects.iter().zip(&doc.effect_params) {
        match parse_effect(name, params) {
            Ok(_) => effects.upsert(name, params.clone(), true),
            Err(err) => tracing::warn!(name, %err, "skipping unloadable effect"),
        }
    }

    let scene = Scene::from_parts(
        nodes,
        doc.background,
        clip_frame,
        canonical,
        canonical,
        doc.background_color.clone(),
        effects,
    )?;

    let mut viewport = Viewport::default();
    viewport.fit_to_container(canonical, container);

    Ok((scene, viewport))
}

//! Adjustment-panel control snapshot and its single dispatch point.
//!
//! The pipeline is never mutated from ad-hoc call sites: the panel edits an
//! [`AdjustControls`] snapshot and [`sync_pipeline`] replays the whole
//! snapshot in one fixed order. Bulk document loads run the other
//! direction through [`load_from_named_list`].

use serde_json::Value;

use crate::{
    effects::{Effect, parse_effect},
    model::Scene,
    session::{Session, SessionMode},
};

/// One slider with an enable toggle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Slider {
    pub enabled: bool,
    pub value: f64,
}

/// Full state of the adjustment panel. Field order matches the panel's
/// control order, which is also the pipeline apply order.
#[derive(Clone, Debug, PartialEq)]
pub struct AdjustControls {
    pub grayscale: bool,
    pub sepia: bool,
    pub vintage: bool,
    pub kodachrome: bool,
    pub technicolor: bool,
    pub sharpen: bool,
    pub invert: bool,
    pub rbrightness: Slider,
    pub bbrightness: Slider,
    pub gbrightness: Slider,
    pub gamma_enabled: bool,
    pub gamma: [f64; 3],
    pub contrast: Slider,
    pub saturation: Slider,
    pub vibrance: Slider,
    pub blur: Slider,
    pub hue_rotation: Slider,
    pub noise: Slider,
    pub pixelate: Slider,
    /// Applied to the background node directly, never a pipeline entry.
    pub opacity: f64,
}

impl Default for AdjustControls {
    fn default() -> Self {
        Self {
            grayscale: false,
            sepia: false,
            vintage: false,
            kodachrome: false,
            technicolor: false,
            sharpen: false,
            invert: false,
            rbrightness: Slider::default(),
            bbrightness: Slider::default(),
            gbrightness: Slider::default(),
            gamma_enabled: false,
            gamma: [1.0, 1.0, 1.0],
            contrast: Slider::default(),
            saturation: Slider::default(),
            vibrance: Slider::default(),
            blur: Slider::default(),
            hue_rotation: Slider::default(),
            noise: Slider::default(),
            pixelate: Slider::default(),
            opacity: 1.0,
        }
    }
}

/// Replay the whole control snapshot into the scene's pipeline, in panel
/// order. Suppressed while a document load is reconstructing state.
pub fn sync_pipeline(controls: &AdjustControls, session: &mut Session, scene: &mut Scene) {
    if session.mode() == SessionMode::BulkLoading {
        return;
    }

    let c = controls;
    let steps: [(Effect, bool); 18] = [
        (Effect::Grayscale, c.grayscale),
        (Effect::Sepia, c.sepia),
        (Effect::Vintage, c.vintage),
        (Effect::Kodachrome, c.kodachrome),
        (Effect::Technicolor, c.technicolor),
        (Effect::Sharpen, c.sharpen),
        (Effect::Invert, c.invert),
        (Effect::RBrightness(c.rbrightness.value), c.rbrightness.enabled),
        (Effect::BBrightness(c.bbrightness.value), c.bbrightness.enabled),
        (Effect::GBrightness(c.gbrightness.value), c.gbrightness.enabled),
        (Effect::Gamma(c.gamma), c.gamma_enabled),
        (Effect::Contrast(c.contrast.value), c.contrast.enabled),
        (Effect::Saturation(c.saturation.value), c.saturation.enabled),
        (Effect::Vibrance(c.vibrance.value), c.vibrance.enabled),
        (Effect::Blur(c.blur.value), c.blur.enabled),
        (Effect::HueRotation(c.hue_rotation.value), c.hue_rotation.enabled),
        (Effect::Noise(c.noise.value), c.noise.enabled),
        (Effect::Pixelate(c.pixelate.value), c.pixelate.enabled),
    ];
    for (effect, enabled) in &steps {
        scene.effects_mut().apply(effect, *enabled);
    }

    scene.background_mut().style.opacity = controls.opacity;

    session.record(Some(scene.background_id()), "adjustments");
}

/// Rebuild controls and pipeline from a stored parallel name/params list.
/// Unknown or malformed entries are skipped with a warning; the rest of
/// the list still loads. History recording is gated for the duration.
pub fn load_from_named_list(
    names: &[String],
    params: &[Value],
    controls: &mut AdjustControls,
    session: &mut Session,
    scene: &mut Scene,
) {
    session.set_mode(SessionMode::BulkLoading);
    scene.effects_mut().clear();

    for (name, p) in names.iter().zip(params) {
        let effect = match parse_effect(name, p) {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(name, %err, "skipping unloadable effect");
                continue;
            }
        };
        match &effect {
            Effect::Grayscale => controls.grayscale = true,
            Effect::Sepia => controls.sepia = true,
            Effect::Vintage => controls.vintage = true,
            Effect::Kodachrome => controls.kodachrome = true,
            Effect::Technicolor => controls.technicolor = true,
            Effect::Sharpen => controls.sharpen = true,
            Effect::Invert => controls.invert = true,
            Effect::RBrightness(v) => controls.rbrightness = Slider { enabled: true, value: *v },
            Effect::BBrightness(v) => controls.bbrightness = Slider { enabled: true, value: *v },
            Effect::GBrightness(v) => controls.gbrightness = Slider { enabled: true, value: *v },
            Effect::Gamma(g) => {
                controls.gamma_enabled = true;
                controls.gamma = *g;
            }
            Effect::Contrast(v) => controls.contrast = Slider { enabled: true, value: *v },
            Effect::Saturation(v) => controls.saturation = Slider { enabled: true, value: *v },
            Effect::Vibrance(v) => controls.vibrance = Slider { enabled: true, value: *v },
            Effect::Blur(v) => controls.blur = Slider { enabled: true, value: *v },
            Effect::HueRotation(v) => controls.hue_rotation = Slider { enabled: true, value: *v },
            Effect::Noise(v) => controls.noise = Slider { enabled: true, value: *v },
            Effect::Pixelate(v) => controls.pixelate = Slider { enabled: true, value: *v },
        }
        scene.effects_mut().apply(&effect, true);
    }

    session.set_mode(SessionMode::Idle);
}

//! Ordered, keyed effect pipeline applied to the background raster.
//!
//! The pipeline never interprets parameters; it stores them as JSON so the
//! persisted form matches the live form byte for byte. [`parse_effect`]
//! gives the typed view used for validation and by renderers.

use serde_json::{Value, json};

use crate::error::{EaselError, EaselResult};

/// Every effect kind the pipeline accepts, in control-panel order.
pub const EFFECT_CATALOG: [&str; 18] = [
    "grayscale",
    "sepia",
    "vintage",
    "kodachrome",
    "technicolor",
    "sharpen",
    "invert",
    "rbrightness",
    "bbrightness",
    "gbrightness",
    "gamma",
    "contrast",
    "saturation",
    "vibrance",
    "blur",
    "hueRotation",
    "noise",
    "pixelate",
];

/// One pipeline slot. `key` is unique within a pipeline; position is
/// insertion order and is semantically meaningful.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EffectEntry {
    pub key: String,
    pub params: Value,
}

/// Typed form of a known effect, for validation and renderer dispatch.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Grayscale,
    Sepia,
    Vintage,
    Kodachrome,
    Technicolor,
    Sharpen,
    Invert,
    RBrightness(f64),
    BBrightness(f64),
    GBrightness(f64),
    Gamma([f64; 3]),
    Contrast(f64),
    Saturation(f64),
    Vibrance(f64),
    Blur(f64),
    HueRotation(f64),
    Noise(f64),
    Pixelate(f64),
}

fn param_f64(params: &Value, key: &str, field: &str) -> EaselResult<f64> {
    params
        .get(field)
        .and_then(Value::as_f64)
        .ok_or_else(|| EaselError::validation(format!("effect {key}: missing number {field:?}")))
}

/// Validate a key/params pair against the catalog.
pub fn parse_effect(key: &str, params: &Value) -> EaselResult<Effect> {
    if !EFFECT_CATALOG.contains(&key) {
        return Err(EaselError::validation(format!(
            "unknown effect kind {key:?}"
        )));
    }
    let effect = match key {
        "grayscale" => Effect::Grayscale,
        "sepia" => Effect::Sepia,
        "vintage" => Effect::Vintage,
        "kodachrome" => Effect::Kodachrome,
        "technicolor" => Effect::Technicolor,
        "sharpen" => Effect::Sharpen,
        "invert" => Effect::Invert,
        "rbrightness" => Effect::RBrightness(param_f64(params, key, "RBrightness")?),
        "bbrightness" => Effect::BBrightness(param_f64(params, key, "BBrightness")?),
        "gbrightness" => Effect::GBrightness(param_f64(params, key, "GBrightness")?),
        "gamma" => {
            let arr = params
                .get("gamma")
                .and_then(Value::as_array)
                .filter(|a| a.len() == 3)
                .ok_or_else(|| {
                    EaselError::validation("effect gamma: expected a 3-element \"gamma\" array")
                })?;
            let mut out = [0.0; 3];
            for (slot, v) in out.iter_mut().zip(arr) {
                *slot = v.as_f64().ok_or_else(|| {
                    EaselError::validation("effect gamma: non-numeric channel value")
                })?;
            }
            Effect::Gamma(out)
        }
        "contrast" => Effect::Contrast(param_f64(params, key, "contrast")?),
        "saturation" => Effect::Saturation(param_f64(params, key, "saturation")?),
        "vibrance" => Effect::Vibrance(param_f64(params, key, "vibrance")?),
        "blur" => Effect::Blur(param_f64(params, key, "blur")?),
        "hueRotation" => Effect::HueRotation(param_f64(params, key, "rotation")?),
        "noise" => Effect::Noise(param_f64(params, key, "noise")?),
        "pixelate" => Effect::Pixelate(param_f64(params, key, "blocksize")?),
        other => {
            return Err(EaselError::validation(format!(
                "unknown effect kind {other:?}"
            )));
        }
    };
    Ok(effect)
}

impl Effect {
    pub fn key(&self) -> &'static str {
        match self {
            Effect::Grayscale => "grayscale",
            Effect::Sepia => "sepia",
            Effect::Vintage => "vintage",
            Effect::Kodachrome => "kodachrome",
            Effect::Technicolor => "technicolor",
            Effect::Sharpen => "sharpen",
            Effect::Invert => "invert",
            Effect::RBrightness(_) => "rbrightness",
            Effect::BBrightness(_) => "bbrightness",
            Effect::GBrightness(_) => "gbrightness",
            Effect::Gamma(_) => "gamma",
            Effect::Contrast(_) => "contrast",
            Effect::Saturation(_) => "saturation",
            Effect::Vibrance(_) => "vibrance",
            Effect::Blur(_) => "blur",
            Effect::HueRotation(_) => "hueRotation",
            Effect::Noise(_) => "noise",
            Effect::Pixelate(_) => "pixelate",
        }
    }

    pub fn params(&self) -> Value {
        match self {
            Effect::Grayscale
            | Effect::Sepia
            | Effect::Vintage
            | Effect::Kodachrome
            | Effect::Technicolor
            | Effect::Sharpen
            | Effect::Invert => json!({}),
            Effect::RBrightness(v) => json!({ "RBrightness": v }),
            Effect::BBrightness(v) => json!({ "BBrightness": v }),
            Effect::GBrightness(v) => json!({ "GBrightness": v }),
            Effect::Gamma(g) => json!({ "gamma": g }),
            Effect::Contrast(v) => json!({ "contrast": v }),
            Effect::Saturation(v) => json!({ "saturation": v }),
            Effect::Vibrance(v) => json!({ "vibrance": v }),
            Effect::Blur(v) => json!({ "blur": v }),
            Effect::HueRotation(v) => json!({ "rotation": v }),
            Effect::Noise(v) => json!({ "noise": v }),
            Effect::Pixelate(v) => json!({ "blocksize": v }),
        }
    }
}

/// Insertion-ordered, key-deduplicated effect list.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EffectPipeline {
    entries: Vec<EffectEntry>,
}

impl EffectPipeline {
    /// The single mutation primitive. Disabled removes the key; enabled
    /// replaces params in place when present, appends otherwise.
    pub fn upsert(&mut self, key: &str, params: Value, enabled: bool) {
        let pos = self.entries.iter().position(|e| e.key == key);
        match (enabled, pos) {
            (false, Some(i)) => {
                self.entries.remove(i);
            }
            (false, None) => {}
            (true, Some(i)) => self.entries[i].params = params,
            (true, None) => self.entries.push(EffectEntry {
                key: key.to_string(),
                params,
            }),
        }
    }

    pub fn apply(&mut self, effect: &Effect, enabled: bool) {
        if enabled {
            self.upsert(effect.key(), effect.params(), true);
        } else {
            self.remove(effect.key());
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.upsert(key, Value::Null, false);
    }

    pub fn get(&self, key: &str) -> Option<&EffectEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn entries(&self) -> &[EffectEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The persisted form: parallel name and params lists.
    pub fn names_and_params(&self) -> (Vec<String>, Vec<Value>) {
        (
            self.entries.iter().map(|e| e.key.clone()).collect(),
            self.entries.iter().map(|e| e.params.clone()).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_is_idempotent_in_position() {
        let mut p = EffectPipeline::default();
        p.upsert("sepia", json!({}), true);
        p.upsert("contrast", json!({ "contrast": 0.2 }), true);
        p.upsert("sepia", json!({}), true);
        let keys: Vec<_> = p.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["sepia", "contrast"]);
    }

    #[test]
    fn replacing_params_preserves_position() {
        let mut p = EffectPipeline::default();
        p.upsert("contrast", json!({ "contrast": 0.2 }), true);
        p.upsert("blur", json!({ "blur": 0.3 }), true);
        p.upsert("contrast", json!({ "contrast": 0.9 }), true);
        assert_eq!(p.entries()[0].key, "contrast");
        assert_eq!(p.entries()[0].params, json!({ "contrast": 0.9 }));
    }

    #[test]
    fn disable_removes_and_preserves_other_order() {
        let mut p = EffectPipeline::default();
        p.upsert("grayscale", json!({}), true);
        p.upsert("blur", json!({ "blur": 0.1 }), true);
        p.upsert("noise", json!({ "noise": 50.0 }), true);
        p.remove("blur");
        let keys: Vec<_> = p.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["grayscale", "noise"]);
        // Removing an absent key is a no-op.
        p.remove("blur");
        assert_eq!(p.entries().len(), 2);
    }

    #[test]
    fn parse_rejects_unknown_kind_and_bad_params() {
        assert!(parse_effect("glitter", &json!({})).is_err());
        assert!(parse_effect("contrast", &json!({})).is_err());
        assert!(parse_effect("gamma", &json!({ "gamma": [1.0, 1.0] })).is_err());
        assert_eq!(
            parse_effect("hueRotation", &json!({ "rotation": 0.5 })).unwrap(),
            Effect::HueRotation(0.5)
        );
    }

    #[test]
    fn catalog_covers_every_typed_effect() {
        let all = [
            Effect::Grayscale,
            Effect::Sepia,
            Effect::Vintage,
            Effect::Kodachrome,
            Effect::Technicolor,
            Effect::Sharpen,
            Effect::Invert,
            Effect::RBrightness(0.1),
            Effect::BBrightness(0.1),
            Effect::GBrightness(0.1),
            Effect::Gamma([1.0, 1.0, 1.0]),
            Effect::Contrast(0.1),
            Effect::Saturation(0.1),
            Effect::Vibrance(0.1),
            Effect::Blur(0.1),
            Effect::HueRotation(0.1),
            Effect::Noise(10.0),
            Effect::Pixelate(4.0),
        ];
        assert_eq!(all.len(), EFFECT_CATALOG.len());
        for effect in all {
            assert!(EFFECT_CATALOG.contains(&effect.key()));
            assert!(parse_effect(effect.key(), &effect.params()).is_ok());
        }
    }

    #[test]
    fn typed_params_round_trip_through_parse() {
        for effect in [
            Effect::Gamma([1.0, 0.8, 1.2]),
            Effect::Pixelate(8.0),
            Effect::RBrightness(0.1),
        ] {
            let parsed = parse_effect(effect.key(), &effect.params()).unwrap();
            assert_eq!(parsed, effect);
        }
    }
}

use crate::{
    error::{KaleidaError, KaleidaResult},
    layers::LayerSlot,
};

/// A scene script: the structured form of the externally decided commands
/// that drive the engine. Whatever interprets user intent (voice, UI, a test
/// harness) is out of scope; it targets this boundary.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneScript {
    pub commands: Vec<TimedCommand>,
}

/// One command, applied once the playback clock reaches `at_secs`.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TimedCommand {
    pub at_secs: f64,
    #[serde(flatten)]
    pub action: ScriptAction,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptAction {
    /// Make one scene active, optionally through a timed fade.
    SetSingle {
        scene: String,
        #[serde(default)]
        transition: bool,
    },
    /// Replace the whole layered composition. Absent slots stay empty.
    SetLayered {
        #[serde(default)]
        background: Option<String>,
        #[serde(default)]
        middle: Option<String>,
        #[serde(default)]
        foreground: Option<String>,
    },
    /// Assign or clear one layer slot. Slot names accept the short aliases
    /// (`bg`, `mid`, `fg`).
    SetLayer {
        slot: String,
        #[serde(default)]
        scene: Option<String>,
    },
    /// Change the global animation-speed multiplier.
    SetSpeed { speed: f64 },
}

impl SceneScript {
    pub fn from_json(s: &str) -> KaleidaResult<Self> {
        serde_json::from_str(s).map_err(|e| KaleidaError::script(format!("parse scene script: {e}")))
    }

    pub fn validate(&self) -> KaleidaResult<()> {
        let mut prev = 0.0f64;
        for (i, cmd) in self.commands.iter().enumerate() {
            if !cmd.at_secs.is_finite() || cmd.at_secs < 0.0 {
                return Err(KaleidaError::script(format!(
                    "command #{i}: at_secs must be finite and >= 0"
                )));
            }
            if cmd.at_secs < prev {
                return Err(KaleidaError::script(format!(
                    "command #{i}: timestamps must be non-decreasing"
                )));
            }
            prev = cmd.at_secs;

            match &cmd.action {
                ScriptAction::SetSingle { scene, .. } => {
                    validate_scene_name(i, scene)?;
                }
                ScriptAction::SetLayered {
                    background,
                    middle,
                    foreground,
                } => {
                    for scene in [background, middle, foreground].into_iter().flatten() {
                        validate_scene_name(i, scene)?;
                    }
                }
                ScriptAction::SetLayer { slot, scene } => {
                    LayerSlot::parse(slot)
                        .map_err(|e| KaleidaError::script(format!("command #{i}: {e}")))?;
                    if let Some(scene) = scene {
                        validate_scene_name(i, scene)?;
                    }
                }
                ScriptAction::SetSpeed { speed } => {
                    if !speed.is_finite() || *speed <= 0.0 {
                        return Err(KaleidaError::script(format!(
                            "command #{i}: speed must be finite and > 0"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

fn validate_scene_name(i: usize, name: &str) -> KaleidaResult<()> {
    if name.trim().is_empty() {
        return Err(KaleidaError::script(format!(
            "command #{i}: scene name must be non-empty"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(json: &str) -> SceneScript {
        SceneScript::from_json(json).unwrap()
    }

    #[test]
    fn parses_tagged_actions() {
        let s = script(
            r#"{"commands": [
                {"at_secs": 0.0, "op": "set_single", "scene": "waves"},
                {"at_secs": 2.0, "op": "set_single", "scene": "spiral", "transition": true},
                {"at_secs": 4.0, "op": "set_layered", "background": "waves", "foreground": "spark"},
                {"at_secs": 6.0, "op": "set_layer", "slot": "fg", "scene": null},
                {"at_secs": 7.0, "op": "set_speed", "speed": 0.5}
            ]}"#,
        );
        s.validate().unwrap();
        assert_eq!(s.commands.len(), 5);
        assert!(matches!(
            s.commands[1].action,
            ScriptAction::SetSingle { transition: true, .. }
        ));
    }

    #[test]
    fn round_trips_through_json() {
        let s = script(
            r#"{"commands": [{"at_secs": 1.5, "op": "set_layer", "slot": "bg", "scene": "waves"}]}"#,
        );
        let json = serde_json::to_string(&s).unwrap();
        let back = SceneScript::from_json(&json).unwrap();
        back.validate().unwrap();
        assert!(matches!(
            &back.commands[0].action,
            ScriptAction::SetLayer { slot, .. } if slot == "bg"
        ));
    }

    #[test]
    fn rejects_decreasing_timestamps() {
        let s = script(
            r#"{"commands": [
                {"at_secs": 3.0, "op": "set_single", "scene": "a"},
                {"at_secs": 1.0, "op": "set_single", "scene": "b"}
            ]}"#,
        );
        assert!(s.validate().is_err());
    }

    #[test]
    fn rejects_unknown_slot() {
        let s = script(
            r#"{"commands": [{"at_secs": 0.0, "op": "set_layer", "slot": "overlay", "scene": "a"}]}"#,
        );
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("unknown layer slot"));
    }

    #[test]
    fn rejects_bad_speed() {
        for bad in ["0.0", "-1.0"] {
            let s = script(&format!(
                r#"{{"commands": [{{"at_secs": 0.0, "op": "set_speed", "speed": {bad}}}]}}"#
            ));
            assert!(s.validate().is_err());
        }
    }

    #[test]
    fn rejects_empty_scene_name() {
        let s = script(r#"{"commands": [{"at_secs": 0.0, "op": "set_single", "scene": "  "}]}"#);
        assert!(s.validate().is_err());
    }
}

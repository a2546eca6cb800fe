//! Scene definitions produced by script generation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// One narrative unit of the reel.
///
/// `scene_number` is the ordering key every downstream stage uses; frames,
/// narration files, captions and clips are all keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub scene_number: u32,
    /// Narration text, also used as the caption
    pub text: String,
    /// Prompt for the illustrative image
    pub image_prompt: String,
    /// Suggested duration in seconds (hint only; narration decides)
    #[serde(default)]
    pub timeframe: i64,
}

/// Structured script returned by the language model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub scenes: Vec<RawScene>,
}

/// Scene as emitted by the model, before validation.
///
/// Scene numbers are signed here so a zero or negative value is reported
/// as a validation error rather than a JSON error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawScene {
    pub scene_number: i64,
    pub text: String,
    pub image_prompt: String,
    #[serde(default)]
    pub timeframe: i64,
}

impl Script {
    /// Validate the script and return scenes sorted by scene number.
    pub fn into_scenes(self) -> ModelResult<Vec<Scene>> {
        if self.scenes.is_empty() {
            return Err(ModelError::EmptyScript);
        }

        let mut seen = HashSet::new();
        let mut scenes = Vec::with_capacity(self.scenes.len());
        for raw in self.scenes {
            let scene_number = u32::try_from(raw.scene_number)
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ModelError::InvalidSceneNumber(raw.scene_number))?;
            if !seen.insert(scene_number) {
                return Err(ModelError::DuplicateScene(scene_number));
            }
            scenes.push(Scene {
                scene_number,
                text: raw.text,
                image_prompt: raw.image_prompt,
                timeframe: raw.timeframe,
            });
        }

        scenes.sort_by_key(|s| s.scene_number);
        Ok(scenes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(n: i64) -> RawScene {
        RawScene {
            scene_number: n,
            text: format!("Scene {} text", n),
            image_prompt: "a city at dawn".to_string(),
            timeframe: 5,
        }
    }

    #[test]
    fn test_script_sorted_by_scene_number() {
        let script = Script {
            scenes: vec![raw(3), raw(1), raw(2)],
        };
        let numbers: Vec<u32> = script
            .into_scenes()
            .unwrap()
            .iter()
            .map(|s| s.scene_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_script_rejects_empty_zero_and_duplicates() {
        assert_eq!(
            Script { scenes: vec![] }.into_scenes(),
            Err(ModelError::EmptyScript)
        );
        assert_eq!(
            Script { scenes: vec![raw(0)] }.into_scenes(),
            Err(ModelError::InvalidSceneNumber(0))
        );
        assert_eq!(
            Script {
                scenes: vec![raw(2), raw(2)]
            }
            .into_scenes(),
            Err(ModelError::DuplicateScene(2))
        );
    }

    #[test]
    fn test_script_deserializes_without_timeframe() {
        let json = r#"{"scenes":[{"scene_number":1,"text":"Hi","image_prompt":"sun"}]}"#;
        let script: Script = serde_json::from_str(json).unwrap();
        let scenes = script.into_scenes().unwrap();
        assert_eq!(scenes[0].timeframe, 0);
    }
}

//! Free-roam interactables.
//!
//! Entities the player can activate implement [`Interactable`]. The closed set
//! of variants lives in [`Interactive`], which dispatches by entity kind rather
//! than by component lookup.

use crate::services::SceneTransition;
use crate::CRANE_SCENE;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Top-level game mode for the free-roam scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Player walks around.
    #[default]
    FreeRoam,
    /// A dialog box owns input.
    Dialog,
    /// A prop interaction owns input.
    Interact,
    /// A menu owns input.
    Menu,
}

/// Level chosen at a cabinet, handed to the crane scene on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSelection {
    /// Level layout key.
    pub level: String,
    /// Plays granted for the session.
    pub plays: u32,
}

/// Mutable state an interaction may touch.
pub struct InteractContext<'a> {
    /// Current game mode.
    pub mode: &'a mut GameMode,
    /// Level picked for the next crane scene.
    pub selection: &'a mut Option<LevelSelection>,
    /// Scene transition service.
    pub scenes: &'a mut dyn SceneTransition,
    /// Dialog lines queued for the dialog box.
    pub dialog: &'a mut Vec<String>,
}

/// Something the player can activate.
pub trait Interactable {
    /// Activate on behalf of `initiator`. Returns `true` if anything happened.
    fn interact(&self, initiator: u64, ctx: &mut InteractContext<'_>) -> bool;
}

/// Arcade cabinet that loads the crane scene with a given level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraneCabinet {
    /// Scene to load.
    #[serde(default = "default_crane_scene")]
    pub scene: String,
    /// Level layout key.
    pub level: String,
    /// Plays granted.
    pub plays: u32,
}

fn default_crane_scene() -> String {
    CRANE_SCENE.to_string()
}

impl Interactable for CraneCabinet {
    fn interact(&self, initiator: u64, ctx: &mut InteractContext<'_>) -> bool {
        if *ctx.mode != GameMode::FreeRoam {
            return false;
        }
        debug!(initiator, level = %self.level, plays = self.plays, "cabinet selected");
        *ctx.selection = Some(LevelSelection {
            level: self.level.clone(),
            plays: self.plays,
        });
        ctx.scenes.fade_to_scene(&self.scene);
        true
    }
}

/// Prop that switches the game into interaction mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractObject {
    /// Label shown in the interaction prompt.
    #[serde(default)]
    pub label: String,
}

impl Interactable for InteractObject {
    fn interact(&self, _initiator: u64, ctx: &mut InteractContext<'_>) -> bool {
        if *ctx.mode != GameMode::FreeRoam {
            return false;
        }
        *ctx.mode = GameMode::Interact;
        true
    }
}

/// Character that opens a dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    /// Lines shown in order.
    pub lines: Vec<String>,
}

impl Interactable for Npc {
    fn interact(&self, initiator: u64, ctx: &mut InteractContext<'_>) -> bool {
        if *ctx.mode != GameMode::FreeRoam || self.lines.is_empty() {
            return false;
        }
        debug!(initiator, lines = self.lines.len(), "npc dialog opened");
        *ctx.mode = GameMode::Dialog;
        ctx.dialog.extend(self.lines.iter().cloned());
        true
    }
}

/// Every interactive entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interactive {
    /// Arcade cabinet.
    Crane(CraneCabinet),
    /// Plain prop.
    Object(InteractObject),
    /// Talking character.
    Npc(Npc),
}

impl Interactable for Interactive {
    fn interact(&self, initiator: u64, ctx: &mut InteractContext<'_>) -> bool {
        match self {
            Interactive::Crane(cabinet) => cabinet.interact(initiator, ctx),
            Interactive::Object(object) => object.interact(initiator, ctx),
            Interactive::Npc(npc) => npc.interact(initiator, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingScenes(Vec<String>);

    impl SceneTransition for RecordingScenes {
        fn fade_to_scene(&mut self, name: &str) {
            self.0.push(name.to_string());
        }
    }

    #[test]
    fn cabinet_selects_level_and_fades() {
        let mut mode = GameMode::FreeRoam;
        let mut selection = None;
        let mut scenes = RecordingScenes::default();
        let mut dialog = Vec::new();
        let mut ctx = InteractContext {
            mode: &mut mode,
            selection: &mut selection,
            scenes: &mut scenes,
            dialog: &mut dialog,
        };

        let cabinet = Interactive::Crane(CraneCabinet {
            scene: CRANE_SCENE.to_string(),
            level: "plushies".into(),
            plays: 3,
        });
        assert!(cabinet.interact(1, &mut ctx));

        assert_eq!(
            selection,
            Some(LevelSelection {
                level: "plushies".into(),
                plays: 3
            })
        );
        assert_eq!(scenes.0, vec![CRANE_SCENE.to_string()]);
    }

    #[test]
    fn interactions_ignored_outside_free_roam() {
        let mut mode = GameMode::Dialog;
        let mut selection = None;
        let mut scenes = RecordingScenes::default();
        let mut dialog = Vec::new();
        let mut ctx = InteractContext {
            mode: &mut mode,
            selection: &mut selection,
            scenes: &mut scenes,
            dialog: &mut dialog,
        };

        assert!(!Interactive::Object(InteractObject::default()).interact(1, &mut ctx));
        assert!(!Interactive::Npc(Npc {
            lines: vec!["hi".into()]
        })
        .interact(1, &mut ctx));
        assert_eq!(mode, GameMode::Dialog);
        assert!(scenes.0.is_empty());
    }

    #[test]
    fn npc_opens_dialog() {
        let mut mode = GameMode::FreeRoam;
        let mut selection = None;
        let mut scenes = RecordingScenes::default();
        let mut dialog = Vec::new();
        let mut ctx = InteractContext {
            mode: &mut mode,
            selection: &mut selection,
            scenes: &mut scenes,
            dialog: &mut dialog,
        };

        let npc = Npc {
            lines: vec!["Try the crane!".into(), "Good luck.".into()],
        };
        assert!(npc.interact(7, &mut ctx));
        assert_eq!(mode, GameMode::Dialog);
        assert_eq!(dialog.len(), 2);
    }

    #[test]
    fn interactive_deserializes_from_tagged_json() {
        let json = r#"{"kind":"crane","level":"robots","plays":5}"#;
        let parsed: Interactive = serde_json::from_str(json).unwrap();
        match parsed {
            Interactive::Crane(cabinet) => {
                assert_eq!(cabinet.scene, CRANE_SCENE);
                assert_eq!(cabinet.plays, 5);
            }
            other => panic!("unexpected variant {other:?}"),
        }
    }
}

//! Scripted sessions: a panel configuration plus a list of actions, loaded
//! from JSON and replayed against a fresh panel.

use crate::AppResult;
use crate::panel::{PaintPanel, PanelConfig};
use crate::upload::Uploader;
use kurbo::Point;
use paintcanvas_core::{
    EventBus, HistoryEventKind, KeyEvent, Modifiers, PointerEvent, SurfaceOptions,
};
use serde::Deserialize;
use std::cell::Cell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Configure {
        options: SurfaceOptions,
    },
    Attribute {
        name: String,
        value: String,
    },
    ScaleFactor {
        value: f64,
    },
    Pointer {
        event: PointerEvent,
    },
    /// A whole single-contact gesture: down at the first point, a move to
    /// each following one, up at the last.
    Stroke {
        points: Vec<Point>,
    },
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Undo,
    Redo,
    Clear,
    Reset,
    Upload,
}

/// A scripted session.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Session {
    pub panel: PanelConfig,
    pub actions: Vec<Action>,
}

/// What a session run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub log_len: usize,
    pub current_step: usize,
    pub uploads: usize,
    pub history_changed: usize,
    pub history_step: usize,
}

impl Session {
    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Replay every action on a new panel. Uploads go to `uploader`.
    ///
    /// An upload with nothing drawn is skipped; any other failure aborts
    /// the run.
    pub fn run<U: Uploader + ?Sized>(&self, uploader: &mut U) -> AppResult<SessionReport> {
        let bus = EventBus::new();
        let changed = Rc::new(Cell::new(0));
        let step = Rc::new(Cell::new(0));
        {
            let changed = Rc::clone(&changed);
            bus.subscribe_to(HistoryEventKind::Changed, move |_| {
                changed.set(changed.get() + 1)
            });
            let step = Rc::clone(&step);
            bus.subscribe_to(HistoryEventKind::Step, move |_| step.set(step.get() + 1));
        }

        let mut panel = PaintPanel::with_parent_bus(self.panel.clone(), &bus);
        let mut uploads = 0;
        for (index, action) in self.actions.iter().enumerate() {
            log::trace!("Action {}: {:?}", index, action);
            if apply(&mut panel, action, uploader)? {
                uploads += 1;
            }
        }

        let surface = panel.surface();
        Ok(SessionReport {
            log_len: surface.log().len(),
            current_step: surface.current_step(),
            uploads,
            history_changed: changed.get(),
            history_step: step.get(),
        })
    }
}

/// Apply one action. Returns whether it uploaded a file.
fn apply<U: Uploader + ?Sized>(
    panel: &mut PaintPanel,
    action: &Action,
    uploader: &mut U,
) -> AppResult<bool> {
    match action {
        Action::Configure { options } => panel.surface_mut().configure(options.clone()),
        Action::Attribute { name, value } => {
            panel.surface_mut().set_attribute(name, value);
        }
        Action::ScaleFactor { value } => panel.surface_mut().set_scale_factor(*value),
        Action::Pointer { event } => {
            panel.handle_pointer_event(*event);
        }
        Action::Stroke { points } => {
            if let Some((first, rest)) = points.split_first() {
                panel.handle_pointer_event(PointerEvent::down(*first));
                for point in rest {
                    panel.handle_pointer_event(PointerEvent::moved(*point));
                }
                let last = rest.last().unwrap_or(first);
                panel.handle_pointer_event(PointerEvent::up(*last));
            }
        }
        Action::Key { key, modifiers } => {
            panel.handle_key_event(&KeyEvent::new(key.as_str(), *modifiers));
        }
        Action::Undo => {
            panel.undo();
        }
        Action::Redo => {
            panel.redo();
        }
        Action::Clear => panel.surface_mut().clear(),
        Action::Reset => panel.reset(),
        Action::Upload => {
            if !panel.can_upload() {
                log::warn!("Skipping upload, nothing drawn yet");
                return Ok(false);
            }
            panel.upload(uploader)?;
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryUploader;

    const SCRIPT: &str = r##"{
        "panel": { "width": 60, "height": 30 },
        "actions": [
            { "action": "stroke", "points": [{"x": 5, "y": 5}, {"x": 20, "y": 20}, {"x": 40, "y": 5}] },
            { "action": "attribute", "name": "color", "value": "#ff0000" },
            { "action": "pointer", "event": { "type": "down", "position": {"x": 10, "y": 25} } },
            { "action": "pointer", "event": { "type": "move", "position": {"x": 50, "y": 25} } },
            { "action": "pointer", "event": { "type": "leave", "position": {"x": 59, "y": 25} } },
            { "action": "key", "key": "z", "modifiers": { "ctrl": true } },
            { "action": "upload" }
        ]
    }"##;

    #[test]
    fn test_parse_session() {
        let session = Session::from_json(SCRIPT).unwrap();
        assert_eq!(session.panel.width, 60.0);
        assert_eq!(session.panel.stroke_width, 3.0);
        assert_eq!(session.actions.len(), 7);
        assert_eq!(
            session.actions[5],
            Action::Key {
                key: "z".to_string(),
                modifiers: Modifiers {
                    ctrl: true,
                    ..Modifiers::default()
                },
            }
        );
    }

    #[test]
    fn test_run_session() {
        let session = Session::from_json(SCRIPT).unwrap();
        let mut uploader = MemoryUploader::new();
        let report = session.run(&mut uploader).unwrap();

        assert_eq!(
            report,
            SessionReport {
                log_len: 2,
                current_step: 1,
                uploads: 1,
                history_changed: 2,
                // two commits and one undo
                history_step: 3,
            }
        );
        assert_eq!(uploader.attachments().len(), 1);
    }

    #[test]
    fn test_upload_before_drawing_is_skipped() {
        let session = Session::from_json(r#"{ "actions": [{ "action": "upload" }] }"#).unwrap();
        let mut uploader = MemoryUploader::new();
        let report = session.run(&mut uploader).unwrap();
        assert_eq!(report.uploads, 0);
        assert!(uploader.attachments().is_empty());
    }

    #[test]
    fn test_reset_clears_history() {
        let session = Session::from_json(
            r#"{ "actions": [
                { "action": "stroke", "points": [{"x": 1, "y": 1}, {"x": 9, "y": 9}] },
                { "action": "reset" },
                { "action": "upload" }
            ] }"#,
        )
        .unwrap();
        let report = session.run(&mut MemoryUploader::new()).unwrap();
        assert_eq!(report.log_len, 0);
        assert_eq!(report.current_step, 0);
        assert_eq!(report.uploads, 0);
    }

    #[test]
    fn test_unknown_action_is_an_error() {
        assert!(Session::from_json(r#"{ "actions": [{ "action": "fly" }] }"#).is_err());
    }
}

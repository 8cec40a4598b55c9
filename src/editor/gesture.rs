//! Pointer gestures: drag to move, drag the corner handle to resize.
//!
//! ```text
//!            pointer_down(Body)           pointer_up
//!   Idle ─────────────────────────▶ Dragging ─────────▶ Idle
//!     │      pointer_down(Handle)          pointer_up
//!     └───────────────────────────▶ Resizing ─────────▶ Idle
//! ```
//!
//! One gesture at a time across the whole editor.

use log::debug;

use crate::error::DataMergeError;
use crate::geometry::{Point, Size};

use super::EditorSession;
use super::boxes::BoxId;

/// Where on a box the pointer went down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Body,
    /// Bottom-right resize handle.
    ResizeHandle,
}

/// Active pointer gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        id: BoxId,
        /// Pointer position at the previous move event.
        last: Point,
    },
    Resizing {
        id: BoxId,
        /// Pointer position when the handle was grabbed.
        start: Point,
        /// Box size when the handle was grabbed.
        initial: Size,
    },
}

impl Gesture {
    pub fn box_id(&self) -> Option<BoxId> {
        match self {
            Gesture::Idle => None,
            Gesture::Dragging { id, .. } | Gesture::Resizing { id, .. } => Some(*id),
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Gesture::Idle)
    }
}

impl EditorSession {
    /// Start a drag or resize on `id`. The box becomes selected.
    pub fn pointer_down(&mut self, id: BoxId, target: HitTarget, at: Point) -> Result<(), DataMergeError> {
        if self.gesture.is_active() {
            return Err(DataMergeError::validation("Another box is already being moved"));
        }
        let size = self
            .get(id)
            .map(|b| b.size)
            .ok_or_else(|| DataMergeError::validation(format!("No box with id {}", id)))?;
        self.select_box(id)?;
        self.gesture = match target {
            HitTarget::Body => Gesture::Dragging { id, last: at },
            HitTarget::ResizeHandle => Gesture::Resizing {
                id,
                start: at,
                initial: size,
            },
        };
        debug!("{:?} gesture started on box {}", target, id);
        Ok(())
    }

    /// Feed a pointer move to the active gesture. No-op when idle.
    pub fn pointer_move(&mut self, at: Point) -> Result<(), DataMergeError> {
        match self.gesture {
            Gesture::Idle => Ok(()),
            Gesture::Dragging { id, last } => {
                self.move_box(id, at.x - last.x, at.y - last.y)?;
                self.gesture = Gesture::Dragging { id, last: at };
                Ok(())
            }
            Gesture::Resizing { id, start, initial } => {
                self.resize_box(
                    id,
                    initial.width + (at.x - start.x),
                    initial.height + (at.y - start.y),
                )?;
                Ok(())
            }
        }
    }

    /// End the active gesture, returning the box it was on.
    pub fn pointer_up(&mut self) -> Option<BoxId> {
        let id = self.gesture.box_id();
        self.gesture = Gesture::Idle;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::boxes::BoxKind;
    use crate::editor::capabilities::Capabilities;
    use crate::geometry::MAX_CANVAS;
    use crate::spreadsheet::{Record, SpreadsheetData};
    use crate::template::Template;

    fn editor() -> EditorSession {
        let mut e = EditorSession::new(Capabilities::COMBINED, MAX_CANVAS);
        e.set_template(Template::new("t.png", "/t.png", Size::new(800.0, 600.0)))
            .unwrap();
        e.load_spreadsheet(SpreadsheetData::new(
            vec!["name".to_string()],
            vec![Record::from([("name".to_string(), "Ada".to_string())])],
        ));
        e
    }

    #[test]
    fn test_drag_moves_by_pointer_delta() {
        let mut e = editor();
        let id = e.create_box(BoxKind::Text, "name", None).unwrap();
        e.place_box(id, 100.0, 100.0).unwrap();

        e.pointer_down(id, HitTarget::Body, Point::new(150.0, 120.0)).unwrap();
        e.pointer_move(Point::new(160.0, 125.0)).unwrap();
        e.pointer_move(Point::new(180.0, 130.0)).unwrap();
        assert_eq!(e.pointer_up(), Some(id));

        assert_eq!(e.get(id).unwrap().position(), Point::new(130.0, 110.0));
        assert!(!e.gesture().is_active());
    }

    #[test]
    fn test_drag_stays_inside_canvas() {
        let mut e = editor();
        let id = e.create_box(BoxKind::Text, "name", None).unwrap();
        e.pointer_down(id, HitTarget::Body, Point::new(400.0, 300.0)).unwrap();
        for step in 1..50 {
            let d = step as f64 * 40.0;
            e.pointer_move(Point::new(400.0 + d, 300.0 - d)).unwrap();
            let b = e.get(id).unwrap();
            assert!(b.position().x >= 0.0 && b.position().y >= 0.0);
            assert!(b.rect().right() <= 800.0 && b.rect().bottom() <= 600.0);
        }
        e.pointer_up();
        assert_eq!(e.get(id).unwrap().position(), Point::new(650.0, 0.0));
    }

    #[test]
    fn test_resize_follows_pointer_from_grab() {
        let mut e = editor();
        let id = e.create_box(BoxKind::Text, "name", None).unwrap();
        e.place_box(id, 0.0, 0.0).unwrap();
        e.pointer_down(id, HitTarget::ResizeHandle, Point::new(150.0, 60.0)).unwrap();
        e.pointer_move(Point::new(250.0, 100.0)).unwrap();
        e.pointer_move(Point::new(300.0, 160.0)).unwrap();
        e.pointer_up();
        let b = e.get(id).unwrap();
        assert_eq!(b.size(), Size::new(300.0, 160.0));
        assert_eq!(b.position(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_resize_floors_at_minimum() {
        let mut e = editor();
        let id = e.create_box(BoxKind::Text, "name", None).unwrap();
        e.pointer_down(id, HitTarget::ResizeHandle, Point::new(0.0, 0.0)).unwrap();
        e.pointer_move(Point::new(-5000.0, -5000.0)).unwrap();
        assert_eq!(e.get(id).unwrap().size(), Size::new(100.0, 50.0));
    }

    #[test]
    fn test_only_one_gesture_at_a_time() {
        let mut e = editor();
        let a = e.create_box(BoxKind::Text, "name", None).unwrap();
        let b = e.create_box(BoxKind::Text, "name", None).unwrap();
        e.pointer_down(a, HitTarget::Body, Point::new(0.0, 0.0)).unwrap();
        assert!(e.pointer_down(b, HitTarget::ResizeHandle, Point::new(0.0, 0.0)).is_err());
        assert_eq!(e.selected(), Some(a));
        assert_eq!(e.gesture().box_id(), Some(a));
    }

    #[test]
    fn test_pointer_down_selects() {
        let mut e = editor();
        let a = e.create_box(BoxKind::Text, "name", None).unwrap();
        let _b = e.create_box(BoxKind::Text, "name", None).unwrap();
        e.pointer_down(a, HitTarget::Body, Point::new(0.0, 0.0)).unwrap();
        assert_eq!(e.selected(), Some(a));
    }

    #[test]
    fn test_delete_during_gesture_ends_it() {
        let mut e = editor();
        let a = e.create_box(BoxKind::Text, "name", None).unwrap();
        e.pointer_down(a, HitTarget::Body, Point::new(0.0, 0.0)).unwrap();
        e.delete_box(a).unwrap();
        assert!(!e.gesture().is_active());
        assert!(e.pointer_move(Point::new(10.0, 10.0)).is_ok());
    }

    #[test]
    fn test_move_while_idle_is_noop() {
        let mut e = editor();
        let a = e.create_box(BoxKind::Text, "name", None).unwrap();
        let before = e.get(a).unwrap().position();
        e.pointer_move(Point::new(999.0, 999.0)).unwrap();
        assert_eq!(e.get(a).unwrap().position(), before);
        assert_eq!(e.pointer_up(), None);
    }
}

use crate::geometry::{self, DisplayPoint, DisplaySize, NormPoint, NormVector};
use crate::text::element::TextElement;

/// Half-extent of the rectangular hit window around an element anchor, in
/// percent of the surface.
///
/// The window is deliberately independent of the rendered text bounds:
/// anchor-relative hit-testing is cheap, deterministic, and good enough for
/// repositioning. The defaults are tuned empirically, not derived from font
/// metrics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragTolerance {
    pub x: f32,
    pub y: f32,
}

impl Default for DragTolerance {
    fn default() -> Self {
        Self { x: 10.0, y: 5.0 }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum DragState {
    Idle,
    Dragging {
        id: String,
        /// Pointer offset from the element anchor at grab time, percent
        /// space. Subtracted on every move so the element does not jump to
        /// the pointer.
        offset: NormVector,
    },
}

/// Translates pointer input into selection and position mutations.
///
/// Three conceptual states: idle, selecting (transient, collapses within
/// `pointer_down`), dragging. Only the selected element's `(x, y)` is ever
/// written; all other fields and all other elements are untouched, so
/// element identity is preserved across a drag.
pub struct InteractionController {
    tolerance: DragTolerance,
    state: DragState,
    selected: Option<String>,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self::with_tolerance(DragTolerance::default())
    }

    pub fn with_tolerance(tolerance: DragTolerance) -> Self {
        Self {
            tolerance,
            state: DragState::Idle,
            selected: None,
        }
    }

    /// Id of the currently selected element, if any. Selection survives
    /// pointer-up so the outline stays visible between drags.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Hit-tests the pointer against each anchor in collection order.
    ///
    /// The first element whose hit window contains the pointer becomes
    /// selected and a drag starts; no hit clears the selection. Pointer
    /// coordinates are in *displayed* pixels and are normalized against the
    /// displayed size, so a responsively scaled surface needs no special
    /// handling by the caller.
    pub fn pointer_down(
        &mut self,
        elements: &[TextElement],
        pointer: DisplayPoint,
        display: DisplaySize,
    ) -> Option<&str> {
        let at = normalize(pointer, display);

        let hit = elements.iter().find(|el| {
            (at.x - el.x).abs() <= self.tolerance.x && (at.y - el.y).abs() <= self.tolerance.y
        });

        match hit {
            Some(el) => {
                self.state = DragState::Dragging {
                    id: el.id.clone(),
                    offset: NormVector::new(at.x - el.x, at.y - el.y),
                };
                self.selected = Some(el.id.clone());
                self.selected.as_deref()
            }
            None => {
                self.state = DragState::Idle;
                self.selected = None;
                None
            }
        }
    }

    /// Moves the dragged element to follow the pointer.
    ///
    /// Returns whether an element position changed; the caller is
    /// responsible for propagating the updated collection. A move while
    /// idle, or after the dragged element disappeared from the collection,
    /// is a no-op.
    pub fn pointer_move(
        &mut self,
        elements: &mut [TextElement],
        pointer: DisplayPoint,
        display: DisplaySize,
    ) -> bool {
        let DragState::Dragging { id, offset } = &self.state else {
            return false;
        };

        let Some(element) = elements.iter_mut().find(|el| &el.id == id) else {
            // Dragged element was removed externally; stop the drag.
            self.state = DragState::Idle;
            return false;
        };

        let at = normalize(pointer, display);
        element.x = at.x - offset.x;
        element.y = at.y - offset.y;
        true
    }

    /// Ends the drag. The last move's mutation stands; nothing further is
    /// committed.
    pub fn pointer_up(&mut self) {
        self.state = DragState::Idle;
    }

    /// The pointer left the interactive region; treated exactly like
    /// pointer-up so a drag can never get stuck.
    pub fn pointer_leave(&mut self) {
        self.pointer_up();
    }
}

fn normalize(pointer: DisplayPoint, display: DisplaySize) -> NormPoint {
    NormPoint::new(
        geometry::to_percent_x(pointer.x, display.width),
        geometry::to_percent_y(pointer.y, display.height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element_at(id: &str, x: f32, y: f32) -> TextElement {
        let mut el = TextElement::new(id, "text");
        el.x = x;
        el.y = y;
        el
    }

    fn display() -> DisplaySize {
        DisplaySize::new(500.0, 1000.0)
    }

    fn at_percent(x: f32, y: f32) -> DisplayPoint {
        // Inverse of the controller's normalization for a 500x1000 display.
        DisplayPoint::new(x / 100.0 * 500.0, y / 100.0 * 1000.0)
    }

    #[test]
    fn pointer_inside_the_window_selects() {
        let elements = vec![element_at("a", 50.0, 50.0)];
        let mut controller = InteractionController::new();
        let hit = controller.pointer_down(&elements, at_percent(58.0, 46.0), display());
        assert_eq!(hit, Some("a"));
        assert!(controller.is_dragging());
    }

    #[test]
    fn pointer_outside_all_windows_clears_selection() {
        let elements = vec![element_at("a", 50.0, 50.0)];
        let mut controller = InteractionController::new();
        controller.pointer_down(&elements, at_percent(50.0, 50.0), display());
        assert_eq!(controller.selected(), Some("a"));

        controller.pointer_down(&elements, at_percent(90.0, 90.0), display());
        assert_eq!(controller.selected(), None);
        assert!(!controller.is_dragging());
    }

    #[test]
    fn first_matching_element_wins() {
        // Overlapping windows: collection order decides.
        let elements = vec![element_at("under", 50.0, 50.0), element_at("over", 52.0, 51.0)];
        let mut controller = InteractionController::new();
        let hit = controller.pointer_down(&elements, at_percent(51.0, 50.5), display());
        assert_eq!(hit, Some("under"));
    }

    #[test]
    fn drag_moves_by_the_pointer_delta_exactly() {
        let mut elements = vec![element_at("a", 50.0, 50.0), element_at("b", 20.0, 80.0)];
        let untouched = elements[1].clone();
        let mut controller = InteractionController::new();

        // Grab slightly off-center of the anchor.
        controller.pointer_down(&elements, at_percent(53.0, 48.0), display());
        controller.pointer_move(&mut elements, at_percent(63.0, 58.0), display());

        // (old anchor) + (pointer delta), regardless of grab offset.
        assert!((elements[0].x - 60.0).abs() < 1e-4);
        assert!((elements[0].y - 60.0).abs() < 1e-4);
        // No other element and no other field changed.
        assert_eq!(elements[1], untouched);
        assert_eq!(elements[0].id, "a");
        assert_eq!(elements[0].text, "text");
    }

    #[test]
    fn responsive_scaling_cancels_out() {
        let mut small = vec![element_at("a", 50.0, 50.0)];
        let mut large = vec![element_at("a", 50.0, 50.0)];
        let mut controller = InteractionController::new();

        // The same gesture in percent terms on two display sizes.
        let small_display = DisplaySize::new(100.0, 100.0);
        controller.pointer_down(&small, DisplayPoint::new(50.0, 50.0), small_display);
        controller.pointer_move(&mut small, DisplayPoint::new(60.0, 55.0), small_display);
        controller.pointer_up();

        let large_display = DisplaySize::new(1000.0, 1000.0);
        controller.pointer_down(&large, DisplayPoint::new(500.0, 500.0), large_display);
        controller.pointer_move(&mut large, DisplayPoint::new(600.0, 550.0), large_display);

        assert!((small[0].x - large[0].x).abs() < 1e-4);
        assert!((small[0].y - large[0].y).abs() < 1e-4);
    }

    #[test]
    fn moves_without_a_drag_are_ignored() {
        let mut elements = vec![element_at("a", 50.0, 50.0)];
        let mut controller = InteractionController::new();
        assert!(!controller.pointer_move(&mut elements, at_percent(10.0, 10.0), display()));
        assert_eq!(elements[0].x, 50.0);
    }

    #[test]
    fn leaving_the_surface_ends_the_drag() {
        let mut elements = vec![element_at("a", 50.0, 50.0)];
        let mut controller = InteractionController::new();
        controller.pointer_down(&elements, at_percent(50.0, 50.0), display());
        controller.pointer_leave();
        assert!(!controller.is_dragging());
        // Selection itself survives, only the drag stops.
        assert_eq!(controller.selected(), Some("a"));
        assert!(!controller.pointer_move(&mut elements, at_percent(0.0, 0.0), display()));
    }

    #[test]
    fn removing_the_dragged_element_stops_cleanly() {
        let elements = vec![element_at("a", 50.0, 50.0)];
        let mut controller = InteractionController::new();
        controller.pointer_down(&elements, at_percent(50.0, 50.0), display());

        let mut emptied: Vec<TextElement> = Vec::new();
        assert!(!controller.pointer_move(&mut emptied, at_percent(60.0, 60.0), display()));
        assert!(!controller.is_dragging());
    }
}

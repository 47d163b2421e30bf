use std::path::PathBuf;

use parking_lot::Mutex;

use crate::{
    binder::{AnalysisContent, bind_content},
    compositor::{CompositeOptions, Compositor},
    error::{CompositeError, ExportError},
    font_storage::FontStorage,
    geometry::{DisplayPoint, DisplaySize},
    interact::{DragTolerance, InteractionController},
    renderer::CpuRenderer,
    text::element::TextElement,
};

/// Callback invoked with the full element list after every
/// controller-originated move. The owner decides persistence and undo.
pub type ChangeHandler = Box<dyn FnMut(&[TextElement]) + Send>;

/// High-level entry point tying fonts, layout, compositing, and interaction
/// together for one composition.
///
/// Every piece of state sits behind its own `Mutex` so a shared
/// `OverlaySystem` can be driven from UI callbacks without external
/// locking; each method acquires what it needs and releases it before
/// returning. This also gives the element collection the single exclusive
/// writer the interaction model assumes.
pub struct OverlaySystem {
    /// The underlying font storage. Public for direct access when the
    /// passthrough methods are not enough.
    pub font_storage: Mutex<FontStorage>,
    renderer: Mutex<CpuRenderer>,
    compositor: Mutex<Compositor>,
    elements: Mutex<Vec<TextElement>>,
    controller: Mutex<InteractionController>,
    on_change: Mutex<Option<ChangeHandler>>,
}

impl OverlaySystem {
    /// Creates a system with an empty composition for a surface of the
    /// given logical pixel size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            font_storage: Mutex::new(FontStorage::new()),
            renderer: Mutex::new(CpuRenderer::new()),
            compositor: Mutex::new(Compositor::new(width, height)),
            elements: Mutex::new(Vec::new()),
            controller: Mutex::new(InteractionController::new()),
            on_change: Mutex::new(None),
        }
    }

    /// Replaces the hit-testing tolerance window.
    pub fn set_drag_tolerance(&self, tolerance: DragTolerance) {
        *self.controller.lock() = InteractionController::with_tolerance(tolerance);
    }
}

/// Font loading passthroughs.
impl OverlaySystem {
    pub fn load_system_fonts(&self) {
        self.font_storage.lock().load_system_fonts();
    }

    pub fn load_font_binary(&self, data: impl Into<Vec<u8>>) {
        self.font_storage.lock().load_font_binary(data);
    }

    pub fn load_font_file(&self, path: PathBuf) -> Result<(), std::io::Error> {
        self.font_storage.lock().load_font_file(path)
    }
}

/// Element collection management.
impl OverlaySystem {
    /// Replaces the element collection wholesale.
    pub fn set_elements(&self, elements: Vec<TextElement>) {
        *self.elements.lock() = elements;
    }

    /// A snapshot of the current elements.
    ///
    /// # Performance
    /// Clones the collection to avoid holding the lock; lock `elements`
    /// internals via the pointer methods instead if that matters.
    pub fn elements(&self) -> Vec<TextElement> {
        self.elements.lock().clone()
    }

    /// Binds analysis copy onto its style's preset and installs the result
    /// as the element collection.
    pub fn apply_analysis(&self, content: &AnalysisContent) {
        self.set_elements(bind_content(content));
    }

    /// Registers the mutation callback fired after every drag move.
    pub fn set_change_handler(&self, handler: impl FnMut(&[TextElement]) + Send + 'static) {
        *self.on_change.lock() = Some(Box::new(handler));
    }
}

/// Compositing and export.
impl OverlaySystem {
    /// Runs one composite pass over the current elements.
    ///
    /// In editable mode the currently selected element, if any, gets the
    /// selection outline.
    pub fn composite(&self, background: &[u8], editable: bool) -> Result<(), CompositeError> {
        let options = self.options(editable);
        let elements = self.elements.lock();
        let mut fonts = self.font_storage.lock();
        let mut renderer = self.renderer.lock();
        self.compositor
            .lock()
            .composite(background, &elements, &options, &mut fonts, &mut renderer)
    }

    /// Like [`Self::composite`], reading the background from a file.
    pub fn composite_file(
        &self,
        path: impl AsRef<std::path::Path>,
        editable: bool,
    ) -> Result<(), CompositeError> {
        let bytes = std::fs::read(path)?;
        self.composite(&bytes, editable)
    }

    /// Encodes the current composited frame as PNG bytes.
    pub fn export_png(&self) -> Result<Vec<u8>, ExportError> {
        self.compositor.lock().export_png()
    }

    /// Resizes the logical surface; requires a fresh composite pass before
    /// the next export.
    pub fn set_surface_size(&self, width: u32, height: u32) {
        self.compositor.lock().set_size(width, height);
    }

    fn options(&self, editable: bool) -> CompositeOptions {
        CompositeOptions {
            editable,
            selected: editable
                .then(|| self.controller.lock().selected().map(str::to_string))
                .flatten(),
        }
    }
}

/// Pointer input, in displayed pixels.
impl OverlaySystem {
    /// Forwards a pointer-down; returns the id of the newly selected
    /// element, if the hit-test matched one.
    pub fn pointer_down(&self, pointer: DisplayPoint, display: DisplaySize) -> Option<String> {
        let elements = self.elements.lock();
        self.controller
            .lock()
            .pointer_down(&elements, pointer, display)
            .map(str::to_string)
    }

    /// Forwards a pointer-move; fires the change handler when an element
    /// actually moved. Returns whether it did.
    pub fn pointer_move(&self, pointer: DisplayPoint, display: DisplaySize) -> bool {
        let mut elements = self.elements.lock();
        let moved = self
            .controller
            .lock()
            .pointer_move(&mut elements, pointer, display);
        if moved
            && let Some(handler) = &mut *self.on_change.lock()
        {
            handler(&elements);
        }
        moved
    }

    pub fn pointer_up(&self) {
        self.controller.lock().pointer_up();
    }

    pub fn pointer_leave(&self) {
        self.controller.lock().pointer_leave();
    }

    /// Id of the currently selected element.
    pub fn selected(&self) -> Option<String> {
        self.controller.lock().selected().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    fn system_with_element() -> OverlaySystem {
        let system = OverlaySystem::new(200, 100);
        let mut el = TextElement::new("headline", "TITLE");
        el.x = 50.0;
        el.y = 50.0;
        system.set_elements(vec![el]);
        system
    }

    fn display() -> DisplaySize {
        DisplaySize::new(200.0, 100.0)
    }

    #[test]
    fn change_handler_fires_per_move() {
        let system = system_with_element();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        system.set_change_handler(move |elements| {
            assert_eq!(elements.len(), 1);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        system.pointer_down(DisplayPoint::new(100.0, 50.0), display());
        assert!(system.pointer_move(DisplayPoint::new(120.0, 60.0), display()));
        assert!(system.pointer_move(DisplayPoint::new(140.0, 70.0), display()));
        system.pointer_up();

        assert_eq!(fired.load(Ordering::SeqCst), 2);
        let el = &system.elements()[0];
        assert!((el.x - 70.0).abs() < 1e-4);
        assert!((el.y - 70.0).abs() < 1e-4);
    }

    #[test]
    fn handler_does_not_fire_without_a_hit() {
        let system = system_with_element();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        system.set_change_handler(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        system.pointer_down(DisplayPoint::new(5.0, 5.0), display());
        system.pointer_move(DisplayPoint::new(50.0, 50.0), display());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn analysis_flows_into_the_element_collection() {
        let system = OverlaySystem::new(100, 100);
        system.apply_analysis(&AnalysisContent {
            title: "T".to_string(),
            subtitle: None,
            body_text: vec!["b".to_string()],
            style: "modern".to_string(),
        });
        let elements = system.elements();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].id, "headline");
        assert_eq!(elements[1].id, "body");
    }

    #[test]
    fn export_requires_a_composite_pass() {
        let system = OverlaySystem::new(100, 100);
        assert!(matches!(
            system.export_png(),
            Err(ExportError::NotComposited)
        ));
    }
}

/// stackfx web host - canvas + requestAnimationFrame driver
///
/// Renders the stack with the core software rasterizer and blits each frame
/// into a 2D canvas. Input listeners are attached through the engine's
/// [`EventHost`] seam so teardown can remove every one of them.
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use stackfx_core::{
    Engine, EngineConfig, EngineError, EventHost, Headless, ListenerKind, ListenerTarget,
    MacroState, MemberInfo, Rgb, Surface,
};
use wasm_bindgen::{prelude::*, Clamped, JsCast};
use web_sys::{
    CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement, ImageData, MouseEvent,
    Window,
};

/// The frame is rendered at 1/RESOLUTION_DIVISOR of the CSS size and
/// stretched by the browser
const RESOLUTION_DIVISOR: i32 = 2;
const BACKGROUND: u32 = 0x15151f;

type RafClosure = Closure<dyn FnMut(f64)>;

/// The mounted engine, if any, plus animating notifications raised while it
/// was borrowed. Notifications reach JavaScript only after the borrow ends,
/// so an observer can call back into the handle.
#[derive(Default)]
struct Shared {
    engine: RefCell<Option<Engine>>,
    pending: RefCell<Vec<bool>>,
    observer: RefCell<Option<js_sys::Function>>,
}

impl Shared {
    /// Route the engine's observer into the pending queue
    fn observe(self: &Rc<Self>, engine: &mut Engine) {
        let shared: Weak<Shared> = Rc::downgrade(self);
        engine.on_animating_change(move |animating| {
            if let Some(shared) = shared.upgrade() {
                shared.pending.borrow_mut().push(animating);
            }
        });
    }

    /// Deliver queued notifications. Call with the engine borrow released.
    fn flush(&self) {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        if pending.is_empty() {
            return;
        }
        let Some(observer) = self.observer.borrow().clone() else {
            return;
        };
        for animating in pending {
            if let Err(err) = observer.call1(&JsValue::NULL, &JsValue::from_bool(animating)) {
                log::warn!("animating observer threw: {err:?}");
            }
        }
    }
}

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))
}

/// Size the canvas backing store to its layout box
fn fit_canvas(canvas: &HtmlCanvasElement) -> Surface {
    let width = (canvas.client_width() / RESOLUTION_DIVISOR).max(0) as u32;
    let height = (canvas.client_height() / RESOLUTION_DIVISOR).max(0) as u32;
    if width > 0 && height > 0 {
        canvas.set_width(width);
        canvas.set_height(height);
    }
    Surface::new(width, height)
}

/// Route one DOM event into the engine
fn dispatch(shared: &Shared, canvas: &HtmlCanvasElement, window: &Window, kind: ListenerKind, event: &Event) {
    {
        // A JS observer calling back into the engine mid-frame finds it busy
        let Ok(mut guard) = shared.engine.try_borrow_mut() else {
            return;
        };
        let Some(engine) = guard.as_mut() else {
            return;
        };

        let pointer = event
            .dyn_ref::<MouseEvent>()
            .map(|m| (m.offset_x() as f32, m.offset_y() as f32));
        match (kind, pointer) {
            (ListenerKind::PointerDown, Some((x, y))) => engine.pointer_down(x, y),
            (ListenerKind::PointerMove, Some((x, y))) => {
                engine.pointer_move(x, y);
            }
            (ListenerKind::PointerUp, _) => engine.pointer_up(),
            (ListenerKind::PointerLeave, _) => engine.pointer_leave(),
            (ListenerKind::Scroll, _) => {
                let offset = window.scroll_y().unwrap_or(0.0);
                engine.on_scroll(offset as f32);
            }
            (ListenerKind::Resize, _) => engine.resize(fit_canvas(canvas)),
            _ => {}
        }
    }
    shared.flush();
}

/// DOM listeners owned on behalf of the engine
struct DomListeners {
    shared: Rc<Shared>,
    canvas: HtmlCanvasElement,
    window: Window,
    attached: Vec<(ListenerKind, Closure<dyn FnMut(Event)>)>,
}

impl DomListeners {
    fn target_for(&self, kind: ListenerKind) -> &EventTarget {
        match kind.target() {
            ListenerTarget::Surface => self.canvas.as_ref(),
            ListenerTarget::Global => self.window.as_ref(),
        }
    }
}

impl EventHost for DomListeners {
    fn listen(&mut self, kind: ListenerKind) -> Result<(), EngineError> {
        let (shared, canvas, window) = (self.shared.clone(), self.canvas.clone(), self.window.clone());
        let callback = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |event: Event| {
            dispatch(&shared, &canvas, &window, kind, &event);
        }));
        self.target_for(kind)
            .add_event_listener_with_callback(kind.event_name(), callback.as_ref().unchecked_ref())
            .map_err(|err| EngineError::ListenerRegistration {
                kind: kind.to_string(),
                reason: format!("{err:?}"),
            })?;
        self.attached.push((kind, callback));
        Ok(())
    }

    fn unlisten(&mut self, kind: ListenerKind) {
        let Some(index) = self.attached.iter().position(|(k, _)| *k == kind) else {
            return;
        };
        let (_, callback) = self.attached.remove(index);
        if let Err(err) = self
            .target_for(kind)
            .remove_event_listener_with_callback(kind.event_name(), callback.as_ref().unchecked_ref())
        {
            log::warn!("failed to remove {kind} listener: {err:?}");
        }
    }
}

/// Tick the engine and present its frame. Returns false once the engine is gone.
fn draw_frame(shared: &Shared, context: &CanvasRenderingContext2d, delta: Duration) -> bool {
    let alive = {
        let Ok(mut guard) = shared.engine.try_borrow_mut() else {
            return true;
        };
        match guard.as_mut() {
            Some(engine) if engine.is_active() => {
                engine.tick(delta);
                if let Err(err) = present(engine, context) {
                    log::warn!("failed to present frame: {err:?}");
                }
                true
            }
            _ => false,
        }
    };
    shared.flush();
    alive
}

fn present(engine: &Engine, context: &CanvasRenderingContext2d) -> Result<(), JsValue> {
    let frame = engine.frame();
    if frame.width() == 0 || frame.height() == 0 {
        return Ok(());
    }
    let pixels = frame.to_rgba(Rgb::hex(BACKGROUND));
    let image = ImageData::new_with_u8_clamped_array_and_sh(
        Clamped(pixels.as_slice()),
        frame.width() as u32,
        frame.height() as u32,
    )?;
    context.put_image_data(&image, 0.0, 0.0)
}

/// requestAnimationFrame loop; holds the pending request id for cancellation
struct FrameLoop {
    window: Window,
    callback: Rc<RefCell<Option<RafClosure>>>,
    pending: Rc<Cell<Option<i32>>>,
}

impl FrameLoop {
    fn start(window: Window, shared: Rc<Shared>, context: CanvasRenderingContext2d) -> Result<Self, JsValue> {
        let callback: Rc<RefCell<Option<RafClosure>>> = Rc::new(RefCell::new(None));
        let pending = Rc::new(Cell::new(None));
        let last_timestamp = Cell::new(None::<f64>);

        let (next, pending_id, win) = (callback.clone(), pending.clone(), window.clone());
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            pending_id.set(None);
            let delta_ms = last_timestamp
                .replace(Some(timestamp))
                .map(|previous| (timestamp - previous).max(0.0))
                .unwrap_or(0.0);
            if !draw_frame(&shared, &context, Duration::from_secs_f64(delta_ms / 1000.0)) {
                return;
            }
            if let Some(f) = next.borrow().as_ref() {
                match win.request_animation_frame(f.as_ref().unchecked_ref()) {
                    Ok(id) => pending_id.set(Some(id)),
                    Err(err) => log::warn!("failed to schedule frame: {err:?}"),
                }
            }
        }) as Box<dyn FnMut(f64)>));

        let first = match callback.borrow().as_ref() {
            Some(f) => window.request_animation_frame(f.as_ref().unchecked_ref())?,
            None => return Err(JsValue::from_str("frame callback missing")),
        };
        pending.set(Some(first));

        Ok(Self {
            window,
            callback,
            pending,
        })
    }

    fn stop(&self) {
        if let Some(id) = self.pending.take() {
            if let Err(err) = self.window.cancel_animation_frame(id) {
                log::warn!("failed to cancel frame: {err:?}");
            }
        }
        // Breaks the closure's reference to itself
        self.callback.borrow_mut().take();
    }
}

/// `{ name, accent }` label object for one member
fn member_label(member: &MemberInfo) -> Result<JsValue, JsValue> {
    let label = js_sys::Object::new();
    js_sys::Reflect::set(&label, &"name".into(), &JsValue::from_str(&member.name))?;
    js_sys::Reflect::set(&label, &"accent".into(), &JsValue::from_str(&member.accent.to_css()))?;
    Ok(label.into())
}

/// Handle returned to JavaScript for one mounted canvas.
///
/// A handle whose mount failed holds no engine; every method is then a
/// no-op and the queries report the resting defaults.
#[wasm_bindgen]
pub struct WebEngine {
    shared: Rc<Shared>,
    listeners: Option<DomListeners>,
    frames: Option<FrameLoop>,
}

impl WebEngine {
    fn detached() -> Self {
        Self {
            shared: Rc::new(Shared::default()),
            listeners: None,
            frames: None,
        }
    }

    fn with_engine<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> Option<R> {
        let result = {
            let mut guard = self.shared.engine.try_borrow_mut().ok()?;
            guard.as_mut().map(f)
        };
        self.shared.flush();
        result
    }

    /// Mount on `canvas`, or `None` with a warning if it cannot be drawn on
    fn mount(window: Window, canvas: HtmlCanvasElement) -> Option<Self> {
        let context = match canvas.get_context("2d") {
            Ok(Some(context)) => context.dyn_into::<CanvasRenderingContext2d>().ok(),
            _ => None,
        };
        let Some(context) = context else {
            log::warn!("{}; nothing will be drawn", EngineError::RasterUnavailable);
            return None;
        };

        let shared = Rc::new(Shared::default());
        let mut listeners = DomListeners {
            shared: shared.clone(),
            canvas: canvas.clone(),
            window: window.clone(),
            attached: Vec::new(),
        };

        let mut engine = match Engine::mount(fit_canvas(&canvas), EngineConfig::default(), &mut listeners) {
            Ok(engine) => engine,
            Err(err) => {
                log::warn!("mount failed: {err}; nothing will be drawn");
                return None;
            }
        };
        shared.observe(&mut engine);
        *shared.engine.borrow_mut() = Some(engine);

        let mut handle = Self {
            shared: shared.clone(),
            listeners: Some(listeners),
            frames: None,
        };
        match FrameLoop::start(window, shared, context) {
            Ok(frames) => handle.frames = Some(frames),
            Err(err) => {
                log::warn!("failed to start the frame loop: {err:?}");
                handle.teardown();
                return None;
            }
        }
        Some(handle)
    }
}

#[wasm_bindgen]
impl WebEngine {
    /// Mount on the canvas with id `canvas_id` and start drawing.
    ///
    /// A missing, non-canvas or zero-sized element yields an inert handle
    /// instead of throwing.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<WebEngine, JsValue> {
        let window = window()?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .and_then(|element| element.dyn_into::<HtmlCanvasElement>().ok());
        let Some(canvas) = canvas else {
            log::warn!("no canvas #{canvas_id}; nothing will be drawn");
            return Ok(Self::detached());
        };
        Ok(Self::mount(window, canvas).unwrap_or_else(Self::detached))
    }

    /// Request "assembled" (`true`) or "exploded" (`false`)
    #[wasm_bindgen(js_name = requestTransition)]
    pub fn request_transition(&self, assembled: bool, immediate: Option<bool>) {
        let target = if assembled {
            MacroState::Assembled
        } else {
            MacroState::Exploded
        };
        self.with_engine(|e| e.request_transition(target, immediate.unwrap_or(false)));
    }

    pub fn toggle(&self) {
        self.with_engine(|e| e.toggle());
    }

    /// Push a scroll offset explicitly, for hosts scrolling something other
    /// than the window
    #[wasm_bindgen(js_name = onScroll)]
    pub fn on_scroll(&self, offset_px: f32) {
        self.with_engine(|e| e.on_scroll(offset_px));
    }

    /// `{ name, accent }` label objects, top to bottom
    pub fn members(&self) -> Result<js_sys::Array, JsValue> {
        let labels = js_sys::Array::new();
        for member in self.with_engine(|e| e.members()).unwrap_or_default() {
            labels.push(&member_label(&member)?);
        }
        Ok(labels)
    }

    /// CSS colour for the label of ingredient `name`
    #[wasm_bindgen(js_name = accentOf)]
    pub fn accent_of(&self, name: &str) -> Option<String> {
        self.with_engine(|e| e.member(name).map(|m| m.accent.to_css()))
            .flatten()
    }

    #[wasm_bindgen(js_name = isAnimating)]
    pub fn is_animating(&self) -> bool {
        self.with_engine(|e| e.is_animating()).unwrap_or(false)
    }

    #[wasm_bindgen(js_name = isAssembled)]
    pub fn is_assembled(&self) -> bool {
        self.with_engine(|e| e.macro_state() == MacroState::Assembled)
            .unwrap_or(false)
    }

    /// Call `callback(animating)` whenever a transition starts or finishes.
    /// The handle is idle by the time it runs, so the callback may query it.
    #[wasm_bindgen(js_name = onAnimatingChange)]
    pub fn on_animating_change(&self, callback: js_sys::Function) {
        *self.shared.observer.borrow_mut() = Some(callback);
    }

    /// Stop drawing and release listeners and resources. Safe to repeat.
    pub fn teardown(&mut self) {
        // Refused while a frame or event holds the engine
        let Ok(mut guard) = self.shared.engine.try_borrow_mut() else {
            log::warn!("teardown while the engine is busy");
            return;
        };
        if let Some(frames) = self.frames.take() {
            frames.stop();
        }
        if let Some(mut engine) = guard.take() {
            match self.listeners.as_mut() {
                Some(listeners) => engine.teardown(listeners),
                None => engine.teardown(&mut Headless),
            }
        }
        drop(guard);
        self.shared.pending.borrow_mut().clear();
        self.shared.observer.borrow_mut().take();
    }
}

impl Drop for WebEngine {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Setup panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> EngineConfig {
        EngineConfig {
            procedural_detail: false,
            lathe_segments: 8,
            ..EngineConfig::default()
        }
    }

    /// Handle around an engine mounted on a headless host
    fn headless_handle() -> WebEngine {
        let handle = WebEngine::detached();
        let mut engine = Engine::mount(Surface::new(32, 20), quick_config(), &mut Headless).unwrap();
        handle.shared.observe(&mut engine);
        *handle.shared.engine.borrow_mut() = Some(engine);
        handle
    }

    #[test]
    fn test_detached_handle_is_inert() {
        let mut handle = WebEngine::detached();
        handle.request_transition(true, None);
        handle.request_transition(false, Some(true));
        handle.toggle();
        handle.on_scroll(500.0);
        assert!(!handle.is_animating());
        assert!(!handle.is_assembled());
        assert_eq!(handle.accent_of("Lettuce"), None);

        handle.teardown();
        handle.teardown();
        assert!(handle.shared.engine.borrow().is_none());
    }

    #[test]
    fn test_handle_forwards_to_engine() {
        let handle = headless_handle();
        handle.request_transition(true, Some(true));
        assert!(handle.is_assembled());
        assert_eq!(handle.accent_of("Tomato Slice").as_deref().map(str::len), Some(7));
        handle.on_scroll(0.0);
        assert!(handle.is_animating());
    }

    #[test]
    fn test_notifications_wait_for_engine_release() {
        let handle = headless_handle();
        {
            let mut guard = handle.shared.engine.borrow_mut();
            guard.as_mut().unwrap().toggle();
            // Raised mid-borrow, still queued
            assert_eq!(*handle.shared.pending.borrow(), vec![true]);
        }
        handle.shared.flush();
        assert!(handle.shared.pending.borrow().is_empty());

        // Entry points deliver before returning
        handle.request_transition(false, Some(true));
        assert!(handle.shared.pending.borrow().is_empty());
    }

    #[test]
    fn test_teardown_releases_engine() {
        let mut handle = headless_handle();
        handle.toggle();
        handle.teardown();
        assert!(handle.shared.engine.borrow().is_none());
        assert!(!handle.is_animating());
        handle.teardown();
    }
}

//! Idea Board entry point
//!
//! Handles platform-specific initialization and runs the board loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_board {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlElement, HtmlInputElement, KeyboardEvent, MouseEvent};

    use idea_board::board::Persistence;
    use idea_board::persistence::LocalBridge;
    use idea_board::runtime::{Outcome, Runtime, Task};
    use idea_board::sim::{IdeaId, Mode, Rect};
    use idea_board::{BoardSettings, IdeaBoard, platform};

    /// A rendered idea and its pointer-down handler
    struct IdeaView {
        el: HtmlElement,
        _on_down: Closure<dyn FnMut(MouseEvent)>,
    }

    /// Document-level drag listeners, attached only while a drag is active
    struct DragListeners {
        on_move: js_sys::Function,
        on_up: js_sys::Function,
    }

    struct App {
        runtime: Runtime,
        document: Document,
        canvas: HtmlElement,
        trash: HtmlElement,
        mode_button: Option<HtmlElement>,
        views: HashMap<IdeaId, IdeaView>,
        drag_listeners: Option<DragListeners>,
        drag_attached: bool,
    }

    impl App {
        /// Pointer position in canvas space
        fn pointer(&self, event: &MouseEvent) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            Vec2::new(
                event.client_x() as f32 - rect.left() as f32,
                event.client_y() as f32 - rect.top() as f32,
            )
        }

        /// Report canvas and trash geometry to the board
        fn measure_layout(&mut self) {
            let canvas_rect = self.canvas.get_bounding_client_rect();
            let size = Vec2::new(
                self.canvas.offset_width() as f32,
                self.canvas.offset_height() as f32,
            );
            self.runtime.enqueue(Task::CanvasResized(size));

            let trash_rect = self.trash.get_bounding_client_rect();
            let trash = Rect::new(
                Vec2::new(
                    (trash_rect.left() - canvas_rect.left()) as f32,
                    (trash_rect.top() - canvas_rect.top()) as f32,
                ),
                Vec2::new(trash_rect.width() as f32, trash_rect.height() as f32),
            );
            self.runtime.enqueue(Task::TrashMoved(trash));
            self.runtime.run_pending();
        }

        fn attach_drag_listeners(&mut self) {
            if self.drag_attached {
                return;
            }
            if let Some(listeners) = &self.drag_listeners {
                let _ = self
                    .document
                    .add_event_listener_with_callback("mousemove", &listeners.on_move);
                let _ = self
                    .document
                    .add_event_listener_with_callback("mouseup", &listeners.on_up);
                self.drag_attached = true;
            }
        }

        fn detach_drag_listeners(&mut self) {
            if let Some(listeners) = &self.drag_listeners {
                let _ = self
                    .document
                    .remove_event_listener_with_callback("mousemove", &listeners.on_move);
                let _ = self
                    .document
                    .remove_event_listener_with_callback("mouseup", &listeners.on_up);
            }
            self.drag_attached = false;
        }

        fn update_mode_button(&self, mode: Mode) {
            if let Some(btn) = &self.mode_button {
                btn.set_text_content(Some(mode.label()));
                let _ = btn
                    .class_list()
                    .toggle_with_force("active", mode == Mode::Piano);
            }
        }

        fn handle_outcomes(&mut self, outcomes: Vec<Outcome>) {
            for outcome in outcomes {
                match outcome {
                    Outcome::ModeChanged(mode) => self.update_mode_button(mode),
                    Outcome::Released(_) => self.detach_drag_listeners(),
                    _ => {}
                }
            }
        }
    }

    /// Bring the DOM in line with the board
    fn sync_view(app: &Rc<RefCell<App>>) {
        let mut new_ids = Vec::new();
        {
            let mut a = app.borrow_mut();
            let a = &mut *a;
            let board = a.runtime.board();

            // Drop views for ideas that no longer exist
            a.views.retain(|id, view| {
                let alive = board.idea(id).is_some();
                if !alive {
                    view.el.remove();
                }
                alive
            });

            for idea in board.ideas() {
                let Some(view) = a.views.get(&idea.id) else {
                    new_ids.push(idea.id.clone());
                    continue;
                };
                let style = view.el.style();
                let _ = style.set_property(
                    "transform",
                    &format!("translate({}px, {}px)", idea.pos.x, idea.pos.y),
                );
                let _ = style.set_property("z-index", &idea.z.to_string());
                let _ = style.set_property("font-size", &format!("{}px", idea.effective_font_size()));
                let classes = view.el.class_list();
                let _ = classes.toggle_with_force("piano-white", idea.variant.css_class() == Some("piano-white"));
                let _ = classes.toggle_with_force("piano-black", idea.variant.css_class() == Some("piano-black"));
                let _ = classes.toggle_with_force("selected", board.selected() == Some(&idea.id));
                let _ = style.set_property(
                    "cursor",
                    if board.dragged() == Some(&idea.id) { "grabbing" } else { "grab" },
                );
            }

            let _ = a
                .trash
                .class_list()
                .toggle_with_force("trash-can-hover", board.trash_hover());
        }

        for id in new_ids {
            create_view(app, id);
        }
    }

    /// Create the element for a new idea and report its rendered size
    fn create_view(app: &Rc<RefCell<App>>, id: IdeaId) {
        let mut a = app.borrow_mut();
        let Some(text) = a.runtime.board().idea(&id).map(|i| i.text().to_string()) else {
            return;
        };
        let Ok(el) = a.document.create_element("div") else {
            return;
        };
        let Ok(el) = el.dyn_into::<HtmlElement>() else {
            return;
        };
        let _ = el.class_list().add_1("idea");
        el.set_text_content(Some(&text));
        let _ = a.canvas.append_child(&el);

        let on_down = {
            let app = app.clone();
            let id = id.clone();
            Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if event.button() != 0 {
                    return;
                }
                event.stop_propagation();
                let mut a = app.borrow_mut();
                let pointer = a.pointer(&event);
                a.runtime.dispatch(Task::PointerDown {
                    id: id.clone(),
                    pointer,
                });
                if a.runtime.board().dragged() == Some(&id) {
                    a.attach_drag_listeners();
                }
            })
        };
        let _ = el.add_event_listener_with_callback("mousedown", on_down.as_ref().unchecked_ref());

        let size = Vec2::new(el.offset_width() as f32, el.offset_height() as f32);
        a.runtime.dispatch(Task::Measured { id: id.clone(), size });
        a.views.insert(
            id,
            IdeaView {
                el,
                _on_down: on_down,
            },
        );
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Idea Board starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("canvas is not an HTML element");
        let trash: HtmlElement = document
            .get_element_by_id("trash-can")
            .expect("no trash can")
            .dyn_into()
            .expect("trash can is not an HTML element");
        let mode_button = document
            .get_element_by_id("mode-toggle")
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());

        let mut store = platform::default_store();
        let settings = BoardSettings::load(store.as_ref());
        // Write back sanitized values so the stored copy is complete and editable
        settings.save(store.as_mut());
        let seed = platform::seed();
        let board = IdeaBoard::new(seed, settings, Persistence::Local(LocalBridge::new(store)));
        log::info!("Board initialized with seed: {}", seed);

        let app = Rc::new(RefCell::new(App {
            runtime: Runtime::new(board),
            document: document.clone(),
            canvas,
            trash,
            mode_button,
            views: HashMap::new(),
            drag_listeners: None,
            drag_attached: false,
        }));

        {
            let mut a = app.borrow_mut();
            a.measure_layout();
            a.runtime.dispatch(Task::Load);
            let mode = a.runtime.board().mode();
            a.update_mode_button(mode);
        }

        setup_drag_listeners(app.clone());
        setup_input_handlers(&document, app.clone());
        setup_controls(&document, app.clone());
        setup_window_handlers(app.clone());

        sync_view(&app);
        request_animation_frame(app);

        log::info!("Idea Board running!");
    }

    fn setup_drag_listeners(app: Rc<RefCell<App>>) {
        let on_move = {
            let app = app.clone();
            Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                let pointer = a.pointer(&event);
                a.runtime.dispatch(Task::PointerMove(pointer));
            })
        };
        let on_up = {
            let app = app.clone();
            Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                {
                    let mut a = app.borrow_mut();
                    let outcomes = a.runtime.dispatch(Task::PointerUp);
                    a.handle_outcomes(outcomes);
                    a.detach_drag_listeners();
                }
                sync_view(&app);
            })
        };

        app.borrow_mut().drag_listeners = Some(DragListeners {
            on_move: on_move.as_ref().unchecked_ref::<js_sys::Function>().clone(),
            on_up: on_up.as_ref().unchecked_ref::<js_sys::Function>().clone(),
        });
        // Live for the whole page; attached/detached per drag
        on_move.forget();
        on_up.forget();
    }

    fn submit_from_input(app: &Rc<RefCell<App>>, input: &HtmlInputElement) {
        let text = input.value();
        if text.trim().is_empty() {
            return;
        }
        app.borrow_mut().runtime.dispatch(Task::Submit(text));
        input.set_value("");
        sync_view(app);
    }

    fn setup_input_handlers(document: &Document, app: Rc<RefCell<App>>) {
        let Some(input) = document
            .get_element_by_id("idea-input")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            log::warn!("No #idea-input element, typing is disabled");
            return;
        };

        // Enter key
        {
            let app = app.clone();
            let input_clone = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.key() == "Enter" {
                    event.prevent_default();
                    submit_from_input(&app, &input_clone);
                }
            });
            let _ = input.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Submit button
        if let Some(btn) = document.get_element_by_id("submit-idea") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                submit_from_input(&app, &input);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_controls(document: &Document, app: Rc<RefCell<App>>) {
        // Mode toggle
        if let Some(btn) = document.get_element_by_id("mode-toggle") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut a = app.borrow_mut();
                let outcomes = a.runtime.dispatch(Task::ToggleMode);
                a.handle_outcomes(outcomes);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Reset
        if let Some(btn) = document.get_element_by_id("reset-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                {
                    let mut a = app.borrow_mut();
                    a.runtime.dispatch(Task::Reset);
                    a.detach_drag_listeners();
                }
                sync_view(&app);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Font size buttons
        for (button_id, steps) in [("font-up", 1), ("font-down", -1)] {
            if let Some(btn) = document.get_element_by_id(button_id) {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    resize_selected(&app, steps);
                });
                let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        // Clicking empty canvas clears the selection
        {
            let canvas = app.borrow().canvas.clone();
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().runtime.dispatch(Task::Select(None));
            });
            let _ = canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard resize (ignored while typing)
        {
            let window = web_sys::window().expect("no window");
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let typing = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                    .is_some();
                if typing {
                    return;
                }
                match event.key().as_str() {
                    "+" | "=" => resize_selected(&app, 1),
                    "-" | "_" => resize_selected(&app, -1),
                    _ => {}
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn resize_selected(app: &Rc<RefCell<App>>, steps: i32) {
        let mut a = app.borrow_mut();
        let Some(id) = a.runtime.board().selected().cloned() else {
            return;
        };
        if a.runtime.dispatch(Task::Resize(steps)).is_empty() {
            return;
        }
        // Re-measure once the new font size is applied
        let Some(font) = a.runtime.board().idea(&id).map(|i| i.effective_font_size()) else {
            return;
        };
        if let Some(view) = a.views.get(&id) {
            let _ = view.el.style().set_property("font-size", &format!("{}px", font));
            let size = Vec2::new(view.el.offset_width() as f32, view.el.offset_height() as f32);
            a.runtime.dispatch(Task::Measured { id, size });
        }
    }

    fn setup_window_handlers(app: Rc<RefCell<App>>) {
        let window = web_sys::window().expect("no window");

        // Resize: canvas and trash move with the layout
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().measure_layout();
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Hidden tabs stop getting frames; don't integrate the gap
        {
            let document = window.document().expect("no document");
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let visible = !document_clone.hidden();
                app.borrow_mut().runtime.dispatch(Task::Visibility(visible));
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::once(move |time: f64| {
            board_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn board_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().runtime.dispatch(Task::Frame(time));
        sync_view(&app);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_board::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Idea Board (native) starting...");
    log::info!("Native mode runs a headless demo - build for wasm32 for the browser board");

    run_headless_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drive a board for a few simulated seconds and report what happened
#[cfg(not(target_arch = "wasm32"))]
fn run_headless_demo() {
    use idea_board::board::Persistence;
    use idea_board::persistence::LocalBridge;
    use idea_board::runtime::{Outcome, Runtime, Task};
    use idea_board::{BoardSettings, IdeaBoard, platform};

    let mut store = platform::default_store();
    let settings = BoardSettings::load(store.as_ref());
    settings.save(store.as_mut());
    let board = IdeaBoard::new(platform::seed(), settings, Persistence::Local(LocalBridge::new(store)));
    let mut runtime = Runtime::new(board);

    for text in ["Ship it", "Write the docs", "Refactor later", "Coffee"] {
        runtime.enqueue(Task::Submit(text.to_string()));
    }
    runtime.run_pending();

    let mut now = 0.0;
    for _ in 0..300 {
        now += 16.0;
        runtime.dispatch(Task::Frame(now));
    }
    runtime.dispatch(Task::ToggleMode);
    for _ in 0..300 {
        now += 16.0;
        runtime.dispatch(Task::Frame(now));
    }

    for idea in runtime.board().ideas() {
        println!(
            "{:>16}  pos=({:7.1}, {:7.1})  vel=({:5.2}, {:5.2})  {:?}",
            idea.text(),
            idea.pos.x,
            idea.pos.y,
            idea.vel.x,
            idea.vel.y,
            idea.variant
        );
    }

    // Throw the first idea into the trash
    let first = runtime
        .board()
        .ideas()
        .next()
        .map(|first| (first.id.clone(), first.pos));
    if let Some((id, grab)) = first {
        let target = runtime.board().trash().center();
        runtime.enqueue(Task::PointerDown { id, pointer: grab });
        runtime.enqueue(Task::PointerMove(target));
        runtime.enqueue(Task::PointerUp);
        for outcome in runtime.run_pending() {
            if let Outcome::Released(release) = outcome {
                println!("released: {:?}", release);
            }
        }
    }

    println!("{} ideas left on the board", runtime.board().len());
}

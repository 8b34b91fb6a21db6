//! Single-threaded task queue in front of the board
//!
//! Host callbacks (animation frames, pointer and keyboard events, feed
//! notifications) never touch the board directly; they enqueue a [`Task`] and
//! the runtime applies tasks strictly in arrival order. A frame task therefore
//! always sees the positions left by earlier pointer tasks.

use std::collections::VecDeque;

use glam::Vec2;

use crate::board::IdeaBoard;
use crate::persistence::RemoteEvent;
use crate::sim::{DragRelease, IdeaId, Mode, Rect};

/// One unit of work for the board
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// Animation frame at host timestamp (ms)
    Frame(f64),
    Submit(String),
    ToggleMode,
    PointerDown { id: IdeaId, pointer: Vec2 },
    PointerMove(Vec2),
    PointerUp,
    Select(Option<IdeaId>),
    Resize(i32),
    Reset,
    Load,
    Remote(RemoteEvent),
    CanvasResized(Vec2),
    TrashMoved(Rect),
    Measured { id: IdeaId, size: Vec2 },
    /// Page hidden/shown; the next frame starts a fresh clock
    Visibility(bool),
}

/// Observable effect of a task, for the view layer
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Nothing,
    Created(IdeaId),
    ModeChanged(Mode),
    Released(DragRelease),
    TrashHover(bool),
    Resized(f32),
    Loaded(usize),
    Stepped(f32),
}

pub struct Runtime {
    board: IdeaBoard,
    queue: VecDeque<Task>,
}

impl Runtime {
    pub fn new(board: IdeaBoard) -> Self {
        Self {
            board,
            queue: VecDeque::new(),
        }
    }

    pub fn board(&self) -> &IdeaBoard {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut IdeaBoard {
        &mut self.board
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queue a task without running it
    pub fn enqueue(&mut self, task: Task) {
        self.queue.push_back(task);
    }

    /// Queue a task and drain the queue
    pub fn dispatch(&mut self, task: Task) -> Vec<Outcome> {
        self.enqueue(task);
        self.run_pending()
    }

    /// Run every queued task in order. Feed notifications that arrive while
    /// running are queued behind the task that caused them.
    pub fn run_pending(&mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        while let Some(task) = self.queue.pop_front() {
            let outcome = self.apply(task);
            if outcome != Outcome::Nothing {
                outcomes.push(outcome);
            }
            self.collect_remote();
        }
        outcomes
    }

    fn collect_remote(&mut self) {
        if !self.board.is_remote() {
            return;
        }
        // Applied by the board right away but ordered after the current task
        let handled = self.board.pump_remote();
        if handled > 0 {
            log::debug!("Applied {} feed notifications", handled);
        }
    }

    fn apply(&mut self, task: Task) -> Outcome {
        let board = &mut self.board;
        match task {
            Task::Frame(now_ms) => Outcome::Stepped(board.tick(now_ms)),
            Task::Submit(text) => match board.submit(&text) {
                Some(id) => Outcome::Created(id),
                None => Outcome::Nothing,
            },
            Task::ToggleMode => Outcome::ModeChanged(board.toggle_mode()),
            Task::PointerDown { id, pointer } => {
                board.begin_drag(&id, pointer);
                Outcome::Nothing
            }
            Task::PointerMove(pointer) => {
                if board.dragged().is_none() {
                    return Outcome::Nothing;
                }
                Outcome::TrashHover(board.drag_to(pointer))
            }
            Task::PointerUp => match board.release_drag() {
                DragRelease::None => Outcome::Nothing,
                release => Outcome::Released(release),
            },
            Task::Select(Some(id)) => {
                board.select(&id);
                Outcome::Nothing
            }
            Task::Select(None) => {
                board.clear_selection();
                Outcome::Nothing
            }
            Task::Resize(steps) => match board.resize_selected(steps) {
                Some(size) => Outcome::Resized(size),
                None => Outcome::Nothing,
            },
            Task::Reset => {
                board.reset();
                Outcome::Nothing
            }
            Task::Load => Outcome::Loaded(board.load()),
            Task::Remote(event) => {
                board.apply_remote(event);
                Outcome::Nothing
            }
            Task::CanvasResized(size) => {
                board.set_canvas(size);
                Outcome::Nothing
            }
            Task::TrashMoved(rect) => {
                board.set_trash(rect);
                Outcome::Nothing
            }
            Task::Measured { id, size } => {
                board.set_measured_size(&id, size);
                Outcome::Nothing
            }
            Task::Visibility(visible) => {
                if !visible {
                    board.pause_clock();
                }
                Outcome::Nothing
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Persistence;
    use crate::persistence::{IdeaRecord, LoopbackFeed, RemoteBridge};
    use crate::settings::BoardSettings;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn pinned(text: &str, x: f32, y: f32) -> RemoteEvent {
        RemoteEvent::Added {
            key: text.to_string(),
            record: IdeaRecord {
                text: text.to_string(),
                x: Some(x),
                y: Some(y),
                vx: Some(0.0),
                vy: Some(0.0),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_tasks_run_in_order() {
        let mut runtime = Runtime::new(IdeaBoard::ephemeral(1));
        runtime.enqueue(Task::Submit("first".into()));
        runtime.enqueue(Task::Submit("  ".into()));
        runtime.enqueue(Task::ToggleMode);
        runtime.enqueue(Task::Frame(0.0));
        assert_eq!(runtime.pending(), 4);

        let outcomes = runtime.run_pending();
        assert!(matches!(outcomes[0], Outcome::Created(_)));
        assert_eq!(outcomes[1], Outcome::ModeChanged(Mode::Piano));
        assert_eq!(outcomes[2], Outcome::Stepped(0.0));
        assert_eq!(runtime.pending(), 0);
        assert_eq!(runtime.board().len(), 1);
    }

    #[test]
    fn test_pointer_move_between_frames_is_authoritative() {
        let mut runtime = Runtime::new(IdeaBoard::ephemeral(1));
        runtime.dispatch(Task::Remote(pinned("a", 100.0, 100.0)));
        let id = IdeaId::Remote("a".into());

        runtime.dispatch(Task::Frame(0.0));
        runtime.dispatch(Task::PointerDown {
            id: id.clone(),
            pointer: Vec2::new(110.0, 110.0),
        });
        runtime.dispatch(Task::PointerMove(Vec2::new(150.0, 130.0)));
        runtime.dispatch(Task::Frame(16.0));
        assert_eq!(runtime.board().idea(&id).unwrap().pos, Vec2::new(140.0, 120.0));

        let outcomes = runtime.dispatch(Task::PointerUp);
        assert!(matches!(
            &outcomes[0],
            Outcome::Released(DragRelease::Thrown { vel, .. }) if *vel == Vec2::new(20.0, 10.0)
        ));
        // A second release is a no-op
        assert!(runtime.dispatch(Task::PointerUp).is_empty());
    }

    #[test]
    fn test_resize_requires_selection() {
        let mut runtime = Runtime::new(IdeaBoard::ephemeral(1));
        assert!(runtime.dispatch(Task::Resize(1)).is_empty());
        let outcomes = runtime.dispatch(Task::Submit("pick me".into()));
        let Outcome::Created(id) = outcomes[0].clone() else {
            panic!("expected a new idea");
        };
        runtime.dispatch(Task::Select(Some(id)));
        assert_eq!(runtime.dispatch(Task::Resize(-1)), vec![Outcome::Resized(14.0)]);
        runtime.dispatch(Task::Select(None));
        assert!(runtime.dispatch(Task::Resize(-1)).is_empty());
    }

    #[test]
    fn test_feed_echo_lands_after_submit() {
        let feed = Rc::new(RefCell::new(LoopbackFeed::new()));
        let bridge = RemoteBridge::new(Box::new(feed.clone()));
        let board = IdeaBoard::new(1, BoardSettings::default(), Persistence::Remote(bridge));
        let mut runtime = Runtime::new(board);

        runtime.dispatch(Task::Submit("echoed".into()));
        assert_eq!(runtime.board().len(), 1);
        runtime.dispatch(Task::Reset);
        assert!(runtime.board().is_empty());
        assert!(feed.borrow().records().is_empty());
    }

    #[test]
    fn test_hidden_page_restarts_clock() {
        let mut runtime = Runtime::new(IdeaBoard::ephemeral(1));
        runtime.dispatch(Task::Frame(1000.0));
        runtime.dispatch(Task::Visibility(false));
        assert_eq!(runtime.dispatch(Task::Frame(50_000.0)), vec![Outcome::Stepped(0.0)]);
    }
}

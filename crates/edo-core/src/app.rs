//! The application loop: [`Model`], [`Effect`], [`AppRunner`],
//! [`EventLoopDriver`].
//!
//! The runner owns the model and the controller state machine
//! (`Uninitialized → Initialized → Running → Terminated`). A driver owns
//! the platform event loop, feeds translated input to
//! [`AppRunner::handle_msg`], and presents the scene returned by
//! [`AppRunner::draw_frame`] once per loop iteration.

use crate::color::Color;
use crate::messages::Msg;
use crate::scene::Scene;

// ---------------------------------------------------------------------------
// Effect
// ---------------------------------------------------------------------------

/// A side-effect returned by [`Model::update`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Signal the application loop to stop.
    End,
}

// ---------------------------------------------------------------------------
// Model trait
// ---------------------------------------------------------------------------

/// The application model (Elm architecture).
pub trait Model {
    /// Process a message, optionally returning a side-effect.
    fn update(&mut self, msg: Msg) -> Option<Effect>;

    /// Render the current state into `scene`.
    fn draw(&self, scene: &mut Scene);
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Controller lifecycle state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AppState {
    /// No platform resources acquired yet.
    Uninitialized,
    /// Window and render surface acquired.
    Initialized,
    /// Event loop active.
    Running,
    /// Quit requested; the driver exits on its next poll.
    Terminated,
}

// ---------------------------------------------------------------------------
// AppRunner
// ---------------------------------------------------------------------------

/// Owns the model and drives the controller state machine.
pub struct AppRunner {
    model: Box<dyn Model>,
    scene: Scene,
    width: i32,
    height: i32,
    background: Color,
    state: AppState,
}

impl AppRunner {
    /// Create a runner in the `Uninitialized` state.
    pub fn new(model: Box<dyn Model>, width: i32, height: i32, background: Color) -> Self {
        Self {
            model,
            scene: Scene::new(background),
            width,
            height,
            background,
            state: AppState::Uninitialized,
        }
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> AppState {
        self.state
    }

    /// Frame width in pixels.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Frame height in pixels.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Mark platform resources as acquired: `Uninitialized → Initialized`.
    ///
    /// Drivers call this once the window and render surface exist. Any
    /// acquisition failure must instead abort [`EventLoopDriver::run`];
    /// there is no partial-success continuation.
    pub fn init(&mut self) {
        if self.state == AppState::Uninitialized {
            self.state = AppState::Initialized;
        }
    }

    /// Enter the event loop: `Initialized → Running`, delivering
    /// [`Msg::Init`] to the model.
    pub fn start(&mut self) {
        if self.state != AppState::Initialized {
            return;
        }
        self.state = AppState::Running;
        self.dispatch(Msg::Init);
    }

    /// Deliver one message.
    ///
    /// [`Msg::Quit`] terminates directly; other messages go through the
    /// model, which may return [`Effect::End`]. After termination all
    /// messages are ignored.
    pub fn handle_msg(&mut self, msg: Msg) {
        match msg {
            Msg::Quit => self.terminate(),
            msg => {
                if self.state == AppState::Running {
                    self.dispatch(msg);
                }
            }
        }
    }

    /// Whether the driver should exit its loop.
    #[inline]
    pub fn should_quit(&self) -> bool {
        self.state == AppState::Terminated
    }

    /// Rebuild the scene from the model and return it for presentation.
    ///
    /// Called once per loop iteration regardless of whether any input
    /// arrived, so idle frames still refresh.
    pub fn draw_frame(&mut self) -> &Scene {
        self.scene.reset(self.background);
        self.model.draw(&mut self.scene);
        &self.scene
    }

    fn dispatch(&mut self, msg: Msg) {
        if let Some(Effect::End) = self.model.update(msg) {
            self.terminate();
        }
    }

    /// Enter the terminal state. Idempotent: the transition happens at
    /// most once.
    fn terminate(&mut self) {
        if self.state != AppState::Terminated {
            self.state = AppState::Terminated;
        }
    }
}

// ---------------------------------------------------------------------------
// EventLoopDriver trait
// ---------------------------------------------------------------------------

/// Back-end driver owning the main-thread event loop.
///
/// A driver acquires its window and render surface (the scoped guard for
/// the platform's video subsystem), runs the loop until
/// [`AppRunner::should_quit`] turns true, and releases everything it
/// acquired in reverse order when `run` returns — on error paths too.
pub trait EventLoopDriver {
    /// Run the application to completion.
    ///
    /// # Errors
    ///
    /// Any window/surface/device acquisition failure. Callers treat this
    /// as fatal.
    fn run(self, runner: AppRunner) -> Result<(), Box<dyn std::error::Error>>;
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::geom::{Point, Rect};
    use crate::messages::Key;
    use crate::scene::ImageId;

    /// Model that moves a rectangle by 10 per key press and quits on 'q'.
    struct RectModel {
        pos: Point,
        inits: u32,
        updates: u32,
    }

    impl RectModel {
        fn new() -> Self {
            Self {
                pos: Point::ZERO,
                inits: 0,
                updates: 0,
            }
        }
    }

    impl Model for RectModel {
        fn update(&mut self, msg: Msg) -> Option<Effect> {
            self.updates += 1;
            match msg {
                Msg::Init => self.inits += 1,
                Msg::KeyDown { key } => match key {
                    Key::ArrowRight => self.pos.x += 10,
                    Key::ArrowLeft => self.pos.x -= 10,
                    Key::ArrowDown => self.pos.y += 10,
                    Key::ArrowUp => self.pos.y -= 10,
                    Key::Char('q') => return Some(Effect::End),
                    _ => {}
                },
                Msg::Quit => {}
            }
            None
        }

        fn draw(&self, scene: &mut Scene) {
            scene.draw_image(ImageId(0), Rect::sized(self.pos, 320, 240));
        }
    }

    #[test]
    fn state_machine_transitions() {
        let mut runner = AppRunner::new(Box::new(RectModel::new()), 640, 480, Color::WHITE);
        assert_eq!(runner.state(), AppState::Uninitialized);
        assert_eq!((runner.width(), runner.height()), (640, 480));

        // Messages before Running are dropped.
        runner.handle_msg(Msg::key(Key::ArrowRight));

        runner.init();
        assert_eq!(runner.state(), AppState::Initialized);

        // start() from the wrong state is a no-op.
        runner.start();
        assert_eq!(runner.state(), AppState::Running);
        runner.init();
        assert_eq!(runner.state(), AppState::Running);
    }

    #[test]
    fn init_message_delivered_once() {
        let mut runner = AppRunner::new(Box::new(RectModel::new()), 640, 480, Color::WHITE);
        runner.init();
        runner.start();
        runner.start();

        let scene = runner.draw_frame();
        // One image command drawn at the origin: Init arrived, nothing moved.
        assert_eq!(scene.cmds().len(), 1);
    }

    #[test]
    fn movement_accumulates_into_the_scene() {
        let mut runner = AppRunner::new(Box::new(RectModel::new()), 640, 480, Color::WHITE);
        runner.init();
        runner.start();

        runner.handle_msg(Msg::key(Key::ArrowRight));
        runner.handle_msg(Msg::key(Key::ArrowRight));
        runner.handle_msg(Msg::key(Key::ArrowDown));

        let scene = runner.draw_frame();
        match &scene.cmds()[0] {
            crate::scene::DrawCmd::Image { dst, .. } => {
                assert_eq!(dst.min, Point::new(20, 10));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn quit_key_terminates_exactly_once() {
        let mut runner = AppRunner::new(Box::new(RectModel::new()), 640, 480, Color::WHITE);
        runner.init();
        runner.start();
        assert!(!runner.should_quit());

        runner.handle_msg(Msg::key(Key::Char('q')));
        assert!(runner.should_quit());
        assert_eq!(runner.state(), AppState::Terminated);

        // Further input is ignored after termination.
        runner.handle_msg(Msg::key(Key::ArrowRight));
        runner.handle_msg(Msg::Quit);
        assert_eq!(runner.state(), AppState::Terminated);

        let scene = runner.draw_frame();
        match &scene.cmds()[0] {
            crate::scene::DrawCmd::Image { dst, .. } => assert_eq!(dst.min, Point::ZERO),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn close_request_terminates() {
        let mut runner = AppRunner::new(Box::new(RectModel::new()), 640, 480, Color::WHITE);
        runner.init();
        runner.start();
        runner.handle_msg(Msg::Quit);
        assert!(runner.should_quit());
    }

    // -- teardown -----------------------------------------------------------

    /// Counts releases so tests can assert release-exactly-once.
    struct SurfaceGuard {
        releases: Rc<Cell<u32>>,
    }

    impl Drop for SurfaceGuard {
        fn drop(&mut self) {
            self.releases.set(self.releases.get() + 1);
        }
    }

    /// Headless driver: acquires a guard, pumps queued messages, presents
    /// one frame per iteration, and releases on every exit path.
    struct HeadlessDriver {
        msgs: Vec<Msg>,
        fail_acquire: bool,
        releases: Rc<Cell<u32>>,
        frames: Rc<Cell<u32>>,
    }

    impl EventLoopDriver for HeadlessDriver {
        fn run(self, mut runner: AppRunner) -> Result<(), Box<dyn std::error::Error>> {
            if self.fail_acquire {
                return Err("surface acquisition failed".into());
            }
            let _guard = SurfaceGuard {
                releases: Rc::clone(&self.releases),
            };

            runner.init();
            runner.start();

            for msg in self.msgs {
                if runner.should_quit() {
                    break;
                }
                runner.handle_msg(msg);
                runner.draw_frame();
                self.frames.set(self.frames.get() + 1);
            }
            Ok(())
        }
    }

    #[test]
    fn driver_releases_resources_exactly_once() {
        let releases = Rc::new(Cell::new(0));
        let frames = Rc::new(Cell::new(0));
        let driver = HeadlessDriver {
            msgs: vec![
                Msg::key(Key::ArrowRight),
                Msg::key(Key::Char('q')),
                Msg::key(Key::ArrowDown),
            ],
            fail_acquire: false,
            releases: Rc::clone(&releases),
            frames: Rc::clone(&frames),
        };

        let runner = AppRunner::new(Box::new(RectModel::new()), 640, 480, Color::WHITE);
        driver.run(runner).unwrap();

        assert_eq!(releases.get(), 1);
        // The ArrowDown after 'q' never produced a frame.
        assert_eq!(frames.get(), 2);
    }

    #[test]
    fn acquisition_failure_is_fatal_and_leak_free() {
        let releases = Rc::new(Cell::new(0));
        let driver = HeadlessDriver {
            msgs: Vec::new(),
            fail_acquire: true,
            releases: Rc::clone(&releases),
            frames: Rc::new(Cell::new(0)),
        };

        let runner = AppRunner::new(Box::new(RectModel::new()), 640, 480, Color::WHITE);
        assert!(driver.run(runner).is_err());
        // Nothing was acquired, so nothing to release.
        assert_eq!(releases.get(), 0);
    }
}

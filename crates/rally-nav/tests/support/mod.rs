//! Shared fixtures for navigation stack tests.
//!
//! [`TestScreen`] is a small closed config set; [`RecordingFactory`] builds
//! controllers that log their creation and destruction into a shared
//! [`Recorder`] so tests can assert lifecycle order.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rally_core::{Observable, SemanticVersion, TaskScope};
use rally_nav::{
    EntryId, Navigator, ScreenConfig, ScreenContext, ScreenController, ScreenFactory,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestScreen {
    Root,
    Home,
    A,
    B,
    Detail(String),
}

impl ScreenConfig for TestScreen {
    const SCHEMA: SemanticVersion = SemanticVersion::new(1, 0, 0);
    const TAGS: &'static [&'static str] = &["root", "home", "a", "b", "detail"];

    fn tag(&self) -> &'static str {
        match self {
            TestScreen::Root => "root",
            TestScreen::Home => "home",
            TestScreen::A => "a",
            TestScreen::B => "b",
            TestScreen::Detail(_) => "detail",
        }
    }
}

pub fn detail(id: &str) -> TestScreen {
    TestScreen::Detail(id.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    Created(EntryId, TestScreen),
    Destroyed(EntryId, TestScreen),
}

#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Lifecycle>>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<Lifecycle> {
        self.events.lock().clone()
    }

    pub fn take(&self) -> Vec<Lifecycle> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn created(&self) -> Vec<TestScreen> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Lifecycle::Created(_, config) => Some(config),
                Lifecycle::Destroyed(..) => None,
            })
            .collect()
    }

    pub fn destroyed(&self) -> Vec<TestScreen> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Lifecycle::Destroyed(_, config) => Some(config),
                Lifecycle::Created(..) => None,
            })
            .collect()
    }

    fn record(&self, event: Lifecycle) {
        self.events.lock().push(event);
    }
}

pub struct RecordingController {
    pub instance: u64,
    pub entry_id: EntryId,
    pub config: TestScreen,
    pub state: Observable<u32>,
    pub scope: TaskScope,
    pub navigator: Navigator<TestScreen>,
    recorder: Recorder,
}

impl ScreenController for RecordingController {
    fn on_destroy(&self) {
        self.state.close();
        self.recorder
            .record(Lifecycle::Destroyed(self.entry_id, self.config.clone()));
    }
}

#[derive(Debug, Default)]
pub struct RecordingFactory {
    recorder: Recorder,
    instances: AtomicU64,
}

impl RecordingFactory {
    pub fn new(recorder: Recorder) -> Self {
        Self {
            recorder,
            instances: AtomicU64::new(0),
        }
    }
}

impl ScreenFactory<TestScreen> for RecordingFactory {
    type Controller = RecordingController;

    fn create(&self, config: &TestScreen, ctx: ScreenContext<TestScreen>) -> RecordingController {
        self.recorder
            .record(Lifecycle::Created(ctx.entry_id(), config.clone()));
        RecordingController {
            instance: self.instances.fetch_add(1, Ordering::SeqCst),
            entry_id: ctx.entry_id(),
            config: config.clone(),
            state: Observable::new(0),
            scope: ctx.scope().clone(),
            navigator: ctx.navigator().clone(),
            recorder: self.recorder.clone(),
        }
    }
}

pub type TestStack = rally_nav::NavigationStack<TestScreen, RecordingFactory>;

pub fn stack_with(recorder: &Recorder, configs: Vec<TestScreen>) -> TestStack {
    match TestStack::with_history(RecordingFactory::new(recorder.clone()), configs) {
        Ok(stack) => stack,
        Err(err) => panic!("fixture history must be non-empty: {err}"),
    }
}

pub fn configs(stack: &TestStack) -> Vec<TestScreen> {
    stack.snapshot().configs().cloned().collect()
}

/// Progress events emitted by long-running engine operations.
#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards [`Progress`] events to an optional callback.
///
/// A default reporter swallows all events, so library code can report
/// unconditionally.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    pub fn phase(&self, name: &'static str) {
        self.report(Progress::PhaseStart { name });
    }

    pub fn phase_done(&self) {
        self.report(Progress::PhaseFinish);
    }

    pub fn task(&self, total_steps: u64) {
        self.report(Progress::TaskStart { total_steps });
    }

    pub fn tick(&self) {
        self.report(Progress::TaskIncrement);
    }

    pub fn task_done(&self) {
        self.report(Progress::TaskFinish);
    }

    pub fn message(&self, text: impl Into<String>) {
        self.report(Progress::Message(text.into()));
    }
}

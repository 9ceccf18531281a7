/// Events emitted by long-running workflows.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// A task with a known number of steps has begun.
    TaskStart { name: &'static str, total_steps: u64 },
    /// `steps` more steps of the current task have completed.
    TaskAdvance { steps: u64 },
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards [`Progress`] events to an optional callback.
///
/// The reporter is `Sync`, so parallel workers may share one reference.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    /// A reporter that discards every event.
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

    pub fn start(&self, name: &'static str, total_steps: u64) {
        self.report(Progress::TaskStart { name, total_steps });
    }

    #[inline]
    pub fn advance(&self, steps: u64) {
        self.report(Progress::TaskAdvance { steps });
    }

    pub fn finish(&self) {
        self.report(Progress::TaskFinish);
    }
}

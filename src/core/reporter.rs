/*!
 * Stage reporting
 *
 * The run is presented as a sequence of stages ("Finding helper",
 * "Running dictionary attack", ...). A [`Stage`] guard mutably borrows the
 * [`Reporter`], so only one stage can be open at a time, and every stage is
 * closed exactly once: explicitly via `succeed`/`fail`, or as a failure when
 * the guard is dropped early (error propagation with `?`).
 */

/// How a stage ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageEnd {
    Ok,
    Failed(String),
}

/// Receiver of stage events (console, test recorder, ...)
pub trait StageSink {
    fn stage_started(&mut self, title: &str);
    fn stage_progress(&mut self, current: u64, total: u64);
    fn stage_ended(&mut self, end: StageEnd);
}

/// Typed handle over a sink
pub struct Reporter<S: StageSink> {
    sink: S,
}

impl<S: StageSink> Reporter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Open a stage; it stays open until the guard is consumed or dropped
    pub fn stage(&mut self, title: &str) -> Stage<'_, S> {
        self.sink.stage_started(title);
        Stage {
            sink: &mut self.sink,
            open: true,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// An open stage
pub struct Stage<'r, S: StageSink> {
    sink: &'r mut S,
    open: bool,
}

impl<S: StageSink> Stage<'_, S> {
    pub fn progress(&mut self, current: u64, total: u64) {
        self.sink.stage_progress(current, total);
    }

    pub fn succeed(mut self) {
        self.finish(StageEnd::Ok);
    }

    pub fn fail(mut self, message: impl Into<String>) {
        self.finish(StageEnd::Failed(message.into()));
    }

    fn finish(&mut self, end: StageEnd) {
        if self.open {
            self.open = false;
            self.sink.stage_ended(end);
        }
    }
}

impl<S: StageSink> Drop for Stage<'_, S> {
    fn drop(&mut self) {
        self.finish(StageEnd::Failed(String::new()));
    }
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl StageSink for SilentSink {
    fn stage_started(&mut self, _title: &str) {}
    fn stage_progress(&mut self, _current: u64, _total: u64) {}
    fn stage_ended(&mut self, _end: StageEnd) {}
}

/// Event as seen by [`RecordingSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageEvent {
    Started(String),
    Progress(u64, u64),
    Ended(StageEnd),
}

/// Sink that keeps every event, for inspection
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub events: Vec<StageEvent>,
}

impl RecordingSink {
    pub fn progress(&self) -> Vec<(u64, u64)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                StageEvent::Progress(current, total) => Some((*current, *total)),
                _ => None,
            })
            .collect()
    }
}

impl StageSink for RecordingSink {
    fn stage_started(&mut self, title: &str) {
        self.events.push(StageEvent::Started(title.to_string()));
    }

    fn stage_progress(&mut self, current: u64, total: u64) {
        self.events.push(StageEvent::Progress(current, total));
    }

    fn stage_ended(&mut self, end: StageEnd) {
        self.events.push(StageEvent::Ended(end));
    }
}

/// One progress update from a running job. `percent` is `-1` on failure,
/// otherwise `0..=100`. `stage` names the current phase within the job
/// (e.g. `"extracting tables"`); `detail` is free-form, usually the object
/// currently being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub percent: i8,
    pub stage: String,
    pub detail: String,
}

impl ProgressUpdate {
    pub fn new(percent: i8, stage: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { percent, stage: stage.into(), detail: detail.into() }
    }

    pub fn failed(stage: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(-1, stage, detail)
    }
}

/// Where a job's progress updates go. Implemented by an in-process channel
/// sender in the pipeline, and by a JSON-lines writer in the CLI; tests use
/// `NullProgressSink` or a recording sink.
pub trait ProgressSink: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Discards every update. Useful for jobs run in tests or one-shot CLI
/// invocations that don't care about incremental progress.
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn report(&self, _update: ProgressUpdate) {}
}

/// Forwards updates over a `std::sync::mpsc` channel, the shape
/// `ora2pg-pipeline` uses to stream progress out of a worker thread.
pub struct ChannelProgressSink {
    sender: std::sync::mpsc::Sender<ProgressUpdate>,
}

impl ChannelProgressSink {
    pub fn new(sender: std::sync::mpsc::Sender<ProgressUpdate>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn report(&self, update: ProgressUpdate) {
        // The receiver may already be gone (caller stopped listening); a
        // job's own progress reporting should never fail because of that.
        let _ = self.sender.send(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    pub struct RecordingSink {
        pub updates: Arc<Mutex<Vec<ProgressUpdate>>>,
    }

    impl ProgressSink for RecordingSink {
        fn report(&self, update: ProgressUpdate) {
            self.updates.lock().unwrap().push(update);
        }
    }

    #[test]
    fn channel_sink_forwards_updates() {
        let (tx, rx) = std::sync::mpsc::channel();
        let sink = ChannelProgressSink::new(tx);
        sink.report(ProgressUpdate::new(50, "stage", "detail"));
        let got = rx.recv().unwrap();
        assert_eq!(got.percent, 50);
    }

    #[test]
    fn channel_sink_survives_dropped_receiver() {
        let (tx, rx) = std::sync::mpsc::channel();
        let sink = ChannelProgressSink::new(tx);
        drop(rx);
        sink.report(ProgressUpdate::new(10, "stage", "detail"));
    }

    #[test]
    fn failed_update_has_negative_percent() {
        let update = ProgressUpdate::failed("extracting", "connection reset");
        assert_eq!(update.percent, -1);
    }

    #[test]
    fn recording_sink_keeps_every_update_in_order() {
        let updates = Arc::new(Mutex::new(Vec::new()));
        let sink = RecordingSink { updates: updates.clone() };
        sink.report(ProgressUpdate::new(0, "start", ""));
        sink.report(ProgressUpdate::new(100, "done", ""));
        let recorded = updates.lock().unwrap();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[1].stage, "done");
    }
}

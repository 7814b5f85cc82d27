//! A `ProgressSink` that writes one JSON object per line, matching the
//! `{percent, stage, detail, timestamp}` shape of the external Job RPC
//! surface, so an embedding process can tail stdout for machine-readable
//! progress without linking against `ora2pg-jobs` itself.

use std::io::Write;
use std::sync::Mutex;

use ora2pg_jobs::{ProgressSink, ProgressUpdate};
use serde::Serialize;

#[derive(Serialize)]
struct ProgressLine<'a> {
    percent: i8,
    stage: &'a str,
    detail: &'a str,
    timestamp: String,
}

pub(crate) struct JsonLinesProgressSink<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesProgressSink<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }
}

impl<W: Write + Send> ProgressSink for JsonLinesProgressSink<W> {
    fn report(&self, update: ProgressUpdate) {
        let line = ProgressLine {
            percent: update.percent,
            stage: &update.stage,
            detail: &update.detail,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let mut out = self.out.lock().unwrap();
        if let Ok(text) = serde_json::to_string(&line) {
            let _ = writeln!(out, "{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn writes_one_json_object_per_update() {
        let buf: Vec<u8> = Vec::new();
        let sink = JsonLinesProgressSink::new(buf);
        sink.report(ProgressUpdate::new(50, "CreateTargetTables", "hr.employees"));
        let out = sink.out.into_inner().unwrap();
        let text = String::from_utf8(out).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(parsed["percent"], 50);
        assert_eq!(parsed["stage"], "CreateTargetTables");
        assert_eq!(parsed["detail"], "hr.employees");
        assert!(parsed["timestamp"].is_string());
    }
}

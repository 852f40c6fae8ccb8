//! Run metrics: stage timings and counters.
//!
//! A [`MetricsCollector`] is cheap to clone and safe to share between the two
//! corpus pipelines when they run concurrently. At the end of a run it can be
//! printed or saved as JSON.
//!
//! ```no_run
//! use corpus_unify::metrics::MetricsCollector;
//!
//! let metrics = MetricsCollector::new();
//! metrics.start();
//! let n = metrics.time_stage("enumerate", || 42);
//! metrics.record("files_found", n);
//! metrics.end();
//! metrics.print();
//! metrics.save_to_file("metrics.json")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Thread-safe container for run metrics.
#[derive(Clone, Default)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsInner>>,
}

#[derive(Default)]
struct MetricsInner {
    counters: BTreeMap<String, Value>,
    stages: Vec<(String, Duration)>,
    start_time: Option<Instant>,
    end_time: Option<Instant>,
}

impl MetricsCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of the run.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    pub fn start(&self) {
        self.inner.lock().unwrap().start_time = Some(Instant::now());
    }

    /// Mark the end of the run.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    pub fn end(&self) {
        self.inner.lock().unwrap().end_time = Some(Instant::now());
    }

    /// Set a named value, replacing any previous one.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    pub fn record(&self, name: &str, value: impl Into<Value>) {
        self.inner
            .lock()
            .unwrap()
            .counters
            .insert(name.to_string(), value.into());
    }

    /// Look up a recorded value.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.inner.lock().unwrap().counters.get(name).cloned()
    }

    /// Run `f`, recording its wall time under `stage`.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    pub fn time_stage<R>(&self, stage: &str, f: impl FnOnce() -> R) -> R {
        let t0 = Instant::now();
        let out = f();
        let elapsed = t0.elapsed();
        self.inner
            .lock()
            .unwrap()
            .stages
            .push((stage.to_string(), elapsed));
        out
    }

    /// Stage names in the order they finished.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn stages(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.stages.iter().map(|(s, _)| s.clone()).collect()
    }

    /// All metrics as one JSON object.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let inner = self.inner.lock().unwrap();
        let stages: serde_json::Map<String, Value> = inner
            .stages
            .iter()
            .map(|(name, d)| (name.clone(), json!(d.as_millis())))
            .collect();
        let mut out = json!({
            "counters": inner.counters,
            "stage_time_ms": stages,
        });
        if let (Some(start), Some(end)) = (inner.start_time, inner.end_time) {
            out["execution_time_ms"] = json!(end.duration_since(start).as_millis());
        }
        out
    }

    /// Print all metrics to stdout in a human-readable format.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    pub fn print(&self) {
        println!("\n========== Run Metrics ==========");

        let inner = self.inner.lock().unwrap();
        if let (Some(start), Some(end)) = (inner.start_time, inner.end_time) {
            let elapsed = end.duration_since(start);
            println!(
                "Execution Time: {:.3}s ({} ms)",
                elapsed.as_secs_f64(),
                elapsed.as_millis()
            );
            println!("---------------------------------");
        }
        for (stage, d) in &inner.stages {
            println!("{stage}: {} ms", d.as_millis());
        }
        if !inner.stages.is_empty() {
            println!("---------------------------------");
        }
        for (name, value) in &inner.counters {
            println!("{name}: {value}");
        }
        drop(inner);
        println!("=================================\n");
    }

    /// Save all metrics to a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written to.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let formatted = serde_json::to_string_pretty(&self.to_json())?;
        let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        file.write_all(formatted.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_and_stages_serialize() {
        let m = MetricsCollector::new();
        m.start();
        let v = m.time_stage("enumerate", || 3);
        m.record("files_found", v);
        m.record("column", "text");
        m.end();

        let j = m.to_json();
        assert_eq!(j["counters"]["files_found"], json!(3));
        assert_eq!(j["counters"]["column"], json!("text"));
        assert!(j["stage_time_ms"].get("enumerate").is_some());
        assert!(j.get("execution_time_ms").is_some());
        assert_eq!(m.stages(), vec!["enumerate".to_string()]);
    }

    #[test]
    fn clones_share_state() {
        let m = MetricsCollector::new();
        let m2 = m.clone();
        std::thread::spawn(move || m2.record("rows", 7u64))
            .join()
            .unwrap();
        assert_eq!(m.get("rows"), Some(json!(7)));
    }

    #[test]
    fn save_to_file_writes_json() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("metrics.json");
        let m = MetricsCollector::new();
        m.record("rows_written", 4u64);
        m.save_to_file(&path)?;
        let back: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(back["counters"]["rows_written"], json!(4));
        Ok(())
    }
}

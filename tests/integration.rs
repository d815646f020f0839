use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use pretty_assertions::assert_eq;

use ocrbench::export::csv_export::REPORT_FILE;
use ocrbench::ocr::{OcrStrategy, StrategyRegistry};
use ocrbench::{run_benchmark, BenchError, PipelineConfig};

type EventLog = Rc<RefCell<Vec<String>>>;

/// Test strategy that returns canned text and records its lifecycle.
struct Scripted {
    key: &'static str,
    reply: Option<&'static str>,
    loaded: bool,
    events: EventLog,
    resident: Option<Rc<RefCell<Vec<&'static str>>>>,
}

impl Scripted {
    fn new(key: &'static str, reply: Option<&'static str>, events: &EventLog) -> Self {
        Self {
            key,
            reply,
            loaded: false,
            events: Rc::clone(events),
            resident: None,
        }
    }
}

impl OcrStrategy for Scripted {
    fn key(&self) -> &str {
        self.key
    }

    fn load(&mut self) -> Result<()> {
        self.loaded = true;
        self.events.borrow_mut().push(format!("load {}", self.key));
        if let Some(resident) = &self.resident {
            resident.borrow_mut().push(self.key);
        }
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn recognize(&mut self, image: &Path) -> Result<String> {
        let name = image.file_name().unwrap().to_string_lossy().into_owned();
        self.events.borrow_mut().push(format!("run {} {name}", self.key));
        match self.reply {
            Some(text) => Ok(text.to_string()),
            None => anyhow::bail!("model crashed on {name}"),
        }
    }

    fn unload(&mut self) {
        if self.loaded {
            self.events.borrow_mut().push(format!("unload {}", self.key));
        }
        self.loaded = false;
        if let Some(resident) = &self.resident {
            resident.borrow_mut().retain(|k| *k != self.key);
        }
    }
}

struct Workspace {
    root: PathBuf,
}

impl Workspace {
    fn new(prefix: &str) -> Result<Self> {
        let mut root = std::env::temp_dir();
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        root.push(format!("{prefix}-{}-{now}", std::process::id()));
        fs::create_dir_all(root.join("images"))?;
        fs::create_dir_all(root.join("gts"))?;
        Ok(Self { root })
    }

    fn image(&self, name: &str) -> Result<()> {
        fs::write(self.root.join("images").join(name), b"\x89PNG")?;
        Ok(())
    }

    fn ground_truth(&self, stem: &str, text: &str) -> Result<()> {
        fs::write(self.root.join("gts").join(format!("{stem}.txt")), text)?;
        Ok(())
    }

    fn results(&self) -> PathBuf {
        self.root.join("results")
    }

    fn config(&self, engines: &[&str]) -> PipelineConfig {
        PipelineConfig::new(
            self.root.join("images"),
            self.root.join("gts"),
            self.results(),
            engines.iter().map(|e| e.to_string()).collect(),
        )
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

#[test]
fn perfect_transcription_scores_perfectly() -> Result<()> {
    let ws = Workspace::new("ocrbench-perfect")?;
    ws.image("greeting.png")?;
    ws.ground_truth("greeting", "Hello World\n")?;

    let events = EventLog::default();
    let mut registry = StrategyRegistry::new();
    registry.register(Box::new(Scripted::new("stub", Some("hello world"), &events)));

    let report = run_benchmark(&ws.config(&["stub"]), &mut registry)?;
    let rows = report.table.rows();
    assert_eq!(rows.len(), 1);

    let row = &rows[0];
    assert_eq!(row.image, "greeting.png");
    assert_eq!(row.engine, "stub");
    assert_eq!(row.gt, "Hello World");
    assert_eq!(row.ocr_raw, "hello world");
    assert_eq!(row.wer, 0.0);
    assert_eq!(row.cer, 0.0);
    assert_eq!(row.bleu, 1.0);
    assert!((row.rouge_l - 1.0).abs() < 1e-9);

    let raw = fs::read_to_string(ws.results().join("greeting__stub.txt"))?;
    assert_eq!(raw, "hello world");
    assert_eq!(report.report_path, Some(ws.results().join(REPORT_FILE)));
    assert!(ws.results().join("ocr_summary.json").exists());
    Ok(())
}

#[test]
fn unknown_engine_aborts_before_any_work() -> Result<()> {
    let ws = Workspace::new("ocrbench-unknown")?;
    ws.image("a.png")?;
    ws.ground_truth("a", "text")?;

    let events = EventLog::default();
    let mut registry = StrategyRegistry::new();
    registry.register(Box::new(Scripted::new("stub", Some("text"), &events)));

    let err = run_benchmark(&ws.config(&["stub", "nope"]), &mut registry).unwrap_err();
    let bench_err = err.downcast_ref::<BenchError>().expect("typed configuration error");
    assert!(matches!(bench_err, BenchError::UnknownEngine { key, .. } if key == "nope"));

    assert!(events.borrow().is_empty());
    assert!(!ws.results().exists());
    Ok(())
}

#[test]
fn failing_strategy_still_produces_rows_and_report() -> Result<()> {
    let ws = Workspace::new("ocrbench-failing")?;
    for stem in ["a", "b"] {
        ws.image(&format!("{stem}.jpg"))?;
        ws.ground_truth(stem, "some words")?;
    }

    let events = EventLog::default();
    let mut registry = StrategyRegistry::new();
    registry.register(Box::new(Scripted::new("broken", None, &events)));

    let report = run_benchmark(&ws.config(&["broken"]), &mut registry)?;
    assert_eq!(report.table.len(), 2);
    for row in report.table.rows() {
        assert_eq!(row.ocr_raw, "");
        assert_eq!(row.wer, 1.0);
        assert_eq!(row.bleu, 0.0);
        assert!(row.failure.as_deref().unwrap().contains("model crashed"));
    }

    let csv = fs::read_to_string(report.report_path.unwrap())?;
    assert_eq!(csv.lines().count(), 3);
    assert_eq!(fs::read_to_string(ws.results().join("a__broken.txt"))?, "");

    let summary = report.table.summarize();
    assert_eq!(summary[0].failures, 2);
    Ok(())
}

#[test]
fn engines_are_evicted_before_the_next_one_starts() -> Result<()> {
    let ws = Workspace::new("ocrbench-evict")?;
    for stem in ["p1", "p2"] {
        ws.image(&format!("{stem}.png"))?;
        ws.ground_truth(stem, "x")?;
    }

    let events = EventLog::default();
    let resident = Rc::new(RefCell::new(Vec::new()));
    let mut registry = StrategyRegistry::new();
    for key in ["alpha", "beta"] {
        let mut strategy = Scripted::new(key, Some("x"), &events);
        strategy.resident = Some(Rc::clone(&resident));
        registry.register(Box::new(strategy));
    }

    let report = run_benchmark(&ws.config(&["beta", "alpha"]), &mut registry)?;

    assert_eq!(
        *events.borrow(),
        vec![
            "load beta",
            "run beta p1.png",
            "run beta p2.png",
            "unload beta",
            "load alpha",
            "run alpha p1.png",
            "run alpha p2.png",
            "unload alpha",
        ]
    );
    assert!(resident.borrow().is_empty());
    assert_eq!(registry.loaded_count(), 0);

    let order: Vec<(&str, &str)> = report
        .table
        .rows()
        .iter()
        .map(|r| (r.engine.as_str(), r.image.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![("beta", "p1.png"), ("beta", "p2.png"), ("alpha", "p1.png"), ("alpha", "p2.png")]
    );
    Ok(())
}

#[test]
fn write_failure_still_unloads_the_engine() -> Result<()> {
    let ws = Workspace::new("ocrbench-write-failure")?;
    ws.image("a.png")?;
    ws.ground_truth("a", "text")?;
    // a directory where the raw output file should go
    fs::create_dir_all(ws.results().join("a__stub.txt"))?;

    let events = EventLog::default();
    let mut registry = StrategyRegistry::new();
    registry.register(Box::new(Scripted::new("stub", Some("text"), &events)));

    let err = run_benchmark(&ws.config(&["stub"]), &mut registry).unwrap_err();
    assert!(format!("{err:#}").contains("a__stub.txt"), "{err:#}");

    assert_eq!(events.borrow().last().map(String::as_str), Some("unload stub"));
    assert_eq!(registry.loaded_count(), 0);
    assert!(!ws.results().join(REPORT_FILE).exists());
    Ok(())
}

#[test]
fn images_without_ground_truth_are_skipped() -> Result<()> {
    let ws = Workspace::new("ocrbench-skip")?;
    ws.image("has_gt.png")?;
    ws.image("no_gt.PNG")?;
    ws.ground_truth("has_gt", "abc")?;
    fs::write(ws.root.join("images").join("readme.md"), "not an image")?;

    let events = EventLog::default();
    let mut registry = StrategyRegistry::new();
    registry.register(Box::new(Scripted::new("stub", Some("abd"), &events)));

    let report = run_benchmark(&ws.config(&["stub"]), &mut registry)?;
    assert_eq!(report.table.len(), 1);
    assert_eq!(report.table.rows()[0].image, "has_gt.png");
    assert!(!ws.results().join("no_gt__stub.txt").exists());
    assert_eq!(report.table.rows()[0].cer, 1.0 / 3.0);
    Ok(())
}

#[test]
fn empty_image_directory_produces_no_report() -> Result<()> {
    let ws = Workspace::new("ocrbench-empty")?;

    let events = EventLog::default();
    let mut registry = StrategyRegistry::new();
    registry.register(Box::new(Scripted::new("stub", Some("x"), &events)));

    let report = run_benchmark(&ws.config(&["stub"]), &mut registry)?;
    assert!(report.table.is_empty());
    assert!(report.report_path.is_none());
    assert!(!ws.results().join(REPORT_FILE).exists());
    assert!(events.borrow().is_empty());
    Ok(())
}

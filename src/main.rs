use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use ocrbench::ocr::{BridgeConfig, Device, EngineKind, StrategyRegistry};
use ocrbench::pipeline::{parse_engine_list, run_benchmark, PipelineConfig};
use ocrbench::EngineSummary;

#[derive(Parser, Debug)]
#[command(name = "ocrbench")]
#[command(version, about = "Benchmark OCR engines against ground-truth transcriptions", long_about = None)]
struct Cli {
    /// Directory containing .png/.jpg/.jpeg images
    #[arg(long, required_unless_present = "list_engines")]
    images: Option<PathBuf>,

    /// Directory containing one <image stem>.txt ground truth per image
    #[arg(long, required_unless_present = "list_engines")]
    gts: Option<PathBuf>,

    /// Output directory for raw OCR text and the CSV report
    #[arg(long, default_value = "results")]
    results: PathBuf,

    /// Comma separated engines, run in this order
    #[arg(long, default_value = "easyocr,doctr,donut,smol")]
    engines: String,

    /// Python interpreter hosting the OCR models
    #[arg(long, default_value = "python3")]
    python: PathBuf,

    /// OCR bridge script started once per engine
    #[arg(long, default_value = "ocr/bridge/ocr_bridge.py")]
    bridge_script: PathBuf,

    /// Device the models run on
    #[arg(long, default_value = "auto", value_parser = ["auto", "cpu", "cuda"])]
    device: String,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Print the known engine keys and exit
    #[arg(long)]
    list_engines: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let crate_level = if cli.quiet {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };
    env_logger::builder()
        .filter(None, log::LevelFilter::Warn)
        .filter(Some("ocrbench"), crate_level)
        .parse_default_env()
        .init();

    if cli.list_engines {
        for kind in EngineKind::ALL {
            println!("{kind}");
        }
        return Ok(());
    }

    let (Some(images), Some(gts)) = (cli.images, cli.gts) else {
        anyhow::bail!("--images and --gts are required");
    };
    if !images.is_dir() {
        anyhow::bail!("Image directory does not exist: {}", images.display());
    }

    let engines = parse_engine_list(&cli.engines);
    let device: Device = cli.device.parse()?;
    let bridge = BridgeConfig::new()
        .with_python(cli.python)
        .with_script(cli.bridge_script)
        .with_device(device);
    let mut registry = StrategyRegistry::for_engines(&engines, &bridge)?;
    let config = PipelineConfig::new(images, gts, cli.results, engines);

    if !cli.quiet {
        println!("[*] Images: {}", config.images.display());
        println!("[*] Ground truth: {}", config.ground_truth.display());
        println!("[*] Engines: {}", config.engines.join(", "));
        println!(
            "[*] Bridge: {} {} (device: {})",
            bridge.python().display(),
            bridge.script().display(),
            bridge.device()
        );
    }

    let report = run_benchmark(&config, &mut registry)
        .with_context(|| format!("Benchmark failed for {}", config.images.display()))?;

    let Some(report_path) = report.report_path else {
        println!("[!] No images found in {}", config.images.display());
        return Ok(());
    };

    if !cli.quiet {
        print_summary(&report.table.summarize());
        println!("\n[✓] Done! {} row(s) saved to: {}", report.table.len(), report_path.display());
    }

    Ok(())
}

fn print_summary(summaries: &[EngineSummary]) {
    println!("\n[+] Summary");
    println!(
        "{:<10} {:>6} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "engine", "pairs", "failed", "wer", "cer", "bleu", "rouge_l"
    );
    for s in summaries {
        println!(
            "{:<10} {:>6} {:>8} {:>8.3} {:>8.3} {:>8.3} {:>8.3}",
            s.engine, s.pairs, s.failures, s.mean_wer, s.mean_cer, s.mean_bleu, s.mean_rouge_l
        );
    }
}

mod args;

use args::{Args, Mode, print_help};
use dreamer_nav::device::{DryRunPointer, FrameSource, PointerDevice, ScreenshotFileSource};
use dreamer_nav::game_automation::sequences::predefined;
use dreamer_nav::game_automation::{
    ActionDriver, AutomationConfig, RunStatus, Sequence, SequenceCommand, SequenceEngine,
    SequenceReport, create_sequence_channels,
};
use dreamer_nav::template_matching::{ActionablePoint, Locator, MatchResult, TemplateLibrary};
use serde::Serialize;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Serialize)]
struct LocateReport<'a> {
    template: &'a str,
    threshold: f32,
    point: Option<ActionablePoint>,
    best: MatchResult,
}

fn init_logger(debug_mode: bool) {
    use env_logger::Builder;
    use std::io::Write;

    let level = if debug_mode {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    Builder::new()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .filter_level(level)
        .parse_default_env() // RUST_LOG still wins
        .init();
}

fn main() -> ExitCode {
    let args = match Args::parse_from(env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => return ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("❌ {}", message);
            print_help();
            return ExitCode::from(2);
        }
    };
    init_logger(args.debug_mode);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("❌ Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };
    rt.block_on(run(args))
}

async fn run(args: Args) -> ExitCode {
    let mut config = AutomationConfig {
        template_dir: args.template_dir.clone(),
        snapshot_dir: args.snapshot_dir.clone(),
        ..AutomationConfig::default()
    };
    if let Some(threshold) = args.threshold {
        config.confidence_threshold = threshold;
    }
    if let Err(message) = config.validate() {
        eprintln!("❌ {}", message);
        return ExitCode::from(2);
    }

    let library = match TemplateLibrary::load_dir(&config.template_dir) {
        Ok(library) => library,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::from(2);
        }
    };
    let locator = Locator::new(Arc::new(library));
    let source = ScreenshotFileSource::new(args.frame_path.clone(), args.origin);
    log::info!("📸 Capturing from {}", source.description());

    match &args.mode {
        Mode::Locate(name) => {
            locate_once(&source, &locator, name, config.confidence_threshold, args.json).await
        }
        Mode::Sequence(name) => {
            let Some(sequence) = predefined(name) else {
                eprintln!("❌ Unknown sequence '{}'", name);
                return ExitCode::from(2);
            };
            if args.click {
                run_with_real_pointer(source, locator, config, sequence, args.json).await
            } else {
                log::info!("🖱️ Dry run: clicks are logged, not performed");
                run_sequence(source, DryRunPointer::new(), locator, config, sequence, args.json)
                    .await
            }
        }
    }
}

async fn locate_once(
    source: &ScreenshotFileSource,
    locator: &Locator,
    name: &str,
    threshold: f32,
    json: bool,
) -> ExitCode {
    let located = match source.capture_frame().await {
        Ok(frame) => locator.locate_detailed(&frame, name, threshold),
        Err(e) => Err(e),
    };
    let (point, best) = match located {
        Ok(located) => located,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    if json {
        let report = LocateReport {
            template: name,
            threshold,
            point,
            best,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ Failed to serialize report: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("🔍 {}", best.describe(name));
        match point {
            Some(point) => println!("🎯 Click target {}", point),
            None => println!("👀 Below threshold {:.2}", threshold),
        }
    }

    if point.is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(feature = "input")]
async fn run_with_real_pointer(
    source: ScreenshotFileSource,
    locator: Locator,
    config: AutomationConfig,
    sequence: Sequence,
    json: bool,
) -> ExitCode {
    match dreamer_nav::device::EnigoPointer::new() {
        Ok(pointer) => run_sequence(source, pointer, locator, config, sequence, json).await,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "input"))]
async fn run_with_real_pointer(
    _source: ScreenshotFileSource,
    _locator: Locator,
    _config: AutomationConfig,
    _sequence: Sequence,
    _json: bool,
) -> ExitCode {
    // Args rejects --click in builds without the input feature
    eprintln!("❌ Built without the 'input' feature, real clicks are unavailable");
    ExitCode::from(2)
}

async fn run_sequence<P: PointerDevice>(
    source: ScreenshotFileSource,
    pointer: P,
    locator: Locator,
    config: AutomationConfig,
    sequence: Sequence,
    json: bool,
) -> ExitCode {
    for template in sequence.template_names() {
        if !locator.library().contains(template) {
            log::warn!(
                "⚠️ Sequence '{}' uses template '{}' which is not in the library",
                sequence.name,
                template
            );
        }
    }

    let (command_tx, abort) = create_sequence_channels();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("⏹️ Ctrl-C received, aborting sequence");
            let _ = command_tx.send(SequenceCommand::Abort).await;
        }
    });

    let driver = ActionDriver::new(source, pointer, locator, config.click);
    let mut engine = SequenceEngine::new(driver, config, abort);
    let report = engine.run(&sequence).await;

    if let Err(e) = print_report(&report, json) {
        eprintln!("❌ Failed to serialize report: {}", e);
        return ExitCode::FAILURE;
    }
    if report.is_completed() {
        ExitCode::SUCCESS
    } else if report.status == RunStatus::Aborted {
        ExitCode::from(130)
    } else {
        ExitCode::FAILURE
    }
}

fn print_report(report: &SequenceReport, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    println!(
        "📋 Sequence '{}': {:?} in {}ms ({} clicks)",
        report.sequence,
        report.status,
        report.elapsed_ms,
        report.click_count()
    );
    for step in &report.steps {
        println!("    {}", step.describe());
        if let Some(point) = step.clicked_at {
            println!("        clicked at {}", point);
        }
        if let Some(snapshot) = &step.snapshot {
            println!("        snapshot: {}", snapshot);
        }
    }
    Ok(())
}

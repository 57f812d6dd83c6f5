use dreamer_nav::game_automation::sequences::{ARENA_NAVIGATION, PREDEFINED_SEQUENCES};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Run a predefined navigation sequence
    Sequence(String),
    /// Report the best match of one template and exit
    Locate(String),
}

#[derive(Debug, PartialEq)]
pub struct Args {
    pub mode: Mode,
    pub template_dir: PathBuf,
    pub frame_path: PathBuf,
    pub origin: (i32, i32),
    pub threshold: Option<f32>,
    pub snapshot_dir: Option<PathBuf>,
    pub json: bool,
    /// Send real mouse clicks instead of logging them
    pub click: bool,
    pub debug_mode: bool,
}

impl Args {
    /// Parse `--flag=value` arguments (program name already skipped)
    ///
    /// `Ok(None)` means help or version was printed and the process should exit.
    pub fn parse_from(args: impl IntoIterator<Item = String>) -> Result<Option<Self>, String> {
        let mut sequence: Option<String> = None;
        let mut locate: Option<String> = None;
        let mut template_dir = PathBuf::from("templates");
        let mut frame_path: Option<PathBuf> = None;
        let mut origin = (0, 0);
        let mut threshold: Option<f32> = None;
        let mut snapshot_dir: Option<PathBuf> = None;
        let mut json = false;
        let mut click = false;
        let mut debug_mode = false;

        for arg in args {
            if arg == "--help" || arg == "-h" {
                print_help();
                return Ok(None);
            } else if arg == "--version" || arg == "-v" {
                println!(
                    "Dreamer Nav v{} (built {})",
                    env!("APP_VERSION_DISPLAY"),
                    env!("APP_BUILD_YEAR")
                );
                return Ok(None);
            } else if arg == "--debug" {
                debug_mode = true;
            } else if arg == "--json" {
                json = true;
            } else if arg == "--click" {
                if !cfg!(feature = "input") {
                    return Err(
                        "--click needs a build with the 'input' feature (cargo build --features input)"
                            .to_string(),
                    );
                }
                click = true;
            } else if let Some(val) = arg.strip_prefix("--templates=") {
                template_dir = PathBuf::from(val);
            } else if let Some(val) = arg.strip_prefix("--frame=") {
                frame_path = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--origin=") {
                origin = parse_origin(val)?;
            } else if let Some(val) = arg.strip_prefix("--threshold=") {
                threshold = Some(parse_threshold(val)?);
            } else if let Some(val) = arg.strip_prefix("--snapshots=") {
                snapshot_dir = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--sequence=") {
                if !PREDEFINED_SEQUENCES.contains(&val) {
                    return Err(format!(
                        "Unknown sequence '{}', expected one of: {}",
                        val,
                        PREDEFINED_SEQUENCES.join(", ")
                    ));
                }
                sequence = Some(val.to_string());
            } else if let Some(val) = arg.strip_prefix("--locate=") {
                locate = Some(val.to_string());
            } else {
                return Err(format!("Unknown argument: {}", arg));
            }
        }

        let mode = match (sequence, locate) {
            (Some(_), Some(_)) => {
                return Err("--sequence and --locate cannot be combined".to_string());
            }
            (None, Some(name)) => Mode::Locate(name),
            (Some(name), None) => Mode::Sequence(name),
            (None, None) => Mode::Sequence(ARENA_NAVIGATION.to_string()),
        };
        let frame_path = frame_path.ok_or_else(|| "--frame=PATH is required".to_string())?;

        Ok(Some(Args {
            mode,
            template_dir,
            frame_path,
            origin,
            threshold,
            snapshot_dir,
            json,
            click,
            debug_mode,
        }))
    }
}

fn parse_origin(val: &str) -> Result<(i32, i32), String> {
    let invalid = || format!("Invalid origin '{}', expected X,Y", val);
    let (x, y) = val.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse::<i32>().map_err(|_| invalid())?;
    let y = y.trim().parse::<i32>().map_err(|_| invalid())?;
    Ok((x, y))
}

fn parse_threshold(val: &str) -> Result<f32, String> {
    match val.parse::<f32>() {
        Ok(t) if (0.0..=1.0).contains(&t) => Ok(t),
        _ => Err(format!(
            "Invalid threshold value: {} (expected 0.0 to 1.0)",
            val
        )),
    }
}

pub fn print_help() {
    println!("🧭 Dreamer Nav - template driven screen navigation");
    println!();
    println!("USAGE:");
    println!("    dreamer-nav --frame=PATH [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --frame=PATH        Screenshot file re-read on every capture (required)");
    println!("    --origin=X,Y        Screen position of the screenshot's top-left corner (default: 0,0)");
    println!("    --templates=DIR     Template directory, file name = template name (default: templates)");
    println!(
        "    --sequence=NAME     Sequence to run: {} (default: {})",
        PREDEFINED_SEQUENCES.join(", "),
        ARENA_NAVIGATION
    );
    println!("    --locate=NAME       Only report where template NAME matches, then exit");
    println!("    --threshold=F       Confidence threshold 0.0 to 1.0 (default: 0.8)");
    println!("    --snapshots=DIR     Write annotated frames of timed-out steps to DIR");
    println!("    --json              Print the report as JSON");
    println!("    --click             Perform real mouse clicks (needs the 'input' feature)");
    println!("    --debug             Enable debug logging");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("Without --click, clicks are logged, not performed. Ctrl-C aborts a running sequence.");
    println!();
    println!("EXAMPLES:");
    println!("    dreamer-nav --frame=screen.png --origin=1920,0");
    println!("    dreamer-nav --frame=screen.png --sequence=arena-fight --json");
    println!("    dreamer-nav --frame=screen.png --locate=\"Classic Arena\" --threshold=0.9");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Args>, String> {
        Args::parse_from(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--frame=screen.png"]).unwrap().unwrap();
        assert_eq!(args.mode, Mode::Sequence(ARENA_NAVIGATION.to_string()));
        assert_eq!(args.template_dir, PathBuf::from("templates"));
        assert_eq!(args.origin, (0, 0));
        assert_eq!(args.threshold, None);
        assert!(!args.json);
        assert!(!args.click);
    }

    #[test]
    fn test_click_flag_follows_input_feature() {
        let parsed = parse(&["--frame=a.png", "--click"]);
        if cfg!(feature = "input") {
            assert!(parsed.unwrap().unwrap().click);
        } else {
            assert!(parsed.unwrap_err().contains("input"));
        }
    }

    #[test]
    fn test_all_flags() {
        let args = parse(&[
            "--frame=shot.bmp",
            "--origin=-1920, 40",
            "--templates=assets",
            "--sequence=arena-fight",
            "--threshold=0.9",
            "--snapshots=debug",
            "--json",
            "--debug",
        ])
        .unwrap()
        .unwrap();
        assert_eq!(args.mode, Mode::Sequence("arena-fight".to_string()));
        assert_eq!(args.origin, (-1920, 40));
        assert_eq!(args.threshold, Some(0.9));
        assert_eq!(args.snapshot_dir, Some(PathBuf::from("debug")));
        assert!(args.json && args.debug_mode);
    }

    #[test]
    fn test_locate_mode() {
        let args = parse(&["--frame=a.png", "--locate=Classic Arena"])
            .unwrap()
            .unwrap();
        assert_eq!(args.mode, Mode::Locate("Classic Arena".to_string()));
        assert!(parse(&["--frame=a.png", "--locate=Battle", "--sequence=arena-fight"]).is_err());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse(&["--frame=a.png", "--threshold=1.5"]).is_err());
        assert!(parse(&["--frame=a.png", "--threshold=abc"]).is_err());
        assert!(parse(&["--frame=a.png", "--origin=12"]).is_err());
        assert!(parse(&["--frame=a.png", "--sequence=tavern"]).is_err());
        assert!(parse(&["--frame=a.png", "--bogus"]).is_err());
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn test_help_exits() {
        assert_eq!(parse(&["--help"]), Ok(None));
    }
}

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use log::info;
#[cfg(not(feature = "tracing"))]
use log::LevelFilter;
use serde::Deserialize;

use labvision::dataset::{load_image, DatasetLoader};
use labvision::hog::HogParams;
use labvision::pipeline::{ImageClassifier, TrainedClassifier};
use labvision::pose::{compose_goal_zyx, relative_pose_zxy, Pose, RelativePose};
use labvision::svm::{SvcParams, TrainOptions};

#[derive(Parser, Debug)]
#[command(
    name = "labvision",
    author,
    version,
    about = "HOG + linear SVM image classifier and pose helpers"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a classifier from a folder of `<label>_<suffix>.<ext>` images.
    Train(TrainArgs),
    /// Score a trained model against a labeled folder.
    Evaluate(EvaluateArgs),
    /// Print the predicted label for each image.
    Predict(PredictArgs),
    /// Express an object pose in a reference frame (intrinsic Z-X-Y yaw).
    RelativePose(RelativePoseArgs),
    /// Move a goal given in a reference frame into robot coordinates
    /// (intrinsic Z-Y-X yaw).
    ComposeGoal(ComposeGoalArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Folder with training images.
    #[arg(long)]
    data: PathBuf,
    /// Where to write the model JSON.
    #[arg(long)]
    model: PathBuf,
    /// Image file extension [default: bmp, or the config value].
    #[arg(long)]
    ext: Option<String>,
    /// SVC regularization strength (overrides the config file).
    #[arg(long)]
    c: Option<f64>,
    /// JSON file with optional `hog`, `svc` and `extension` entries.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Abort training after this many seconds.
    #[arg(long)]
    timeout: Option<f64>,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    #[arg(long)]
    data: PathBuf,
    #[arg(long)]
    model: PathBuf,
    #[arg(long, default_value = "bmp")]
    ext: String,
    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct PredictArgs {
    #[arg(long)]
    model: PathBuf,
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct RelativePoseArgs {
    /// Object pose in the world frame as `x,y,z,yaw_deg`.
    #[arg(long, value_parser = parse_planar, allow_hyphen_values = true)]
    object: Pose,
    /// Reference pose in the world frame as `x,y,z,yaw_deg`.
    #[arg(long, value_parser = parse_planar, allow_hyphen_values = true)]
    reference: Pose,
}

#[derive(Args, Debug)]
struct ComposeGoalArgs {
    /// Goal pose relative to the reference as `x,y,z,yaw_deg`.
    #[arg(long, value_parser = parse_planar, allow_hyphen_values = true)]
    goal: Pose,
    /// Reference pose in the robot frame as `x,y,z,yaw_deg`.
    #[arg(long, value_parser = parse_planar, allow_hyphen_values = true)]
    reference: Pose,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TrainConfig {
    hog: HogParams,
    svc: SvcParams,
    extension: Option<String>,
}

fn parse_planar(raw: &str) -> Result<Pose, String> {
    let values = raw
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("expected x,y,z,yaw_deg: {e}"))?;
    match values[..] {
        [x, y, z, yaw] => Ok(Pose::from_planar(x, y, z, yaw)),
        _ => Err(format!(
            "expected 4 comma-separated values, got {}",
            values.len()
        )),
    }
}

fn read_config(path: Option<&Path>) -> Result<TrainConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(serde_json::from_str(&fs::read_to_string(path)?)?),
        None => Ok(TrainConfig::default()),
    }
}

fn train(args: TrainArgs) -> Result<(), Box<dyn Error>> {
    let mut config = read_config(args.config.as_deref())?;
    if let Some(c) = args.c {
        config.svc.c = c;
    }
    let extension = args
        .ext
        .or(config.extension)
        .unwrap_or_else(|| DatasetLoader::default().extension);

    let options = TrainOptions {
        deadline: args.timeout.map(Duration::from_secs_f64),
        ..TrainOptions::default()
    };
    let trained = ImageClassifier::new(config.hog, config.svc)?
        .with_loader(DatasetLoader::with_extension(extension))
        .train_from_dir_with(&args.data, &options)?;
    trained.write_json(&args.model)?;

    info!("model written to {}", args.model.display());
    println!(
        "trained {} classes ({}) -> {}",
        trained.model.classes().len(),
        trained.model.classes().join(", "),
        args.model.display()
    );
    Ok(())
}

fn evaluate(args: EvaluateArgs) -> Result<(), Box<dyn Error>> {
    let trained = TrainedClassifier::load_json(&args.model)?;
    let dataset = DatasetLoader::with_extension(args.ext).load(&args.data)?;
    let report = trained.evaluate_dataset(&dataset)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn predict(args: PredictArgs) -> Result<(), Box<dyn Error>> {
    let trained = TrainedClassifier::load_json(&args.model)?;
    for path in &args.images {
        let image = load_image(path)?;
        let label = trained.classify_one(&image.view())?;
        println!("{}\t{label}", path.display());
    }
    Ok(())
}

fn print_pose(rel: &RelativePose) {
    let t = rel.pose.translation;
    println!(
        "x={:.6} y={:.6} z={:.6} yaw_deg={:.6}",
        t.x, t.y, t.z, rel.yaw_deg
    );
    if rel.gimbal_lock {
        println!("warning: gimbal lock, yaw combines first and third rotation");
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: u8) -> Result<(), Box<dyn Error>> {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    labvision::core::init_with_level(level)?;
    Ok(())
}

/// With `tracing`, verbosity comes from `RUST_LOG` instead.
#[cfg(feature = "tracing")]
fn init_logging(_verbose: u8) -> Result<(), Box<dyn Error>> {
    labvision::core::init_tracing(false);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Command::Train(args) => train(args),
        Command::Evaluate(args) => evaluate(args),
        Command::Predict(args) => predict(args),
        Command::RelativePose(args) => {
            print_pose(&relative_pose_zxy(&args.object, &args.reference));
            Ok(())
        }
        Command::ComposeGoal(args) => {
            print_pose(&compose_goal_zyx(&args.goal, &args.reference));
            Ok(())
        }
    }
}

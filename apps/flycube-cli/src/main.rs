use anyhow::Context;
use clap::{Parser, Subcommand};
use flycube_camera::{CameraSettings, PerspectiveCamera};
use flycube_config::AppConfig;
use flycube_input::Action;
use flycube_render_wgpu::{ProgramTarget, ShaderProgram, ShaderSource, ShaderStage, UniformBlock};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flycube-cli", about = "Headless tooling for the cube demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the default camera pose
    Info,
    /// Replay a YAML list of camera actions and print the pose after each one
    Simulate {
        /// YAML file holding a list of actions
        #[arg(short, long)]
        script: PathBuf,
        /// Frame time applied to each action, in seconds
        #[arg(long, default_value = "0.016", value_parser = parse_dt, allow_negative_numbers = true)]
        dt: f32,
        /// Take camera settings from this config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Compile and link the shader pair on a headless device
    CheckShaders {
        /// Vertex shader (WGSL)
        #[arg(long)]
        vertex: Option<PathBuf>,
        /// Fragment shader (WGSL)
        #[arg(long)]
        fragment: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("flycube-cli v{}", env!("CARGO_PKG_VERSION"));
            let camera = PerspectiveCamera::default();
            println!("default camera: {}", describe(&camera));
            let shaders = AppConfig::default().shaders;
            println!(
                "default shaders: {} + {}",
                shaders.vertex.display(),
                shaders.fragment.display()
            );
        }
        Commands::Simulate { script, dt, config } => {
            let settings = match config {
                Some(path) => AppConfig::load(&path)?.camera,
                None => CameraSettings::default(),
            };
            let actions = load_script(&script)?;
            println!("Simulating {} actions, dt={dt}", actions.len());

            let mut camera = PerspectiveCamera::new(settings);
            println!("start: {}", describe(&camera));
            for (step, pose) in simulate(&mut camera, &actions, dt).into_iter().enumerate() {
                println!("{:>4} {:?}: {}", step + 1, actions[step], pose);
            }
        }
        Commands::CheckShaders { vertex, fragment } => {
            let defaults = AppConfig::default().shaders;
            let vertex = vertex.unwrap_or(defaults.vertex);
            let fragment = fragment.unwrap_or(defaults.fragment);
            check_shaders(&vertex, &fragment)?;
            println!("OK: {} + {}", vertex.display(), fragment.display());
        }
    }

    Ok(())
}

/// Frame time must be a finite, non-negative number of seconds.
fn parse_dt(text: &str) -> Result<f32, String> {
    let dt: f32 = text.parse().map_err(|e| format!("{e}"))?;
    if dt.is_finite() && dt >= 0.0 {
        Ok(dt)
    } else {
        Err(format!("{dt} is not a non-negative number of seconds"))
    }
}

fn load_script(path: &Path) -> anyhow::Result<Vec<Action>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    parse_script(&text).with_context(|| format!("parsing script {}", path.display()))
}

fn parse_script(text: &str) -> Result<Vec<Action>, serde_yaml::Error> {
    serde_yaml::from_str(text)
}

/// Apply `actions` in order, stopping at the first `Exit`. Returns the pose
/// after each applied action.
fn simulate(camera: &mut PerspectiveCamera, actions: &[Action], dt: f32) -> Vec<String> {
    let mut poses = Vec::with_capacity(actions.len());
    for action in actions {
        if !action.apply(camera, dt) {
            tracing::info!("script requested exit after {} actions", poses.len());
            break;
        }
        poses.push(describe(camera));
    }
    poses
}

fn describe(camera: &PerspectiveCamera) -> String {
    let p = camera.view_position();
    let f = camera.front();
    format!(
        "pos=({:.3}, {:.3}, {:.3}) front=({:.3}, {:.3}, {:.3}) yaw={:.2} pitch={:.2} zoom={:.2}",
        p.x,
        p.y,
        p.z,
        f.x,
        f.y,
        f.z,
        camera.yaw(),
        camera.pitch(),
        camera.zoom()
    )
}

fn check_shaders(vertex: &Path, fragment: &Path) -> anyhow::Result<()> {
    let vertex = ShaderSource::load(ShaderStage::Vertex, vertex)?;
    let fragment = ShaderSource::load(ShaderStage::Fragment, fragment)?;

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::default(),
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .context("no GPU adapter available")?;
    let (device, _queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("flycube_check_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            memory_hints: Default::default(),
        },
        None,
    ))
    .context("creating device")?;
    tracing::debug!("checking shaders on {}", adapter.get_info().name);

    ShaderProgram::new(
        &device,
        &vertex,
        &fragment,
        UniformBlock::scene(),
        ProgramTarget::with_depth(wgpu::TextureFormat::Rgba8UnormSrgb),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flycube_camera::Direction;
    use std::io::Write;

    const SCRIPT: &str = "
- !Move Forward
- !Look { dx: 50.0, dy: 0.0 }
- !Zoom 5.0
- Exit
- !Move Backward
";

    #[test]
    fn script_parses_into_actions() {
        let actions = parse_script(SCRIPT).unwrap();
        assert_eq!(actions.len(), 5);
        assert_eq!(actions[0], Action::Move(Direction::Forward));
        assert_eq!(actions[1], Action::Look { dx: 50.0, dy: 0.0 });
        assert_eq!(actions[2], Action::Zoom(5.0));
        assert_eq!(actions[3], Action::Exit);
    }

    #[test]
    fn simulation_stops_at_exit() {
        let actions = parse_script(SCRIPT).unwrap();
        let mut camera = PerspectiveCamera::default();
        let poses = simulate(&mut camera, &actions, 0.1);
        assert_eq!(poses.len(), 3);
        assert_eq!(camera.zoom(), 40.0);
        assert_eq!(camera.yaw(), -80.0);
    }

    #[test]
    fn dt_must_be_non_negative() {
        let parse = |dt: &str| {
            Cli::try_parse_from(["flycube-cli", "simulate", "--script", "s.yaml", "--dt", dt])
        };
        assert!(parse("-0.5").is_err());
        assert!(parse("NaN").is_err());
        assert!(parse("inf").is_err());

        let cli = parse("0.25").unwrap();
        assert!(matches!(cli.command, Commands::Simulate { dt, .. } if dt == 0.25));
        let cli = parse("0").unwrap();
        assert!(matches!(cli.command, Commands::Simulate { dt, .. } if dt == 0.0));
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(parse_script("- !Teleport 3.0").is_err());
    }

    #[test]
    fn load_script_reports_path() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "- !Move Left\n- !Move Up").unwrap();
        let actions = load_script(tmp.path()).unwrap();
        assert_eq!(
            actions,
            vec![Action::Move(Direction::Left), Action::Move(Direction::Up)]
        );

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");
        let err = load_script(&missing).unwrap_err();
        assert!(format!("{err:#}").contains("missing.yaml"));
    }
}

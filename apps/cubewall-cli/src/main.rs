use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use cubewall_common::{SurfaceSize, WallConfig};
use cubewall_field::Grid;
use cubewall_input::Action;
use cubewall_render::{CpuRenderer, CubeWall};
use glam::Vec2;
use serde::Serialize;
use std::convert::Infallible;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cubewall-cli", about = "CLI tool for cube wall operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file; missing keys use defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the grid size (cells per side)
    #[arg(long, global = true)]
    grid: Option<u32>,

    /// Disable the bloom chain
    #[arg(long, global = true)]
    no_bloom: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, crate info and grid summary
    Info,
    /// Print the effective configuration as YAML
    Config,
    /// Run the wall headless on the CPU renderer
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "120")]
        frames: u32,
        /// Frame step in milliseconds
        #[arg(long, default_value = "16")]
        step_ms: u64,
        /// Surface size as WIDTH,HEIGHT
        #[arg(long, value_delimiter = ',', num_args = 2, default_values_t = [800, 600])]
        size: Vec<u32>,
        /// Pointer start in pixels as X,Y
        #[arg(long, value_delimiter = ',', num_args = 2, default_values_t = [200.0, 150.0])]
        from: Vec<f32>,
        /// Pointer end in pixels as X,Y
        #[arg(long, value_delimiter = ',', num_args = 2, default_values_t = [600.0, 450.0])]
        to: Vec<f32>,
        /// Hold the pointer down for the whole run
        #[arg(long)]
        press: bool,
        /// Cells to list in the report
        #[arg(long, default_value = "8")]
        cells: usize,
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn wall_config(&self) -> anyhow::Result<WallConfig> {
        let mut config = match &self.config {
            Some(path) => WallConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => WallConfig::default(),
        };
        if let Some(grid) = self.grid {
            config.grid_size = grid;
        }
        if self.no_bloom {
            config.bloom = false;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Serialize)]
struct SimulationReport {
    frames: u64,
    time: f32,
    surface: [u32; 2],
    cells: usize,
    influenced: usize,
    peak_influence: f32,
    pointer: [f32; 2],
    radius: f32,
    pressed: bool,
    samples: Vec<SampleRow>,
}

#[derive(Serialize)]
struct SampleRow {
    index: usize,
    position: [f32; 3],
    influence: f32,
    color: [f32; 3],
}

fn pair<T: Copy>(values: &[T], what: &str) -> anyhow::Result<[T; 2]> {
    match values {
        [a, b] => Ok([*a, *b]),
        _ => bail!("{what} expects two comma-separated values"),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = cli.wall_config()?;

    match cli.command {
        Commands::Info => {
            let grid = Grid::new(config.grid_size, config.wall_width, config.wall_depth);
            let bounds = grid.bounds();
            let extent = bounds.size();
            println!("cubewall-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", cubewall_render::crate_info());
            println!(
                "grid: {}x{} = {} cells, spacing {:.4}",
                grid.size(),
                grid.size(),
                grid.len(),
                grid.spacing()
            );
            println!(
                "bounds: x [{:.3}, {:.3}] y [{:.3}, {:.3}] extent {:.3} x {:.3} x {:.3}",
                bounds.min.x,
                bounds.max.x,
                bounds.min.y,
                bounds.max.y,
                extent.x,
                extent.y,
                extent.z
            );
            println!(
                "bloom: {} (strength {}, radius {}, threshold {})",
                if config.bloom { "on" } else { "off" },
                config.bloom_strength,
                config.bloom_radius,
                config.bloom_threshold
            );
        }
        Commands::Config => {
            print!("{}", config.to_yaml()?);
        }
        Commands::Simulate {
            frames,
            step_ms,
            size,
            from,
            to,
            press,
            cells,
            json,
        } => {
            let [width, height] = pair(&size, "--size")?;
            let from = Vec2::from(pair(&from, "--from")?);
            let to = Vec2::from(pair(&to, "--to")?);
            let size = SurfaceSize::new(width, height);
            let step = Duration::from_millis(step_ms);

            let mut wall = CubeWall::mount(&config, size, |_| {
                Ok::<_, Infallible>(CpuRenderer::new(&config, size))
            });

            wall.apply(Action::PointerMoved(from));
            if press {
                wall.apply(Action::PointerPressed(from));
            }
            for i in 0..frames {
                let t = if frames > 1 {
                    i as f32 / (frames - 1) as f32
                } else {
                    1.0
                };
                wall.apply(Action::PointerMoved(from.lerp(to, t)));
                wall.frame(step);
            }

            let status = wall.status();
            tracing::debug!("{status}");
            let Some(renderer) = wall.renderer() else {
                bail!("simulation renderer unavailable");
            };

            if json {
                let last = renderer.last_frame();
                let report = SimulationReport {
                    frames: status.frames,
                    time: last.time,
                    surface: [size.width, size.height],
                    cells: last.samples.len(),
                    influenced: last.influenced(),
                    peak_influence: last.peak_influence(),
                    pointer: status.pointer.to_array(),
                    radius: status.radius,
                    pressed: status.pressed,
                    samples: last
                        .samples
                        .iter()
                        .take(cells)
                        .enumerate()
                        .map(|(index, s)| SampleRow {
                            index,
                            position: s.position.to_array(),
                            influence: s.influence,
                            color: s.color.to_array(),
                        })
                        .collect(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", renderer.describe(cells));
                println!("{status}");
            }

            wall.teardown();
        }
    }

    Ok(())
}

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use wt_client::{HttpModelClient, ModelService};
use wt_engine::{OrchestratorConfig, TrialLoop};
use wt_launch::{ExecutableLocator, ProcessRunner};
use wt_sampler::BatchMode;
use wt_types::{
    Bounds, FeatureMapping, IoConfig, Observation, ParameterBounds, ProcessLayout, Topology,
    TrialParameters,
};

#[derive(Parser, Debug)]
#[command(
    name = "walltime",
    about = "Run simulation trials and learn to predict their wall time"
)]
struct Cli {
    /// JSON configuration file; command-line flags override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Model service base URL. Overrides WALLTIME_SERVICE_URL.
    #[arg(long, global = true)]
    url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run simulations and train every model on each measured wall time.
    Train(BatchArgs),
    /// Run simulations, compare model predictions to measured wall times.
    Predict(BatchArgs),
    /// Send a single known observation to every model.
    Send {
        #[arg(long)]
        x: i64,
        #[arg(long)]
        y: i64,
        #[arg(long)]
        z: i64,
        /// Measured wall time in seconds.
        #[arg(long)]
        time: u64,
    },
    /// Ask every model for a prediction without running anything.
    Query {
        #[arg(long)]
        x: i64,
        #[arg(long)]
        y: i64,
        #[arg(long)]
        z: i64,
    },
    /// List the models the service knows.
    Models,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TopologyArg {
    Direct,
    Scheduled,
}

#[derive(ClapArgs, Debug)]
struct BatchArgs {
    /// Number of jobs to launch.
    #[arg(long)]
    iters: Option<usize>,
    #[arg(long)]
    x_min: Option<i64>,
    #[arg(long)]
    x_max: Option<i64>,
    #[arg(long)]
    y_min: Option<i64>,
    #[arg(long)]
    y_max: Option<i64>,
    #[arg(long)]
    z_min: Option<i64>,
    #[arg(long)]
    z_max: Option<i64>,
    /// Number of nodes.
    #[arg(long = "nodes", short = 'N')]
    nodes: Option<u32>,
    /// Processes per node (direct) or total tasks (scheduled).
    #[arg(long = "np")]
    procs: Option<u32>,
    /// Directory holding the simulation inputs.
    #[arg(long)]
    workdir: Option<PathBuf>,
    /// Log file the simulation writes.
    #[arg(long)]
    log: Option<String>,
    /// Input arguments, whitespace separated.
    #[arg(long = "in")]
    inputs: Option<String>,
    #[arg(long, value_enum)]
    topology: Option<TopologyArg>,
    /// Container image for the scheduled topology.
    #[arg(long)]
    container: Option<String>,
    /// Working directory inside the container.
    #[arg(long)]
    container_workdir: Option<String>,
    #[arg(long)]
    scheduler_verb: Option<String>,
    /// Fixed sampler seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Send y in both the x and y feature slots, as older models expect.
    #[arg(long)]
    legacy_features: bool,
}

impl BatchArgs {
    fn apply(self, mut config: OrchestratorConfig, mode: BatchMode) -> OrchestratorConfig {
        config.mode = mode;
        if let Some(iters) = self.iters {
            config.iterations = iters;
        }

        let b = config.bounds;
        config.bounds = ParameterBounds::new(
            Bounds::new(self.x_min.unwrap_or(b.x.min), self.x_max.unwrap_or(b.x.max)),
            Bounds::new(self.y_min.unwrap_or(b.y.min), self.y_max.unwrap_or(b.y.max)),
            Bounds::new(self.z_min.unwrap_or(b.z.min), self.z_max.unwrap_or(b.z.max)),
        );

        if let Some(workdir) = &self.workdir {
            config.io.workdir = workdir.clone();
        }
        if let Some(log) = self.log {
            config.io.log = log;
        }
        if let Some(inputs) = self.inputs {
            config.io.inputs = IoConfig::parse_inputs(&inputs);
        }

        let current = config.topology.layout();
        let layout = ProcessLayout {
            nodes: self.nodes.unwrap_or(current.nodes),
            procs: self.procs.unwrap_or(current.procs),
        };
        let scheduled = match self.topology {
            Some(TopologyArg::Scheduled) => true,
            Some(TopologyArg::Direct) => false,
            None => matches!(config.topology, Topology::ScheduledContainerized { .. }),
        };
        config.topology = if scheduled {
            let (verb, image, cwd) = match &config.topology {
                Topology::ScheduledContainerized {
                    scheduler_verb,
                    image,
                    container_workdir,
                    ..
                } => (
                    scheduler_verb.clone(),
                    image.clone(),
                    Some(container_workdir.clone()),
                ),
                Topology::Direct { .. } => ("run".to_string(), String::new(), None),
            };
            // --pwd: explicit container workdir, else --workdir, else whatever
            // the file configured, else the host input directory.
            let cwd = self
                .container_workdir
                .or_else(|| self.workdir.map(|w| w.display().to_string()))
                .or(cwd)
                .unwrap_or_else(|| config.io.workdir.display().to_string());
            Topology::ScheduledContainerized {
                layout,
                scheduler_verb: self.scheduler_verb.unwrap_or(verb),
                image: self.container.unwrap_or(image),
                container_workdir: cwd,
            }
        } else {
            Topology::Direct { layout }
        };

        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if self.legacy_features {
            config.feature_mapping = FeatureMapping::LegacyYAsX;
        }
        config
    }
}

/// Defaults, then the config file, then the environment, then `--url`.
/// Batch flags are layered on last by [`BatchArgs::apply`].
fn load_config(
    cli: &Cli,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<OrchestratorConfig> {
    let config = match &cli.config {
        Some(path) => OrchestratorConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => OrchestratorConfig::default(),
    };
    let mut config = config.apply_env_from(env);
    if let Some(url) = &cli.url {
        config.service_url = url.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli, |key| std::env::var(key).ok())?;
    let service = HttpModelClient::new(&config.service_url)?;

    match cli.command {
        Command::Train(args) => run_batch(args.apply(config, BatchMode::Train), service).await,
        Command::Predict(args) => run_batch(args.apply(config, BatchMode::Predict), service).await,
        Command::Send { x, y, z, time } => {
            let observation = Observation::new(TrialParameters::new(x, y, z), time);
            let trained =
                wt_engine::train_all(&service, config.feature_mapping, &observation).await?;
            info!(models = trained.len(), "observation sent");
            Ok(())
        }
        Command::Query { x, y, z } => {
            let params = TrialParameters::new(x, y, z);
            let predictions =
                wt_engine::predict_all(&service, config.feature_mapping, &params).await?;
            for (model, predicted) in predictions {
                println!("{model}\t{predicted}");
            }
            Ok(())
        }
        Command::Models => {
            for model in service.list_models().await? {
                println!("{model}");
            }
            Ok(())
        }
    }
}

async fn run_batch(config: OrchestratorConfig, service: HttpModelClient) -> anyhow::Result<()> {
    let locator = ExecutableLocator::from_env();
    let mut trial_loop = TrialLoop::prepare(config, &locator, ProcessRunner::new(), service)?;
    let summary = trial_loop.run().await?;

    for report in &summary.reports {
        println!("{report}");
    }
    println!(
        "{} trials: {} succeeded, {} skipped",
        summary.progress.attempted, summary.progress.succeeded, summary.progress.skipped
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wt_engine::SERVICE_URL_ENV;

    fn batch(argv: &[&str]) -> (Cli, BatchArgs) {
        let mut cli = Cli::parse_from(argv);
        let command = std::mem::replace(&mut cli.command, Command::Models);
        match command {
            Command::Train(args) | Command::Predict(args) => (cli, args),
            other => panic!("expected a batch command, got {other:?}"),
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn workdir_becomes_container_pwd() {
        let (_, args) = batch(&[
            "walltime", "train", "--topology", "scheduled", "--container", "img.sif",
            "--workdir", "/scratch/hns",
        ]);
        let config = args.apply(OrchestratorConfig::default(), BatchMode::Train);

        assert_eq!(config.io.workdir, PathBuf::from("/scratch/hns"));
        match &config.topology {
            Topology::ScheduledContainerized {
                image,
                container_workdir,
                scheduler_verb,
                ..
            } => {
                assert_eq!(container_workdir, "/scratch/hns");
                assert_eq!(image, "img.sif");
                assert_eq!(scheduler_verb, "run");
            }
            other => panic!("expected scheduled topology, got {other:?}"),
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn container_workdir_flag_wins_over_workdir() {
        let (_, args) = batch(&[
            "walltime", "train", "--topology", "scheduled", "--container", "img.sif",
            "--workdir", "/scratch/hns", "--container-workdir", "/opt/run",
        ]);
        let config = args.apply(OrchestratorConfig::default(), BatchMode::Train);
        assert!(matches!(
            &config.topology,
            Topology::ScheduledContainerized { container_workdir, .. } if container_workdir == "/opt/run"
        ));
    }

    #[test]
    fn switching_to_scheduled_keeps_layout_and_defaults_pwd() {
        let (_, args) = batch(&[
            "walltime", "predict", "--topology", "scheduled", "--container", "img.sif",
            "-N", "6", "--np", "48", "--scheduler-verb", "submit",
        ]);
        let config = args.apply(OrchestratorConfig::default(), BatchMode::Predict);

        assert_eq!(config.mode, BatchMode::Predict);
        assert_eq!(config.topology.layout(), ProcessLayout { nodes: 6, procs: 48 });
        match &config.topology {
            Topology::ScheduledContainerized {
                scheduler_verb,
                container_workdir,
                ..
            } => {
                assert_eq!(scheduler_verb, "submit");
                assert_eq!(container_workdir, "/opt/lammps/examples/reaxff/HNS");
            }
            other => panic!("expected scheduled topology, got {other:?}"),
        }
    }

    #[test]
    fn direct_flag_overrides_scheduled_file() {
        let base = OrchestratorConfig::default()
            .with_topology(Topology::scheduled(2, 8, "img.sif", "/w"));
        let (_, args) = batch(&["walltime", "train", "--topology", "direct"]);
        let config = args.apply(base, BatchMode::Train);
        assert_eq!(config.topology, Topology::direct(2, 8));
    }

    #[test]
    fn precedence_defaults_file_env_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"service_url": "http://from-file", "iterations": 7, "io": {{"workdir": "/file/dir", "log": "/file.log", "inputs": ["in.file"]}}}}"#
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let env = |key: &str| (key == SERVICE_URL_ENV).then(|| "http://from-env".to_string());

        // File over defaults.
        let (cli, args) = batch(&["walltime", "--config", &path, "train"]);
        let config = args.apply(load_config(&cli, no_env).unwrap(), BatchMode::Train);
        assert_eq!(config.service_url, "http://from-file");
        assert_eq!(config.iterations, 7);
        assert_eq!(config.io.log, "/file.log");
        assert_eq!(config.bounds, ParameterBounds::default());

        // Env over file.
        let (cli, args) = batch(&["walltime", "--config", &path, "train"]);
        let config = args.apply(load_config(&cli, env).unwrap(), BatchMode::Train);
        assert_eq!(config.service_url, "http://from-env");
        assert_eq!(config.iterations, 7);

        // Flags over env and file.
        let (cli, args) = batch(&[
            "walltime", "--config", &path, "--url", "http://from-flag", "train", "--iters", "3",
            "--log", "/flag.log",
        ]);
        let config = args.apply(load_config(&cli, env).unwrap(), BatchMode::Train);
        assert_eq!(config.service_url, "http://from-flag");
        assert_eq!(config.iterations, 3);
        assert_eq!(config.io.log, "/flag.log");
        assert_eq!(config.io.workdir, PathBuf::from("/file/dir"));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let (cli, _) = batch(&["walltime", "--config", "/no/such/walltime.json", "train"]);
        assert!(load_config(&cli, no_env).is_err());
    }

    #[test]
    fn bounds_and_features_from_flags() {
        let (_, args) = batch(&[
            "walltime", "train", "--x-min", "2", "--x-max", "4", "--seed", "9",
            "--legacy-features",
        ]);
        let config = args.apply(OrchestratorConfig::default(), BatchMode::Train);
        assert_eq!(config.bounds.x, Bounds::new(2, 4));
        assert_eq!(config.bounds.y, Bounds::new(1, 16));
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.feature_mapping, FeatureMapping::LegacyYAsX);
    }
}

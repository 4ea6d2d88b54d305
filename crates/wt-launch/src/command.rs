//! Translate a topology and sampled parameters into an exact command line.

use wt_types::{CommandSpec, IoConfig, Topology, Toolchain, TrialParameters};

/// Affinity directive the scheduler always receives: one core per task.
const CORES_PER_TASK: &str = "1";
const CPU_AFFINITY: &str = "cpu-affinity=per-task";

/// Build the command for one trial.
///
/// `tools` should already be resolved to host paths (see
/// [`crate::ExecutableLocator::resolve`]); names are used verbatim.
pub fn build(
    topology: &Topology,
    params: &TrialParameters,
    io: &IoConfig,
    tools: &Toolchain,
) -> CommandSpec {
    match topology {
        Topology::Direct { layout } => {
            let mut argv = vec![
                tools.launcher.clone(),
                "-N".to_string(),
                layout.nodes.to_string(),
                "--ppn".to_string(),
                layout.procs.to_string(),
            ];
            argv.extend(simulation_args(&tools.simulator, params, io));
            CommandSpec::new(argv, Some(io.workdir.clone()))
        }
        Topology::ScheduledContainerized {
            layout,
            scheduler_verb,
            image,
            container_workdir,
        } => {
            let mut argv = vec![
                tools.scheduler.clone(),
                scheduler_verb.clone(),
                "-N".to_string(),
                layout.nodes.to_string(),
                "--ntasks".to_string(),
                layout.procs.to_string(),
                "-c".to_string(),
                CORES_PER_TASK.to_string(),
                "-o".to_string(),
                CPU_AFFINITY.to_string(),
                tools.runtime.clone(),
                "exec".to_string(),
                "--pwd".to_string(),
                container_workdir.clone(),
                image.clone(),
            ];
            argv.extend(simulation_args(&tools.container_simulator, params, io));
            // The container gets its directory through --pwd.
            CommandSpec::new(argv, None)
        }
    }
}

/// `<sim> -v x <x> y <y> z <z> -log <log> -in <inputs...>`
///
/// Only the first variable binding carries `-v`; the simulator's grammar
/// reads the following name/value pairs as continuations of it.
fn simulation_args(simulator: &str, params: &TrialParameters, io: &IoConfig) -> Vec<String> {
    let mut args = vec![
        simulator.to_string(),
        "-v".to_string(),
        "x".to_string(),
        params.x.to_string(),
        "y".to_string(),
        params.y.to_string(),
        "z".to_string(),
        params.z.to_string(),
        "-log".to_string(),
        io.log.clone(),
        "-in".to_string(),
    ];
    args.extend(io.inputs.iter().cloned());
    args
}

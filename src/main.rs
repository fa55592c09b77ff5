use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use clap::Parser;
use log::{error, info, warn, LevelFilter};
use simple_logger::SimpleLogger;
use hancock::config::{Config, Parameters};
use hancock::error::Error;
use hancock::output::{DataSaver, OutputConfig, SnapshotSink};
use hancock::problem::problem_from_name;
use hancock::simulation::Simulation;




#[derive(Debug, Parser)]
#[clap(version, author = "J. Zrake <jzrake@clemson.edu>")]
#[clap(about = "MUSCL-Hancock solver for the 2D Euler equations")]
struct Opts {
    /// Name of the problem to run; the input file is <input-dir>/<problem>.in
    #[clap(short = 'p', long)]
    problem: String,

    #[clap(short = 'i', long, default_value = "inputs")]
    input_dir: PathBuf,

    /// Number of worker threads (defaults to num_threads in the input file,
    /// or one per core)
    #[clap(short = 't', long)]
    threads: Option<usize>,

    /// Pin each worker thread to a core
    #[clap(long)]
    pin_threads: bool,

    /// Write output files on a dedicated thread
    #[clap(long)]
    background_output: bool,

    #[clap(short = 'l', long, default_value = "info")]
    log_level: LevelFilter,
}




fn configure_threads(num_threads: Option<usize>, pin_threads: bool) -> Result<(), Error> {
    let mut builder = rayon::ThreadPoolBuilder::new();

    if let Some(n) = num_threads {
        builder = builder.num_threads(n)
    }
    if pin_threads {
        match core_affinity::get_core_ids() {
            Some(core_ids) if !core_ids.is_empty() => {
                builder = builder.start_handler(move |index| {
                    core_affinity::set_for_current(core_ids[index % core_ids.len()]);
                })
            }
            _ => warn!("could not read the core ids; worker threads are not pinned"),
        }
    }
    builder
        .build_global()
        .map_err(|e| Error::invalid("threads", e.to_string()))?;

    info!("running on {} threads", rayon::current_num_threads());
    Ok(())
}




fn run(opts: &Opts) -> Result<(), Error> {
    let input = opts.input_dir.join(format!("{}.in", opts.problem));
    info!("reading {}", input.display());

    let parameters = Parameters::from_file(&input)?;
    let config = Config::from_parameters(&parameters)?;
    let output = OutputConfig::from_parameters(&parameters)?;
    let problem = problem_from_name(&opts.problem, &parameters)?;

    configure_threads(opts.threads.or(config.num_threads), opts.pin_threads)?;

    let stop = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&stop))?;

    let saver = DataSaver::create(&output)?;
    let mut sink: Box<dyn SnapshotSink> = if opts.background_output {
        Box::new(saver.into_background())
    } else {
        Box::new(saver)
    };

    let mut simulation = Simulation::new(config);
    simulation.initialize(problem.as_ref())?;

    let start = std::time::Instant::now();
    simulation.run(sink.as_mut(), &stop)?;
    sink.finish()?;

    info!(
        "finished {} iterations at t={:.6} in {:.3}s",
        simulation.iteration(),
        simulation.time(),
        start.elapsed().as_secs_f64());
    Ok(())
}




fn main() {
    let opts = Opts::parse();

    if let Err(e) = SimpleLogger::new().with_level(opts.log_level).init() {
        eprintln!("{}", e)
    }
    if let Err(e) = run(&opts) {
        error!("{}", e);
        std::process::exit(1)
    }
}

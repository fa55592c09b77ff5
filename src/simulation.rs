use std::sync::atomic::{AtomicBool, Ordering};
use log::{debug, info, warn};
use crate::config::Config;
use crate::error::Error;
use crate::hydro::euler2d::NUM_FIELDS;
use crate::mesh::Mesh;
use crate::output::SnapshotSink;
use crate::patch::Patch;
use crate::problem::ProblemGenerator;
use crate::solvers::muscl_hancock::{calculate_timestep, MusclHancock};




/**
 * The stage of a simulation's life cycle
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Idle,
    Initialized,
    Stepping,
    Finished,
}




/**
 * Owns the conserved state and the numerical scheme, and advances the state
 * in time until `tmax` is reached. The iteration count is the number of
 * completed steps; a snapshot labeled with iteration `n` holds the state
 * after `n` steps.
 */
pub struct Simulation {
    config: Config,
    scheme: MusclHancock,
    state: Patch,
    time: f64,
    iteration: u64,
    status: Status,
}




// ============================================================================
impl Simulation {

    pub fn new(config: Config) -> Self {
        let scheme = MusclHancock::new(
            config.mesh.clone(),
            config.gamma_law_index,
            config.reconstruction,
            config.boundaries);
        let state = Patch::zeros(NUM_FIELDS, config.mesh.extended());

        Self {
            config,
            scheme,
            state,
            time: 0.0,
            iteration: 0,
            status: Status::Idle,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mesh(&self) -> &Mesh {
        &self.config.mesh
    }

    pub fn state(&self) -> &Patch {
        &self.state
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn status(&self) -> Status {
        self.status
    }


    /**
     * Fill the state with the initial conditions of the given problem, and
     * its guard zones from the boundary conditions.
     */
    pub fn initialize(&mut self, problem: &dyn ProblemGenerator) -> Result<(), Error> {
        if self.status != Status::Idle {
            return Err(Error::InvalidState("simulation is already initialized"))
        }
        problem.generate(&self.config.mesh, self.config.gamma_law_index, &mut self.state);
        self.scheme.apply_boundaries(&mut self.state);
        self.time = 0.0;
        self.iteration = 0;
        self.status = Status::Initialized;

        let (ni, nj) = self.config.mesh.size;
        info!("initialized problem '{}' on a {}x{} mesh", problem.name(), ni, nj);
        Ok(())
    }


    /**
     * Take one step of the scheme, and return its size. The step is
     * shortened if needed to land exactly on `tmax`.
     */
    pub fn step(&mut self) -> Result<f64, Error> {
        match self.status {
            Status::Idle => return Err(Error::InvalidState("simulation has not been initialized")),
            Status::Finished => return Err(Error::InvalidState("simulation has already finished")),
            Status::Initialized | Status::Stepping => {}
        }
        let Config { cfl, gamma_law_index, tmax, .. } = self.config;
        let dt = calculate_timestep(&self.state, &self.config.mesh, cfl, gamma_law_index)?;

        let (dt, time) = if self.time + dt >= tmax {
            (tmax - self.time, tmax)
        } else {
            (dt, self.time + dt)
        };
        self.scheme.advance(&mut self.state, dt);
        self.time = time;
        self.iteration += 1;
        self.status = if self.time >= tmax { Status::Finished } else { Status::Stepping };

        debug!("[{:06}] t={:.6} dt={:.3e}", self.iteration, self.time, dt);
        Ok(dt)
    }


    /**
     * Step until `tmax` is reached, or until the stop flag is raised. A
     * snapshot is saved before the first step, after every
     * `output_frequency` steps, and after the last step.
     */
    pub fn run(&mut self, sink: &mut dyn SnapshotSink, stop: &AtomicBool) -> Result<(), Error> {
        if self.status == Status::Idle {
            return Err(Error::InvalidState("simulation has not been initialized"))
        }
        let mut last_saved = None;

        if self.status == Status::Initialized {
            self.save(sink)?;
            last_saved = Some(self.iteration);
        }

        while self.status != Status::Finished {
            if stop.load(Ordering::Relaxed) {
                warn!("stopping early at t={:.6}", self.time);
                break
            }
            self.step()?;

            if self.iteration % self.config.output_frequency == 0 {
                self.save(sink)?;
                last_saved = Some(self.iteration);
            }
        }
        if last_saved != Some(self.iteration) {
            self.save(sink)?;
        }
        Ok(())
    }

    fn save(&self, sink: &mut dyn SnapshotSink) -> Result<(), Error> {
        sink.save(&self.state, &self.config.mesh, self.config.gamma_law_index, self.iteration, self.time)?;
        info!("saved output at iteration {} t={:.6}", self.iteration, self.time);
        Ok(())
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::config::test::KH_INPUT;
    use crate::config::{Parameters, Value};
    use crate::problem::KelvinHelmholtz;

    #[derive(Default)]
    struct Recorder {
        saved: Vec<(u64, f64)>,
    }

    impl SnapshotSink for Recorder {
        fn save(&mut self, _: &Patch, _: &Mesh, _: f64, iteration: u64, time: f64) -> Result<(), Error> {
            self.saved.push((iteration, time));
            Ok(())
        }
    }

    fn setup(tmax: f64, output_frequency: i64) -> (Simulation, KelvinHelmholtz) {
        let mut p = Parameters::parse(KH_INPUT).unwrap();
        p.insert("nx1", Value::Integer(16));
        p.insert("nx2", Value::Integer(16));
        p.insert("tmax", Value::Float(tmax));
        p.insert("output_frequency", Value::Integer(output_frequency));
        let config = Config::from_parameters(&p).unwrap();
        let problem = KelvinHelmholtz::from_parameters(&p).unwrap();
        (Simulation::new(config), problem)
    }

    #[test]
    fn stepping_before_initialization_is_an_error() {
        let (mut sim, _) = setup(0.1, 1);
        assert_eq!(sim.status(), Status::Idle);
        assert!(matches!(sim.step(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn simulation_runs_to_tmax_exactly() {
        let (mut sim, problem) = setup(0.05, 1);
        sim.initialize(&problem).unwrap();
        assert_eq!(sim.status(), Status::Initialized);

        while sim.status() != Status::Finished {
            let dt = sim.step().unwrap();
            assert!(dt > 0.0);
        }
        assert_eq!(sim.time(), 0.05);
        assert!(matches!(sim.step(), Err(Error::InvalidState(_))));
        assert!(matches!(sim.initialize(&problem), Err(Error::InvalidState(_))));
    }

    #[test]
    fn snapshots_follow_the_output_cadence() {
        let (mut sim, problem) = setup(0.1, 3);
        let mut recorder = Recorder::default();
        sim.initialize(&problem).unwrap();
        sim.run(&mut recorder, &AtomicBool::new(false)).unwrap();

        let n = sim.iteration();
        let iterations: Vec<u64> = recorder.saved.iter().map(|s| s.0).collect();
        let mut expected: Vec<u64> = (0..=n).filter(|i| i % 3 == 0).collect();

        if n % 3 != 0 {
            expected.push(n)
        }
        assert_eq!(iterations, expected);
        assert_eq!(recorder.saved.last().map(|s| s.1), Some(0.1));
    }

    #[test]
    fn raised_stop_flag_still_saves_the_final_state() {
        let (mut sim, problem) = setup(0.1, 100);
        let mut recorder = Recorder::default();
        sim.initialize(&problem).unwrap();
        sim.step().unwrap();
        sim.run(&mut recorder, &AtomicBool::new(true)).unwrap();

        assert_eq!(recorder.saved, vec![(1, sim.time())]);
        assert_eq!(sim.status(), Status::Stepping);
    }
}

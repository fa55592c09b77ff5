use std::fs;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use hancock::config::{Config, Parameters, Value};
use hancock::output::{DataSaver, OutputConfig, Snapshot, SnapshotSink};
use hancock::problem::problem_from_name;
use hancock::simulation::{Simulation, Status};




const INPUT: &str = "
# two-layer shear flow
nvar = 4
nx1 = 64
nx2 = 64
ng = 2
x1min = -0.5
x1max = 0.5
x2min = -0.5
x2max = 0.5
CFL = 0.4
gamma = 1.4
tmax = 1.0
left_bc = periodic
right_bc = periodic
bottom_bc = periodic
top_bc = periodic
output_frequency = 2
rho0 = 1.0
rho1 = 2.0
p0 = 2.5
p1 = 2.5
u0 = 0.5
u1 = -0.5
pert_amp = 0.0
";




fn parameters() -> Parameters {
    Parameters::parse(INPUT).unwrap()
}

fn initialized(parameters: &Parameters) -> Simulation {
    let problem = problem_from_name("kh", parameters).unwrap();
    let mut sim = Simulation::new(Config::from_parameters(parameters).unwrap());
    sim.initialize(problem.as_ref()).unwrap();
    sim
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hancock-kh-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}




#[test]
fn first_step_introduces_no_new_extrema_at_the_shear_layer() {
    let mut sim = initialized(&parameters());
    let interior = sim.mesh().interior();
    let (m_lo, m_hi) = sim.state().field_range(interior.clone(), 1);

    sim.step().unwrap();

    let (d_lo, d_hi) = sim.state().field_range(interior.clone(), 0);
    let (m1_lo, m1_hi) = sim.state().field_range(interior.clone(), 1);
    let (m2_lo, m2_hi) = sim.state().field_range(interior, 2);

    assert!(d_lo >= 1.0 - 1e-12 && d_hi <= 2.0 + 1e-12, "density left [1, 2]: [{}, {}]", d_lo, d_hi);
    assert!(m1_lo >= m_lo - 1e-12 && m1_hi <= m_hi + 1e-12);
    assert!(m2_lo.abs() < 1e-12 && m2_hi.abs() < 1e-12);
}

#[test]
fn periodic_domain_conserves_mass_momentum_and_energy() {
    let mut p = parameters();
    p.insert("pert_amp", Value::Float(0.01));
    p.insert("seed", Value::Integer(7));

    let mut sim = initialized(&p);
    let interior = sim.mesh().interior();
    let before = sim.state().totals(interior.clone());

    for _ in 0..5 {
        sim.step().unwrap();
    }
    let after = sim.state().totals(interior.clone());

    for (a, b) in before.iter().zip(&after) {
        assert!((a - b).abs() <= 1e-10 * a.abs().max(1.0), "{} != {}", a, b);
    }
    let (d_lo, _) = sim.state().field_range(interior, 0);
    assert!(d_lo > 0.0);
}

#[test]
fn input_file_drives_a_complete_run() {
    let dir = scratch_dir("run");
    let text = INPUT
        .replace("nx1 = 64", "nx1 = 16")
        .replace("nx2 = 64", "nx2 = 16")
        .replace("tmax = 1.0", "tmax = 0.02");
    let input = dir.join("kh.in");
    fs::write(&input, format!("{}\noutput_variables = [density, pressure]\ndata_file_type = [csv, cbor]\noutput_dir = {}\n", text, dir.display())).unwrap();

    let p = Parameters::from_file(&input).unwrap();
    let output = OutputConfig::from_parameters(&p).unwrap();
    let mut saver = DataSaver::create(&output).unwrap();
    let mut sim = initialized(&p);

    sim.run(&mut saver, &AtomicBool::new(false)).unwrap();
    saver.finish().unwrap();

    assert_eq!(sim.status(), Status::Finished);
    assert_eq!(sim.time(), 0.02);

    let n = sim.iteration();
    let num_snapshots = (0..=n).filter(|i| i % 2 == 0).count() + if n % 2 == 0 { 0 } else { 1 };
    let density = fs::read_to_string(dir.join("density.csv")).unwrap();
    let iter_time = fs::read_to_string(dir.join("iter_time.csv")).unwrap();

    assert_eq!(density.lines().count(), 16 * num_snapshots);
    assert_eq!(iter_time.lines().count(), num_snapshots);
    assert!(!dir.join("x-velocity.csv").exists());

    let last: Snapshot = ciborium::de::from_reader(fs::File::open(dir.join(format!("iter_{}.cbor", n))).unwrap()).unwrap();
    assert_eq!(last.time, 0.02);
    assert_eq!(last.field("pressure").unwrap().data.len(), 256);

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn unknown_names_are_fatal_at_setup() {
    let p = parameters();
    assert!(problem_from_name("rayleigh-taylor", &p).is_err());

    let mut p = parameters();
    p.insert("top_bc", Value::Text("reflecting".into()));
    assert!(Config::from_parameters(&p).is_err());
}

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use crate::boundary::Boundaries;
use crate::error::Error;
use crate::hydro::reconstruct::Reconstruction;
use crate::mesh::Mesh;




/// Keys whose values are kept as text, whatever they look like.
const TEXT_KEYS: [&str; 10] = [
    "left_bc",
    "right_bc",
    "top_bc",
    "bottom_bc",
    "stability_name",
    "problem",
    "data_file_type",
    "reconstruction",
    "output_dir",
    "output_variables",
];

const BOOL_KEYS: [&str; 1] = ["style_mode"];

/// The halo width required by the MUSCL-Hancock stencil.
pub const NUM_GUARD: i64 = 2;




/**
 * A single value read from an input file
 */
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
    Bool(bool),
}




/**
 * The key-value mapping read from a line-oriented input file. Each line is
 * `key = value`; blank lines and lines starting with `#` are ignored.
 */
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parameters {
    values: BTreeMap<String, Value>,
}




/**
 * The validated, typed settings of a simulation. These are read once before
 * the time loop and not modified afterwards.
 */
#[derive(Clone, Debug)]
pub struct Config {
    pub mesh: Mesh,
    pub cfl: f64,
    pub gamma_law_index: f64,
    pub tmax: f64,
    pub boundaries: Boundaries,
    pub output_frequency: u64,
    pub reconstruction: Reconstruction,
    pub num_threads: Option<usize>,
}




// ============================================================================
impl Value {
    fn parse(key: &str, raw: &str) -> Result<Self, Error> {
        let malformed = || Error::MalformedParameter {
            key: key.to_string(),
            value: raw.to_string(),
        };

        if raw.starts_with('[') {
            let inner = raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')).ok_or_else(malformed)?;
            return Ok(Value::List(split_list(inner)))
        }
        if TEXT_KEYS.contains(&key) {
            return Ok(Value::Text(raw.to_string()))
        }
        if BOOL_KEYS.contains(&key) {
            return match raw.to_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(malformed()),
            }
        }
        if !raw.contains('.') {
            if let Ok(n) = raw.parse::<i64>() {
                return Ok(Value::Integer(n))
            }
        }
        match raw.parse::<f64>() {
            Ok(x) if x.is_finite() => Ok(Value::Float(x)),
            _ => Err(malformed()),
        }
    }
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .filter(|item| !item.is_empty())
        .collect()
}




// ============================================================================
impl Parameters {

    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut parameters = Self::default();

        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue
            }
            let (key, raw) = line.split_once('=').ok_or_else(|| Error::MalformedParameter {
                key: line.to_string(),
                value: String::new(),
            })?;
            let key = key.trim();
            parameters.insert(key, Value::parse(key, raw.trim())?);
        }
        Ok(parameters)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn require(&self, key: &str) -> Result<&Value, Error> {
        self.get(key).ok_or_else(|| Error::MissingParameter(key.to_string()))
    }

    fn mistyped(&self, key: &str) -> Error {
        let value = match self.get(key) {
            Some(Value::Integer(n)) => n.to_string(),
            Some(Value::Float(x)) => x.to_string(),
            Some(Value::Text(s)) => s.clone(),
            Some(Value::List(l)) => format!("[{}]", l.join(", ")),
            Some(Value::Bool(b)) => b.to_string(),
            None => String::new(),
        };
        Error::MalformedParameter { key: key.to_string(), value }
    }

    /// Return a floating point value; integer values are converted.
    pub fn float(&self, key: &str) -> Result<f64, Error> {
        match self.require(key)? {
            Value::Float(x) => Ok(*x),
            Value::Integer(n) => Ok(*n as f64),
            _ => Err(self.mistyped(key)),
        }
    }

    pub fn float_or(&self, key: &str, default: f64) -> Result<f64, Error> {
        if self.contains(key) { self.float(key) } else { Ok(default) }
    }

    pub fn integer(&self, key: &str) -> Result<i64, Error> {
        match self.require(key)? {
            Value::Integer(n) => Ok(*n),
            _ => Err(self.mistyped(key)),
        }
    }

    pub fn integer_or(&self, key: &str, default: i64) -> Result<i64, Error> {
        if self.contains(key) { self.integer(key) } else { Ok(default) }
    }

    pub fn text(&self, key: &str) -> Result<&str, Error> {
        match self.require(key)? {
            Value::Text(s) => Ok(s),
            _ => Err(self.mistyped(key)),
        }
    }

    pub fn text_or<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str, Error> {
        if self.contains(key) { self.text(key) } else { Ok(default) }
    }

    /// Return a list of strings; a bare value is split on commas.
    pub fn list(&self, key: &str) -> Result<Vec<String>, Error> {
        match self.require(key)? {
            Value::List(l) => Ok(l.clone()),
            Value::Text(s) => Ok(split_list(s)),
            _ => Err(self.mistyped(key)),
        }
    }

    pub fn boolean(&self, key: &str) -> Result<bool, Error> {
        match self.require(key)? {
            Value::Bool(b) => Ok(*b),
            _ => Err(self.mistyped(key)),
        }
    }
}




// ============================================================================
impl Config {

    /**
     * Build and validate the simulation settings. Any missing, malformed, or
     * out-of-range key is an error.
     */
    pub fn from_parameters(p: &Parameters) -> Result<Self, Error> {
        let nvar = p.integer("nvar")?;
        let nx1 = p.integer("nx1")?;
        let nx2 = p.integer("nx2")?;
        let ng = p.integer("ng")?;
        let (x1min, x1max) = (p.float("x1min")?, p.float("x1max")?);
        let (x2min, x2max) = (p.float("x2min")?, p.float("x2max")?);
        let cfl = p.float("CFL")?;
        let gamma_law_index = p.float("gamma")?;
        let tmax = p.float("tmax")?;
        let output_frequency = p.integer("output_frequency")?;

        if nvar != 4 {
            return Err(Error::invalid("nvar", "the 2D Euler equations have 4 conserved variables"))
        }
        if ng != NUM_GUARD {
            return Err(Error::invalid("ng", format!("the stencil needs exactly {} guard zones", NUM_GUARD)))
        }
        if nx1 < ng || nx2 < ng {
            return Err(Error::invalid("nx1", "each axis needs at least as many zones as guard zones"))
        }
        if x1max <= x1min {
            return Err(Error::invalid("x1max", "must exceed x1min"))
        }
        if x2max <= x2min {
            return Err(Error::invalid("x2max", "must exceed x2min"))
        }
        if !(cfl > 0.0 && cfl <= 1.0) {
            return Err(Error::invalid("CFL", "must lie in (0, 1]"))
        }
        if gamma_law_index <= 1.0 {
            return Err(Error::invalid("gamma", "must exceed one"))
        }
        if tmax <= 0.0 {
            return Err(Error::invalid("tmax", "must be positive"))
        }
        if output_frequency <= 0 {
            return Err(Error::invalid("output_frequency", "must be positive"))
        }

        let boundaries = Boundaries::new(
            p.text("left_bc")?.parse()?,
            p.text("right_bc")?.parse()?,
            p.text("bottom_bc")?.parse()?,
            p.text("top_bc")?.parse()?)?;

        let num_threads = match p.integer_or("num_threads", 0)? {
            0 => None,
            n if n > 0 => Some(n as usize),
            _ => return Err(Error::invalid("num_threads", "must not be negative")),
        };

        Ok(Self {
            mesh: Mesh {
                area: (x1min..x1max, x2min..x2max),
                size: (nx1, nx2),
                num_guard: ng,
            },
            cfl,
            gamma_law_index,
            tmax,
            boundaries,
            output_frequency: output_frequency as u64,
            reconstruction: reconstruction_from_parameters(p)?,
            num_threads,
        })
    }
}

fn reconstruction_from_parameters(p: &Parameters) -> Result<Reconstruction, Error> {
    match p.text_or("reconstruction", "limited")? {
        "limited" => {
            let beta = p.float_or("beta", 1.0)?;

            if !(1.0..=2.0).contains(&beta) {
                return Err(Error::invalid("beta", "must lie in [1, 2]"))
            }
            Ok(Reconstruction::Limited { beta })
        }
        "unlimited" => {
            let omega = p.float_or("omega", 0.0)?;

            if !(-1.0..=1.0).contains(&omega) {
                return Err(Error::invalid("omega", "must lie in [-1, 1]"))
            }
            Ok(Reconstruction::Unlimited { omega })
        }
        other => Err(Error::invalid("reconstruction", format!("expected limited or unlimited, got {}", other))),
    }
}




// ============================================================================
#[cfg(test)]
pub(crate) mod test {

    use super::*;
    use crate::boundary::{BoundaryCondition, Side};

    pub(crate) const KH_INPUT: &str = "
# Kelvin-Helmholtz instability
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
tmax = 2.0
left_bc = periodic
right_bc = periodic
bottom_bc = periodic
top_bc = periodic
output_frequency = 10
output_variables = [density, pressure]
data_file_type = [txt]
style_mode = True
rho0 = 1.0
rho1 = 2.0
p0 = 2.5
p1 = 2.5
u0 = 0.5
u1 = -0.5
pert_amp = 0.01
";

    #[test]
    fn values_are_typed_by_key_and_content() {
        let p = Parameters::parse(KH_INPUT).unwrap();
        assert_eq!(p.get("nx1"), Some(&Value::Integer(64)));
        assert_eq!(p.get("CFL"), Some(&Value::Float(0.4)));
        assert_eq!(p.get("left_bc"), Some(&Value::Text("periodic".into())));
        assert_eq!(p.get("style_mode"), Some(&Value::Bool(true)));
        assert!(p.boolean("style_mode").unwrap());
        assert!(p.boolean("nx1").is_err());
        assert_eq!(p.list("output_variables").unwrap(), vec!["density", "pressure"]);
        assert_eq!(p.list("data_file_type").unwrap(), vec!["txt"]);
        assert_eq!(p.float("nx1").unwrap(), 64.0);
    }

    #[test]
    fn exponents_parse_as_floats() {
        let p = Parameters::parse("a = 1e-3\nb = 7").unwrap();
        assert_eq!(p.get("a"), Some(&Value::Float(1e-3)));
        assert_eq!(p.get("b"), Some(&Value::Integer(7)));
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(matches!(Parameters::parse("nx1 64"), Err(Error::MalformedParameter { .. })));
        assert!(matches!(Parameters::parse("nx1 = sixty"), Err(Error::MalformedParameter { .. })));
        assert!(matches!(Parameters::parse("style_mode = maybe"), Err(Error::MalformedParameter { .. })));
        assert!(matches!(Parameters::parse("x = nan"), Err(Error::MalformedParameter { .. })));
    }

    #[test]
    fn config_is_built_from_valid_parameters() {
        let config = Config::from_parameters(&Parameters::parse(KH_INPUT).unwrap()).unwrap();
        assert_eq!(config.mesh.size, (64, 64));
        assert_eq!(config.mesh.num_guard, 2);
        assert_eq!(config.boundaries.get(Side::Top), BoundaryCondition::Periodic);
        assert_eq!(config.reconstruction, Reconstruction::Limited { beta: 1.0 });
        assert_eq!(config.output_frequency, 10);
        assert_eq!(config.num_threads, None);
    }

    #[test]
    fn missing_and_invalid_keys_are_configuration_errors() {
        let mut p = Parameters::parse(KH_INPUT).unwrap();
        p.values.remove("tmax");
        assert!(matches!(Config::from_parameters(&p), Err(Error::MissingParameter(k)) if k == "tmax"));

        let mut p = Parameters::parse(KH_INPUT).unwrap();
        p.insert("ng", Value::Integer(3));
        assert!(matches!(Config::from_parameters(&p), Err(Error::InvalidParameter { .. })));

        let mut p = Parameters::parse(KH_INPUT).unwrap();
        p.insert("gamma", Value::Float(1.0));
        assert!(matches!(Config::from_parameters(&p), Err(Error::InvalidParameter { .. })));

        let mut p = Parameters::parse(KH_INPUT).unwrap();
        p.insert("left_bc", Value::Text("open".into()));
        assert!(matches!(Config::from_parameters(&p), Err(Error::UnknownBoundaryCondition(_))));

        let mut p = Parameters::parse(KH_INPUT).unwrap();
        p.insert("left_bc", Value::Text("wall".into()));
        assert!(matches!(Config::from_parameters(&p), Err(Error::UnpairedPeriodicBoundary(_))));
    }

    #[test]
    fn unlimited_reconstruction_is_selectable() {
        let mut p = Parameters::parse(KH_INPUT).unwrap();
        p.insert("reconstruction", Value::Text("unlimited".into()));
        p.insert("omega", Value::Float(0.5));
        let config = Config::from_parameters(&p).unwrap();
        assert_eq!(config.reconstruction, Reconstruction::Unlimited { omega: 0.5 });
    }
}

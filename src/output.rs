use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::thread;
use crossbeam_channel::Sender;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use crate::config::Parameters;
use crate::error::Error;
use crate::hydro::euler2d::{Conserved, Primitive};
use crate::mesh::Mesh;
use crate::patch::Patch;




/**
 * A primitive variable that can be written to the output files
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputVariable {
    Density,
    XVelocity,
    YVelocity,
    Pressure,
}




/**
 * A supported output file format. Each format is served by one
 * `SnapshotWriter` implementation.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Csv,
    Cbor,
    MessagePack,
}




/**
 * The output settings read from the input file
 */
#[derive(Clone, Debug, PartialEq)]
pub struct OutputConfig {
    pub variables: Vec<OutputVariable>,
    pub formats: Vec<OutputFormat>,
    pub directory: PathBuf,
}




#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data: Vec<f64>,
}




/**
 * The primitive variables on the interior cells at one iteration. Each field
 * holds `nx2` rows of `nx1` values; rows run from the top of the domain
 * (`j = nx2 - 1`) down to the bottom, and each row runs over `i`.
 */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub iteration: u64,
    pub time: f64,
    pub nx1: usize,
    pub nx2: usize,
    pub fields: Vec<Field>,
}




/**
 * Interface for a file format strategy. Files are opened when the writer is
 * created, and flushed when it is finished or dropped.
 */
pub trait SnapshotWriter: Send {
    fn write(&mut self, snapshot: &Snapshot) -> Result<(), Error>;
    fn finish(&mut self) -> Result<(), Error>;
}




/**
 * Interface for a receiver of the simulation state, invoked by the driver at
 * the output cadence. A plot renderer would be another implementation.
 */
pub trait SnapshotSink {
    fn save(&mut self, state: &Patch, mesh: &Mesh, gamma_law_index: f64, iteration: u64, time: f64) -> Result<(), Error>;

    fn finish(&mut self) -> Result<(), Error> {
        Ok(())
    }
}




// ============================================================================
impl OutputVariable {
    pub fn name(&self) -> &'static str {
        match self {
            OutputVariable::Density => "density",
            OutputVariable::XVelocity => "x-velocity",
            OutputVariable::YVelocity => "y-velocity",
            OutputVariable::Pressure => "pressure",
        }
    }

    pub fn value(&self, p: &Primitive) -> f64 {
        match self {
            OutputVariable::Density => p.mass_density(),
            OutputVariable::XVelocity => p.velocity_1(),
            OutputVariable::YVelocity => p.velocity_2(),
            OutputVariable::Pressure => p.gas_pressure(),
        }
    }

    pub fn all() -> Vec<OutputVariable> {
        use OutputVariable::*;
        vec![Density, XVelocity, YVelocity, Pressure]
    }
}

impl FromStr for OutputVariable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "density" => Ok(OutputVariable::Density),
            "x-velocity" => Ok(OutputVariable::XVelocity),
            "y-velocity" => Ok(OutputVariable::YVelocity),
            "pressure" => Ok(OutputVariable::Pressure),
            _ => Err(Error::UnknownOutputVariable(s.to_string())),
        }
    }
}




// ============================================================================
impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Csv => "csv",
            OutputFormat::Cbor => "cbor",
            OutputFormat::MessagePack => "msgpack",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    /// `hdf5` is accepted for older input files, and written as CBOR.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "txt" => Ok(OutputFormat::Text),
            "csv" => Ok(OutputFormat::Csv),
            "cbor" => Ok(OutputFormat::Cbor),
            "hdf5" => {
                warn!("hdf5 output is not supported; writing cbor files instead");
                Ok(OutputFormat::Cbor)
            }
            "msgpack" => Ok(OutputFormat::MessagePack),
            _ => Err(Error::UnknownFileType(s.to_string())),
        }
    }
}




// ============================================================================
impl OutputConfig {
    pub fn from_parameters(p: &Parameters) -> Result<Self, Error> {
        let variables = if p.contains("output_variables") {
            dedup(p.list("output_variables")?.iter().map(|s| s.parse()).collect::<Result<Vec<OutputVariable>, Error>>()?)
        } else {
            OutputVariable::all()
        };
        let formats = if p.contains("data_file_type") {
            dedup(p.list("data_file_type")?.iter().map(|s| s.parse()).collect::<Result<Vec<OutputFormat>, Error>>()?)
        } else {
            vec![OutputFormat::Text]
        };

        if variables.is_empty() {
            return Err(Error::invalid("output_variables", "no variables given"))
        }
        if formats.is_empty() {
            return Err(Error::invalid("data_file_type", "no file types given"))
        }
        Ok(Self {
            variables,
            formats,
            directory: PathBuf::from(p.text_or("output_dir", ".")?),
        })
    }
}

fn dedup<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut result = Vec::with_capacity(items.len());

    for item in items {
        if !result.contains(&item) {
            result.push(item)
        }
    }
    result
}




// ============================================================================
impl Snapshot {

    /**
     * Recover the requested primitive variables on the interior of the mesh.
     * A cell with negative density or pressure is an error.
     */
    pub fn from_state(
        state: &Patch,
        mesh: &Mesh,
        variables: &[OutputVariable],
        gamma_law_index: f64,
        iteration: u64,
        time: f64) -> Result<Self, Error>
    {
        let (nx1, nx2) = mesh.size;
        let mut fields: Vec<Field> = variables
            .iter()
            .map(|v| Field {
                name: v.name().to_string(),
                data: Vec::with_capacity(mesh.total_zones() as usize),
            })
            .collect();

        for j in (0..nx2).rev() {
            for i in 0..nx1 {
                let p = Conserved::from(state.get_slice((i, j))).to_primitive(gamma_law_index)?;

                for (v, f) in variables.iter().zip(&mut fields) {
                    f.data.push(v.value(&p))
                }
            }
        }
        Ok(Self {
            iteration,
            time,
            nx1: nx1 as usize,
            nx2: nx2 as usize,
            fields,
        })
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}




/**
 * Writes each variable to its own delimited text file, one row of the grid
 * per line, and the iteration number and time of each snapshot to the
 * `iter_time` file.
 */
pub struct DelimitedWriter {
    separator: &'static str,
    iter_time: BufWriter<File>,
    fields: Vec<(OutputVariable, BufWriter<File>)>,
}

impl DelimitedWriter {
    pub fn create(directory: &Path, variables: &[OutputVariable], format: OutputFormat) -> Result<Self, Error> {
        let separator = match format {
            OutputFormat::Csv => ",",
            _ => " ",
        };
        let ext = format.extension();
        let open = |name: &str| -> Result<BufWriter<File>, Error> {
            Ok(BufWriter::new(File::create(directory.join(format!("{}.{}", name, ext)))?))
        };
        let fields = variables
            .iter()
            .map(|&v| -> Result<_, Error> { Ok((v, open(v.name())?)) })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Self { separator, iter_time: open("iter_time")?, fields })
    }
}

impl SnapshotWriter for DelimitedWriter {
    fn write(&mut self, snapshot: &Snapshot) -> Result<(), Error> {
        writeln!(self.iter_time, "{}{}{}", snapshot.iteration, self.separator, snapshot.time)?;

        for (variable, file) in &mut self.fields {
            if let Some(field) = snapshot.field(variable.name()) {
                for row in field.data.chunks(snapshot.nx1.max(1)) {
                    let line: Vec<String> = row.iter().map(|x| x.to_string()).collect();
                    writeln!(file, "{}", line.join(self.separator))?;
                }
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        self.iter_time.flush()?;

        for (_, file) in &mut self.fields {
            file.flush()?
        }
        Ok(())
    }
}




/**
 * Writes each snapshot to its own binary file, `iter_<n>.cbor` or
 * `iter_<n>.msgpack`.
 */
pub struct SerdeWriter {
    directory: PathBuf,
    format: OutputFormat,
}

impl SerdeWriter {
    pub fn new(directory: &Path, format: OutputFormat) -> Self {
        assert!(matches!(format, OutputFormat::Cbor | OutputFormat::MessagePack), "not a binary format");
        Self { directory: directory.to_path_buf(), format }
    }

    pub fn path_for(&self, iteration: u64) -> PathBuf {
        self.directory.join(format!("iter_{}.{}", iteration, self.format.extension()))
    }
}

impl SnapshotWriter for SerdeWriter {
    fn write(&mut self, snapshot: &Snapshot) -> Result<(), Error> {
        let mut file = BufWriter::new(File::create(self.path_for(snapshot.iteration))?);

        match self.format {
            OutputFormat::MessagePack => {
                rmp_serde::encode::write(&mut file, snapshot).map_err(|e| Error::Encode(e.to_string()))?
            }
            _ => {
                ciborium::ser::into_writer(snapshot, &mut file).map_err(|e| Error::Encode(format!("{:?}", e)))?
            }
        }
        file.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        Ok(())
    }
}




/**
 * Create the writer for one output format.
 */
pub fn writer_for(format: OutputFormat, directory: &Path, variables: &[OutputVariable]) -> Result<Box<dyn SnapshotWriter>, Error> {
    match format {
        OutputFormat::Text | OutputFormat::Csv => Ok(Box::new(DelimitedWriter::create(directory, variables, format)?)),
        OutputFormat::Cbor | OutputFormat::MessagePack => Ok(Box::new(SerdeWriter::new(directory, format))),
    }
}




/**
 * Saves the requested variables with each of the configured writers, on the
 * calling thread.
 */
pub struct DataSaver {
    variables: Vec<OutputVariable>,
    writers: Vec<Box<dyn SnapshotWriter>>,
}

impl DataSaver {
    pub fn new(variables: Vec<OutputVariable>, writers: Vec<Box<dyn SnapshotWriter>>) -> Self {
        Self { variables, writers }
    }

    /**
     * Create the output directory, and open a writer for each configured
     * format.
     */
    pub fn create(config: &OutputConfig) -> Result<Self, Error> {
        fs::create_dir_all(&config.directory)?;

        let writers = config.formats
            .iter()
            .map(|&format| writer_for(format, &config.directory, &config.variables))
            .collect::<Result<Vec<_>, Error>>()?;

        info!("writing {:?} as {:?} to {}", config.variables, config.formats, config.directory.display());
        Ok(Self::new(config.variables.clone(), writers))
    }

    /**
     * Move the writers onto a dedicated thread. Snapshots are still built on
     * the calling thread, so the state may be modified as soon as `save`
     * returns.
     */
    pub fn into_background(self) -> BackgroundSink {
        BackgroundSink::new(self.variables, self.writers)
    }
}

impl SnapshotSink for DataSaver {
    fn save(&mut self, state: &Patch, mesh: &Mesh, gamma_law_index: f64, iteration: u64, time: f64) -> Result<(), Error> {
        let snapshot = Snapshot::from_state(state, mesh, &self.variables, gamma_law_index, iteration, time)?;

        for writer in &mut self.writers {
            writer.write(&snapshot)?
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        for writer in &mut self.writers {
            writer.finish()?
        }
        Ok(())
    }
}




/**
 * A sink whose writers run on their own thread, fed through a channel. The
 * thread is joined when the sink is finished or dropped; `finish` returns
 * the first error the writers encountered.
 */
pub struct BackgroundSink {
    variables: Vec<OutputVariable>,
    sender: Option<Sender<Snapshot>>,
    handle: Option<thread::JoinHandle<Result<(), Error>>>,
}

impl BackgroundSink {
    pub fn new(variables: Vec<OutputVariable>, mut writers: Vec<Box<dyn SnapshotWriter>>) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded::<Snapshot>();

        let handle = thread::spawn(move || -> Result<(), Error> {
            for snapshot in receiver {
                for writer in &mut writers {
                    writer.write(&snapshot)?
                }
            }
            for writer in &mut writers {
                writer.finish()?
            }
            Ok(())
        });

        Self {
            variables,
            sender: Some(sender),
            handle: Some(handle),
        }
    }

    fn join(&mut self) -> Result<(), Error> {
        self.sender.take();

        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| Error::WriterThread)?,
            None => Ok(()),
        }
    }
}

impl SnapshotSink for BackgroundSink {
    fn save(&mut self, state: &Patch, mesh: &Mesh, gamma_law_index: f64, iteration: u64, time: f64) -> Result<(), Error> {
        let snapshot = Snapshot::from_state(state, mesh, &self.variables, gamma_law_index, iteration, time)?;

        let sent = match &self.sender {
            Some(sender) => sender.send(snapshot).is_ok(),
            None => false,
        };
        if !sent {
            self.join()?;
            return Err(Error::WriterThread)
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        self.join()
    }
}

impl Drop for BackgroundSink {
    fn drop(&mut self) {
        if let Err(e) = self.join() {
            error!("{}", e)
        }
    }
}

// Adapters layer: concrete implementations of the domain ports for external runtimes.

pub mod docker;
pub mod python;

pub use docker::DockerCli;
pub use python::PythonImporter;

// Domain layer: transient models and ports (interfaces) to external runtimes.

pub mod model;
pub mod ports;

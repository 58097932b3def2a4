// Domain layer: core models and ports. No file system access here.

pub mod model;
pub mod ports;

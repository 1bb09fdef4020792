pub mod cli;
pub mod descriptor;
pub mod mapping;
pub mod model;
pub mod remap;

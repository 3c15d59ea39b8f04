pub mod error;
pub mod experiment;
pub mod monitor;
pub mod net;
pub mod path;
pub mod sim;
pub mod topo;
pub mod workload;

#[cfg(test)]
mod test;

mod experiment;
mod simulator;
mod traffic;

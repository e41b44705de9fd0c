pub mod ai;
pub mod calculators;
pub mod commands;
pub mod engine;
pub mod input;
pub mod state;

#[cfg(test)]
mod tests;

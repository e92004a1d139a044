pub mod heuristic;

pub use heuristic::HeuristicSelector;

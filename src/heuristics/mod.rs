//! JSON-lines trail of heuristic scoring decisions

pub mod logger;

pub use logger::ScoreLogger;

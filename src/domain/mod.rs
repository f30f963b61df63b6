pub mod endpoint;
pub mod outcome;
pub mod submission;

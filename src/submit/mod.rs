pub mod client;
pub mod controller;
pub mod response;
pub mod vars;

pub use client::{CalculateClient, CalculateRequest, Evaluator};
pub use controller::{Calculation, SubmissionController, SubmissionState, SubmitOutcome, Waker};
pub use response::{GeneratedResult, ResponseEntry};
pub use vars::VariableDictionary;

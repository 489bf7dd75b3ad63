//! Single-event prediction: form model and the submit/result state machine.

pub mod flow;
pub mod form;

pub use flow::{ErrorCard, FlowState, PredictionFlow, ResultCard};
pub use form::{PredictionForm, now_as_local_input_value};

// Services module - protocol logic with no HTTP-handler concerns

pub mod quiz_picker;
pub mod token_verifier;

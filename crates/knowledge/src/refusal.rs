//! Fixed refusal messages.

/// Returned when a question is outside the office domain.
pub const OUT_OF_SCOPE: &str = "I can only answer questions related to office operations and policies. \
Please ask me about office facilities, procedures, equipment, or related topics.";

/// Returned when no relevant, grounded answer can be given.
pub const NO_CONTEXT: &str = "I don't have information about this in the current office documentation. \
The topic may not be covered in the documents that have been loaded.";

pub mod panels;
pub mod plot;
pub mod tables;

/// Shown instead of the yearly table when the selection matches nothing.
pub const NO_DATA_ADVISORY: &str =
    "Engin gögn fundust fyrir valið. Vinsamlegast prófaðu aðra samsetningu af síum.";

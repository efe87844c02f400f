pub mod extract;
pub mod filesystem;

pub use extract::{extract_code_blocks, CodeBlocks};
pub use filesystem::ProjectWriter;

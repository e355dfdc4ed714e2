//! Default pipeline stages.
//!
//! The standard document processing pipeline consists of:
//!
//! 1. **ParseStage** - Lex and parse the source into a raw tree
//! 2. **NormalizeStage** - Nest indentation blocks
//! 3. **ValidateStage** - Collect diagnostics, fail on errors
//! 4. **EmitStage** - Generate HTML, source map, CSS and JS
//! 5. **WriteStage** - Write the artifacts to the output directory

mod emit;
mod normalize;
mod parse;
mod validate;
mod write;

pub use emit::EmitStage;
pub use normalize::NormalizeStage;
pub use parse::ParseStage;
pub use validate::ValidateStage;
pub use write::{WriteStage, inject_live_reload};

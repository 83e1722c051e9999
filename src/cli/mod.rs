mod args;
mod picker;

pub use args::{Args, OutputFormat};
pub use picker::TermPicker;

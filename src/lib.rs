pub mod camera;
pub mod error;
pub mod features;
pub mod grid;
pub mod io;
pub mod replay;
pub mod rerun_viewer;
pub mod viewer;
pub mod visualization;

pub use error::{Error, Result};

//! Report writers

pub mod latex;

pub use latex::{render_latex, write_latex_file, MetricTable};

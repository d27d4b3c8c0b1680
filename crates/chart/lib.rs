pub mod barh;
pub mod error;
pub mod figure;
pub mod report;
pub mod stacked;
pub mod style;

pub use error::{ChartError, Result};
pub use figure::{Figure, Render};
pub use report::Settings;
pub use stacked::StackedLayout;
pub use style::{Style, StyleCycle};

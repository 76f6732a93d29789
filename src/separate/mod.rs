//! Vocal/accompaniment separation.

mod backend;
mod layout;
mod separator;
mod stems;

pub use backend::{SeparationBackend, SpleeterBackend};
pub use layout::StemLayout;
pub use separator::StemSeparator;
pub use stems::{Stem, StemFiles, StemSet};

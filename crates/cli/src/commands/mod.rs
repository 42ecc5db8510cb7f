pub mod minimize;
pub mod overlap;
pub mod recommend;
pub mod util;

pub use minimize::*;
pub use overlap::*;
pub use recommend::*;
pub use util::*;

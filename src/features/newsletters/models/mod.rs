mod newsletter;
mod section;

pub use newsletter::Newsletter;
pub use section::{Section, SectionImage};

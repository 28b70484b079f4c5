mod public;
mod secret;

pub use self::{public::*, secret::*};

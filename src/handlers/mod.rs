mod admin;
mod link;
mod redirect;

pub use admin::*;
pub use link::*;
pub use redirect::*;

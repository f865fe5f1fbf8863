//! Validator declarations.
//!
//! - `token`: lexer for declaration source
//! - `loader`: reads declaration source into [`Descriptor`]s
//! - `descriptor`: the descriptor and its argument range
//! - `registry`: alias lookup with ordered overloads

mod descriptor;
mod loader;
mod registry;
mod token;

pub use descriptor::{ArgRange, Descriptor};
pub use loader::load;
pub use registry::{BUILTIN_DECLS, Registry};

//! The symbolic script hierarchy at the codec boundary.

pub mod model;
pub mod random;
pub mod roles;

pub use model::{role_name, significance_name, step_name, Role, Script, Significance, Step, Synset};
pub use random::{RandomScriptBuilder, RandomScriptConfig};
pub use roles::RoleLabel;

//! # devyard-spec
//!
//! Raw spec records as authored by users, and the collection that holds them.
//!
//! Handles:
//! - **Records**: typed `App`, `Lib`, `Service`, and `Bundle` declarations.
//! - **Set**: the four name-keyed collections and edge lookup by kind.
//! - **Store**: loading a specs directory of YAML files.
//! - **Validator**: name uniqueness, image/build exclusivity, and
//!   undeclared hard references.

pub mod records;
pub mod set;
pub mod store;
pub mod validator;

pub use records::{App, Bundle, Commands, ConditionalLinks, Depends, ImageSource, Lib, LibDepends, Service};
pub use set::{DependencyEdges, SpecSet};

//! Generic substitution: applying substitutions, inferring them from call
//! arguments, and the least upper bound of a set of types.

mod inference;
mod lub;
mod solver;
mod substitution;

pub use self::substitution::TypeSubstitution;

//! Stable integer handles into the analysis arenas.

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub(crate) fn from_index(index: usize) -> Self {
                Self(u32::try_from(index).expect("arena overflow"))
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id!(
    /// A declared program entity in the symbol arena.
    SymbolId
);
arena_id!(
    /// A type in the type arena. Class, array, wildcard and parameterized
    /// types are interned, so equal types share one id.
    TypeId
);
arena_id!(ScopeId);
arena_id!(
    /// A lexical environment snapshot.
    EnvId
);
arena_id!(
    /// A node of the consumed syntax tree.
    NodeId
);

//! Dense integer identifiers used throughout the IR.
//!
//! Every IR-internal cross-reference (a `PointerType`'s base type, an
//! `Operation`'s operand, a `Goto`'s target Builder, ...) is stored as one of
//! these newtypes rather than as a pointer. Each id indexes a per-kind table
//! owned by the [`crate::ir::IR`] that allocated it; ids from one `IR` are
//! meaningless against another `IR`'s tables. This mirrors the `StringId` /
//! `HeapId` newtype-over-index convention used throughout the teacher crate
//! for exactly the same reason: stable, `Copy`, comparison- and hash-friendly
//! identity without carrying a borrow.

use std::fmt;

macro_rules! ir_object_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Constructs an id from a raw dense index.
            ///
            /// Only [`crate::ir::IR`]'s allocators should call this; client
            /// code receives ids back from construction APIs instead.
            #[must_use]
            pub(crate) fn from_index(index: usize) -> Self {
                Self(u32::try_from(index).expect("IR object count exceeded u32::MAX"))
            }

            /// Returns the raw index, for indexing into the owning IR's tables.
            #[must_use]
            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

ir_object_id!(
    /// Identifies a [`crate::types::Type`] within one IR.
    TypeId
);
ir_object_id!(
    /// Identifies a [`crate::literal::Literal`] within one IR.
    LiteralId
);
ir_object_id!(
    /// Identifies a [`crate::symbol::Symbol`] within one IR.
    SymbolId
);
ir_object_id!(
    /// Identifies a [`crate::value::Value`] within one IR.
    ValueId
);
ir_object_id!(
    /// Identifies an [`crate::operation::Operation`] within one IR.
    OperationId
);
ir_object_id!(
    /// Identifies a [`crate::builder::Builder`] within one IR.
    BuilderId
);
ir_object_id!(
    /// Identifies a [`crate::context::Context`] within one IR.
    ContextId
);
ir_object_id!(
    /// Identifies a [`crate::scope::Scope`] within one IR.
    ScopeId
);

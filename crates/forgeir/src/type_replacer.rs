//! `TypeReplacer`: a type-driven IR rewrite pass (`spec.md` §9).
//!
//! Registers a mapping from an original `TypeId` to one or more replacement
//! types. A 1-to-1 entry is an ordinary substitution (useful for lowering a
//! high-level type to its machine representation); a 1-to-many entry
//! "explodes" a type — most commonly a `StructType` parameter that the target
//! calling convention wants passed as separate scalar arguments instead of
//! one aggregate. Exploding a function's parameter list shifts every later
//! parameter's ordinal index, so the parameter Symbols downstream of the
//! explosion point need renumbering; `renumber_parameters_from` does that.

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::context::Context;
use crate::error::CompilationException;
use crate::ids::{BuilderId, TypeId, ValueId};
use crate::ir::IR;
use crate::operation::Operation;
use crate::symbol::{Symbol, SymbolClass};
use crate::types::TypeShape;

/// Maps an original `Value` of an exploded type to the ordered tuple of
/// Values it was rebuilt into, one per field (`spec.md` §4.8). Populated by
/// [`crate::ir::IR::explode_value`] as `IR::rewrite_with_type_replacer` walks
/// a Builder's operations.
pub type ExplodedValues = AHashMap<ValueId, SmallVec<[ValueId; 2]>>;

/// Rewrites one Operation that references an exploded Value into an
/// equivalent sequence against that Value's replacement tuple (`spec.md`
/// §4.8's "Operations that consume exploded values are replaced by
/// equivalent sequences").
///
/// Registered per `ActionId` on an `IR` via `IR::register_expand_hook`. An
/// Operation whose operands or results touch an exploded Value, but whose
/// action has no registered hook, makes `IR::rewrite_with_type_replacer` fail
/// outright — silently replaying such an Operation unchanged would leave a
/// dangling reference to the exploded (and now-absent) original type.
pub trait ExpandHook: Send + Sync {
    /// `op` is the original, not-yet-replayed Operation; implementors append
    /// whatever replacement Operation(s) belong in `target_builder`. `exploded`
    /// doubles as the rewrite's value-renaming map: look up any operand of
    /// `op` in it (falling back to the operand itself if absent) to find
    /// where that Value landed in the rewritten stream, and index into a
    /// multi-element entry to reach a particular field. An implementor whose
    /// own *result* is of an exploded type is responsible for calling
    /// `ir.explode_value` itself and recording the outcome back into
    /// `exploded` for whatever Operation consumes that result next.
    fn expand(
        &self,
        ir: &mut IR<'_>,
        target_builder: BuilderId,
        op: &Operation,
        replacer: &TypeReplacer,
        exploded: &mut ExplodedValues,
    ) -> Result<(), CompilationException>;
}

/// A registered set of type substitutions, applied by whatever pass
/// constructs the replacement IR (`spec.md` §4.10's `Pass` trait).
#[derive(Default)]
pub struct TypeReplacer {
    replacements: AHashMap<TypeId, SmallVec<[TypeId; 2]>>,
}

impl TypeReplacer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `original -> replacements`. An empty `replacements` is
    /// rejected: every type must map to at least itself or something.
    pub fn register(&mut self, original: TypeId, replacements: impl IntoIterator<Item = TypeId>) {
        let replacements: SmallVec<[TypeId; 2]> = replacements.into_iter().collect();
        assert!(!replacements.is_empty(), "a TypeReplacer entry must name at least one replacement type");
        self.replacements.insert(original, replacements);
    }

    #[must_use]
    pub fn lookup(&self, original: TypeId) -> Option<&[TypeId]> {
        self.replacements.get(&original).map(SmallVec::as_slice)
    }

    /// True if `original` explodes into more than one replacement type.
    #[must_use]
    pub fn is_explosive(&self, original: TypeId) -> bool {
        self.replacements.get(&original).is_some_and(|r| r.len() > 1)
    }

    /// Expands an ordered type list, substituting every registered type with
    /// its (possibly multi-type) replacement and passing through types with
    /// no registered entry unchanged.
    #[must_use]
    pub fn explode_types(&self, types: &[TypeId]) -> Vec<TypeId> {
        let mut out = Vec::with_capacity(types.len());
        for &ty in types {
            match self.lookup(ty) {
                Some(replacements) => out.extend_from_slice(replacements),
                None => out.push(ty),
            }
        }
        out
    }

    /// Explodes `param_types` and returns, alongside the exploded list, the
    /// ordinal each original parameter's *first* replacement now starts at —
    /// the input to [`renumber_parameters_from`].
    #[must_use]
    pub fn explode_parameter_types(&self, param_types: &[TypeId]) -> (Vec<TypeId>, Vec<u32>) {
        let mut exploded = Vec::with_capacity(param_types.len());
        let mut starts = Vec::with_capacity(param_types.len());
        for &ty in param_types {
            starts.push(u32::try_from(exploded.len()).expect("parameter count exceeded u32::MAX"));
            match self.lookup(ty) {
                Some(replacements) => exploded.extend_from_slice(replacements),
                None => exploded.push(ty),
            }
        }
        (exploded, starts)
    }

    /// Explodes a `FunctionType`'s parameter list in place within `declare`,
    /// a closure that declares the rebuilt function type given the exploded
    /// parameter type list. Returns the new function `TypeId` plus the
    /// original-index -> new-starting-index table for parameter renumbering.
    pub fn explode_function_type(
        &self,
        shape: &TypeShape<'_>,
        mut declare: impl FnMut(TypeId, &[TypeId]) -> TypeId,
    ) -> Option<(TypeId, Vec<u32>)> {
        let TypeShape::Function { return_type, param_types } = shape else {
            return None;
        };
        let (exploded, starts) = self.explode_parameter_types(param_types);
        Some((declare(*return_type, &exploded), starts))
    }
}

/// Renumbers every parameter Symbol local to `context` using `starts`
/// (`starts[i]` is the new ordinal the `i`-th original parameter's first
/// replacement now occupies). A parameter whose type did not explode simply
/// moves to its single new ordinal.
pub fn renumber_parameters(symbols: &mut [Symbol<'_>], context: &Context, starts: &[u32]) {
    for symbol in symbols.iter_mut() {
        if let SymbolClass::Parameter { index } = symbol.class() {
            let original_index = *index as usize;
            if context.lookup_local(symbol.name()).is_some() {
                if let Some(&new_start) = starts.get(original_index) {
                    symbol.set_parameter_index(new_start);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::ids::SymbolId;

    #[test]
    fn a_struct_parameter_explodes_into_its_field_types() {
        let mut replacer = TypeReplacer::new();
        let pair_ty = TypeId::from_index(0);
        let i32_ty = TypeId::from_index(1);
        let i64_ty = TypeId::from_index(2);
        replacer.register(pair_ty, [i32_ty, i64_ty]);

        let trailing = TypeId::from_index(4);
        let (exploded, starts) = replacer.explode_parameter_types(&[pair_ty, trailing]);

        assert_eq!(exploded, vec![i32_ty, i64_ty, trailing]);
        assert_eq!(starts, vec![0, 2]);
        assert!(replacer.is_explosive(pair_ty));
        assert!(!replacer.is_explosive(trailing));
    }

    #[test]
    fn unregistered_types_pass_through_unchanged() {
        let replacer = TypeReplacer::new();
        let a = TypeId::from_index(0);
        let b = TypeId::from_index(1);
        assert_eq!(replacer.explode_types(&[a, b]), vec![a, b]);
    }

    #[test]
    fn renumbering_shifts_parameters_after_the_explosion_point() {
        let arena = Arena::new();
        let ty = TypeId::from_index(0);
        let mut context = Context::new(crate::ids::ContextId::from_index(0), None);
        let mut symbols = vec![
            Symbol::new(SymbolId::from_index(0), &arena, "pair", ty, SymbolClass::Parameter { index: 0 }),
            Symbol::new(SymbolId::from_index(1), &arena, "trailing", ty, SymbolClass::Parameter { index: 1 }),
        ];
        context.define_symbol("pair", symbols[0].id());
        context.define_symbol("trailing", symbols[1].id());

        let starts = vec![0, 2];
        renumber_parameters(&mut symbols, &context, &starts);

        match symbols[0].class() {
            SymbolClass::Parameter { index } => assert_eq!(*index, 0),
            _ => panic!("expected parameter"),
        }
        match symbols[1].class() {
            SymbolClass::Parameter { index } => assert_eq!(*index, 2),
            _ => panic!("expected parameter"),
        }
    }
}

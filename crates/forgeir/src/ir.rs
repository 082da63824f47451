//! `IR`: the per-kind dense tables that replace the source's arena of
//! pointer-linked objects (`spec.md` §3, §9).
//!
//! `IR<'a>` borrows an [`Arena`] owned by its caller (typically a
//! [`crate::compilation::Compilation`]) rather than owning one itself —
//! storing both an allocator and references into it in the same struct is
//! the one shape Rust won't let you build safely, so the arena's lifetime is
//! threaded in from outside instead, the same way `rustc`'s `TyCtxt<'tcx>`
//! borrows its arena rather than owning it.

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::arena::Arena;
use crate::builder::{Builder, BuilderParent};
use crate::clone_map::IRCloneMap;
use crate::context::Context;
use crate::error::{CompilationException, CompilerReturnCode};
use crate::ids::{BuilderId, ContextId, LiteralId, OperationId, ScopeId, SymbolId, TypeId, ValueId};
use crate::literal::{Literal, LiteralDictionary};
use crate::operation::{ActionId, CheckerChain, Operation, ProposedOperation};
use crate::scope::Scope;
use crate::symbol::{Symbol, SymbolClass};
use crate::type_replacer::{ExpandHook, ExplodedValues, TypeReplacer};
use crate::types::{FieldSlot, PrimitiveKind, Type, TypeDictionary, TypeShape};
use crate::value::Value;

/// Owns every IR object table for one compilation's worth of construction.
pub struct IR<'a> {
    arena: &'a Arena,
    types: Vec<Type<'a>>,
    literals: Vec<Literal<'a>>,
    symbols: Vec<Symbol<'a>>,
    values: Vec<Value<'a>>,
    operations: Vec<Operation>,
    builders: Vec<Builder>,
    contexts: Vec<Context>,
    scopes: Vec<Scope>,
    /// The IR-wide prototype dictionary; Contexts may overlay their own names
    /// on top without mutating this one (`spec.md` §4.7).
    type_dictionary: TypeDictionary,
    literal_dictionary: LiteralDictionary,
    /// Per-action checker chains (`spec.md` §4.4). An action with no
    /// registered chain is unchecked, not rejected — extensions opt an
    /// action into validation by registering at least one checker for it.
    checkers: AHashMap<ActionId, CheckerChain>,
    /// Per-action IR-rewrite hooks consulted by `rewrite_with_type_replacer`
    /// (`spec.md` §4.8). Unlike `checkers`, this is at most one hook per
    /// action rather than a chain: an action either has a defined rewrite or
    /// it doesn't.
    expand_hooks: AHashMap<ActionId, Box<dyn ExpandHook>>,
    root_scope: ScopeId,
    root_context: ContextId,
}

impl<'a> IR<'a> {
    #[must_use]
    pub fn new(arena: &'a Arena) -> Self {
        let mut scopes = Vec::new();
        let root_scope = ScopeId::from_index(0);
        scopes.push(Scope::new(root_scope, None));

        let mut contexts = Vec::new();
        let root_context = ContextId::from_index(0);
        contexts.push(Context::new(root_context, None));

        Self {
            arena,
            types: Vec::new(),
            literals: Vec::new(),
            symbols: Vec::new(),
            values: Vec::new(),
            operations: Vec::new(),
            builders: Vec::new(),
            contexts,
            scopes,
            type_dictionary: TypeDictionary::new(),
            literal_dictionary: LiteralDictionary::new(),
            checkers: AHashMap::default(),
            expand_hooks: AHashMap::default(),
            root_scope,
            root_context,
        }
    }

    /// Registers `checker` to run before every checker already installed for
    /// `action` (LIFO — the most recently registered checker runs first).
    pub fn register_checker(&mut self, action: ActionId, checker: Box<dyn crate::operation::Checker>) {
        self.checkers.entry(action).or_insert_with(CheckerChain::new).push(checker);
    }

    /// Registers `hook` as the single IR-rewrite rule for `action`, used by
    /// `rewrite_with_type_replacer`. Registering again for the same action
    /// replaces whatever hook was registered before.
    pub fn register_expand_hook(&mut self, action: ActionId, hook: Box<dyn ExpandHook>) {
        self.expand_hooks.insert(action, hook);
    }

    #[must_use]
    pub fn arena(&self) -> &'a Arena {
        self.arena
    }

    #[must_use]
    pub fn root_scope(&self) -> ScopeId {
        self.root_scope
    }

    #[must_use]
    pub fn root_context(&self) -> ContextId {
        self.root_context
    }

    #[must_use]
    pub fn type_dictionary(&self) -> &TypeDictionary {
        &self.type_dictionary
    }

    // -- accessors --------------------------------------------------------

    #[must_use]
    pub fn ty(&self, id: TypeId) -> &Type<'a> {
        &self.types[id.index()]
    }

    #[must_use]
    pub fn literal(&self, id: LiteralId) -> &Literal<'a> {
        &self.literals[id.index()]
    }

    #[must_use]
    pub fn symbol(&self, id: SymbolId) -> &Symbol<'a> {
        &self.symbols[id.index()]
    }

    #[must_use]
    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol<'a> {
        &mut self.symbols[id.index()]
    }

    #[must_use]
    pub fn value(&self, id: ValueId) -> &Value<'a> {
        &self.values[id.index()]
    }

    #[must_use]
    pub fn operation(&self, id: OperationId) -> &Operation {
        &self.operations[id.index()]
    }

    #[must_use]
    pub fn operation_mut(&mut self, id: OperationId) -> &mut Operation {
        &mut self.operations[id.index()]
    }

    #[must_use]
    pub fn builder(&self, id: BuilderId) -> &Builder {
        &self.builders[id.index()]
    }

    #[must_use]
    pub fn builder_mut(&mut self, id: BuilderId) -> &mut Builder {
        &mut self.builders[id.index()]
    }

    #[must_use]
    pub fn context(&self, id: ContextId) -> &Context {
        &self.contexts[id.index()]
    }

    #[must_use]
    pub fn context_mut(&mut self, id: ContextId) -> &mut Context {
        &mut self.contexts[id.index()]
    }

    #[must_use]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    #[must_use]
    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    #[must_use]
    pub fn resolve_symbol(&self, start: ContextId, name: &str) -> Option<SymbolId> {
        crate::context::resolve_symbol(&self.contexts, start, name)
    }

    #[must_use]
    pub fn resolve_entry_point(&self, start: ContextId, name: &str) -> Option<BuilderId> {
        crate::context::resolve_entry_point(&self.contexts, start, name)
    }

    // -- type construction --------------------------------------------------

    pub fn declare_primitive_type(&mut self, owning_extension: &'static str, prim: PrimitiveKind) -> TypeId {
        if let Some(existing) = self.type_dictionary.lookup_local(prim.name()) {
            return existing;
        }
        let id = TypeId::from_index(self.types.len());
        self.types.push(Type::new_primitive(id, self.arena, owning_extension, prim));
        self.type_dictionary.register(prim.name(), id);
        id
    }

    pub fn declare_pointer_type(&mut self, owning_extension: &'static str, base: TypeId) -> TypeId {
        let base_name = self.ty(base).name().to_string();
        let structural_name = crate::types::pointer_structural_name(&base_name);
        if let Some(existing) = self.type_dictionary.lookup_local(&structural_name) {
            return existing;
        }
        let id = TypeId::from_index(self.types.len());
        self.types.push(Type::new_pointer(id, self.arena, owning_extension, base, &base_name));
        self.type_dictionary.register(&structural_name, id);
        id
    }

    /// Declares a `StructType` with the given ordered `(name, field type)` pairs.
    ///
    /// Packs fields back-to-back in declaration order; callers that need a
    /// different layout policy can overlay one on top since `FieldSlot`'s
    /// `offset_bits` is plain data.
    pub fn declare_struct_type(
        &mut self,
        owning_extension: &'static str,
        name: &str,
        field_names_and_types: &[(&str, TypeId)],
    ) -> TypeId {
        let mut offset_bits = 0u32;
        let mut field_names = Vec::with_capacity(field_names_and_types.len());
        let mut fields = Vec::with_capacity(field_names_and_types.len());
        for (field_name, field_type) in field_names_and_types {
            field_names.push(self.arena.intern_str(field_name));
            fields.push(FieldSlot { field_type: *field_type, offset_bits });
            offset_bits += self.ty(*field_type).size_in_bits();
        }
        let id = TypeId::from_index(self.types.len());
        self.types.push(Type::new_struct(id, self.arena, owning_extension, name, field_names, fields, offset_bits));
        self.type_dictionary.register(name, id);
        id
    }

    /// Declares the `FieldType` for one field of an already-declared struct.
    pub fn declare_field_type(
        &mut self,
        owning_extension: &'static str,
        owner: TypeId,
        field_index: usize,
    ) -> TypeId {
        let (field_name, field_type, size_in_bits) = match self.ty(owner).shape() {
            TypeShape::Struct { field_names, fields } => {
                (field_names[field_index].to_string(), fields[field_index].field_type, self.ty(fields[field_index].field_type).size_in_bits())
            }
            _ => panic!("declare_field_type called on a non-struct Type"),
        };
        let structural_name = format!("{}.{field_name}", self.ty(owner).name());
        if let Some(existing) = self.type_dictionary.lookup_local(&structural_name) {
            return existing;
        }
        let id = TypeId::from_index(self.types.len());
        self.types.push(Type::new_field(id, self.arena, owning_extension, &structural_name, owner, field_type, size_in_bits));
        self.type_dictionary.register(&structural_name, id);
        id
    }

    pub fn declare_function_type(
        &mut self,
        owning_extension: &'static str,
        return_type: TypeId,
        param_types: &[TypeId],
    ) -> TypeId {
        let structural_name = crate::types::function_structural_name(return_type, param_types);
        if let Some(existing) = self.type_dictionary.lookup_local(&structural_name) {
            return existing;
        }
        let id = TypeId::from_index(self.types.len());
        self.types.push(Type::new_function(id, self.arena, owning_extension, &structural_name, return_type, param_types.to_vec()));
        self.type_dictionary.register(&structural_name, id);
        id
    }

    /// Renumbers every parameter Symbol local to `context`, per a
    /// [`crate::type_replacer::TypeReplacer`] explosion's ordinal table
    /// (`spec.md` §4.8's "Parameters renumber as they are expanded").
    pub fn renumber_parameters(&mut self, context: ContextId, starts: &[u32]) {
        crate::type_replacer::renumber_parameters(&mut self.symbols, &self.contexts[context.index()], starts);
    }

    /// Explodes `value` into one freshly-created Value per field of its
    /// (registered, multi-way) replacement type, each named by concatenating
    /// `value`'s own name (or a positional fallback) with `.` and the field
    /// name (`spec.md` §4.8). Returns `[value]` unchanged if `replacer` has no
    /// multi-way entry for its type.
    pub fn explode_value(&mut self, value: ValueId, replacer: &TypeReplacer) -> SmallVec<[ValueId; 2]> {
        let original_ty = self.value(value).ty();
        let Some(replacement_types) = replacer.lookup(original_ty).filter(|r| r.len() > 1) else {
            return SmallVec::from_slice(&[value]);
        };
        let replacement_types = replacement_types.to_vec();
        let base_name = self.value(value).name().map(str::to_string).unwrap_or_else(|| format!("v{}", value.index()));
        let field_names: Vec<String> = match self.ty(original_ty).shape() {
            TypeShape::Struct { field_names, .. } => field_names.iter().map(ToString::to_string).collect(),
            _ => (0..replacement_types.len()).map(|i| i.to_string()).collect(),
        };
        let defining_op = self.value(value).defining_op();
        let mut exploded = SmallVec::new();
        for (field_name, field_ty) in field_names.iter().zip(replacement_types.iter()) {
            let id = ValueId::from_index(self.values.len());
            let full_name = format!("{base_name}.{field_name}");
            self.values.push(Value::new(id, *field_ty, defining_op).with_name(self.arena, &full_name));
            exploded.push(id);
        }
        exploded
    }

    /// Rewrites `source_builder`'s operations into `target_builder` under
    /// `replacer` (`spec.md` §4.8). Every Value whose type explodes into more
    /// than one replacement is rebuilt via `explode_value` the first time it
    /// is encountered as an operand; an Operation that touches an exploded
    /// Value (as an operand, or as one of its own results) is handed to its
    /// registered `ExpandHook` instead of being replayed verbatim — an
    /// Operation with no hook registered for its action is a construction
    /// error, since replaying it unchanged would leave a dangling reference
    /// to the now-exploded original type. Operations untouched by any
    /// explosion are replayed as-is, with operands remapped to whatever their
    /// producing Operation was replayed as.
    ///
    /// Returns the full exploded-value map accumulated over the rewrite.
    pub fn rewrite_with_type_replacer(
        &mut self,
        source_builder: BuilderId,
        target_builder: BuilderId,
        replacer: &TypeReplacer,
    ) -> Result<ExplodedValues, CompilationException> {
        // `exploded` doubles as the rewrite's value-renaming map: a struct
        // Value that explodes maps to its multi-element field tuple, while an
        // ordinary Value that simply gets replayed into `target_builder` maps
        // to a single-element tuple holding its replayed id. Hooks only ever
        // need to consult this one map to find where any operand of `op`
        // landed in the rewritten stream.
        let mut exploded: ExplodedValues = AHashMap::default();
        let source_ops: Vec<OperationId> = self.builder(source_builder).operations().to_vec();

        for op_id in source_ops {
            let op = self.operation(op_id).clone();

            for &operand in op.operands() {
                if !exploded.contains_key(&operand) && replacer.is_explosive(self.value(operand).ty()) {
                    let parts = self.explode_value(operand, replacer);
                    exploded.insert(operand, parts);
                }
            }
            let result_explodes = op.results().iter().any(|&r| replacer.is_explosive(self.value(r).ty()));
            let touches_exploded =
                result_explodes || op.operands().iter().any(|o| exploded.get(o).is_some_and(|v| v.len() > 1));

            if touches_exploded {
                let Some(hook) = self.expand_hooks.remove(&op.action()) else {
                    return Err(CompilationException::new(
                        CompilerReturnCode::FAILED,
                        format!(
                            "no ExpandHook registered for action '{}', which references an exploded type",
                            op.action().name()
                        ),
                    ));
                };
                let result = hook.expand(self, target_builder, &op, replacer, &mut exploded);
                self.expand_hooks.insert(op.action(), hook);
                result?;
            } else {
                let remapped_operands: SmallVec<[ValueId; 2]> =
                    op.operands().iter().map(|o| exploded.get(o).map_or(*o, |v| v[0])).collect();
                let result_types: Vec<TypeId> = op.results().iter().map(|&r| self.value(r).ty()).collect();
                let new_op = self.append_operation(
                    target_builder,
                    op.action(),
                    op.owning_extension(),
                    remapped_operands,
                    &result_types,
                    op.type_operands().iter().copied().collect(),
                    op.literal_operands().iter().copied().collect(),
                    op.symbol_operands().iter().copied().collect(),
                    op.bound_builders().iter().copied().collect(),
                    op.targets().iter().copied().collect(),
                    false,
                )?;
                for (&old_result, &new_result) in op.results().iter().zip(self.operation(new_op).results()) {
                    exploded.insert(old_result, SmallVec::from_slice(&[new_result]));
                }
            }
        }

        let source_reaches_end = self.builder(source_builder).control_reaches_end();
        self.builder_mut(target_builder).set_control_reaches_end(source_reaches_end);
        Ok(exploded)
    }

    // -- literal/symbol/value construction ----------------------------------

    pub fn create_literal(&mut self, ty: TypeId, bytes: &[u8]) -> LiteralId {
        if let Some(existing) = self.literal_dictionary.lookup_local(ty, bytes) {
            return existing;
        }
        let id = LiteralId::from_index(self.literals.len());
        self.literals.push(Literal::new(id, self.arena, ty, bytes));
        self.literal_dictionary.register(ty, bytes, id);
        id
    }

    pub fn create_symbol(&mut self, context: ContextId, name: &str, ty: TypeId, class: SymbolClass) -> SymbolId {
        let id = SymbolId::from_index(self.symbols.len());
        self.symbols.push(Symbol::new(id, self.arena, name, ty, class));
        self.context_mut(context).define_symbol(name, id);
        id
    }

    pub fn new_value(&mut self, ty: TypeId, defining_op: OperationId) -> ValueId {
        let id = ValueId::from_index(self.values.len());
        self.values.push(Value::new(id, ty, defining_op));
        id
    }

    // -- builder/context/scope construction ----------------------------------

    pub fn new_builder(&mut self, parent: BuilderParent) -> BuilderId {
        let id = BuilderId::from_index(self.builders.len());
        self.builders.push(Builder::new(id, parent));
        id
    }

    pub fn new_context(&mut self, parent: Option<ContextId>) -> ContextId {
        let id = ContextId::from_index(self.contexts.len());
        self.contexts.push(Context::new(id, parent));
        id
    }

    pub fn new_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId::from_index(self.scopes.len());
        self.scopes.push(Scope::new(id, parent));
        if let Some(parent_id) = parent {
            self.scope_mut(parent_id).add_child(id);
        }
        id
    }

    /// Appends a freshly-built Operation to `builder`, updating the
    /// Builder's own operation list and `control_reaches_end` flag in step.
    ///
    /// If a checker chain is registered for `action`, it is run against the
    /// proposed operands first; a rejection leaves the IR untouched.
    pub fn append_operation(
        &mut self,
        builder: BuilderId,
        action: ActionId,
        owning_extension: &'static str,
        operands: SmallVec<[ValueId; 2]>,
        result_types: &[TypeId],
        type_operands: SmallVec<[TypeId; 1]>,
        literal_operands: SmallVec<[LiteralId; 1]>,
        symbol_operands: SmallVec<[SymbolId; 1]>,
        bound_builders: SmallVec<[BuilderId; 2]>,
        targets: SmallVec<[BuilderId; 2]>,
        is_terminator: bool,
    ) -> Result<OperationId, CompilationException> {
        if let Some(chain) = self.checkers.get(&action) {
            let operand_type_names: Vec<&str> = operands.iter().map(|&v| self.ty(self.value(v).ty()).name()).collect();
            let proposal = ProposedOperation { action, operand_types: &operand_type_names, operands: &operands };
            chain.validate(&proposal)?;
        }

        let op_id = OperationId::from_index(self.operations.len());
        let mut results = SmallVec::<[ValueId; 1]>::new();
        for &ty in result_types {
            results.push(self.new_value(ty, op_id));
        }
        let op = Operation::new(
            op_id,
            action,
            owning_extension,
            builder,
            operands,
            results,
            type_operands,
            literal_operands,
            symbol_operands,
            bound_builders,
            targets,
        );
        self.operations.push(op);
        self.builder_mut(builder).append(op_id, is_terminator);
        Ok(op_id)
    }

    // -- merging --------------------------------------------------------------

    /// Appends every table of `other` onto `self`'s tables, remapping all
    /// internal ids by the offsets each kind needed. Returns the map so the
    /// caller can translate any externally-held id (e.g. "the callee's entry
    /// Builder") into the merged numbering.
    ///
    /// There's no cycle-ordering concern here (a struct field type pointing
    /// back at its own struct, a loop body builder transferring back to its
    /// owning `ForLoopUp`): every id in `other` is already resolved against
    /// `other`'s own tables, so the offsets are computed once up front and
    /// applied uniformly, regardless of what a given field happens to point at.
    pub fn clone_from(&mut self, other: &IR<'a>) -> IRCloneMap {
        let map = IRCloneMap {
            type_offset: self.types.len(),
            literal_offset: self.literals.len(),
            symbol_offset: self.symbols.len(),
            value_offset: self.values.len(),
            operation_offset: self.operations.len(),
            builder_offset: self.builders.len(),
            context_offset: self.contexts.len(),
            scope_offset: self.scopes.len(),
        };

        for ty in &other.types {
            let mut ty = clone_type(ty, self.arena);
            ty.remap(&map);
            self.types.push(ty);
        }
        for literal in &other.literals {
            let mut literal = clone_literal(literal, self.arena);
            literal.remap(&map);
            self.literals.push(literal);
        }
        for symbol in &other.symbols {
            let mut symbol = clone_symbol(symbol, self.arena);
            symbol.remap(&map);
            self.symbols.push(symbol);
        }
        for value in &other.values {
            let mut value = clone_value(value, self.arena);
            value.remap(&map);
            self.values.push(value);
        }
        for op in &other.operations {
            let mut op = clone_operation(op);
            op.remap(&map);
            self.operations.push(op);
        }
        for builder in &other.builders {
            let mut builder = clone_builder(builder);
            builder.remap(&map);
            self.builders.push(builder);
        }
        for context in &other.contexts {
            let mut context = clone_context(context);
            context.remap(&map);
            self.contexts.push(context);
        }
        for scope in &other.scopes {
            let mut scope = clone_scope(scope);
            scope.remap(&map);
            self.scopes.push(scope);
        }

        let mut type_dictionary = other.type_dictionary.clone();
        type_dictionary.remap(&map);
        self.type_dictionary.merge_from(type_dictionary);

        let mut literal_dictionary = other.literal_dictionary.clone();
        literal_dictionary.remap(&map);
        self.literal_dictionary.merge_from(literal_dictionary);

        map
    }

    pub fn budgeted_operation_count(&self, budget: &crate::config::CompilationBudget) -> Result<(), CompilationException> {
        if let Some(max) = budget.max_operations {
            if self.operations.len() > max {
                return Err(CompilationException::new(
                    CompilerReturnCode::FAILED,
                    format!("operation count {} exceeds budget {max}", self.operations.len()),
                ));
            }
        }
        Ok(())
    }
}

// Re-arena'ing helpers: cloning an object whose name/bytes live in a
// different arena means interning them afresh into the destination's arena.

fn clone_type<'a>(ty: &Type<'a>, arena: &'a Arena) -> Type<'a> {
    match ty.shape() {
        TypeShape::Primitive(prim) => Type::new_primitive(ty.id(), arena, ty.owning_extension(), *prim),
        TypeShape::Pointer { base } => Type::new_pointer(ty.id(), arena, ty.owning_extension(), *base, ty.name().trim_start_matches('*')),
        TypeShape::Struct { field_names, fields } => Type::new_struct(
            ty.id(),
            arena,
            ty.owning_extension(),
            ty.name(),
            field_names.iter().map(|n| arena.intern_str(n.as_str())).collect(),
            fields.clone(),
            ty.size_in_bits(),
        ),
        TypeShape::Field { owner, field_type } => {
            Type::new_field(ty.id(), arena, ty.owning_extension(), ty.name(), *owner, *field_type, ty.size_in_bits())
        }
        TypeShape::Function { return_type, param_types } => {
            Type::new_function(ty.id(), arena, ty.owning_extension(), ty.name(), *return_type, param_types.clone())
        }
    }
}

fn clone_literal<'a>(literal: &Literal<'a>, arena: &'a Arena) -> Literal<'a> {
    Literal::new(literal.id(), arena, literal.ty(), literal.bytes())
}

fn clone_symbol<'a>(symbol: &Symbol<'a>, arena: &'a Arena) -> Symbol<'a> {
    Symbol::new(symbol.id(), arena, symbol.name(), symbol.ty(), *symbol.class())
}

fn clone_value(value: &Value<'_>) -> Value<'static> {
    debug_assert!(value.name().is_none(), "named Value cloning across arenas is not yet supported");
    Value::new(value.id(), value.ty(), value.defining_op())
}

fn clone_operation(op: &Operation) -> Operation {
    let mut cloned = Operation::new(
        op.id(),
        op.action(),
        op.owning_extension(),
        op.parent_builder(),
        op.operands().iter().copied().collect(),
        op.results().iter().copied().collect(),
        op.type_operands().iter().copied().collect(),
        op.literal_operands().iter().copied().collect(),
        op.symbol_operands().iter().copied().collect(),
        op.bound_builders().iter().copied().collect(),
        op.targets().iter().copied().collect(),
    );
    if let Some(location) = op.location() {
        cloned = cloned.with_location(location);
    }
    cloned.set_case_falls_through(op.case_falls_through().iter().copied().collect());
    cloned
}

fn clone_builder(builder: &Builder) -> Builder {
    let mut cloned = Builder::new(builder.id(), builder.parent());
    for &op in builder.operations() {
        cloned.append(op, false);
    }
    cloned.set_control_reaches_end(builder.control_reaches_end());
    cloned.set_bound_state(builder.bound_to(), builder.boundness());
    if builder.is_target() {
        cloned.mark_target();
    }
    cloned
}

fn clone_context(context: &Context) -> Context {
    let mut cloned = Context::new(context.id(), context.parent());
    // Names aren't exposed for bulk iteration (by design — see `ScopedDict`),
    // so a context clone only carries structure forward; callers that need
    // the full symbol table copied should re-`define_symbol` explicitly.
    let _ = &mut cloned;
    cloned
}

fn clone_scope(scope: &Scope) -> Scope {
    let mut cloned = Scope::new(scope.id(), scope.parent());
    for &child in scope.children() {
        cloned.add_child(child);
    }
    for &entry in scope.entries() {
        cloned.add_entry(entry);
    }
    for &exit in scope.exits() {
        cloned.add_exit(exit);
    }
    cloned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaring_the_same_primitive_twice_dedups() {
        let arena = Arena::new();
        let mut ir = IR::new(&arena);
        let a = ir.declare_primitive_type("core", PrimitiveKind::Int32);
        let b = ir.declare_primitive_type("core", PrimitiveKind::Int32);
        assert_eq!(a, b);
    }

    #[test]
    fn pointer_types_dedup_by_structural_name() {
        let arena = Arena::new();
        let mut ir = IR::new(&arena);
        let base = ir.declare_primitive_type("core", PrimitiveKind::Int32);
        let p1 = ir.declare_pointer_type("core", base);
        let p2 = ir.declare_pointer_type("core", base);
        assert_eq!(p1, p2);
        assert_eq!(ir.ty(p1).name(), "*Int32");
    }

    #[test]
    fn struct_fields_are_packed_back_to_back() {
        let arena = Arena::new();
        let mut ir = IR::new(&arena);
        let i32_ty = ir.declare_primitive_type("core", PrimitiveKind::Int32);
        let i64_ty = ir.declare_primitive_type("core", PrimitiveKind::Int64);
        let s = ir.declare_struct_type("core", "Pair", &[("a", i32_ty), ("b", i64_ty)]);
        assert_eq!(ir.ty(s).size_in_bits(), 96);
        match ir.ty(s).shape() {
            TypeShape::Struct { fields, .. } => {
                assert_eq!(fields[0].offset_bits, 0);
                assert_eq!(fields[1].offset_bits, 32);
            }
            _ => panic!("expected struct shape"),
        }
    }

    #[test]
    fn appending_an_operation_creates_its_result_values() {
        let arena = Arena::new();
        let mut ir = IR::new(&arena);
        let i32_ty = ir.declare_primitive_type("core", PrimitiveKind::Int32);
        let action = ActionId::register("forgeir.test.ir.Const");
        let builder = ir.new_builder(BuilderParent::Scope(ir.root_scope()));
        let op = ir.append_operation(
            builder,
            action,
            "core",
            SmallVec::new(),
            &[i32_ty],
            SmallVec::new(),
            SmallVec::new(),
            SmallVec::new(),
            SmallVec::new(),
            SmallVec::new(),
            false,
        )
        .unwrap();
        assert_eq!(ir.operation(op).results().len(), 1);
        assert_eq!(ir.builder(builder).operations(), &[op]);
    }

    #[test]
    fn clone_from_offsets_every_id_kind() {
        let template_arena = Arena::new();
        let mut template = IR::new(&template_arena);
        let i32_ty = template.declare_primitive_type("core", PrimitiveKind::Int32);
        let action = ActionId::register("forgeir.test.ir.CloneConst");
        let template_builder = template.new_builder(BuilderParent::Scope(template.root_scope()));
        template.append_operation(
            template_builder,
            action,
            "core",
            SmallVec::new(),
            &[i32_ty],
            SmallVec::new(),
            SmallVec::new(),
            SmallVec::new(),
            SmallVec::new(),
            SmallVec::new(),
            false,
        )
        .unwrap();

        let dest_arena = Arena::new();
        let mut dest = IR::new(&dest_arena);
        let dest_i32 = dest.declare_primitive_type("core", PrimitiveKind::Int32);
        let map = dest.clone_from(&template);

        let merged_builder = map.map_builder(template_builder);
        assert_eq!(dest.builder(merged_builder).operations().len(), 1);
        let merged_type = map.map_type(i32_ty);
        assert_ne!(merged_type, dest_i32);
        assert_eq!(dest.ty(merged_type).name(), "Int32");
    }
}

//! Types: immutable, arena-named IR nodes forming a DAG by reference (`spec.md` §3).

use std::sync::OnceLock;

use crate::arena::{Arena, ArenaStr};
use crate::clone_map::IRCloneMap;
use crate::dictionary::ScopedDict;
use crate::ids::TypeId;
use crate::kind::{self, KindId};

/// The scalar element kinds the core checkers understand directly
/// (`spec.md` §4.4's "allowed element kinds").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Address,
}

impl PrimitiveKind {
    #[must_use]
    pub fn size_in_bits(self) -> u32 {
        match self {
            Self::Int8 => 8,
            Self::Int16 => 16,
            Self::Int32 | Self::Float32 => 32,
            Self::Int64 | Self::Float64 | Self::Address => 64,
            // Address is host-word-sized; this crate targets 64-bit hosts only,
            // per `spec.md` scenario (B)'s "on a 64-bit host" framing.
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Int8 => "Int8",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
            Self::Address => "Address",
        }
    }

    #[must_use]
    pub fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

/// One ordered field of a `StructType`.
#[derive(Debug, Clone, Copy)]
pub struct FieldSlot {
    pub field_type: TypeId,
    pub offset_bits: u32,
}

/// The structural shape of a `Type`. Distinct from `PrimitiveKind`: a `Type`
/// is either a primitive scalar or one of these composite shapes.
#[derive(Debug, Clone)]
pub enum TypeShape<'a> {
    Primitive(PrimitiveKind),
    /// `PointerType`: `baseType` must already exist in the IR when this is
    /// registered (`spec.md` §3 invariant (b)).
    Pointer { base: TypeId },
    /// `StructType`: an ordered field map, keyed by name for field lookup
    /// but iterated in declaration order for layout.
    Struct { field_names: Vec<ArenaStr<'a>>, fields: Vec<FieldSlot> },
    /// `FieldType`: `owningStruct` + `fieldType`, used by `StoreField`/`LoadField`-shaped operations.
    Field { owner: TypeId, field_type: TypeId },
    /// `FunctionType`: `returnType` + ordered `parmTypes`.
    Function { return_type: TypeId, param_types: Vec<TypeId> },
}

/// An immutable Type: id, size, name, owning extension, and kind.
pub struct Type<'a> {
    id: TypeId,
    name: ArenaStr<'a>,
    size_in_bits: u32,
    owning_extension: &'static str,
    kind: KindId,
    shape: TypeShape<'a>,
}

fn type_root_kind() -> KindId {
    static KIND: OnceLock<KindId> = OnceLock::new();
    *KIND.get_or_init(|| kind::register_root_kind("forgeir.Type"))
}

impl<'a> Type<'a> {
    pub(crate) fn new_primitive(id: TypeId, arena: &'a Arena, owning_extension: &'static str, prim: PrimitiveKind) -> Self {
        Self {
            id,
            name: arena.intern_str(prim.name()),
            size_in_bits: prim.size_in_bits(),
            owning_extension,
            kind: type_root_kind(),
            shape: TypeShape::Primitive(prim),
        }
    }

    pub(crate) fn new_pointer(id: TypeId, arena: &'a Arena, owning_extension: &'static str, base: TypeId, base_name: &str) -> Self {
        Self {
            id,
            name: arena.intern_str(&format!("*{base_name}")),
            size_in_bits: PrimitiveKind::Address.size_in_bits(),
            owning_extension,
            kind: type_root_kind(),
            shape: TypeShape::Pointer { base },
        }
    }

    pub(crate) fn new_struct(
        id: TypeId,
        arena: &'a Arena,
        owning_extension: &'static str,
        name: &str,
        field_names: Vec<ArenaStr<'a>>,
        fields: Vec<FieldSlot>,
        size_in_bits: u32,
    ) -> Self {
        Self {
            id,
            name: arena.intern_str(name),
            size_in_bits,
            owning_extension,
            kind: type_root_kind(),
            shape: TypeShape::Struct { field_names, fields },
        }
    }

    pub(crate) fn new_field(
        id: TypeId,
        arena: &'a Arena,
        owning_extension: &'static str,
        name: &str,
        owner: TypeId,
        field_type: TypeId,
        size_in_bits: u32,
    ) -> Self {
        Self {
            id,
            name: arena.intern_str(name),
            size_in_bits,
            owning_extension,
            kind: type_root_kind(),
            shape: TypeShape::Field { owner, field_type },
        }
    }

    pub(crate) fn new_function(
        id: TypeId,
        arena: &'a Arena,
        owning_extension: &'static str,
        name: &str,
        return_type: TypeId,
        param_types: Vec<TypeId>,
    ) -> Self {
        Self {
            id,
            name: arena.intern_str(name),
            size_in_bits: PrimitiveKind::Address.size_in_bits(),
            owning_extension,
            kind: type_root_kind(),
            shape: TypeShape::Function { return_type, param_types },
        }
    }

    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    #[must_use]
    pub fn size_in_bits(&self) -> u32 {
        self.size_in_bits
    }

    #[must_use]
    pub fn owning_extension(&self) -> &'static str {
        self.owning_extension
    }

    #[must_use]
    pub fn kind(&self) -> KindId {
        self.kind
    }

    #[must_use]
    pub fn shape(&self) -> &TypeShape<'a> {
        &self.shape
    }

    #[must_use]
    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self.shape {
            TypeShape::Primitive(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_address(&self) -> bool {
        matches!(self.shape, TypeShape::Primitive(PrimitiveKind::Address))
    }

    /// The additive identity's byte pattern: all-zero, sized to this type.
    #[must_use]
    pub fn zero_bytes(&self) -> Vec<u8> {
        vec![0u8; (self.size_in_bits as usize) / 8]
    }

    /// The multiplicative identity's byte pattern, where defined (integers and floats only).
    #[must_use]
    pub fn identity_bytes(&self) -> Option<Vec<u8>> {
        match self.as_primitive()? {
            PrimitiveKind::Int8 => Some(1i8.to_ne_bytes().to_vec()),
            PrimitiveKind::Int16 => Some(1i16.to_ne_bytes().to_vec()),
            PrimitiveKind::Int32 => Some(1i32.to_ne_bytes().to_vec()),
            PrimitiveKind::Int64 => Some(1i64.to_ne_bytes().to_vec()),
            PrimitiveKind::Float32 => Some(1f32.to_ne_bytes().to_vec()),
            PrimitiveKind::Float64 => Some(1f64.to_ne_bytes().to_vec()),
            PrimitiveKind::Address => None,
        }
    }

    /// Bit-exact literal equality, used by `LiteralDictionary` deduplication.
    #[must_use]
    pub fn literals_are_equal(&self, a: &[u8], b: &[u8]) -> bool {
        a == b
    }

    /// Rewrites every id this Type carries by `map`, after it has been
    /// appended onto a destination IR's type table.
    pub(crate) fn remap(&mut self, map: &IRCloneMap) {
        self.id = map.map_type(self.id);
        match &mut self.shape {
            TypeShape::Primitive(_) => {}
            TypeShape::Pointer { base } => *base = map.map_type(*base),
            TypeShape::Struct { fields, .. } => {
                for field in fields {
                    field.field_type = map.map_type(field.field_type);
                }
            }
            TypeShape::Field { owner, field_type } => {
                *owner = map.map_type(*owner);
                *field_type = map.map_type(*field_type);
            }
            TypeShape::Function { return_type, param_types } => {
                *return_type = map.map_type(*return_type);
                for param in param_types {
                    *param = map.map_type(*param);
                }
            }
        }
    }
}

/// Structural-name keyed, scope-delegating registry of Types for one IR
/// (`spec.md` §4.7). One instance is the IR's "prototype"; `Context`s may
/// overlay their own on top.
#[derive(Debug, Clone, Default)]
pub struct TypeDictionary {
    by_name: ScopedDict<String, TypeId>,
}

impl TypeDictionary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, structural_name: &str, id: TypeId) {
        self.by_name.insert(structural_name.to_string(), id);
    }

    #[must_use]
    pub fn lookup_local(&self, structural_name: &str) -> Option<TypeId> {
        self.by_name.get_local(&structural_name.to_string())
    }

    pub(crate) fn remap(&mut self, map: &IRCloneMap) {
        self.by_name.remap_values(|id| map.map_type(id));
    }

    pub(crate) fn merge_from(&mut self, other: Self) {
        self.by_name.merge_from(other.by_name);
    }
}

/// The structural-name key `spec.md` §4.7 specifies for a `PointerType`.
#[must_use]
pub fn pointer_structural_name(base_name: &str) -> String {
    format!("*{base_name}")
}

/// The structural-name key for a `FunctionType`: a canonical signature built
/// from return/parameter type ids in order.
#[must_use]
pub fn function_structural_name(return_type: TypeId, param_types: &[TypeId]) -> String {
    let mut s = String::from("fn(");
    for (i, p) in param_types.iter().enumerate() {
        if i > 0 {
            s.push(',');
        }
        s.push_str(&p.to_string());
    }
    s.push_str(")->");
    s.push_str(&return_type.to_string());
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[test]
    fn primitive_sizes_match_spec() {
        assert_eq!(PrimitiveKind::Int8.size_in_bits(), 8);
        assert_eq!(PrimitiveKind::Int64.size_in_bits(), 64);
        assert_eq!(PrimitiveKind::Address.size_in_bits(), 64);
    }

    #[test]
    fn zero_and_identity_bytes_are_sized_correctly() {
        let arena = Arena::new();
        let ty = Type::new_primitive(TypeId::from_index(0), &arena, "Base", PrimitiveKind::Int32);
        assert_eq!(ty.zero_bytes(), vec![0u8; 4]);
        assert_eq!(ty.identity_bytes(), Some(1i32.to_ne_bytes().to_vec()));
    }

    #[test]
    fn address_has_no_multiplicative_identity() {
        let arena = Arena::new();
        let ty = Type::new_primitive(TypeId::from_index(0), &arena, "Base", PrimitiveKind::Address);
        assert_eq!(ty.identity_bytes(), None);
    }

    #[test]
    fn pointer_structural_name_matches_spec_scheme() {
        assert_eq!(pointer_structural_name("Int32"), "*Int32");
    }

    #[test]
    fn type_dictionary_registers_and_looks_up_locally() {
        let mut dict = TypeDictionary::new();
        let id = TypeId::from_index(3);
        dict.register("Int32", id);
        assert_eq!(dict.lookup_local("Int32"), Some(id));
        assert_eq!(dict.lookup_local("Int64"), None);
    }
}

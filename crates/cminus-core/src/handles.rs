//! Deterministic hash-based identity handles.
//!
//! [`TypeId`] is a 64-bit hash computed from a type's structure, so two
//! structurally equal type descriptors always produce the same handle and
//! type comparison is a single integer compare. [`DeclId`] and [`ExprId`]
//! are plain arena indices: the semantic checker owns arenas of canonical
//! declarations and shared default-argument expressions, and AST nodes
//! reference into them instead of holding raw back-pointers.
//!
//! # Hash Computation
//!
//! Uses XXHash64 with domain-specific mixing constants so that, e.g., a
//! pointer to `int` and an array of `int` can never collide even though
//! they hash the same child handle.

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
///
/// Each type shape gets its own seed so that different shapes built from
/// the same components produce distinct hashes.
mod hash_seeds {
    /// Seed for simple (named) types.
    pub const SIMPLE: u64 = 0x6f1c_3a58_92d4_be07;

    /// Seed for pointer types.
    pub const POINTER: u64 = 0x2b8e_55a0_c719_f4d3;

    /// Seed for array types.
    pub const ARRAY: u64 = 0x95d2_07cb_3e61_8a4f;

    /// Seed for function types.
    pub const FUNCTION: u64 = 0x4a03_e98d_71f5_26bc;

    /// Mixed in when the type carries a const qualifier.
    pub const CONST: u64 = 0xd1f6_4b29_085c_e7a3;

    /// Mixed in when a function type is variadic.
    pub const VARARG: u64 = 0x38c7_91ef_5ad0_624b;
}

/// A 64-bit structural hash identifying a type.
///
/// Handle equality is structural type equality; the interner guarantees a
/// `TypeId` can always be decomposed back into its descriptor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u64);

impl TypeId {
    /// Hash for a simple (named) type, e.g. `int` or `const Foo`.
    pub fn from_simple(name: &str, is_const: bool) -> Self {
        let seed = mix_const(hash_seeds::SIMPLE, is_const);
        TypeId(xxh64(name.as_bytes(), seed))
    }

    /// Hash for a pointer type.
    pub fn from_pointer(pointee: TypeId, is_const: bool) -> Self {
        let seed = mix_const(hash_seeds::POINTER, is_const);
        TypeId(xxh64(&pointee.0.to_le_bytes(), seed))
    }

    /// Hash for an array type. `size` of `None` means unknown size.
    pub fn from_array(elem: TypeId, size: Option<u64>) -> Self {
        let mut buf = [0u8; 17];
        buf[..8].copy_from_slice(&elem.0.to_le_bytes());
        match size {
            Some(n) => {
                buf[8] = 1;
                buf[9..].copy_from_slice(&n.to_le_bytes());
            }
            None => buf[8] = 0,
        }
        TypeId(xxh64(&buf, hash_seeds::ARRAY))
    }

    /// Hash for a function type.
    pub fn from_function(ret: TypeId, params: &[TypeId], vararg: bool) -> Self {
        let mut buf = Vec::with_capacity(8 * (params.len() + 1));
        buf.extend_from_slice(&ret.0.to_le_bytes());
        for p in params {
            buf.extend_from_slice(&p.0.to_le_bytes());
        }
        let mut seed = hash_seeds::FUNCTION;
        if vararg {
            seed ^= hash_seeds::VARARG;
        }
        TypeId(xxh64(&buf, seed))
    }

    /// The raw hash value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

fn mix_const(seed: u64, is_const: bool) -> u64 {
    if is_const { seed ^ hash_seeds::CONST } else { seed }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({:016x})", self.0)
    }
}

/// Index of a canonical declaration in the checker's declaration arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclId(pub u32);

/// Index of a shared expression (a default-argument value) in the
/// checker's expression arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(pub u32);

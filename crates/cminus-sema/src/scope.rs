//! Lexical scopes and class scopes.
//!
//! Scopes form a tree owned by a [`ScopeTable`] arena and referenced by
//! [`ScopeId`]; a scope never goes away, so resolved bindings stay valid
//! for the whole pass. Name lookup walks the parent chain and stops at
//! the first scope that has any binding for the name: an inner binding
//! shadows all outer ones, including every overload of a shadowed
//! function.
//!
//! A class scope is a scope that additionally records the access level
//! of each member, so the checker can reject private access from outside
//! the class.

use cminus_ast::Access;
use cminus_core::{DeclId, TypeId};
use rustc_hash::{FxHashMap, FxHashSet};

/// A name's resolution: the canonical declaration and its type.
///
/// Bindings are implicitly lvalues; value category is decided where the
/// name is used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binding {
    pub decl: DeclId,
    pub ty: TypeId,
}

/// Index of a scope in the [`ScopeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    /// A name can hold several bindings only when all of them are
    /// function overloads.
    values: FxHashMap<String, Vec<Binding>>,
    /// Access levels, present only for class scopes.
    access: Option<ClassAccess>,
}

#[derive(Debug, Default)]
struct ClassAccess {
    public: FxHashSet<DeclId>,
    private: FxHashSet<DeclId>,
}

/// Arena of all scopes created during a checking pass.
#[derive(Debug, Default)]
pub struct ScopeTable {
    scopes: Vec<Scope>,
}

impl ScopeTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, parent: Option<ScopeId>, access: Option<ClassAccess>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent,
            values: FxHashMap::default(),
            access,
        });
        id
    }

    /// Create an ordinary block scope.
    pub fn push_block(&mut self, parent: Option<ScopeId>) -> ScopeId {
        self.push(parent, None)
    }

    /// Create a class scope.
    pub fn push_class(&mut self, parent: Option<ScopeId>) -> ScopeId {
        self.push(parent, Some(ClassAccess::default()))
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.scopes[id.0 as usize].parent
    }

    /// Whether `id` holds any binding for `name`. Does not search
    /// parents.
    pub fn contains(&self, id: ScopeId, name: &str) -> bool {
        self.scopes[id.0 as usize].values.contains_key(name)
    }

    /// All bindings for `name`, searching the parent chain if asked.
    /// The first scope containing the name provides all results.
    pub fn values(&self, id: ScopeId, name: &str, search_parents: bool) -> Vec<Binding> {
        let scope = &self.scopes[id.0 as usize];
        if let Some(bindings) = scope.values.get(name) {
            return bindings.clone();
        }
        match scope.parent {
            Some(parent) if search_parents => self.values(parent, name, search_parents),
            _ => Vec::new(),
        }
    }

    /// The scope (this one or an ancestor) that holds a binding for
    /// `name`, if any.
    pub fn value_scope(&self, id: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(id);
        while let Some(s) = current {
            if self.contains(s, name) {
                return Some(s);
            }
            current = self.parent(s);
        }
        None
    }

    /// Whether `ancestor` is `id` itself or on `id`'s parent chain.
    pub fn is_within(&self, id: ScopeId, ancestor: ScopeId) -> bool {
        let mut current = Some(id);
        while let Some(s) = current {
            if s == ancestor {
                return true;
            }
            current = self.parent(s);
        }
        false
    }

    pub fn add_value(&mut self, id: ScopeId, name: impl Into<String>, binding: Binding) {
        self.scopes[id.0 as usize]
            .values
            .entry(name.into())
            .or_default()
            .push(binding);
    }

    /// Add a class member with its access level. `id` must be a class
    /// scope.
    pub fn add_member(
        &mut self,
        id: ScopeId,
        name: impl Into<String>,
        binding: Binding,
        access: Access,
    ) {
        let scope = &mut self.scopes[id.0 as usize];
        if let Some(class) = scope.access.as_mut() {
            match access {
                Access::Public => class.public.insert(binding.decl),
                Access::Private => class.private.insert(binding.decl),
            };
        }
        scope
            .values
            .entry(name.into())
            .or_default()
            .push(binding);
    }

    /// Whether `id` is a class scope.
    pub fn is_class(&self, id: ScopeId) -> bool {
        self.scopes[id.0 as usize].access.is_some()
    }

    /// Whether `decl` is a private member of class scope `id`. False for
    /// non-class scopes and unknown members.
    pub fn is_private(&self, id: ScopeId, decl: DeclId) -> bool {
        self.scopes[id.0 as usize]
            .access
            .as_ref()
            .is_some_and(|class| class.private.contains(&decl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(decl: u32) -> Binding {
        Binding {
            decl: DeclId(decl),
            ty: TypeId::from_simple("int", false),
        }
    }

    #[test]
    fn lookup_walks_parents() {
        let mut table = ScopeTable::new();
        let global = table.push_block(None);
        let inner = table.push_block(Some(global));
        table.add_value(global, "a", binding(0));

        assert!(table.contains(global, "a"));
        assert!(!table.contains(inner, "a"));
        assert_eq!(table.values(inner, "a", true), vec![binding(0)]);
        assert!(table.values(inner, "a", false).is_empty());
    }

    #[test]
    fn shadowing_hides_all_outer_bindings() {
        let mut table = ScopeTable::new();
        let global = table.push_block(None);
        let inner = table.push_block(Some(global));
        // two overloads in the outer scope, one variable shadowing inside
        table.add_value(global, "f", binding(0));
        table.add_value(global, "f", binding(1));
        table.add_value(inner, "f", binding(2));

        assert_eq!(table.values(inner, "f", true), vec![binding(2)]);
        assert_eq!(table.values(global, "f", true).len(), 2);
    }

    #[test]
    fn value_scope_finds_the_owning_scope() {
        let mut table = ScopeTable::new();
        let global = table.push_block(None);
        let inner = table.push_block(Some(global));
        table.add_value(global, "a", binding(0));

        assert_eq!(table.value_scope(inner, "a"), Some(global));
        assert_eq!(table.value_scope(inner, "missing"), None);
    }

    #[test]
    fn is_within_checks_the_ancestor_chain() {
        let mut table = ScopeTable::new();
        let global = table.push_block(None);
        let a = table.push_block(Some(global));
        let b = table.push_block(Some(global));

        assert!(table.is_within(a, global));
        assert!(table.is_within(a, a));
        assert!(!table.is_within(a, b));
        assert!(!table.is_within(global, a));
    }

    #[test]
    fn class_scope_tracks_member_access() {
        let mut table = ScopeTable::new();
        let global = table.push_block(None);
        let class = table.push_class(Some(global));
        table.add_member(class, "secret", binding(0), Access::Private);
        table.add_member(class, "open", binding(1), Access::Public);

        assert!(table.is_class(class));
        assert!(!table.is_class(global));
        assert!(table.is_private(class, DeclId(0)));
        assert!(!table.is_private(class, DeclId(1)));
        assert!(!table.is_private(global, DeclId(0)));
    }
}

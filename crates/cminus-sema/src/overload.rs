//! Overload resolution.
//!
//! Given every binding a call's name resolves to, filter out candidates
//! that cannot accept the argument list at all, then pick the unique
//! best match by comparing per-argument [`TypeMatch`] grades. Two
//! candidates neither of which is at least as good as the other make the
//! call ambiguous.

use cminus_core::TypeId;
use cminus_types::TypeInterner;

use crate::arena::DefaultArgTable;
use crate::conversion::{TypeMatch, better_or_same_match, implicit_match};
use crate::scope::Binding;

/// Why no single overload could be chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum OverloadFailure {
    /// No candidate accepts the argument list.
    NoViable,
    /// Several viable candidates rank equally well or incomparably.
    Ambiguous(Vec<Binding>),
}

/// Select the overload for `arg_types` among `candidates`.
///
/// For method and constructor calls `arg_types` starts with the implicit
/// receiver pointer. A candidate is viable when every argument converts
/// to its parameter, surplus arguments land in varargs, and missing
/// arguments are covered by default values (looked up in `defaults` by
/// the candidate's canonical declaration).
pub fn resolve(
    types: &TypeInterner,
    candidates: &[Binding],
    defaults: &DefaultArgTable,
    arg_types: &[TypeId],
) -> Result<Binding, OverloadFailure> {
    let arg_count = arg_types.len();
    let mut viable: Vec<(Binding, Vec<TypeMatch>)> = Vec::new();

    for &candidate in candidates {
        let Some((_, params, vararg)) = types.as_function(candidate.ty) else {
            continue;
        };
        // too many arguments and nowhere to put them
        if arg_count > params.len() && !vararg {
            continue;
        }
        // too few arguments and no default for the first missing one
        if arg_count < params.len() {
            let has_default = defaults
                .get(&candidate.decl)
                .is_some_and(|list| list[arg_count].is_some());
            if !has_default {
                continue;
            }
        }
        let mut matches = Vec::with_capacity(arg_count.min(params.len()));
        let mut all_pass = true;
        for (i, &param) in params.iter().enumerate().take(arg_count) {
            let m = implicit_match(types, arg_types[i], param);
            if m == TypeMatch::None {
                all_pass = false;
                break;
            }
            matches.push(m);
        }
        if all_pass {
            viable.push((candidate, matches));
        }
    }

    if viable.is_empty() {
        return Err(OverloadFailure::NoViable);
    }

    // Pick the candidate every other one loses to. The relation is a
    // partial order, so a "winner" of the first sweep still has to be
    // verified against every contender.
    let mut best = 0;
    for i in 1..viable.len() {
        if better_or_same_match(&viable[i].1, &viable[best].1) {
            best = i;
        }
    }
    for (i, (_, matches)) in viable.iter().enumerate() {
        if i == best {
            continue;
        }
        let best_matches = &viable[best].1;
        if better_or_same_match(matches, best_matches)
            || !better_or_same_match(best_matches, matches)
        {
            return Err(OverloadFailure::Ambiguous(
                viable.iter().map(|(b, _)| *b).collect(),
            ));
        }
    }

    Ok(viable[best].0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cminus_core::DeclId;
    use rustc_hash::FxHashMap;

    struct Fixture {
        types: TypeInterner,
        defaults: DefaultArgTable,
        candidates: Vec<Binding>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                types: TypeInterner::new(),
                defaults: FxHashMap::default(),
                candidates: Vec::new(),
            }
        }

        fn add(&mut self, params: Vec<TypeId>, vararg: bool) -> Binding {
            let ret = self.types.int_ty(false);
            let n_params = params.len();
            let ty = self.types.function(ret, params, vararg);
            let decl = DeclId(self.candidates.len() as u32);
            self.defaults.insert(decl, vec![None; n_params]);
            let binding = Binding { decl, ty };
            self.candidates.push(binding);
            binding
        }
    }

    #[test]
    fn exact_beats_conversion() {
        let mut fx = Fixture::new();
        let int = fx.types.int_ty(false);
        let double = fx.types.double_ty(false);
        let f_int = fx.add(vec![int], false);
        let _f_double = fx.add(vec![double], false);

        let chosen = resolve(&fx.types, &fx.candidates, &fx.defaults, &[int])
            .expect("resolves");
        assert_eq!(chosen, f_int);
    }

    #[test]
    fn no_viable_candidate() {
        let mut fx = Fixture::new();
        let int = fx.types.int_ty(false);
        let int_ptr = fx.types.pointer(int, false);
        fx.add(vec![int_ptr], false);

        let err = resolve(&fx.types, &fx.candidates, &fx.defaults, &[int]).unwrap_err();
        assert_eq!(err, OverloadFailure::NoViable);
    }

    #[test]
    fn incomparable_candidates_are_ambiguous() {
        let mut fx = Fixture::new();
        let int = fx.types.int_ty(false);
        let double = fx.types.double_ty(false);
        // f(int, double) and f(double, int) called with (int, int):
        // each wins on one argument
        fx.add(vec![int, double], false);
        fx.add(vec![double, int], false);

        let err = resolve(&fx.types, &fx.candidates, &fx.defaults, &[int, int]).unwrap_err();
        assert!(matches!(err, OverloadFailure::Ambiguous(c) if c.len() == 2));
    }

    #[test]
    fn fixed_params_beat_varargs() {
        let mut fx = Fixture::new();
        let int = fx.types.int_ty(false);
        let f_vararg = fx.add(vec![int], true);
        let f_exact = fx.add(vec![int, int], false);

        let chosen = resolve(&fx.types, &fx.candidates, &fx.defaults, &[int, int])
            .expect("resolves");
        assert_eq!(chosen, f_exact);

        // with one argument only the vararg overload fits the call below
        let chosen = resolve(&fx.types, &fx.candidates, &fx.defaults, &[int])
            .expect("resolves");
        assert_eq!(chosen, f_vararg);
    }

    #[test]
    fn missing_args_need_defaults() {
        let mut fx = Fixture::new();
        let int = fx.types.int_ty(false);
        let f = fx.add(vec![int, int], false);

        // without a default for the second parameter, one arg is not enough
        let err = resolve(&fx.types, &fx.candidates, &fx.defaults, &[int]).unwrap_err();
        assert_eq!(err, OverloadFailure::NoViable);

        // give the second parameter a default value
        fx.defaults.get_mut(&f.decl).unwrap()[1] = Some(cminus_core::ExprId(0));
        let chosen = resolve(&fx.types, &fx.candidates, &fx.defaults, &[int])
            .expect("resolves");
        assert_eq!(chosen, f);
    }

    #[test]
    fn surplus_args_go_to_varargs() {
        let mut fx = Fixture::new();
        let int = fx.types.int_ty(false);
        let f = fx.add(vec![int], true);

        let chosen = resolve(&fx.types, &fx.candidates, &fx.defaults, &[int, int, int])
            .expect("resolves");
        assert_eq!(chosen, f);

        // no vararg, no fit
        let mut fx2 = Fixture::new();
        let int = fx2.types.int_ty(false);
        fx2.add(vec![int], false);
        let err = resolve(&fx2.types, &fx2.candidates, &fx2.defaults, &[int, int]).unwrap_err();
        assert_eq!(err, OverloadFailure::NoViable);
    }
}

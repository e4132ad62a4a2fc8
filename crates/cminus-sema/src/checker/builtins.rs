//! The builtin function surface.
//!
//! Every translation unit starts with the declarations of the standard
//! I/O and allocation functions, prepended before the user's code and
//! checked through the ordinary declaration path.

use cminus_ast::{Declaration, Declarator, InitDeclarator, SimpleDeclaration};
use cminus_core::{Span, TypeId};

use super::Checker;

impl Checker {
    /// The declarations prepended to every translation unit.
    pub(crate) fn builtin_declarations(&mut self) -> Vec<Declaration> {
        let int = self.types.int_ty(false);
        let void = self.types.void_ty();
        let char_ptr = {
            let ch = self.types.char_ty(false);
            self.types.pointer(ch, false)
        };
        let const_char_ptr = {
            let ch = self.types.char_ty(true);
            self.types.pointer(ch, false)
        };
        let void_ptr = self.types.pointer(void, false);

        vec![
            self.builtin("printf", int, vec![const_char_ptr], true),
            self.builtin("scanf", int, vec![const_char_ptr], true),
            self.builtin("malloc", void_ptr, vec![int], false),
            self.builtin("free", void, vec![void_ptr], false),
            self.builtin("sprintf", int, vec![char_ptr, const_char_ptr], true),
            self.builtin("sscanf", int, vec![const_char_ptr, const_char_ptr], true),
        ]
    }

    fn builtin(
        &mut self,
        name: &str,
        ret: TypeId,
        params: Vec<TypeId>,
        vararg: bool,
    ) -> Declaration {
        let span = Span::point(0, 0);
        let ty = self.types.function(ret, params, vararg);
        Declaration::Simple(SimpleDeclaration {
            span,
            declarators: vec![InitDeclarator {
                span,
                declarator: Declarator::new(span, name, ty),
                initializer: None,
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cminus_ast::{Expr, ExprKind, TranslationUnit};
    use cminus_types::TypeInterner;

    #[test]
    fn builtins_are_callable_after_the_run() {
        let mut c = Checker::new(TypeInterner::new());
        let mut unit = TranslationUnit {
            span: Span::point(1, 1),
            declarations: Vec::new(),
        };
        c.run(&mut unit).unwrap();
        assert_eq!(unit.declarations.len(), 6);

        // printf("%d\n", 5) resolves against the prepended declaration
        let mut call = Expr::new(
            Span::point(2, 1),
            ExprKind::Call {
                callee: Box::new(Expr::new(
                    Span::point(2, 1),
                    ExprKind::Ident {
                        name: "printf".into(),
                        decl: None,
                    },
                )),
                args: vec![
                    Expr::new(Span::point(2, 8), ExprKind::StringLit("%d\n".into())),
                    Expr::new(Span::point(2, 15), ExprKind::IntLit(5)),
                ],
                ctor_call: false,
                resolved: None,
            },
        );
        let info = c.check_expr(&mut call, true).unwrap();
        let int = c.types.int_ty(false);
        assert_eq!(info.ty, int);
    }
}

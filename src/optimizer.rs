//! The idempotent AST rewriter run between parsing and compilation.
//!
//! Four passes, applied bottom-up in a single tree walk: collapse sibling
//! `Character` runs into `String` nodes, flatten nested `Alternation`s,
//! assign left-to-right indices to capturing groups, and unwrap
//! single-child `ImplicitGroup`s.

use crate::ast::Ast;

/// Rewrites `ast` in place conceptually (the tree is rebuilt, since `Ast`
/// has no interior mutability) and returns the number of capturing groups
/// found, in source order.
pub fn optimize(ast: Ast) -> (Ast, u32) {
    let mut next_index = 1;
    let ast = rewrite(ast, &mut next_index);
    (ast, next_index - 1)
}

fn rewrite(ast: Ast, next_index: &mut u32) -> Ast {
    match ast {
        Ast::Group {
            index: _,
            capturing,
            child,
        } => {
            let child = rewrite(*child, next_index);
            let index = if capturing {
                let i = *next_index;
                *next_index += 1;
                Some(i)
            } else {
                None
            };
            Ast::Group {
                index,
                capturing,
                child: Box::new(child),
            }
        }
        Ast::ImplicitGroup(children) => {
            let children: Vec<Ast> = children.into_iter().map(|c| rewrite(c, next_index)).collect();
            let collapsed = collapse_character_runs(children);
            unwrap_singleton(Ast::ImplicitGroup(collapsed))
        }
        Ast::Alternation(children) => {
            let mut flattened = Vec::with_capacity(children.len());
            for child in children {
                match rewrite(child, next_index) {
                    Ast::Alternation(inner) => flattened.extend(inner),
                    other => flattened.push(other),
                }
            }
            Ast::Alternation(flattened)
        }
        Ast::Quantified {
            child,
            quantifier,
            lazy,
        } => Ast::Quantified {
            child: Box::new(rewrite(*child, next_index)),
            quantifier,
            lazy,
        },
        leaf => leaf,
    }
}

/// Collapses maximal runs of sibling `Character` nodes into a single
/// `String` node; a run of length 1 is left as `Character` (so later passes
/// that special-case single characters, e.g. range-quantifier expansion,
/// don't need to also special-case single-character strings).
fn collapse_character_runs(children: Vec<Ast>) -> Vec<Ast> {
    let mut out = Vec::with_capacity(children.len());
    let mut run = String::new();
    for child in children {
        match child {
            Ast::Character(c) => run.push(c),
            other => {
                flush_run(&mut run, &mut out);
                out.push(other);
            }
        }
    }
    flush_run(&mut run, &mut out);
    out
}

fn flush_run(run: &mut String, out: &mut Vec<Ast>) {
    match run.chars().count() {
        0 => {}
        1 => out.push(Ast::Character(run.chars().next().unwrap())),
        _ => out.push(Ast::String(std::mem::take(run))),
    }
    run.clear();
}

fn unwrap_singleton(ast: Ast) -> Ast {
    match ast {
        Ast::ImplicitGroup(mut children) if children.len() == 1 => children.pop().unwrap(),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_character_runs_into_string() {
        let ast = Ast::ImplicitGroup(vec![
            Ast::Character('a'),
            Ast::Character('b'),
            Ast::Character('c'),
        ]);
        let (ast, groups) = optimize(ast);
        assert_eq!(ast, Ast::String("abc".to_owned()));
        assert_eq!(groups, 0);
    }

    #[test]
    fn single_character_run_stays_character() {
        let ast = Ast::ImplicitGroup(vec![Ast::Character('a')]);
        let (ast, _) = optimize(ast);
        assert_eq!(ast, Ast::Character('a'));
    }

    #[test]
    fn assigns_group_indices_left_to_right() {
        let ast = Ast::ImplicitGroup(vec![
            Ast::Group {
                index: None,
                capturing: true,
                child: Box::new(Ast::Character('a')),
            },
            Ast::Group {
                index: None,
                capturing: false,
                child: Box::new(Ast::Character('b')),
            },
            Ast::Group {
                index: None,
                capturing: true,
                child: Box::new(Ast::Character('c')),
            },
        ]);
        let (ast, groups) = optimize(ast);
        assert_eq!(groups, 2);
        match ast {
            Ast::ImplicitGroup(items) => {
                assert!(matches!(items[0], Ast::Group { index: Some(1), .. }));
                assert!(matches!(items[1], Ast::Group { index: None, .. }));
                assert!(matches!(items[2], Ast::Group { index: Some(2), .. }));
            }
            other => panic!("expected ImplicitGroup, got {:?}", other),
        }
    }

    #[test]
    fn flattens_nested_alternation() {
        let ast = Ast::Alternation(vec![
            Ast::Character('a'),
            Ast::Alternation(vec![Ast::Character('b'), Ast::Character('c')]),
        ]);
        let (ast, _) = optimize(ast);
        match ast {
            Ast::Alternation(items) => assert_eq!(items.len(), 3),
            other => panic!("expected Alternation, got {:?}", other),
        }
    }
}

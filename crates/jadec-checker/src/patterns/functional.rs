//! Functional-notation patterns: `Name(p1, p2)` deconstructs a value of a
//! declared type through its constructor's parameters.

use super::input::PatternMatchInput;
use super::walker::{PatternWalker, TermResult};
use crate::expr::{check_argument_style, map_arguments, report_ambiguity};
use crate::state::StaticState;
use crate::symbols::{CallableKind, CallableSymbol};
use jadec_ast::{Argument, NodeIndex};
use jadec_common::{Atom, DiagnosticCode};

impl PatternWalker<'_, '_> {
    /// Deconstructors called `name` the arguments fit by shape.
    fn deconstructors(&self, name: &str, args: &[Argument]) -> (Vec<CallableSymbol>, Vec<CallableSymbol>) {
        let cx = self.cx;
        let named = cx
            .symbols
            .search_callable(name, &|_| true, &|_| true)
            .into_iter()
            .filter(CallableSymbol::is_constructor)
            .collect::<Vec<_>>();
        let shaped = named
            .iter()
            .filter(|c| map_arguments(cx, args, &c.params, false).is_some())
            .cloned()
            .collect();
        (named, shaped)
    }

    pub(super) fn visit_functional(
        &mut self,
        node: NodeIndex,
        callee: Atom,
        args: &[Argument],
        input: &PatternMatchInput,
        state: &StaticState,
    ) -> TermResult {
        let cx = self.cx;
        let name = cx.text(callee);
        if !self.with_acceptor(|acceptor| check_argument_style(cx, args, acceptor)) {
            return TermResult::failed(state);
        }

        let (named, shaped) = self.deconstructors(name, args);
        if named.is_empty() {
            self.error(
                node,
                DiagnosticCode::UnresolvedPattern,
                format!("Cannot resolve pattern '{name}': no type called '{name}' is declared"),
            );
            return TermResult::failed(state);
        }
        if shaped.is_empty() {
            let arities: Vec<String> = named.iter().map(|c| c.params.len().to_string()).collect();
            self.error(
                node,
                DiagnosticCode::InvalidPatternTermsCount,
                format!(
                    "Pattern '{name}' has {} terms, but '{name}' expects {}",
                    args.len(),
                    arities.join(" or ")
                ),
            );
            return TermResult::failed(state);
        }

        let provided = input.provided_type;
        let mut candidates: Vec<CallableSymbol> = shaped
            .into_iter()
            .filter(|c| provided.is_error() || cx.compare(c.result_type(), provided).is_related())
            .collect();
        if candidates.len() > 1 {
            self.with_acceptor(|acceptor| {
                report_ambiguity(
                    cx,
                    node,
                    &format!("pattern '{name}'"),
                    &candidates,
                    DiagnosticCode::AmbiguousPatternResolution,
                    acceptor,
                );
            });
            return TermResult::failed(state);
        }
        let Some(deconstructor) = candidates.pop() else {
            self.error(
                node,
                DiagnosticCode::UnresolvedPattern,
                format!(
                    "No pattern '{name}' can match a value of type '{}'",
                    cx.format_type(provided)
                ),
            );
            return TermResult::failed(state);
        };
        let CallableKind::Constructor { accessors, .. } = &deconstructor.kind else {
            return TermResult::failed(state);
        };
        let Some(slots) = map_arguments(cx, args, &deconstructor.params, false) else {
            return TermResult::failed(state);
        };

        let mut ok = true;
        let mut current = state.clone();
        let mut conditions = Vec::with_capacity(slots.len());
        let mut declares = Vec::new();
        for (i, (slot, param)) in slots.iter().zip(&deconstructor.params).enumerate() {
            let Some(term) = *slot else {
                continue;
            };
            let term_input = input.term(i, term, param.type_id);
            let result = self.visit(&term_input, &current);
            let projection = match accessors.get(i) {
                Some(accessor) => format!("__x.{accessor}()"),
                None => "null".to_string(),
            };
            conditions.push(result.matcher.condition_on(&projection, &term_input.method_name()));
            ok &= result.ok;
            declares.extend(result.declares);
            current = result.state;
        }

        let solved = deconstructor.result_type();
        ok &= self.check_requirement(node, input, solved);
        TermResult {
            ok,
            solved,
            matcher: self.composite(solved, conditions),
            state: current,
            declares,
        }
    }
}

//! Structural patterns: tuples, lists, sets and maps.
//!
//! Terms are visited left to right (map entries key then value, the rest
//! pattern last). Set elements and map keys are looked up by value, so they
//! must be ground.

use super::input::PatternMatchInput;
use super::matcher::PatternMatcher;
use super::mode::HolesPolicy;
use super::walker::{PatternWalker, TermResult, holed};
use crate::state::StaticState;
use jadec_ast::NodeIndex;
use jadec_common::DiagnosticCode;
use jadec_common::limits::MAX_TUPLE_ARITY;
use jadec_solver::{TypeData, TypeDatabase, TypeId};

/// Terms visited so far and what they produced.
struct Terms {
    ok: bool,
    conditions: Vec<String>,
    solved: Vec<TypeId>,
    declares: Vec<(jadec_common::Atom, TypeId)>,
    state: StaticState,
}

impl Terms {
    fn new(state: &StaticState, conditions: Vec<String>) -> Self {
        Self {
            ok: true,
            conditions,
            solved: Vec::new(),
            declares: Vec::new(),
            state: state.clone(),
        }
    }

    fn push(&mut self, term: TermResult, condition: String) {
        self.ok &= term.ok;
        self.conditions.push(condition);
        self.solved.push(term.solved);
        self.declares.extend(term.declares);
        self.state = term.state;
    }

    fn finish(self, walker: &PatternWalker<'_, '_>, solved: TypeId, ok: bool) -> TermResult {
        TermResult {
            ok: self.ok && ok,
            solved,
            matcher: walker.composite(solved, self.conditions),
            state: self.state,
            declares: self.declares,
        }
    }
}

/// `size()` test: exact without a rest pattern, a lower bound with one.
fn size_condition(count: usize, rest: Option<NodeIndex>) -> String {
    match rest {
        Some(_) => format!("__x.size()>={count}"),
        None => format!("__x.size()=={count}"),
    }
}

/// Fallback for a component type the provided type does not determine.
fn unknown(provided: TypeId) -> TypeId {
    if provided.is_error() { TypeId::ERROR } else { TypeId::ANY }
}

impl PatternWalker<'_, '_> {
    /// Type covering `types`, or `any` when there are none.
    fn bound_of(&self, types: &[TypeId]) -> TypeId {
        if types.is_empty() || types.iter().any(|t| t.is_error()) {
            return TypeId::ANY;
        }
        self.cx.lattice().lub_all(types.iter().copied()).type_id
    }

    fn visit_rest(
        &mut self,
        terms: &mut Terms,
        index: usize,
        rest: NodeIndex,
        input: &PatternMatchInput,
        provided: TypeId,
        projection: String,
    ) {
        let rest_input = input.term(index, rest, provided);
        let term = self.visit(&rest_input, &terms.state);
        let condition = term.matcher.condition_on(&projection, &rest_input.method_name());
        // The rest shares the collection type: its solved type is not an
        // element type.
        terms.ok &= term.ok;
        terms.conditions.push(condition);
        terms.declares.extend(term.declares);
        terms.state = term.state;
    }

    /// `(a, b, …)`
    pub(super) fn visit_tuple(
        &mut self,
        node: NodeIndex,
        elements: &[NodeIndex],
        input: &PatternMatchInput,
        state: &StaticState,
    ) -> TermResult {
        let arity = elements.len();
        let provided = input.provided_type;
        let mut ok = true;
        if arity > MAX_TUPLE_ARITY {
            self.error(
                node,
                DiagnosticCode::TupleTooBig,
                format!("Tuples can have at most {MAX_TUPLE_ARITY} elements, found {arity}"),
            );
            ok = false;
        }
        let expected: Vec<TypeId> = match self.cx.types.tuple_elements(provided) {
            Some(types) if types.len() == arity => types.to_vec(),
            Some(types) => {
                self.error(
                    node,
                    DiagnosticCode::InvalidPatternTermsCount,
                    format!(
                        "Tuple pattern has {arity} terms, but the matched tuple has {}",
                        types.len()
                    ),
                );
                ok = false;
                vec![TypeId::ANY; arity]
            }
            None => vec![unknown(provided); arity],
        };

        let mut terms = Terms::new(state, vec![format!("__x.getLength()=={arity}")]);
        for (i, (&element, &element_type)) in elements.iter().zip(&expected).enumerate() {
            let term_input = input.term(i, element, element_type);
            let term = self.visit(&term_input, &terms.state);
            let condition = term
                .matcher
                .condition_on(&format!("__x.get({i})"), &term_input.method_name());
            terms.push(term, condition);
        }

        let solved = if terms.solved.iter().any(|t| t.is_error()) {
            TypeId::ERROR
        } else {
            self.cx.types.tuple(terms.solved.clone())
        };
        ok &= self.check_requirement(node, input, solved);
        terms.finish(self, solved, ok)
    }

    /// `[a, b | rest]`
    pub(super) fn visit_list(
        &mut self,
        node: NodeIndex,
        elements: &[NodeIndex],
        rest: Option<NodeIndex>,
        input: &PatternMatchInput,
        state: &StaticState,
    ) -> TermResult {
        let provided = input.provided_type;
        let provided_element = match self.cx.types.lookup(provided) {
            Some(TypeData::List(element)) => Some(element),
            _ => None,
        };
        let element_type = provided_element.unwrap_or_else(|| unknown(provided));

        let mut terms = Terms::new(state, vec![size_condition(elements.len(), rest)]);
        for (i, &element) in elements.iter().enumerate() {
            let term_input = input.term(i, element, element_type);
            let term = self.visit(&term_input, &terms.state);
            let condition = term
                .matcher
                .condition_on(&format!("__x.get({i})"), &term_input.method_name());
            terms.push(term, condition);
        }
        if let Some(rest) = rest {
            let count = elements.len();
            let rest_type = self.cx.types.list(element_type);
            self.visit_rest(
                &mut terms,
                count,
                rest,
                input,
                rest_type,
                format!("__x.subList({count}, __x.size())"),
            );
        }

        let solved = self
            .cx
            .types
            .list(provided_element.unwrap_or_else(|| self.bound_of(&terms.solved)));
        let ok = self.check_requirement(node, input, solved);
        terms.finish(self, solved, ok)
    }

    /// `{a, b | rest}`
    pub(super) fn visit_set(
        &mut self,
        node: NodeIndex,
        elements: &[NodeIndex],
        rest: Option<NodeIndex>,
        input: &PatternMatchInput,
        state: &StaticState,
    ) -> TermResult {
        let cx = self.cx;
        let provided = input.provided_type;
        let provided_element = match cx.types.lookup(provided) {
            Some(TypeData::Set(element)) => Some(element),
            _ => None,
        };
        let element_type = provided_element.unwrap_or_else(|| unknown(provided));

        let mut terms = Terms::new(state, vec![size_condition(elements.len(), rest)]);
        let mut values = Vec::with_capacity(elements.len());
        for (i, &element) in elements.iter().enumerate() {
            if holed(cx, element, input.mode.within_assignment, &terms.state) {
                self.error(
                    element,
                    DiagnosticCode::HoleNotAllowed,
                    "Elements of a set pattern must not contain holes".to_string(),
                );
                terms.ok = false;
                terms.conditions.push("false".to_string());
                continue;
            }
            let term_input = input
                .term(i, element, element_type)
                .with_mode(input.mode.sub_pattern().with_holes(HolesPolicy::MustBeGround));
            let term = self.visit(&term_input, &terms.state);
            let condition = match &term.matcher {
                PatternMatcher::SingleCondition { value, .. } => {
                    values.push(value.clone());
                    format!("__x.contains({value})")
                }
                _ => "false".to_string(),
            };
            terms.push(term, condition);
        }
        if let Some(rest) = rest {
            let rest_type = cx.types.set(element_type);
            let projection = format!("__x.without(java.util.Arrays.asList({}))", values.join(", "));
            self.visit_rest(&mut terms, elements.len(), rest, input, rest_type, projection);
        }

        let solved = cx
            .types
            .set(provided_element.unwrap_or_else(|| self.bound_of(&terms.solved)));
        let ok = self.check_requirement(node, input, solved);
        terms.finish(self, solved, ok)
    }

    /// `{k: v, … | rest}`
    pub(super) fn visit_map(
        &mut self,
        node: NodeIndex,
        entries: &[(NodeIndex, NodeIndex)],
        rest: Option<NodeIndex>,
        input: &PatternMatchInput,
        state: &StaticState,
    ) -> TermResult {
        let cx = self.cx;
        let provided = input.provided_type;
        let provided_types = cx.types.map_types(provided);
        let (key_type, value_type) = provided_types.unwrap_or_else(|| (unknown(provided), unknown(provided)));

        let mut terms = Terms::new(state, vec![size_condition(entries.len(), rest)]);
        let mut key_types = Vec::with_capacity(entries.len());
        let mut value_types = Vec::with_capacity(entries.len());
        let mut keys = Vec::with_capacity(entries.len());
        for (i, &(key, value)) in entries.iter().enumerate() {
            if holed(cx, key, input.mode.within_assignment, &terms.state) {
                self.error(
                    key,
                    DiagnosticCode::InvalidMapKeyPattern,
                    "Keys of a map pattern must not contain holes".to_string(),
                );
                terms.ok = false;
                terms.conditions.push("false".to_string());
                continue;
            }
            let key_input = input
                .term(2 * i, key, key_type)
                .with_mode(input.mode.sub_pattern().with_holes(HolesPolicy::MustBeGround));
            let key_term = self.visit(&key_input, &terms.state);
            let key_value = match &key_term.matcher {
                PatternMatcher::SingleCondition { value, .. } => Some(value.clone()),
                _ => None,
            };
            key_types.push(key_term.solved);
            terms.ok &= key_term.ok;
            terms.state = key_term.state;
            let Some(key_value) = key_value else {
                terms.conditions.push("false".to_string());
                continue;
            };
            terms.conditions.push(format!("__x.containsKey({key_value})"));

            let value_input = input.term(2 * i + 1, value, value_type);
            let value_term = self.visit(&value_input, &terms.state);
            let condition = value_term
                .matcher
                .condition_on(&format!("__x.get({key_value})"), &value_input.method_name());
            value_types.push(value_term.solved);
            terms.push(value_term, condition);
            keys.push(key_value);
        }
        if let Some(rest) = rest {
            let rest_type = cx.types.map(key_type, value_type);
            let projection = format!("__x.without(java.util.Arrays.asList({}))", keys.join(", "));
            self.visit_rest(&mut terms, 2 * entries.len(), rest, input, rest_type, projection);
        }

        let solved = match provided_types {
            Some((key, value)) => cx.types.map(key, value),
            None => cx.types.map(self.bound_of(&key_types), self.bound_of(&value_types)),
        };
        let ok = self.check_requirement(node, input, solved);
        terms.finish(self, solved, ok)
    }
}

use std::sync::Arc;

use assert_matches::assert_matches;

use crate::{CompileError, Context, Env, ExecutionError, Program, Value};

/// Compiles and evaluates a script against an optional prelude and
/// variable set.
pub(crate) fn try_eval(
	src: &str,
	prelude: &[&str],
	vars: &[(&str, Value)],
) -> Result<Value, ExecutionError> {
	let prelude: Vec<String> = prelude.iter().map(|s| s.to_string()).collect();
	let program = match Program::compile(src, &prelude) {
		Ok(p) => p,
		Err(e) => panic!("compile failed for `{src}`: {e}"),
	};
	let env: Env = vars
		.iter()
		.map(|(k, v)| (Arc::from(*k), v.clone()))
		.collect();
	program.execute(Context::root(), &env)
}

fn eval(src: &str) -> Value {
	try_eval(src, &[], &[]).unwrap()
}

fn eval_vars(src: &str, vars: &[(&str, Value)]) -> Value {
	try_eval(src, &[], vars).unwrap()
}

#[test]
fn arithmetic() {
	assert_eq!(eval("1 + 2"), Value::Int(3));
	assert_eq!(eval("7 - 10"), Value::Int(-3));
	assert_eq!(eval("6 * 7"), Value::Int(42));
	assert_eq!(eval("1 + 2 * 3"), Value::Int(7));
	assert_eq!(eval("(1 + 2) * 3"), Value::Int(9));
}

#[test]
fn true_division_always_floats() {
	assert_eq!(eval("7 / 2"), Value::Float(3.5));
	assert_eq!(eval("6 / 3"), Value::Float(2.0));
	assert_matches!(eval("6 / 3"), Value::Float(_));
}

#[test]
fn floor_division_and_modulo_follow_sign_of_divisor() {
	assert_eq!(eval("7 // 2"), Value::Int(3));
	assert_eq!(eval("-7 // 2"), Value::Int(-4));
	assert_eq!(eval("-7 % 2"), Value::Int(1));
	assert_eq!(eval("7 % -2"), Value::Int(-1));
	assert_eq!(eval("7.0 // 2"), Value::Float(3.0));
}

#[test]
fn power() {
	assert_eq!(eval("2 ** 10"), Value::Int(1024));
	assert_eq!(eval("-2 ** 2"), Value::Int(-4));
	assert_eq!(eval("2 ** -1"), Value::Float(0.5));
	assert_eq!(eval("2.0 ** 3"), Value::Float(8.0));
}

#[test]
fn division_by_zero() {
	assert_matches!(
		try_eval("1 / 0", &[], &[]),
		Err(ExecutionError::DivisionByZero)
	);
	assert_matches!(
		try_eval("1 % 0", &[], &[]),
		Err(ExecutionError::RemainderByZero)
	);
}

#[test]
fn string_operations() {
	assert_eq!(eval("'ab' + 'cd'"), Value::from("abcd"));
	assert_eq!(eval("'ab' * 3"), Value::from("ababab"));
	assert_eq!(eval("'b' in 'abc'"), Value::Bool(true));
	assert_eq!(eval("'abc'[1]"), Value::from("b"));
	assert_eq!(eval("'abc'[-1]"), Value::from("c"));
}

#[test]
fn comparisons() {
	assert_eq!(eval("1 < 2"), Value::Bool(true));
	assert_eq!(eval("1 < 2 <= 2 < 3"), Value::Bool(true));
	assert_eq!(eval("1 < 2 > 3"), Value::Bool(false));
	assert_eq!(eval("1 == 1.0"), Value::Bool(true));
	assert_eq!(eval("'a' != 'b'"), Value::Bool(true));
}

#[test]
fn membership() {
	assert_eq!(eval("2 in [1, 2, 3]"), Value::Bool(true));
	assert_eq!(eval("4 not in (1, 2, 3)"), Value::Bool(true));
	assert_eq!(eval("'a' in {'a': 1}"), Value::Bool(true));
	assert_eq!(eval("1 in {1, 2}"), Value::Bool(true));
}

#[test]
fn boolean_operators_return_operands() {
	assert_eq!(eval("0 or 'fallback'"), Value::from("fallback"));
	assert_eq!(eval("1 and 2"), Value::Int(2));
	assert_eq!(eval("0 and 2"), Value::Int(0));
	assert_eq!(eval("not 0"), Value::Bool(true));
}

#[test]
fn short_circuit_skips_poison() {
	// The right side would fail if evaluated.
	assert_eq!(eval("True or (1 / 0)"), Value::Bool(true));
	assert_eq!(eval("False and (1 / 0)"), Value::Bool(false));
}

#[test]
fn conditional_expression() {
	assert_eq!(eval("'yes' if 2 > 1 else 'no'"), Value::from("yes"));
	assert_eq!(eval("'yes' if 1 > 2 else 'no'"), Value::from("no"));
}

#[test]
fn collections() {
	assert_eq!(eval("[1, 2, 3][1]"), Value::Int(2));
	assert_eq!(eval("(1, 2)[0]"), Value::Int(1));
	assert_eq!(eval("{'a': 1, 'b': 2}['b']"), Value::Int(2));
	assert_eq!(eval("{'a': 1}.a"), Value::Int(1));
	assert_eq!(eval("len({1, 1, 2})"), Value::Int(2));
}

#[test]
fn negative_indexing() {
	assert_eq!(eval("[1, 2, 3][-1]"), Value::Int(3));
	assert_matches!(
		try_eval("[1, 2][5]", &[], &[]),
		Err(ExecutionError::IndexOutOfBounds(5))
	);
}

#[test]
fn unhashable_key() {
	assert_matches!(
		try_eval("{[1]: 2}", &[], &[]),
		Err(ExecutionError::UnsupportedKeyType(_))
	);
}

#[test]
fn variables_resolve_from_env() {
	assert_eq!(
		eval_vars("a * 10", &[("a", Value::Int(3))]),
		Value::Int(30)
	);
	assert_matches!(
		try_eval("missing + 1", &[], &[]),
		Err(ExecutionError::UndeclaredReference(name)) if &*name == "missing"
	);
}

#[test]
fn lambdas_and_higher_order_builtins() {
	assert_eq!(
		eval("list(map(lambda x: x * 2, [1, 2, 3]))"),
		eval("[2, 4, 6]")
	);
	assert_eq!(
		eval("filter(lambda x: x % 2 == 0, range(6))"),
		eval("[0, 2, 4]")
	);
	assert_eq!(eval("(lambda a, b: a + b)(1, 2)"), Value::Int(3));
}

#[test]
fn lambda_captures_environment() {
	let f = eval_vars("lambda v: v + offset", &[("offset", Value::Int(10))]);
	let out = Context::root().call(&f, vec![Value::Int(5)]).unwrap();
	assert_eq!(out, Value::Int(15));
}

#[test]
fn lambda_arity_is_checked() {
	let f = eval("lambda a, b: a");
	assert_matches!(
		Context::root().call(&f, vec![Value::Int(1)]),
		Err(ExecutionError::InvalidArgumentCount {
			expected: 2,
			actual: 1
		})
	);
}

#[test]
fn calling_a_non_callable_fails() {
	assert_matches!(
		try_eval("(1)(2)", &[], &[]),
		Err(ExecutionError::NotCallable(_))
	);
}

#[test]
fn comprehensions() {
	assert_eq!(eval("[x * x for x in range(4)]"), eval("[0, 1, 4, 9]"));
	assert_eq!(
		eval("[x for x in range(10) if x % 3 == 0]"),
		eval("[0, 3, 6, 9]")
	);
	assert_eq!(
		eval("[(x, y) for x in range(2) for y in range(2)]"),
		eval("[(0, 0), (0, 1), (1, 0), (1, 1)]")
	);
	assert_eq!(eval("{x % 3 for x in range(6)}"), eval("{0, 1, 2}"));
	assert_eq!(
		eval("{k: v * 10 for (k, v) in [('a', 1), ('b', 2)]}"),
		eval("{'a': 10, 'b': 20}")
	);
	assert_eq!(eval("sum(x for x in range(4))"), Value::Int(6));
}

#[test]
fn comprehension_over_nested_braces() {
	assert_eq!(eval("sum({x for x in range(3)})"), Value::Int(3));
}

#[test]
fn walrus_binds_for_later_use_in_same_expression() {
	assert_eq!(eval("[(y := 21), y * 2]"), eval("[21, 42]"));
}

#[test]
fn fstrings() {
	assert_eq!(
		eval_vars("f'{v:.2f}'", &[("v", Value::Float(3.14159))]),
		Value::from("3.14")
	);
	assert_eq!(eval("f'{1 + 1} items'"), Value::from("2 items"));
	assert_eq!(eval("f'literal {{braces}}'"), Value::from("literal {braces}"));
}

#[test]
fn formatter_shaped_lambda() {
	let f = eval("lambda v: f'{v:.2f}'");
	let out = Context::root().call(&f, vec![Value::Float(3.14159)]).unwrap();
	assert_eq!(out, Value::from("3.14"));
}

#[test]
fn builtin_aggregates() {
	assert_eq!(eval("sum([10, 20, 30])"), Value::Int(60));
	assert_eq!(eval("sum([1, 2], 10)"), Value::Int(13));
	assert_eq!(eval("sum([1.5, 2.5])"), Value::Float(4.0));
	assert_eq!(eval("min(3, 1, 2)"), Value::Int(1));
	assert_eq!(eval("max([3, 1, 2])"), Value::Int(3));
	assert_eq!(eval("abs(-3)"), Value::Int(3));
	assert_eq!(eval("len('abc')"), Value::Int(3));
}

#[test]
fn conversions() {
	assert_eq!(eval("int('42')"), Value::Int(42));
	assert_eq!(eval("int(3.9)"), Value::Int(3));
	assert_eq!(eval("float('2.5')"), Value::Float(2.5));
	assert_eq!(eval("str(20.0)"), Value::from("20.0"));
	assert_eq!(eval("bool([])"), Value::Bool(false));
	assert_eq!(eval("list('ab')"), eval("['a', 'b']"));
	assert_eq!(eval("set([1, 1, 2])"), eval("{1, 2}"));
	assert_eq!(eval("dict([('a', 1)])"), eval("{'a': 1}"));
	assert_eq!(eval("tuple([1, 2])"), eval("(1, 2)"));
}

#[test]
fn imports() {
	assert_eq!(
		try_eval("math.sqrt(16)", &["import math"], &[]).unwrap(),
		Value::Float(4.0)
	);
	assert_eq!(
		try_eval("sqrt(9)", &["from math import sqrt"], &[]).unwrap(),
		Value::Float(3.0)
	);
	assert_eq!(
		try_eval("m.floor(2.7)", &["import math as m"], &[]).unwrap(),
		Value::Int(2)
	);
	assert_eq!(
		try_eval("mean([1, 2, 3])", &["from statistics import mean"], &[]).unwrap(),
		Value::Float(2.0)
	);
}

#[test]
fn env_shadows_imports_and_builtins() {
	assert_eq!(
		try_eval("math", &["import math"], &[("math", Value::Int(1))]).unwrap(),
		Value::Int(1)
	);
}

#[test]
fn safety_policy() {
	assert_matches!(
		Program::compile("x = 5", &[]),
		Err(CompileError::DisallowedAssignment)
	);
	assert_matches!(
		Program::compile("x = 5\nx", &[]),
		Err(CompileError::DisallowedAssignment)
	);
	assert_matches!(
		Program::compile("class Foo: pass", &[]),
		Err(CompileError::DisallowedClassDef)
	);
	assert_matches!(
		Program::compile("def f(): return 1", &[]),
		Err(CompileError::DisallowedFunctionDef)
	);
	assert_matches!(
		Program::compile("", &[]),
		Err(CompileError::EmptyExpression)
	);
	assert_matches!(
		Program::compile("import math", &[]),
		Err(CompileError::NotAnExpression)
	);
}

#[test]
fn prelude_policy() {
	assert_matches!(
		Program::compile("1", &["1 + 1".to_string()]),
		Err(CompileError::InvalidImport(_))
	);
	assert_matches!(
		Program::compile("1", &["import os".to_string()]),
		Err(CompileError::UnknownModule(m)) if m == "os"
	);
}

#[test]
fn multiple_statements_keep_only_the_last() {
	let program = Program::compile("1 + 1\n2 + 2", &[]).unwrap();
	let out = program.execute(Context::root(), &Env::new()).unwrap();
	assert_eq!(out, Value::Int(4));
}

#[test]
fn analysis_is_exposed() {
	let program = Program::compile("a + b", &[]).unwrap();
	let names: Vec<&str> = program
		.analysis()
		.unbound
		.iter()
		.map(|s| s.as_ref())
		.collect();
	assert_eq!(names, vec!["a", "b"]);
	assert_eq!(program.analysis().sole_dependency, None);

	let program = Program::compile("pi", &[]).unwrap();
	assert_eq!(program.analysis().sole_dependency.as_deref(), Some("pi"));
}

#[test]
fn type_tags_and_unions() {
	assert_eq!(eval("str(int)"), Value::from("<class 'int'>"));
	let t = eval("int | float");
	assert_matches!(t, Value::Type(_));
	let list_of_int = eval("list[int]");
	match list_of_int {
		Value::Type(spec) => {
			assert!(spec.check(&eval("[1, 2]")));
			assert!(!spec.check(&eval("[1.0]")));
		},
		other => panic!("unexpected {other:?}"),
	}
}

#[test]
fn environment_is_not_mutated_by_walrus() {
	let env: Env = [(Arc::from("a"), Value::Int(1))].into_iter().collect();
	let program = Program::compile("[(a := 99), a]", &[]).unwrap();
	let out = program.execute(Context::root(), &env).unwrap();
	assert_eq!(out, eval("[99, 99]"));
	// The caller's environment still sees the original binding.
	assert_eq!(env.get("a"), Some(Value::Int(1)));
}

#[test]
fn set_operations() {
	assert_eq!(eval("{1, 2} | {2, 3}"), eval("{1, 2, 3}"));
	assert_eq!(eval("{1, 2, 3} - {2}"), eval("{1, 3}"));
}

#[test]
fn map_iteration_yields_keys() {
	assert_eq!(eval("[k for k in {'a': 1, 'b': 2}]"), eval("['a', 'b']"));
}

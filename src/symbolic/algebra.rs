//! 布尔函数代数抽象：可达性引擎只通过该 trait 使用决策图后端.
use std::fmt::Debug;
use std::hash::Hash;

use num_bigint::BigUint;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlgebraError {
    #[error("variable '{0}' is not declared in this context")]
    UndeclaredVariable(String),
    #[error("variable '{0}' is declared twice")]
    DuplicateVariable(String),
    #[error("variable name '{0}' contains a reserved character")]
    InvalidName(String),
    #[error("variables are already declared in this context")]
    AlreadyDeclared,
    #[error("{requested} variables exceed the backend limit of {limit}")]
    TooManyVariables { requested: usize, limit: usize },
    #[error("cannot rename {from} to {to}: {to} already occurs in the function")]
    RenameCollision { from: String, to: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Exists,
    ForAll,
}

/// A context of Boolean functions with structural sharing.
///
/// Every operation returns a new immutable value; the context owns the variable
/// table and is the only mutable state. Values from different contexts must not
/// be mixed.
pub trait BooleanAlgebra {
    type Value: Clone + Debug + PartialEq;
    type Var: Copy + Eq + Ord + Hash + Debug;

    /// Declares all variables of the context in the given order, which is also
    /// the variable order of the diagrams. May be called once.
    fn declare(&mut self, names: &[String]) -> Result<Vec<Self::Var>, AlgebraError>;

    /// Looks up a declared variable by name.
    fn variable(&self, name: &str) -> Result<Self::Var, AlgebraError>;

    fn name_of(&self, var: Self::Var) -> String;

    /// The function that is true exactly when `var` is true.
    fn var(&self, name: &str) -> Result<Self::Value, AlgebraError> {
        Ok(self.literal(self.variable(name)?, true))
    }

    fn literal(&self, var: Self::Var, positive: bool) -> Self::Value;

    fn constant(&self, value: bool) -> Self::Value;

    fn and(&self, left: &Self::Value, right: &Self::Value) -> Self::Value;

    fn or(&self, left: &Self::Value, right: &Self::Value) -> Self::Value;

    fn not(&self, value: &Self::Value) -> Self::Value;

    fn iff(&self, left: &Self::Value, right: &Self::Value) -> Self::Value;

    fn quantify(&self, value: &Self::Value, vars: &[Self::Var], quantifier: Quantifier) -> Self::Value;

    /// Renames variables according to `(from, to)` pairs. The targets must not
    /// occur in `value`.
    fn substitute(
        &self,
        value: &Self::Value,
        renaming: &[(Self::Var, Self::Var)],
    ) -> Result<Self::Value, AlgebraError>;

    fn equals(&self, left: &Self::Value, right: &Self::Value) -> bool {
        left == right
    }

    fn is_false(&self, value: &Self::Value) -> bool;

    /// Number of satisfying assignments in a universe of `num_vars` variables.
    ///
    /// `value` must depend on at most `num_vars` of the declared variables; the
    /// remaining declared variables are treated as absent, not as free.
    fn count_satisfying(&self, value: &Self::Value, num_vars: usize) -> BigUint;

    fn node_count(&self, value: &Self::Value) -> usize;

    /// Satisfying assignments of `value` projected onto `vars`, one bool per var.
    fn assignments(&self, value: &Self::Value, vars: &[Self::Var]) -> Vec<Vec<bool>>;
}

/// Conjunction of a sequence of values, `true` when empty.
pub fn conjunction<'a, A, I>(algebra: &A, values: I) -> A::Value
where
    A: BooleanAlgebra,
    A::Value: 'a,
    I: IntoIterator<Item = &'a A::Value>,
{
    values
        .into_iter()
        .fold(algebra.constant(true), |acc, v| algebra.and(&acc, v))
}

/// Disjunction of a sequence of values, `false` when empty.
pub fn disjunction<'a, A, I>(algebra: &A, values: I) -> A::Value
where
    A: BooleanAlgebra,
    A::Value: 'a,
    I: IntoIterator<Item = &'a A::Value>,
{
    values
        .into_iter()
        .fold(algebra.constant(false), |acc, v| algebra.or(&acc, v))
}

//! [`BooleanAlgebra`] backed by `biodivine-lib-bdd`.
use std::ops::{Shl, Shr};

use biodivine_lib_bdd::{Bdd, BddVariable, BddVariableSet, BddVariableSetBuilder};
use num_bigint::BigUint;
use rustc_hash::FxHashSet;

use super::algebra::{AlgebraError, BooleanAlgebra, Quantifier};

/// Characters the backend's expression syntax reserves; names containing them are refused.
const RESERVED_CHARS: [char; 11] = ['!', '&', '|', '^', '=', '<', '>', '(', ')', '?', ':'];

/// One decision-diagram context. Variables are declared once; the order of
/// declaration is the diagram order.
pub struct BddContext {
    variables: BddVariableSet,
    declared: bool,
}

impl Default for BddContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BddContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BddContext")
            .field("num_vars", &self.variables.num_vars())
            .finish()
    }
}

impl BddContext {
    /// Largest number of variables the backend accepts.
    pub const MAX_VARIABLES: usize = (u16::MAX - 1) as usize;

    pub fn new() -> Self {
        Self {
            variables: BddVariableSet::new(&[]),
            declared: false,
        }
    }

    pub fn num_vars(&self) -> usize {
        usize::from(self.variables.num_vars())
    }

    pub fn variable_set(&self) -> &BddVariableSet {
        &self.variables
    }

    fn rename(&self, value: &Bdd, from: BddVariable, to: BddVariable) -> Result<Bdd, AlgebraError> {
        if from == to {
            return Ok(value.clone());
        }
        let support = value.support_set();
        if support.contains(&to) {
            return Err(AlgebraError::RenameCollision {
                from: self.variables.name_of(from),
                to: self.variables.name_of(to),
            });
        }
        if !support.contains(&from) {
            return Ok(value.clone());
        }

        let (low, high) = if from < to { (from, to) } else { (to, from) };
        let adjacent = !support.iter().any(|v| *v > low && *v < high);
        if adjacent {
            let mut renamed = value.clone();
            // SAFETY: no variable of the support lies between `from` and `to`,
            // so relabeling the nodes keeps the diagram ordered.
            unsafe {
                renamed.rename_variable(from, to);
            }
            Ok(renamed)
        } else {
            let link = self
                .variables
                .mk_var(from)
                .iff(&self.variables.mk_var(to));
            Ok(value.and(&link).var_exists(from))
        }
    }
}

impl BooleanAlgebra for BddContext {
    type Value = Bdd;
    type Var = BddVariable;

    fn declare(&mut self, names: &[String]) -> Result<Vec<BddVariable>, AlgebraError> {
        if self.declared {
            return Err(AlgebraError::AlreadyDeclared);
        }
        if names.len() > Self::MAX_VARIABLES {
            return Err(AlgebraError::TooManyVariables {
                requested: names.len(),
                limit: Self::MAX_VARIABLES,
            });
        }
        if let Some(bad) = names
            .iter()
            .find(|name| name.chars().any(|c| RESERVED_CHARS.contains(&c)))
        {
            return Err(AlgebraError::InvalidName(bad.clone()));
        }
        let mut seen = FxHashSet::default();
        if let Some(dup) = names.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(AlgebraError::DuplicateVariable(dup.clone()));
        }

        let mut builder = BddVariableSetBuilder::new();
        let vars = names
            .iter()
            .map(|name| builder.make_variable(name))
            .collect();
        self.variables = builder.build();
        self.declared = true;
        Ok(vars)
    }

    fn variable(&self, name: &str) -> Result<BddVariable, AlgebraError> {
        self.variables
            .var_by_name(name)
            .ok_or_else(|| AlgebraError::UndeclaredVariable(name.to_owned()))
    }

    fn name_of(&self, var: BddVariable) -> String {
        self.variables.name_of(var)
    }

    fn literal(&self, var: BddVariable, positive: bool) -> Bdd {
        self.variables.mk_literal(var, positive)
    }

    fn constant(&self, value: bool) -> Bdd {
        if value {
            self.variables.mk_true()
        } else {
            self.variables.mk_false()
        }
    }

    fn and(&self, left: &Bdd, right: &Bdd) -> Bdd {
        left.and(right)
    }

    fn or(&self, left: &Bdd, right: &Bdd) -> Bdd {
        left.or(right)
    }

    fn not(&self, value: &Bdd) -> Bdd {
        value.not()
    }

    fn iff(&self, left: &Bdd, right: &Bdd) -> Bdd {
        left.iff(right)
    }

    fn quantify(&self, value: &Bdd, vars: &[BddVariable], quantifier: Quantifier) -> Bdd {
        match quantifier {
            Quantifier::Exists => value.exists(vars),
            Quantifier::ForAll => value.for_all(vars),
        }
    }

    fn substitute(
        &self,
        value: &Bdd,
        renaming: &[(BddVariable, BddVariable)],
    ) -> Result<Bdd, AlgebraError> {
        renaming
            .iter()
            .try_fold(value.clone(), |acc, &(from, to)| self.rename(&acc, from, to))
    }

    fn is_false(&self, value: &Bdd) -> bool {
        value.is_false()
    }

    fn count_satisfying(&self, value: &Bdd, num_vars: usize) -> BigUint {
        let total = self.num_vars();
        let count = value.exact_cardinality().magnitude().clone();
        if num_vars <= total {
            count.shr(total - num_vars)
        } else {
            count.shl(num_vars - total)
        }
    }

    fn node_count(&self, value: &Bdd) -> usize {
        value.size()
    }

    fn assignments(&self, value: &Bdd, vars: &[BddVariable]) -> Vec<Vec<bool>> {
        // Fix every other variable to false so each projected assignment is seen once.
        let keep: FxHashSet<BddVariable> = vars.iter().copied().collect();
        let ignored: Vec<BddVariable> = self
            .variables
            .variables()
            .into_iter()
            .filter(|v| !keep.contains(v))
            .collect();
        let fixed: Vec<(BddVariable, bool)> = ignored.iter().map(|v| (*v, false)).collect();
        let projected = value.exists(&ignored).select(&fixed);
        projected
            .sat_valuations()
            .map(|valuation| vars.iter().map(|v| valuation.value(*v)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(names: &[&str]) -> (BddContext, Vec<BddVariable>) {
        let mut ctx = BddContext::new();
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        let vars = ctx.declare(&names).unwrap();
        (ctx, vars)
    }

    #[test]
    fn declare_only_once_and_rejects_duplicates() {
        let mut ctx = BddContext::new();
        assert_eq!(
            ctx.declare(&["a".into(), "a".into()]),
            Err(AlgebraError::DuplicateVariable("a".into()))
        );
        ctx.declare(&["a".into()]).unwrap();
        assert_eq!(ctx.declare(&["b".into()]), Err(AlgebraError::AlreadyDeclared));
        assert!(matches!(
            ctx.var("zzz"),
            Err(AlgebraError::UndeclaredVariable(_))
        ));
    }

    #[test]
    fn reserved_characters_are_an_error() {
        let mut ctx = BddContext::new();
        assert_eq!(
            ctx.declare(&["ok".into(), "p:1".into()]),
            Err(AlgebraError::InvalidName("p:1".into()))
        );
        assert_eq!(
            ctx.declare(&["Place (1)".into()]),
            Err(AlgebraError::InvalidName("Place (1)".into()))
        );
        // rejected declarations leave the context empty
        assert_eq!(ctx.declare(&["x".into(), "x'".into()]).unwrap().len(), 2);
    }

    #[test]
    fn count_ignores_absent_variables() {
        let (ctx, v) = context(&["x0", "x0'", "x1", "x1'"]);
        let f = ctx.or(&ctx.literal(v[0], true), &ctx.literal(v[2], true));
        assert_eq!(ctx.count_satisfying(&f, 2), BigUint::from(3u32));
        assert_eq!(ctx.count_satisfying(&ctx.constant(false), 2), BigUint::from(0u32));
    }

    #[test]
    fn substitute_adjacent_and_distant() {
        let (ctx, v) = context(&["a", "a'", "b", "b'"]);
        // a' & !b'  renamed to  a & !b
        let primed = ctx.and(&ctx.literal(v[1], true), &ctx.literal(v[3], false));
        let expected = ctx.and(&ctx.literal(v[0], true), &ctx.literal(v[2], false));
        let renamed = ctx.substitute(&primed, &[(v[1], v[0]), (v[3], v[2])]).unwrap();
        assert!(ctx.equals(&renamed, &expected));

        // a' -> b' with b between them in the support of the function
        let f = ctx.and(&ctx.literal(v[1], true), &ctx.literal(v[2], true));
        let g = ctx.substitute(&f, &[(v[1], v[3])]).unwrap();
        let expected = ctx.and(&ctx.literal(v[2], true), &ctx.literal(v[3], true));
        assert!(ctx.equals(&g, &expected));
    }

    #[test]
    fn substitute_rejects_existing_target() {
        let (ctx, v) = context(&["a", "a'"]);
        let f = ctx.and(&ctx.literal(v[0], true), &ctx.literal(v[1], false));
        assert!(matches!(
            ctx.substitute(&f, &[(v[1], v[0])]),
            Err(AlgebraError::RenameCollision { .. })
        ));
    }

    #[test]
    fn quantifiers_and_assignments() {
        let (ctx, v) = context(&["a", "b"]);
        let f = ctx.iff(&ctx.literal(v[0], true), &ctx.literal(v[1], true));
        assert!(ctx.equals(&ctx.quantify(&f, &[v[1]], Quantifier::Exists), &ctx.constant(true)));
        assert!(ctx.is_false(&ctx.quantify(&f, &[v[1]], Quantifier::ForAll)));

        let mut models = ctx.assignments(&f, &[v[0]]);
        models.sort();
        assert_eq!(models, vec![vec![false], vec![true]]);
        assert_eq!(ctx.assignments(&f, &v).len(), 2);
    }
}

//! Evaluator: runs a parsed scriptlet inside a fresh, bounded environment
//!
//! Each run starts from nothing but the supplied context: context values are
//! copied in on first read, every assignment lands in a run-local binding
//! table, and the table is handed back when the last statement finishes.
//! Nothing survives between runs.
//!
//! Two guardrails bound a run: a step budget charged on every expression
//! node and every comprehension or aggregation element, and a wall-clock
//! deadline checked at the same points. Either one failing aborts the run
//! with all per-run state dropped.

use crate::errors::{ScriptError, ScriptResult};
use crate::parser::{BinaryOp, Expr, Parser, Statement, UnaryOp, MAX_EXPR_DEPTH};
use crate::value::{OutputBindings, ScriptContext, Value};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Resource ceilings for one script execution
#[derive(Debug, Clone)]
pub struct ScriptLimits {
    /// Evaluation steps before the run is aborted
    pub max_steps: u64,
    /// Wall-clock ceiling for one run
    pub timeout: Duration,
}

impl Default for ScriptLimits {
    fn default() -> Self {
        Self {
            max_steps: 100_000,
            timeout: Duration::from_secs(2),
        }
    }
}

/// Restricted script engine.
///
/// Stateless between runs: the engine owns nothing but its limits, so it can
/// be shared and reused freely without one execution observing another.
#[derive(Debug, Clone, Default)]
pub struct ScriptEngine {
    limits: ScriptLimits,
}

impl ScriptEngine {
    pub fn new(limits: ScriptLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ScriptLimits {
        &self.limits
    }

    /// Parse and execute `script` against `context`, returning the names the
    /// script assigned. Every failure mode is a [`ScriptError`]; the error
    /// text carries script-visible information only.
    pub fn run(&self, script: &str, context: &ScriptContext) -> ScriptResult<OutputBindings> {
        let execution_id = Uuid::new_v4();
        tracing::debug!(
            %execution_id,
            script_bytes = script.len(),
            context_names = context.len(),
            "script execution started"
        );

        let program = match Parser::parse(script) {
            Ok(program) => program,
            Err(err) => {
                tracing::warn!(%execution_id, error = %err, "script rejected at parse time");
                return Err(err);
            }
        };

        let mut run = Evaluator::new(context, self.limits.clone());
        for statement in &program.statements {
            if let Err(err) = run.execute(statement) {
                tracing::warn!(
                    %execution_id,
                    line = statement.line,
                    error = %err,
                    "script execution failed"
                );
                return Err(err);
            }
        }

        let (bindings, steps) = run.finish();
        tracing::debug!(
            %execution_id,
            steps,
            bindings = bindings.len(),
            "script execution completed"
        );
        Ok(bindings)
    }
}

/// Per-run evaluation state. Created for one execution and consumed by it.
struct Evaluator<'a> {
    context: &'a ScriptContext,
    limits: ScriptLimits,
    deadline: Instant,
    steps: u64,
    depth: usize,
    bindings: OutputBindings,
    /// Comprehension variables, innermost last
    scopes: Vec<(String, Value)>,
}

impl<'a> Evaluator<'a> {
    fn new(context: &'a ScriptContext, limits: ScriptLimits) -> Self {
        let deadline = Instant::now() + limits.timeout;
        Self {
            context,
            limits,
            deadline,
            steps: 0,
            depth: 0,
            bindings: BTreeMap::new(),
            scopes: Vec::new(),
        }
    }

    fn finish(self) -> (OutputBindings, u64) {
        (self.bindings, self.steps)
    }

    fn execute(&mut self, statement: &Statement) -> ScriptResult<()> {
        let value = self.eval(&statement.expr)?;
        self.bindings.insert(statement.name.clone(), value);
        Ok(())
    }

    /// Charge one step and enforce both ceilings
    fn tick(&mut self) -> ScriptResult<()> {
        self.steps += 1;
        if self.steps > self.limits.max_steps {
            return Err(ScriptError::StepBudgetExhausted(self.limits.max_steps));
        }
        if Instant::now() >= self.deadline {
            return Err(ScriptError::TimedOut(self.limits.timeout));
        }
        Ok(())
    }

    /// Recursion gateway for expression evaluation. Trees from the parser
    /// stay within [`MAX_EXPR_DEPTH`], so the headroom here never binds on a
    /// parsed program.
    fn eval(&mut self, expr: &Expr) -> ScriptResult<Value> {
        if self.depth >= MAX_EXPR_DEPTH * 2 {
            return Err(ScriptError::NestingTooDeep(MAX_EXPR_DEPTH * 2));
        }
        self.depth += 1;
        let value = self.eval_node(expr);
        self.depth -= 1;
        value
    }

    fn eval_node(&mut self, expr: &Expr) -> ScriptResult<Value> {
        self.tick()?;

        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Name(name) => self.lookup(name),
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item)?);
                }
                Ok(Value::List(values))
            }
            Expr::Map(entries) => {
                let mut map = BTreeMap::new();
                for (key, value) in entries {
                    let key = self.eval_map_key(key)?;
                    let value = self.eval(value)?;
                    map.insert(key, value);
                }
                Ok(Value::Map(map))
            }
            Expr::Unary { op, operand } => self.eval_unary(*op, operand),
            // and / or short-circuit and yield the deciding operand
            Expr::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => {
                let value = self.eval(left)?;
                if !value.truthy() {
                    Ok(value)
                } else {
                    self.eval(right)
                }
            }
            Expr::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                let value = self.eval(left)?;
                if value.truthy() {
                    Ok(value)
                } else {
                    self.eval(right)
                }
            }
            Expr::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                self.eval_binary(*op, left, right)
            }
            Expr::Conditional {
                then,
                cond,
                otherwise,
            } => {
                if self.eval(cond)?.truthy() {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            Expr::Field { target, field } => self.eval_field(target, field),
            Expr::Index { target, index } => self.eval_index(target, index),
            Expr::Call { function, args } => self.eval_call(function, args),
            Expr::ListComp {
                element,
                var,
                iterable,
                filter,
            } => self.eval_list_comp(element, var, iterable, filter.as_deref()),
            Expr::MapComp {
                key,
                value,
                var,
                iterable,
                filter,
            } => self.eval_map_comp(key, value, var, iterable, filter.as_deref()),
        }
    }

    /// Name resolution: comprehension scopes, then this run's bindings, then
    /// the read-only context. Context values are cloned out, never borrowed.
    fn lookup(&self, name: &str) -> ScriptResult<Value> {
        for (var, value) in self.scopes.iter().rev() {
            if var == name {
                return Ok(value.clone());
            }
        }
        if let Some(value) = self.bindings.get(name) {
            return Ok(value.clone());
        }
        if let Some(value) = self.context.get(name) {
            return Ok(value.clone());
        }
        Err(ScriptError::UnknownName(name.to_string()))
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr) -> ScriptResult<Value> {
        let value = self.eval(operand)?;
        match op {
            UnaryOp::Not => Ok(Value::Bool(!value.truthy())),
            UnaryOp::Neg => match value {
                Value::Number(n) => Ok(Value::Number(-n)),
                other => Err(ScriptError::TypeMismatch {
                    operation: "unary '-'".into(),
                    expected: "number".into(),
                    found: other.type_name().into(),
                }),
            },
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, left: Value, right: Value) -> ScriptResult<Value> {
        match op {
            // Reached only when the short-circuit arms are bypassed
            BinaryOp::And => Ok(if !left.truthy() { left } else { right }),
            BinaryOp::Or => Ok(if left.truthy() { left } else { right }),
            BinaryOp::Eq => Ok(Value::Bool(left == right)),
            BinaryOp::NotEq => Ok(Value::Bool(left != right)),
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                let ordering = match (&left, &right) {
                    (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
                    (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                    _ => None,
                };
                match ordering {
                    Some(ordering) => {
                        let keep = match op {
                            BinaryOp::Lt => ordering.is_lt(),
                            BinaryOp::LtEq => ordering.is_le(),
                            BinaryOp::Gt => ordering.is_gt(),
                            _ => ordering.is_ge(),
                        };
                        Ok(Value::Bool(keep))
                    }
                    None => Err(Self::binary_type_error(
                        op,
                        "two numbers or two strings",
                        &left,
                        &right,
                    )),
                }
            }
            BinaryOp::Add => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Self::finite(a + b, "+"),
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
                (left, right) => Err(Self::binary_type_error(
                    op,
                    "two numbers or two strings",
                    &left,
                    &right,
                )),
            },
            BinaryOp::Sub => {
                let (a, b) = Self::numeric_operands(op, left, right)?;
                Self::finite(a - b, "-")
            }
            BinaryOp::Mul => {
                let (a, b) = Self::numeric_operands(op, left, right)?;
                Self::finite(a * b, "*")
            }
            BinaryOp::Div => {
                let (a, b) = Self::numeric_operands(op, left, right)?;
                if b == 0.0 {
                    return Err(ScriptError::DivisionByZero);
                }
                Self::finite(a / b, "/")
            }
            BinaryOp::Rem => {
                let (a, b) = Self::numeric_operands(op, left, right)?;
                if b == 0.0 {
                    return Err(ScriptError::DivisionByZero);
                }
                Self::finite(a % b, "%")
            }
        }
    }

    fn eval_field(&mut self, target: &Expr, field: &str) -> ScriptResult<Value> {
        // In field position the name `math` always means the builtin
        // namespace; it is not resolvable as a value.
        if matches!(target, Expr::Name(name) if name == "math") {
            return match field {
                "pi" => Ok(Value::Number(std::f64::consts::PI)),
                "e" => Ok(Value::Number(std::f64::consts::E)),
                _ => Err(ScriptError::UnknownName(format!("math.{}", field))),
            };
        }

        let value = self.eval(target)?;
        match value {
            Value::Map(entries) => entries
                .get(field)
                .cloned()
                .ok_or_else(|| ScriptError::UnknownField(field.to_string())),
            other => Err(ScriptError::TypeMismatch {
                operation: format!(".{}", field),
                expected: "map".into(),
                found: other.type_name().into(),
            }),
        }
    }

    fn eval_index(&mut self, target: &Expr, index: &Expr) -> ScriptResult<Value> {
        let target = self.eval(target)?;
        let index = self.eval(index)?;

        match (target, index) {
            (Value::List(items), Value::Number(n)) => {
                if n.fract() != 0.0 {
                    return Err(ScriptError::TypeMismatch {
                        operation: "list index".into(),
                        expected: "integer".into(),
                        found: "fractional number".into(),
                    });
                }
                let idx = n as i64;
                if idx < 0 || idx as usize >= items.len() {
                    return Err(ScriptError::IndexOutOfBounds {
                        index: idx,
                        len: items.len(),
                    });
                }
                Ok(items[idx as usize].clone())
            }
            (Value::Map(entries), Value::Str(key)) => entries
                .get(&key)
                .cloned()
                .ok_or(ScriptError::UnknownKey(key)),
            (target, index) => Err(ScriptError::TypeMismatch {
                operation: "indexing".into(),
                expected: "list[integer] or map[string]".into(),
                found: format!("{}[{}]", target.type_name(), index.type_name()),
            }),
        }
    }

    fn eval_call(&mut self, function: &str, args: &[Expr]) -> ScriptResult<Value> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg)?);
        }

        match function {
            "len" => Self::builtin_len(values),
            "sum" => self.builtin_sum(values),
            "min" => self.builtin_extreme("min", values),
            "max" => self.builtin_extreme("max", values),
            "abs" => Self::builtin_numeric("abs", values, f64::abs),
            "round" => Self::builtin_numeric("round", values, f64::round),
            "unique" => self.builtin_unique(values),
            "math.sqrt" => Self::builtin_numeric("math.sqrt", values, f64::sqrt),
            "math.floor" => Self::builtin_numeric("math.floor", values, f64::floor),
            "math.ceil" => Self::builtin_numeric("math.ceil", values, f64::ceil),
            "math.exp" => Self::builtin_numeric("math.exp", values, f64::exp),
            "math.log" => Self::builtin_numeric("math.log", values, f64::ln),
            "math.log10" => Self::builtin_numeric("math.log10", values, f64::log10),
            "math.pow" => Self::builtin_pow(values),
            _ => Err(ScriptError::UnknownFunction(function.to_string())),
        }
    }

    fn eval_list_comp(
        &mut self,
        element: &Expr,
        var: &str,
        iterable: &Expr,
        filter: Option<&Expr>,
    ) -> ScriptResult<Value> {
        let items = self.eval_comp_source(iterable)?;

        let mut out = Vec::new();
        for item in items {
            self.tick()?;
            self.scopes.push((var.to_string(), item));
            let produced = self.comp_element(element, filter);
            self.scopes.pop();
            if let Some(value) = produced? {
                out.push(value);
            }
        }
        Ok(Value::List(out))
    }

    fn eval_map_comp(
        &mut self,
        key: &Expr,
        value: &Expr,
        var: &str,
        iterable: &Expr,
        filter: Option<&Expr>,
    ) -> ScriptResult<Value> {
        let items = self.eval_comp_source(iterable)?;

        let mut out = BTreeMap::new();
        for item in items {
            self.tick()?;
            self.scopes.push((var.to_string(), item));
            let produced = self.comp_entry(key, value, filter);
            self.scopes.pop();
            if let Some((k, v)) = produced? {
                out.insert(k, v);
            }
        }
        Ok(Value::Map(out))
    }

    fn eval_comp_source(&mut self, iterable: &Expr) -> ScriptResult<Vec<Value>> {
        let source = self.eval(iterable)?;
        match source {
            Value::List(items) => Ok(items),
            other => Err(ScriptError::TypeMismatch {
                operation: "comprehension".into(),
                expected: "list".into(),
                found: other.type_name().into(),
            }),
        }
    }

    fn comp_element(&mut self, element: &Expr, filter: Option<&Expr>) -> ScriptResult<Option<Value>> {
        if let Some(filter) = filter {
            if !self.eval(filter)?.truthy() {
                return Ok(None);
            }
        }
        Ok(Some(self.eval(element)?))
    }

    fn comp_entry(
        &mut self,
        key: &Expr,
        value: &Expr,
        filter: Option<&Expr>,
    ) -> ScriptResult<Option<(String, Value)>> {
        if let Some(filter) = filter {
            if !self.eval(filter)?.truthy() {
                return Ok(None);
            }
        }
        let key = self.eval_map_key(key)?;
        let value = self.eval(value)?;
        Ok(Some((key, value)))
    }

    fn eval_map_key(&mut self, expr: &Expr) -> ScriptResult<String> {
        let value = self.eval(expr)?;
        match value {
            Value::Str(s) => Ok(s),
            other => Err(ScriptError::TypeMismatch {
                operation: "map key".into(),
                expected: "string".into(),
                found: other.type_name().into(),
            }),
        }
    }

    // ── Builtins ─────────────────────────────────────────────────────

    fn builtin_len(values: Vec<Value>) -> ScriptResult<Value> {
        let value = Self::one_arg("len", values)?;
        let len = match &value {
            Value::Str(s) => s.chars().count(),
            Value::List(items) => items.len(),
            Value::Map(entries) => entries.len(),
            other => {
                return Err(ScriptError::TypeMismatch {
                    operation: "len".into(),
                    expected: "string, list, or map".into(),
                    found: other.type_name().into(),
                })
            }
        };
        Ok(Value::Number(len as f64))
    }

    fn builtin_sum(&mut self, values: Vec<Value>) -> ScriptResult<Value> {
        let value = Self::one_arg("sum", values)?;
        let items = Self::list_arg("sum", &value)?;

        let mut total = 0.0;
        for item in items {
            self.tick()?;
            match item.as_number() {
                Some(n) => total += n,
                None => {
                    return Err(ScriptError::TypeMismatch {
                        operation: "sum".into(),
                        expected: "list of numbers".into(),
                        found: format!("{} element", item.type_name()),
                    })
                }
            }
        }
        Self::finite(total, "sum")
    }

    fn builtin_extreme(&mut self, name: &str, values: Vec<Value>) -> ScriptResult<Value> {
        let value = Self::one_arg(name, values)?;
        let items = Self::list_arg(name, &value)?;

        let mut best: Option<f64> = None;
        for item in items {
            self.tick()?;
            match item.as_number() {
                Some(n) => {
                    best = Some(match best {
                        None => n,
                        Some(b) if name == "min" => b.min(n),
                        Some(b) => b.max(n),
                    });
                }
                None => {
                    return Err(ScriptError::TypeMismatch {
                        operation: name.to_string(),
                        expected: "list of numbers".into(),
                        found: format!("{} element", item.type_name()),
                    })
                }
            }
        }

        best.map(Value::Number)
            .ok_or_else(|| ScriptError::EmptyList(name.to_string()))
    }

    fn builtin_unique(&mut self, values: Vec<Value>) -> ScriptResult<Value> {
        let value = Self::one_arg("unique", values)?;
        let items = Self::list_arg("unique", &value)?;

        // First-seen order preserved
        let mut out: Vec<Value> = Vec::new();
        for item in items {
            self.tick()?;
            if !out.contains(item) {
                out.push(item.clone());
            }
        }
        Ok(Value::List(out))
    }

    fn builtin_numeric(name: &str, values: Vec<Value>, f: fn(f64) -> f64) -> ScriptResult<Value> {
        let value = Self::one_arg(name, values)?;
        match value {
            Value::Number(n) => Self::finite(f(n), name),
            other => Err(ScriptError::TypeMismatch {
                operation: name.to_string(),
                expected: "number".into(),
                found: other.type_name().into(),
            }),
        }
    }

    fn builtin_pow(values: Vec<Value>) -> ScriptResult<Value> {
        let [base, exponent] = Self::two_args("math.pow", values)?;
        match (base, exponent) {
            (Value::Number(a), Value::Number(b)) => Self::finite(a.powf(b), "math.pow"),
            (base, exponent) => Err(ScriptError::TypeMismatch {
                operation: "math.pow".into(),
                expected: "two numbers".into(),
                found: format!("{} and {}", base.type_name(), exponent.type_name()),
            }),
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn one_arg(name: &str, values: Vec<Value>) -> ScriptResult<Value> {
        let [value] = <[Value; 1]>::try_from(values).map_err(|values| ScriptError::Arity {
            name: name.to_string(),
            expected: 1,
            found: values.len(),
        })?;
        Ok(value)
    }

    fn two_args(name: &str, values: Vec<Value>) -> ScriptResult<[Value; 2]> {
        <[Value; 2]>::try_from(values).map_err(|values| ScriptError::Arity {
            name: name.to_string(),
            expected: 2,
            found: values.len(),
        })
    }

    fn list_arg<'v>(name: &str, value: &'v Value) -> ScriptResult<&'v [Value]> {
        value.as_list().ok_or_else(|| ScriptError::TypeMismatch {
            operation: name.to_string(),
            expected: "list".into(),
            found: value.type_name().into(),
        })
    }

    fn finite(n: f64, op: &str) -> ScriptResult<Value> {
        if n.is_finite() {
            Ok(Value::Number(n))
        } else {
            Err(ScriptError::NonFiniteResult(op.to_string()))
        }
    }

    fn numeric_operands(op: BinaryOp, left: Value, right: Value) -> ScriptResult<(f64, f64)> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok((a, b)),
            (left, right) => Err(Self::binary_type_error(op, "two numbers", &left, &right)),
        }
    }

    fn binary_type_error(op: BinaryOp, expected: &str, left: &Value, right: &Value) -> ScriptError {
        ScriptError::TypeMismatch {
            operation: format!("'{}'", op.symbol()),
            expected: expected.into(),
            found: format!("{} and {}", left.type_name(), right.type_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, Value)]) -> Value {
        let mut map = BTreeMap::new();
        for (key, value) in pairs {
            map.insert(key.to_string(), value.clone());
        }
        Value::Map(map)
    }

    fn transactions_context(amounts: &[f64]) -> ScriptContext {
        let records: Vec<Value> = amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| {
                record(&[
                    ("id", Value::Number(i as f64 + 1.0)),
                    ("amount", Value::Number(*amount)),
                ])
            })
            .collect();
        ScriptContext::new().with("transactions", Value::List(records))
    }

    #[test]
    fn test_run_refinement_shaped_script() {
        let script = "\
scores = [abs(t.amount) for t in transactions]
threshold = max(scores) * 0.8 if scores else 0
flags = [s >= threshold for s in scores]
";
        let context = transactions_context(&[10.0, 1000.0, 50.0]);
        let bindings = ScriptEngine::default().run(script, &context).unwrap();

        assert_eq!(
            bindings.get("scores"),
            Some(&Value::List(vec![
                Value::Number(10.0),
                Value::Number(1000.0),
                Value::Number(50.0),
            ]))
        );
        assert_eq!(bindings.get("threshold"), Some(&Value::Number(800.0)));
        assert_eq!(
            bindings.get("flags"),
            Some(&Value::List(vec![
                Value::Bool(false),
                Value::Bool(true),
                Value::Bool(false),
            ]))
        );
    }

    #[test]
    fn test_run_portfolio_shaped_script() {
        let script = "\
services = unique([t.service for t in transactions])
per_service = {s: sum([t.amount for t in transactions if t.service == s]) for s in services}
total = sum([t.amount for t in transactions])
";
        let records = Value::List(vec![
            record(&[("service", Value::from("A")), ("amount", Value::Number(100.0))]),
            record(&[("service", Value::from("B")), ("amount", Value::Number(50.0))]),
            record(&[("service", Value::from("A")), ("amount", Value::Number(20.0))]),
        ]);
        let context = ScriptContext::new().with("transactions", records);
        let bindings = ScriptEngine::default().run(script, &context).unwrap();

        let per_service = bindings.get("per_service").and_then(|v| v.as_map()).unwrap();
        assert_eq!(per_service.get("A"), Some(&Value::Number(120.0)));
        assert_eq!(per_service.get("B"), Some(&Value::Number(50.0)));
        assert_eq!(bindings.get("total"), Some(&Value::Number(170.0)));
    }

    #[test]
    fn test_conditional_falls_back_on_empty_candidates() {
        let script = "threshold = max(scores) * 0.8 if scores else 0";
        let context = ScriptContext::new().with("scores", Value::List(Vec::new()));
        let bindings = ScriptEngine::default().run(script, &context).unwrap();
        assert_eq!(bindings.get("threshold"), Some(&Value::Number(0.0)));
    }

    #[test]
    fn test_arithmetic_precedence_and_grouping() {
        let bindings = ScriptEngine::default()
            .run("x = (2 + 3) * 4 - 1", &ScriptContext::new())
            .unwrap();
        assert_eq!(bindings.get("x"), Some(&Value::Number(19.0)));
    }

    #[test]
    fn test_and_or_yield_deciding_operand() {
        let bindings = ScriptEngine::default()
            .run("a = 0 or 5\nb = [] and 1\nc = 2 and 3", &ScriptContext::new())
            .unwrap();
        assert_eq!(bindings.get("a"), Some(&Value::Number(5.0)));
        assert_eq!(bindings.get("b"), Some(&Value::List(Vec::new())));
        assert_eq!(bindings.get("c"), Some(&Value::Number(3.0)));
    }

    #[test]
    fn test_string_concatenation_and_comparison() {
        let bindings = ScriptEngine::default()
            .run("s = \"spend\" + \"sight\"\nlt = \"a\" < \"b\"", &ScriptContext::new())
            .unwrap();
        assert_eq!(bindings.get("s"), Some(&Value::from("spendsight")));
        assert_eq!(bindings.get("lt"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_math_namespace_functions_and_constants() {
        let script = "\
r = math.sqrt(16)
p = math.pow(2, 10)
c = math.ceil(1.2)
tau = 2 * math.pi
";
        let bindings = ScriptEngine::default().run(script, &ScriptContext::new()).unwrap();
        assert_eq!(bindings.get("r"), Some(&Value::Number(4.0)));
        assert_eq!(bindings.get("p"), Some(&Value::Number(1024.0)));
        assert_eq!(bindings.get("c"), Some(&Value::Number(2.0)));
        assert_eq!(
            bindings.get("tau"),
            Some(&Value::Number(2.0 * std::f64::consts::PI))
        );
    }

    #[test]
    fn test_indexing_and_field_chains() {
        let context = transactions_context(&[42.5, 7.0]);
        let bindings = ScriptEngine::default()
            .run("first = transactions[0].amount", &context)
            .unwrap();
        assert_eq!(bindings.get("first"), Some(&Value::Number(42.5)));
    }

    #[test]
    fn test_bindings_contain_only_script_assignments() {
        let context = transactions_context(&[1.0]);
        let bindings = ScriptEngine::default()
            .run("count = len(transactions)", &context)
            .unwrap();
        assert_eq!(bindings.len(), 1);
        assert!(bindings.contains_key("count"));
        assert!(!bindings.contains_key("transactions"));
    }

    #[test]
    fn test_sequential_runs_are_isolated() {
        let engine = ScriptEngine::default();
        let context = ScriptContext::new();

        let first = engine.run("secret = 41", &context).unwrap();
        assert_eq!(first.get("secret"), Some(&Value::Number(41.0)));

        let second = engine.run("leak = secret + 1", &context);
        assert!(matches!(second, Err(ScriptError::UnknownName(name)) if name == "secret"));
    }

    #[test]
    fn test_host_facing_symbols_are_unreachable() {
        let engine = ScriptEngine::default();
        let context = ScriptContext::new();

        let open = engine.run("data = open(\"/etc/passwd\")", &context);
        assert!(matches!(open, Err(ScriptError::UnknownFunction(name)) if name == "open"));

        let os = engine.run("p = os.path", &context);
        assert!(matches!(os, Err(ScriptError::UnknownName(name)) if name == "os"));

        let eval = engine.run("e = eval(\"1\")", &context);
        assert!(matches!(eval, Err(ScriptError::UnknownFunction(name)) if name == "eval"));

        assert!(engine.run("import os", &context).is_err());
    }

    #[test]
    fn test_division_by_zero() {
        let result = ScriptEngine::default().run("x = 1 / 0", &ScriptContext::new());
        assert!(matches!(result, Err(ScriptError::DivisionByZero)));
    }

    #[test]
    fn test_non_finite_results_are_rejected() {
        let engine = ScriptEngine::default();
        let context = ScriptContext::new();

        let log = engine.run("x = math.log(0)", &context);
        assert!(matches!(log, Err(ScriptError::NonFiniteResult(op)) if op == "math.log"));

        let sqrt = engine.run("x = math.sqrt(-1)", &context);
        assert!(matches!(sqrt, Err(ScriptError::NonFiniteResult(_))));

        let exp = engine.run("x = math.exp(100000)", &context);
        assert!(matches!(exp, Err(ScriptError::NonFiniteResult(_))));
    }

    #[test]
    fn test_min_max_reject_empty_lists() {
        let result = ScriptEngine::default().run("m = max([])", &ScriptContext::new());
        assert!(matches!(result, Err(ScriptError::EmptyList(name)) if name == "max"));
    }

    #[test]
    fn test_arity_mismatch() {
        let result = ScriptEngine::default().run("x = abs(1, 2)", &ScriptContext::new());
        assert!(matches!(
            result,
            Err(ScriptError::Arity {
                expected: 1,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_unique_preserves_first_seen_order() {
        let context = ScriptContext::new().with(
            "names",
            Value::List(vec![
                Value::from("zoom"),
                Value::from("slack"),
                Value::from("zoom"),
                Value::from("aws"),
            ]),
        );
        let bindings = ScriptEngine::default()
            .run("distinct = unique(names)", &context)
            .unwrap();
        assert_eq!(
            bindings.get("distinct"),
            Some(&Value::List(vec![
                Value::from("zoom"),
                Value::from("slack"),
                Value::from("aws"),
            ]))
        );
    }

    #[test]
    fn test_index_out_of_bounds() {
        let context = ScriptContext::new().with("xs", Value::List(vec![Value::Number(1.0)]));
        let result = ScriptEngine::default().run("x = xs[3]", &context);
        assert!(matches!(
            result,
            Err(ScriptError::IndexOutOfBounds { index: 3, len: 1 })
        ));
    }

    #[test]
    fn test_missing_map_key_and_field() {
        let context = ScriptContext::new().with("m", record(&[("a", Value::Number(1.0))]));

        let key = ScriptEngine::default().run("x = m[\"b\"]", &context);
        assert!(matches!(key, Err(ScriptError::UnknownKey(k)) if k == "b"));

        let field = ScriptEngine::default().run("x = m.b", &context);
        assert!(matches!(field, Err(ScriptError::UnknownField(f)) if f == "b"));
    }

    #[test]
    fn test_comprehension_over_non_list() {
        let result = ScriptEngine::default().run("xs = [x for x in 5]", &ScriptContext::new());
        assert!(matches!(result, Err(ScriptError::TypeMismatch { .. })));
    }

    #[test]
    fn test_comprehension_variable_does_not_escape() {
        let context = ScriptContext::new().with(
            "xs",
            Value::List(vec![Value::Number(1.0), Value::Number(2.0)]),
        );
        let result = ScriptEngine::default().run("ys = [x for x in xs]\nz = x", &context);
        assert!(matches!(result, Err(ScriptError::UnknownName(name)) if name == "x"));
    }

    #[test]
    fn test_reassignment_takes_last_value() {
        let bindings = ScriptEngine::default()
            .run("x = 1\nx = x + 1", &ScriptContext::new())
            .unwrap();
        assert_eq!(bindings.get("x"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_step_budget_exhaustion() {
        let engine = ScriptEngine::new(ScriptLimits {
            max_steps: 20,
            timeout: Duration::from_secs(2),
        });
        let items: Vec<Value> = (0..100).map(|i| Value::Number(i as f64)).collect();
        let context = ScriptContext::new().with("xs", Value::List(items));

        let result = engine.run("ys = [x * 2 for x in xs]", &context);
        assert!(matches!(result, Err(ScriptError::StepBudgetExhausted(20))));
    }

    #[test]
    fn test_expired_deadline_aborts_run() {
        let engine = ScriptEngine::new(ScriptLimits {
            max_steps: 100_000,
            timeout: Duration::ZERO,
        });
        let result = engine.run("x = 1", &ScriptContext::new());
        assert!(matches!(result, Err(ScriptError::TimedOut(_))));
    }

    #[test]
    fn test_deeply_nested_script_fails_cleanly() {
        let script = format!("x = {}1{}", "(".repeat(10_000), ")".repeat(10_000));
        let result = ScriptEngine::default().run(&script, &ScriptContext::new());
        assert!(matches!(result, Err(ScriptError::NestingTooDeep(_))));
    }

    #[test]
    fn test_unbounded_operator_chain_is_rejected() {
        // Built iteratively by the parser, but the tree would still be ten
        // thousand levels deep when walked.
        let script = format!("total = {}1", "1 + ".repeat(10_000));
        let result = ScriptEngine::default().run(&script, &ScriptContext::new());
        assert!(matches!(result, Err(ScriptError::NestingTooDeep(_))));
    }

    #[test]
    fn test_evaluator_rejects_trees_deeper_than_any_parse() {
        let mut expr = Expr::Number(1.0);
        for _ in 0..(MAX_EXPR_DEPTH * 2 + 10) {
            expr = Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(expr),
            };
        }

        let context = ScriptContext::new();
        let mut run = Evaluator::new(&context, ScriptLimits::default());
        assert!(matches!(
            run.eval(&expr),
            Err(ScriptError::NestingTooDeep(_))
        ));
    }

    #[test]
    fn test_map_key_must_be_string() {
        let result = ScriptEngine::default().run("m = {1: 2}", &ScriptContext::new());
        assert!(matches!(result, Err(ScriptError::TypeMismatch { .. })));
    }

    #[test]
    fn test_empty_script_yields_no_bindings() {
        let bindings = ScriptEngine::default()
            .run("# commentary only\n", &ScriptContext::new())
            .unwrap();
        assert!(bindings.is_empty());
    }
}

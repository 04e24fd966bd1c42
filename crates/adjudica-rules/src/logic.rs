//! Tree Evaluator over canonical logic
//!
//! A canonical node is a single-key object `{op: [args...]}`; a bare
//! (non-array) argument is treated as a one-element list. Objects with more
//! than one key are literals. Truthiness follows JSON-logic: `null`,
//! `false`, `0`, `""` and `[]` are falsy; everything else is truthy.

use crate::mapper::{parse_path, Segment};
use crate::RulesError;
use adjudica_domain::Operator;
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Default maximum tree depth
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// JSON-logic truthiness
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Evaluate canonical logic against nested data
pub fn evaluate_logic(logic: &Value, data: &Value) -> Result<Value, RulesError> {
    Evaluator::new(data, DEFAULT_MAX_DEPTH).eval(logic, 0)
}

/// Evaluation state for one tree
pub(crate) struct Evaluator<'a> {
    data: &'a Value,
    max_depth: usize,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(data: &'a Value, max_depth: usize) -> Self {
        Self { data, max_depth }
    }

    pub(crate) fn eval(&self, logic: &Value, depth: usize) -> Result<Value, RulesError> {
        if depth > self.max_depth {
            return Err(RulesError::MaxDepth(self.max_depth));
        }
        match logic {
            Value::Object(map) if map.len() == 1 => {
                let Some((symbol, raw_args)) = map.iter().next() else {
                    return Ok(logic.clone());
                };
                let operator =
                    Operator::parse(symbol).ok_or_else(|| RulesError::UnknownOperator(symbol.clone()))?;
                let args: Vec<&Value> = match raw_args {
                    Value::Array(items) => items.iter().collect(),
                    single => vec![single],
                };
                self.apply(operator, &args, depth + 1)
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.eval(item, depth + 1))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            literal => Ok(literal.clone()),
        }
    }

    fn eval_all(&self, args: &[&Value], depth: usize) -> Result<Vec<Value>, RulesError> {
        args.iter().map(|a| self.eval(a, depth)).collect()
    }

    fn apply(&self, op: Operator, args: &[&Value], depth: usize) -> Result<Value, RulesError> {
        match op {
            // Lazy operators evaluate only what they need
            Operator::And => {
                require_at_least(op, args, 1)?;
                let mut last = Value::Bool(true);
                for arg in args {
                    last = self.eval(arg, depth)?;
                    if !truthy(&last) {
                        return Ok(last);
                    }
                }
                Ok(last)
            }
            Operator::Or => {
                require_at_least(op, args, 1)?;
                let mut last = Value::Bool(false);
                for arg in args {
                    last = self.eval(arg, depth)?;
                    if truthy(&last) {
                        return Ok(last);
                    }
                }
                Ok(last)
            }
            Operator::If => {
                let mut i = 0;
                while i + 1 < args.len() {
                    if truthy(&self.eval(args[i], depth)?) {
                        return self.eval(args[i + 1], depth);
                    }
                    i += 2;
                }
                match args.get(i) {
                    Some(otherwise) => self.eval(otherwise, depth),
                    None => Ok(Value::Null),
                }
            }
            _ => {
                let values = self.eval_all(args, depth)?;
                self.apply_strict(op, &values)
            }
        }
    }

    fn apply_strict(&self, op: Operator, v: &[Value]) -> Result<Value, RulesError> {
        match op {
            Operator::Not => {
                require_exactly(op, v.len(), 1)?;
                Ok(Value::Bool(!truthy(&v[0])))
            }
            Operator::Truthy => {
                require_exactly(op, v.len(), 1)?;
                Ok(Value::Bool(truthy(&v[0])))
            }
            Operator::Eq => {
                require_exactly(op, v.len(), 2)?;
                Ok(Value::Bool(loose_eq(&v[0], &v[1])))
            }
            Operator::Ne => {
                require_exactly(op, v.len(), 2)?;
                Ok(Value::Bool(!loose_eq(&v[0], &v[1])))
            }
            Operator::StrictEq => {
                require_exactly(op, v.len(), 2)?;
                Ok(Value::Bool(strict_eq(&v[0], &v[1])))
            }
            Operator::StrictNe => {
                require_exactly(op, v.len(), 2)?;
                Ok(Value::Bool(!strict_eq(&v[0], &v[1])))
            }
            Operator::Gt => compare_pair(op, v, |o| o == Ordering::Greater),
            Operator::Ge => compare_pair(op, v, |o| o != Ordering::Less),
            Operator::Lt => compare_chain(op, v, |o| o == Ordering::Less),
            Operator::Le => compare_chain(op, v, |o| o != Ordering::Greater),
            Operator::Add => {
                let nums = numbers(op, v)?;
                to_value(nums.iter().sum())
            }
            Operator::Mul => {
                require_at_least_len(op, v.len(), 1)?;
                let nums = numbers(op, v)?;
                to_value(nums.iter().product())
            }
            Operator::Sub => {
                let nums = numbers(op, v)?;
                match nums.as_slice() {
                    [a] => to_value(-a),
                    [a, b] => to_value(a - b),
                    _ => Err(arity(op, "1 or 2", v.len())),
                }
            }
            Operator::Div => {
                require_exactly(op, v.len(), 2)?;
                let nums = numbers(op, v)?;
                if nums[1] == 0.0 {
                    return Err(RulesError::DivisionByZero);
                }
                to_value(nums[0] / nums[1])
            }
            Operator::Mod => {
                require_exactly(op, v.len(), 2)?;
                let nums = numbers(op, v)?;
                if nums[1] == 0.0 {
                    return Err(RulesError::DivisionByZero);
                }
                to_value(nums[0] % nums[1])
            }
            Operator::Min | Operator::Max => {
                if v.is_empty() {
                    return Ok(Value::Null);
                }
                let nums = numbers(op, v)?;
                let pick = if op == Operator::Min { f64::min } else { f64::max };
                let first = nums[0];
                to_value(nums.into_iter().skip(1).fold(first, pick))
            }
            Operator::Var => self.var(v),
            Operator::Missing => Ok(self.missing(v)),
            Operator::In => {
                require_exactly(op, v.len(), 2)?;
                Ok(Value::Bool(match (&v[0], &v[1]) {
                    (needle, Value::Array(haystack)) => haystack.iter().any(|h| strict_eq(needle, h)),
                    (Value::String(needle), Value::String(haystack)) => haystack.contains(needle.as_str()),
                    _ => false,
                }))
            }
            Operator::And | Operator::Or | Operator::If => {
                Err(RulesError::InvalidNode(format!("'{}' must be evaluated lazily", op)))
            }
        }
    }

    fn var(&self, v: &[Value]) -> Result<Value, RulesError> {
        let default = v.get(1).cloned().unwrap_or(Value::Null);
        let path = match v.first() {
            None | Some(Value::Null) => return Ok(self.data.clone()),
            Some(Value::String(s)) if s.is_empty() => return Ok(self.data.clone()),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => {
                return Err(RulesError::Type(format!("var path must be a string, got {}", other)))
            }
        };
        Ok(match lookup(self.data, &path)? {
            Some(found) if !found.is_null() => found.clone(),
            _ => default,
        })
    }

    fn missing(&self, v: &[Value]) -> Value {
        let keys: Vec<&Value> = match v {
            [Value::Array(items)] => items.iter().collect(),
            _ => v.iter().collect(),
        };
        let absent = keys
            .into_iter()
            .filter(|key| {
                let path = match key {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                match lookup(self.data, &path) {
                    Ok(Some(Value::Null)) | Ok(None) | Err(_) => true,
                    Ok(Some(Value::String(s))) => s.is_empty(),
                    Ok(Some(_)) => false,
                }
            })
            .cloned()
            .collect();
        Value::Array(absent)
    }
}

/// Resolve a dotted path in nested data
fn lookup<'v>(data: &'v Value, path: &str) -> Result<Option<&'v Value>, RulesError> {
    let mut current = data;
    for segment in parse_path(path)? {
        let next = match (&segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get(key),
            (Segment::Index(index), Value::Array(items)) => items.get(*index),
            (Segment::Index(index), Value::Object(map)) => map.get(&index.to_string()),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

fn arity(op: Operator, expected: &str, got: usize) -> RulesError {
    RulesError::Arity {
        operator: op.as_str().to_string(),
        expected: expected.to_string(),
        got,
    }
}

fn require_exactly(op: Operator, got: usize, expected: usize) -> Result<(), RulesError> {
    if got != expected {
        return Err(arity(op, &expected.to_string(), got));
    }
    Ok(())
}

fn require_at_least(op: Operator, args: &[&Value], min: usize) -> Result<(), RulesError> {
    require_at_least_len(op, args.len(), min)
}

fn require_at_least_len(op: Operator, got: usize, min: usize) -> Result<(), RulesError> {
    if got < min {
        return Err(arity(op, &format!("at least {}", min), got));
    }
    Ok(())
}

/// Numeric coercion: numbers, numeric strings, booleans and null (as 0)
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        _ => None,
    }
}

fn numbers(op: Operator, values: &[Value]) -> Result<Vec<f64>, RulesError> {
    values
        .iter()
        .map(|v| {
            coerce_number(v)
                .filter(|f| f.is_finite())
                .ok_or_else(|| RulesError::Type(format!("'{}' needs numeric operands, got {}", op, v)))
        })
        .collect()
}

/// Integral results become JSON integers
fn to_value(f: f64) -> Result<Value, RulesError> {
    if !f.is_finite() {
        return Err(RulesError::Type(format!("non-finite result {}", f)));
    }
    if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
        return Ok(Value::Number((f as i64).into()));
    }
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| RulesError::Type(format!("non-finite result {}", f)))
}

/// `==`: numbers and numeric strings compare numerically, booleans as 0/1
fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(_), _) | (_, Value::Array(_)) | (Value::Object(_), _) | (_, Value::Object(_)) => {
            a == b
        }
        _ => match (coerce_number(a), coerce_number(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

/// `===`: same JSON type and value; `1` and `1.0` are equal
fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Two strings compare lexically (ISO dates order correctly); anything
/// else compares numerically. Incomparable operands yield `None`.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => coerce_number(a)?.partial_cmp(&coerce_number(b)?),
    }
}

fn compare_pair(op: Operator, v: &[Value], accept: impl Fn(Ordering) -> bool) -> Result<Value, RulesError> {
    require_exactly(op, v.len(), 2)?;
    Ok(Value::Bool(compare(&v[0], &v[1]).is_some_and(accept)))
}

/// `<` and `<=` also accept three operands: `a < b < c`
fn compare_chain(op: Operator, v: &[Value], accept: impl Fn(Ordering) -> bool) -> Result<Value, RulesError> {
    if v.len() != 2 && v.len() != 3 {
        return Err(arity(op, "2 or 3", v.len()));
    }
    let holds = v
        .windows(2)
        .all(|pair| compare(&pair[0], &pair[1]).is_some_and(&accept));
    Ok(Value::Bool(holds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval(logic: Value, data: Value) -> Value {
        evaluate_logic(&logic, &data).unwrap()
    }

    #[test]
    fn test_truthiness() {
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!([])));
        assert!(truthy(&json!("0")));
        assert!(truthy(&json!({})));
    }

    #[test]
    fn test_boolean_operators() {
        assert_eq!(eval(json!({"and": [true, 1, "x"]}), json!({})), json!("x"));
        assert_eq!(eval(json!({"and": [true, 0, "x"]}), json!({})), json!(0));
        assert_eq!(eval(json!({"or": [false, null, "y"]}), json!({})), json!("y"));
        assert_eq!(eval(json!({"!": [true]}), json!({})), json!(false));
        assert_eq!(eval(json!({"!": true}), json!({})), json!(false));
        assert_eq!(eval(json!({"!!": [[1]]}), json!({})), json!(true));
        assert_eq!(eval(json!({"not": [0]}), json!({})), json!(true));
    }

    #[test]
    fn test_and_short_circuits() {
        // The second operand would fail with division by zero
        assert_eq!(eval(json!({"and": [false, {"/": [1, 0]}]}), json!({})), json!(false));
    }

    #[test]
    fn test_if_chain() {
        let logic = json!({"if": [
            {"<": [{"var": "t"}, 0]}, "freezing",
            {"<": [{"var": "t"}, 100]}, "liquid",
            "gas"
        ]});
        assert_eq!(eval(logic.clone(), json!({"t": -5})), json!("freezing"));
        assert_eq!(eval(logic.clone(), json!({"t": 50})), json!("liquid"));
        assert_eq!(eval(logic, json!({"t": 150})), json!("gas"));
        assert_eq!(eval(json!({"if": [false, 1]}), json!({})), Value::Null);
    }

    #[test]
    fn test_equality() {
        assert_eq!(eval(json!({"==": [1, "1"]}), json!({})), json!(true));
        assert_eq!(eval(json!({"===": [1, "1"]}), json!({})), json!(false));
        assert_eq!(eval(json!({"===": [1, 1.0]}), json!({})), json!(true));
        assert_eq!(eval(json!({"!=": [null, 0]}), json!({})), json!(true));
        assert_eq!(eval(json!({"!==": ["a", "a"]}), json!({})), json!(false));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval(json!({">": [3, 2]}), json!({})), json!(true));
        assert_eq!(eval(json!({">=": ["10", 9]}), json!({})), json!(true));
        assert_eq!(eval(json!({"<": [1, 2, 3]}), json!({})), json!(true));
        assert_eq!(eval(json!({"<=": [1, 3, 3]}), json!({})), json!(true));
        assert_eq!(eval(json!({"<": [1, 5, 3]}), json!({})), json!(false));
        assert_eq!(
            eval(json!({"<": ["2024-12-31", "2025-01-01"]}), json!({})),
            json!(true)
        );
        assert_eq!(eval(json!({">": ["abc", 1]}), json!({})), json!(false));
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval(json!({"+": [1, 2, "3"]}), json!({})), json!(6));
        assert_eq!(eval(json!({"-": [10, 4]}), json!({})), json!(6));
        assert_eq!(eval(json!({"-": [4]}), json!({})), json!(-4));
        assert_eq!(eval(json!({"*": [2, 2.5]}), json!({})), json!(5));
        assert_eq!(eval(json!({"/": [7, 2]}), json!({})), json!(3.5));
        assert_eq!(eval(json!({"%": [7, 3]}), json!({})), json!(1));
        assert_eq!(eval(json!({"min": [4, 2, 9]}), json!({})), json!(2));
        assert_eq!(eval(json!({"max": [4, 2, 9]}), json!({})), json!(9));
        assert_eq!(eval(json!({"min": []}), json!({})), Value::Null);
    }

    #[test]
    fn test_arithmetic_errors() {
        assert_eq!(
            evaluate_logic(&json!({"/": [1, 0]}), &json!({})),
            Err(RulesError::DivisionByZero)
        );
        assert!(matches!(
            evaluate_logic(&json!({"+": [1, "abc"]}), &json!({})),
            Err(RulesError::Type(_))
        ));
        assert!(matches!(
            evaluate_logic(&json!({"-": [1, 2, 3]}), &json!({})),
            Err(RulesError::Arity { .. })
        ));
    }

    #[test]
    fn test_var_lookup() {
        let data = json!({
            "vehicle": {"odometer_km": 91000},
            "claim": {"parties": {"claimants": [{"role": "owner"}]}}
        });
        assert_eq!(eval(json!({"var": ["vehicle.odometer_km"]}), data.clone()), json!(91000));
        assert_eq!(eval(json!({"var": "claim.parties.claimants.0.role"}), data.clone()), json!("owner"));
        assert_eq!(eval(json!({"var": ["claim.parties.claimants[0].role"]}), data.clone()), json!("owner"));
        assert_eq!(eval(json!({"var": ["vehicle.vin", "unknown"]}), data.clone()), json!("unknown"));
        assert_eq!(eval(json!({"var": ["vehicle.vin"]}), data.clone()), Value::Null);
        assert_eq!(eval(json!({"var": [""]}), json!(5)), json!(5));
    }

    #[test]
    fn test_missing() {
        let data = json!({"a": 1, "b": "", "c": null});
        assert_eq!(eval(json!({"missing": ["a", "b", "c", "d"]}), data.clone()), json!(["b", "c", "d"]));
        assert_eq!(eval(json!({"missing": [["a"]]}), data), json!([]));
    }

    #[test]
    fn test_membership() {
        assert_eq!(eval(json!({"in": ["diesel", ["petrol", "diesel"]]}), json!({})), json!(true));
        assert_eq!(eval(json!({"in": ["gear", "gearbox failure"]}), json!({})), json!(true));
        assert_eq!(eval(json!({"in": [1, "123"]}), json!({})), json!(false));
    }

    #[test]
    fn test_unknown_operator_and_depth() {
        assert_eq!(
            evaluate_logic(&json!({"xor": [true, false]}), &json!({})),
            Err(RulesError::UnknownOperator("xor".to_string()))
        );

        let mut deep = json!(true);
        for _ in 0..40 {
            deep = json!({"!": [{"!": [deep]}]});
        }
        assert_eq!(evaluate_logic(&deep, &json!({})), Err(RulesError::MaxDepth(DEFAULT_MAX_DEPTH)));
    }

    #[test]
    fn test_multi_key_object_is_literal() {
        let literal = json!({"currency": "EUR", "amount": 5});
        assert_eq!(eval(literal.clone(), json!({})), literal);
    }
}

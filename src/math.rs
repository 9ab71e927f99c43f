/// Arithmetic for `add(…)`, `subtract(…)`, `multiply(…)`, `divide(…)`,
/// `modulo(…)` and `power(…)`.
///
/// Every operation folds its operands left to right:
///
/// ```text
/// subtract(10, 3, 2)   # (10 - 3) - 2 = 5
/// divide(100, 5, 2)    # (100 / 5) / 2 = 10
/// power(2, 3, 2)       # (2 ^ 3) ^ 2 = 64
/// ```
///
/// Integer results are checked; overflow is an error rather than a wrap.
use crate::ast::MathOperator;
use crate::error::{Error, Result};

pub fn apply(operator: MathOperator, operands: &[i64], offset: usize) -> Result<i64> {
    let minimum = match operator {
        MathOperator::Add | MathOperator::Multiply => 0,
        MathOperator::Subtract | MathOperator::Divide => 1,
        MathOperator::Modulo | MathOperator::Power => 2,
    };
    if operands.len() < minimum {
        return Err(Error::ArityMismatch {
            name: operator.to_string(),
            expected: format!("at least {}", minimum),
            found: operands.len(),
            offset,
        });
    }

    if matches!(operator, MathOperator::Divide | MathOperator::Modulo)
        && operands.iter().skip(1).any(|&n| n == 0)
    {
        return Err(Error::DivisionByZero {
            operation: operator.to_string(),
            offset,
        });
    }

    let overflow = || Error::Overflow {
        operation: operator.to_string(),
        offset,
    };

    match operator {
        MathOperator::Add => operands
            .iter()
            .try_fold(0i64, |acc, &n| acc.checked_add(n))
            .ok_or_else(overflow),
        MathOperator::Multiply => operands
            .iter()
            .try_fold(1i64, |acc, &n| acc.checked_mul(n))
            .ok_or_else(overflow),
        MathOperator::Subtract => fold(operands, i64::checked_sub).ok_or_else(overflow),
        MathOperator::Divide => fold(operands, i64::checked_div).ok_or_else(overflow),
        MathOperator::Modulo => fold(operands, i64::checked_rem).ok_or_else(overflow),
        MathOperator::Power => Ok(power(operands)),
    }
}

/// Left fold seeded with the first operand. `None` on overflow.
fn fold(operands: &[i64], step: fn(i64, i64) -> Option<i64>) -> Option<i64> {
    let (&first, rest) = operands.split_first()?;
    rest.iter().try_fold(first, |acc, &n| step(acc, n))
}

/// Pairwise `powf` over doubles, truncated once at the end. Out-of-range
/// results saturate at the `i64` bounds.
fn power(operands: &[i64]) -> i64 {
    let mut iter = operands.iter().map(|&n| n as f64);
    let first = iter.next().unwrap_or(0.0);
    iter.fold(first, f64::powf) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn run(operator: MathOperator, operands: &[i64]) -> Result<i64> {
        apply(operator, operands, 0)
    }

    #[test]
    fn folds_left_to_right() {
        assert_eq!(run(MathOperator::Add, &[1, 2, 3]), Ok(6));
        assert_eq!(run(MathOperator::Subtract, &[10, 3, 2]), Ok(5));
        assert_eq!(run(MathOperator::Multiply, &[2, 3, 4]), Ok(24));
        assert_eq!(run(MathOperator::Divide, &[100, 5, 2]), Ok(10));
        assert_eq!(run(MathOperator::Modulo, &[17, 10, 4]), Ok(3));
        assert_eq!(run(MathOperator::Power, &[2, 3, 2]), Ok(64));
    }

    #[test]
    fn single_operands() {
        assert_eq!(run(MathOperator::Add, &[7]), Ok(7));
        assert_eq!(run(MathOperator::Subtract, &[7]), Ok(7));
        assert_eq!(run(MathOperator::Divide, &[7]), Ok(7));
    }

    #[test]
    fn integer_division_truncates() {
        assert_eq!(run(MathOperator::Divide, &[7, 2]), Ok(3));
        assert_eq!(run(MathOperator::Divide, &[-7, 2]), Ok(-3));
        assert_eq!(run(MathOperator::Power, &[2, -1]), Ok(0));
    }

    #[test]
    fn zero_after_first_operand_fails() {
        for operands in [&[1, 0][..], &[0, 5, 0][..], &[8, 2, 0, 1][..]] {
            let err = run(MathOperator::Divide, operands).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DivisionByZero);
            let err = run(MathOperator::Modulo, operands).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DivisionByZero);
        }
        assert_eq!(run(MathOperator::Divide, &[0, 5]), Ok(0));
    }

    #[test]
    fn minimum_operand_counts() {
        let err = run(MathOperator::Modulo, &[5]).unwrap_err();
        assert_eq!(
            err,
            Error::ArityMismatch {
                name: "modulo".into(),
                expected: "at least 2".into(),
                found: 1,
                offset: 0
            }
        );
        assert_eq!(run(MathOperator::Power, &[5]).unwrap_err().kind(), ErrorKind::ArityMismatch);
        assert_eq!(run(MathOperator::Subtract, &[]).unwrap_err().kind(), ErrorKind::ArityMismatch);
    }

    #[test]
    fn overflow_is_reported() {
        let err = run(MathOperator::Add, &[i64::MAX, 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
        let err = run(MathOperator::Divide, &[i64::MIN, -1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
        assert_eq!(run(MathOperator::Power, &[10, 30]), Ok(i64::MAX));
    }

    #[test]
    fn infinite_powers_saturate() {
        // 0 ^ -1 is +inf in f64.
        assert_eq!(run(MathOperator::Power, &[0, -1]), Ok(i64::MAX));
        assert_eq!(run(MathOperator::Power, &[-10, 31]), Ok(i64::MIN));
        assert_eq!(run(MathOperator::Power, &[0, -1, 0]), Ok(1));
    }
}

use std::collections::BTreeSet;

use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::error::{AuditError, Result};
use crate::share::Point;

/// Exact rational `num / den`, `den > 0`. Not kept reduced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fraction {
    pub num: BigInt,
    pub den: BigInt,
}

impl Fraction {
    fn zero() -> Self {
        Fraction {
            num: BigInt::zero(),
            den: BigInt::one(),
        }
    }

    fn plus(self, num: BigInt, den: BigInt) -> Self {
        Fraction {
            num: self.num * &den + num * &self.den,
            den: self.den * den,
        }
    }

    #[cfg(test)]
    pub(crate) fn reduced(&self) -> Fraction {
        let g = self.num.gcd(&self.den);
        if g.is_zero() || g.is_one() {
            return self.clone();
        }
        Fraction {
            num: &self.num / &g,
            den: &self.den / &g,
        }
    }

    /// Nearest integer, halves rounded away from zero.
    pub fn round(&self) -> BigInt {
        let twice = self.num.abs() * 2u32 + &self.den;
        let magnitude = twice.div_floor(&(self.den.clone() * 2u32));
        if self.num.sign() == Sign::Minus {
            -magnitude
        } else {
            magnitude
        }
    }
}

/// Performs a Lagrange interpolation at the origin for the polynomial through `points`.
///
/// The value is accumulated as a single exact fraction,
/// `Σ y_i · Π_{j≠i} (0 - x_j) / Π_{j≠i} (x_i - x_j)`, so no precision is lost
/// to the divisions in each basis polynomial.
pub fn lagrange_at_zero(points: &[Point]) -> Result<Fraction> {
    let mut seen = BTreeSet::new();
    for p in points {
        if !seen.insert(&p.x) {
            return Err(AuditError::DuplicateAbscissa(p.x.to_string()));
        }
    }

    let mut acc = Fraction::zero();
    for (i, pi) in points.iter().enumerate() {
        let mut num = pi.y.clone();
        let mut den = BigInt::one();
        for (j, pj) in points.iter().enumerate() {
            if i != j {
                num *= -&pj.x;
                den *= &pi.x - &pj.x;
            }
        }
        if den.is_negative() {
            num = -num;
            den = -den;
        }
        acc = acc.plus(num, den);
    }
    Ok(acc)
}

/// The secret implied by `points`: the interpolated constant term, rounded.
pub fn secret_at_zero(points: &[Point]) -> Result<BigInt> {
    Ok(lagrange_at_zero(points)?.round())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(i64, i64)]) -> Vec<Point> {
        raw.iter()
            .map(|&(x, y)| Point {
                x: BigInt::from(x),
                y: BigInt::from(y),
            })
            .collect()
    }

    fn frac(num: i64, den: i64) -> Fraction {
        Fraction {
            num: BigInt::from(num),
            den: BigInt::from(den),
        }
    }

    #[test]
    fn line_through_three_points() {
        // y = 3x + 2
        let secret = secret_at_zero(&pts(&[(1, 5), (2, 8), (3, 11)])).unwrap();
        assert_eq!(secret, BigInt::from(2));
    }

    #[test]
    fn order_of_points_is_irrelevant() {
        let a = secret_at_zero(&pts(&[(1, 5), (2, 8), (4, 999)])).unwrap();
        let b = secret_at_zero(&pts(&[(4, 999), (1, 5), (2, 8)])).unwrap();
        assert_eq!(a, b);
        // 40/3 - 16 + 333 = 991/3
        assert_eq!(a, BigInt::from(330));
    }

    #[test]
    fn exact_fraction_before_rounding() {
        let f = lagrange_at_zero(&pts(&[(1, 5), (2, 8), (4, 999)])).unwrap();
        assert_eq!(f.reduced(), frac(991, 3));
    }

    #[test]
    fn single_point_is_its_own_secret() {
        assert_eq!(secret_at_zero(&pts(&[(7, 42)])).unwrap(), BigInt::from(42));
    }

    #[test]
    fn quadratic_with_large_coefficients() {
        // f(x) = 10^30 + 7x + 3x^2
        let c0 = BigInt::parse_bytes(b"1000000000000000000000000000000", 10).unwrap();
        let points: Vec<Point> = (1..=3)
            .map(|x| Point {
                x: BigInt::from(x),
                y: &c0 + BigInt::from(7 * x + 3 * x * x),
            })
            .collect();
        assert_eq!(secret_at_zero(&points).unwrap(), c0);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(frac(5, 2).round(), BigInt::from(3));
        assert_eq!(frac(-5, 2).round(), BigInt::from(-3));
        assert_eq!(frac(7, 3).round(), BigInt::from(2));
        assert_eq!(frac(-7, 3).round(), BigInt::from(-2));
        assert_eq!(frac(8, 3).round(), BigInt::from(3));
        assert_eq!(frac(0, 9).round(), BigInt::from(0));
    }

    #[test]
    fn negative_secret() {
        // y = 4x - 10
        let secret = secret_at_zero(&pts(&[(2, -2), (5, 10)])).unwrap();
        assert_eq!(secret, BigInt::from(-10));
    }

    #[test]
    fn duplicate_abscissa() {
        assert_eq!(
            lagrange_at_zero(&pts(&[(1, 5), (2, 8), (1, 9)])),
            Err(AuditError::DuplicateAbscissa("1".into()))
        );
    }
}

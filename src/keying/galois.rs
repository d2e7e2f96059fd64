//! Galois Field GF(256) arithmetic operations
//!
//! This module implements arithmetic in the Galois Field GF(2^8) using the
//! irreducible polynomial x^8 + x^4 + x^3 + x + 1 (0x11b) and the primitive
//! element 0xe5. The share splitter on the signaling server uses the same
//! field, so these two constants are part of the share wire format.

use std::sync::OnceLock;

use thiserror::Error;

/// Irreducible polynomial defining the field.
pub const FIELD_POLYNOMIAL: u16 = 0x11b;

/// Primitive element the log/antilog tables are generated from.
pub const GENERATOR: u8 = 0xe5;

/// Order of the multiplicative group.
const GROUP_ORDER: usize = 255;

static GLOBAL: OnceLock<GF256> = OnceLock::new();

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaloisError {
    #[error("division by zero in GF(256)")]
    DivisionByZero,
}

/// Galois Field GF(256) implementation
#[derive(Debug, Clone)]
pub struct GF256 {
    /// Discrete logarithm of every non-zero element
    log_table: [u8; 256],
    /// Powers of the generator, stored twice so sums of two logs index directly
    antilog_table: [u8; 2 * GROUP_ORDER],
}

impl GF256 {
    /// Create a new GF(256) instance with precomputed tables
    pub fn new() -> Self {
        let mut gf = Self {
            log_table: [0; 256],
            antilog_table: [0; 2 * GROUP_ORDER],
        };
        gf.build_tables();
        gf
    }

    /// Process-wide instance, built on first use.
    pub fn global() -> &'static GF256 {
        GLOBAL.get_or_init(GF256::new)
    }

    /// Build logarithm and antilog tables for fast multiplication
    fn build_tables(&mut self) {
        let mut value = 1u8;
        for i in 0..GROUP_ORDER {
            self.antilog_table[i] = value;
            self.antilog_table[i + GROUP_ORDER] = value;
            self.log_table[value as usize] = i as u8;
            value = carryless_multiply(value, GENERATOR);
        }

        // log(0) is undefined; multiply/divide check for zero before lookup
        self.log_table[0] = 0;
    }

    /// Addition in GF(256) - same as XOR
    pub fn add(&self, a: u8, b: u8) -> u8 {
        a ^ b
    }

    /// Subtraction in GF(256) - same as XOR (since -x = x in GF(2^n))
    pub fn subtract(&self, a: u8, b: u8) -> u8 {
        a ^ b
    }

    /// Multiplication in GF(256) using log/antilog tables
    pub fn multiply(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }

        let log_a = self.log_table[a as usize] as usize;
        let log_b = self.log_table[b as usize] as usize;

        self.antilog_table[log_a + log_b]
    }

    /// Division in GF(256)
    pub fn divide(&self, a: u8, b: u8) -> Result<u8, GaloisError> {
        if b == 0 {
            return Err(GaloisError::DivisionByZero);
        }
        if a == 0 {
            return Ok(0);
        }

        let log_a = self.log_table[a as usize] as usize;
        let log_b = self.log_table[b as usize] as usize;

        Ok(self.antilog_table[log_a + GROUP_ORDER - log_b])
    }

    /// Multiplicative inverse in GF(256)
    pub fn inverse(&self, a: u8) -> Result<u8, GaloisError> {
        self.divide(1, a)
    }

    /// Power operation in GF(256)
    pub fn power(&self, base: u8, exponent: u8) -> u8 {
        if exponent == 0 {
            return 1;
        }
        if base == 0 {
            return 0;
        }

        let log_base = self.log_table[base as usize] as usize;
        let log_result = (log_base * exponent as usize) % GROUP_ORDER;

        self.antilog_table[log_result]
    }

    /// Evaluate polynomial at given point
    /// poly[0] + poly[1]*x + poly[2]*x^2 + ... + poly[n]*x^n
    pub fn eval_polynomial(&self, poly: &[u8], x: u8) -> u8 {
        poly.iter()
            .rev()
            .fold(0u8, |acc, &coeff| self.add(self.multiply(acc, x), coeff))
    }

    /// Lagrange basis polynomials L_i evaluated at x = 0.
    ///
    /// `L_i(0) = prod_{j != i} (0 - x_j) / (x_i - x_j)`, which in characteristic
    /// two is `prod_{j != i} x_j / (x_i ^ x_j)`. Fails on repeated coordinates.
    pub fn lagrange_basis_at_zero(&self, xs: &[u8]) -> Result<Vec<u8>, GaloisError> {
        let mut basis = Vec::with_capacity(xs.len());

        for (i, &xi) in xs.iter().enumerate() {
            let mut li = 1u8;
            for (j, &xj) in xs.iter().enumerate() {
                if i != j {
                    let term = self.divide(self.subtract(0, xj), self.subtract(xi, xj))?;
                    li = self.multiply(li, term);
                }
            }
            basis.push(li);
        }

        Ok(basis)
    }

    /// Lagrange interpolation to find polynomial value at x=0
    /// Given points (x_i, y_i), compute the polynomial value at 0
    pub fn lagrange_interpolate_at_zero(&self, points: &[(u8, u8)]) -> Result<u8, GaloisError> {
        let xs: Vec<u8> = points.iter().map(|&(x, _)| x).collect();
        let basis = self.lagrange_basis_at_zero(&xs)?;

        Ok(points
            .iter()
            .zip(basis)
            .fold(0u8, |acc, (&(_, yi), li)| self.add(acc, self.multiply(yi, li))))
    }
}

impl Default for GF256 {
    fn default() -> Self {
        Self::new()
    }
}

/// Shift-and-add multiplication with reduction by the field polynomial.
/// Only used to seed the tables.
fn carryless_multiply(mut a: u8, mut b: u8) -> u8 {
    let reduction = (FIELD_POLYNOMIAL & 0xff) as u8;
    let mut product = 0u8;

    while b != 0 {
        if b & 1 != 0 {
            product ^= a;
        }
        let high_bit = a & 0x80;
        a <<= 1;
        if high_bit != 0 {
            a ^= reduction;
        }
        b >>= 1;
    }

    product
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gf256_basic_operations() {
        let gf = GF256::new();

        assert_eq!(gf.add(0x53, 0xCA), 0x99);
        assert_eq!(gf.add(0xFF, 0xFF), 0x00);
        assert_eq!(gf.add(0x00, 0xFF), 0xFF);

        assert_eq!(gf.subtract(0x53, 0xCA), 0x99);
        assert_eq!(gf.subtract(0xFF, 0xFF), 0x00);

        for a in 0..=255u8 {
            assert_eq!(gf.add(a, a), 0);
        }
    }

    #[test]
    fn test_tables_match_deployed_constants() {
        let gf = GF256::new();

        // Leading entries of the antilog table shipped with the first client
        assert_eq!(&gf.antilog_table[..8], &[0x01, 0xe5, 0x4c, 0xb5, 0xfb, 0x9f, 0xfc, 0x12]);
        assert_eq!(gf.log_table[0x02], 0xc8);
        assert_eq!(gf.log_table[0x03], 0x08);
        assert_eq!(gf.log_table[0xff], 0x38);

        // The doubled half repeats the first
        assert_eq!(&gf.antilog_table[..GROUP_ORDER], &gf.antilog_table[GROUP_ORDER..]);
    }

    #[test]
    fn test_tables_are_a_bijection() {
        let gf = GF256::new();

        let mut seen = [false; 256];
        for &v in &gf.antilog_table[..GROUP_ORDER] {
            assert_ne!(v, 0);
            assert!(!seen[v as usize], "generator cycle repeats {:#04x}", v);
            seen[v as usize] = true;
        }
        for a in 1..=255u8 {
            assert_eq!(gf.antilog_table[gf.log_table[a as usize] as usize], a);
        }
    }

    #[test]
    fn test_gf256_multiplication() {
        let gf = GF256::new();

        assert_eq!(gf.multiply(0, 5), 0);
        assert_eq!(gf.multiply(5, 0), 0);
        assert_eq!(gf.multiply(1, 5), 5);
        assert_eq!(gf.multiply(5, 1), 5);

        assert_eq!(gf.multiply(2, 2), 4);
        assert_eq!(gf.multiply(2, 3), 6);
        assert_eq!(gf.multiply(3, 3), 5);
        assert_eq!(gf.multiply(0x53, 0xCA), 0x01);

        for a in 0..=255u8 {
            assert_eq!(gf.multiply(a, 1), a);
            for b in 0..=255u8 {
                assert_eq!(gf.multiply(a, b), carryless_multiply(a, b), "a={} b={}", a, b);
            }
        }
    }

    #[test]
    fn test_gf256_inverse() {
        let gf = GF256::new();

        for a in 1..=255u8 {
            let inv_a = gf.inverse(a).unwrap();
            assert_eq!(gf.multiply(a, inv_a), 1, "Failed for a={}", a);
        }

        assert_eq!(gf.inverse(0), Err(GaloisError::DivisionByZero));
    }

    #[test]
    fn test_gf256_division() {
        let gf = GF256::new();

        assert_eq!(gf.divide(0, 5).unwrap(), 0);
        assert_eq!(gf.divide(5, 1).unwrap(), 5);
        assert_eq!(gf.divide(6, 2).unwrap(), 3);

        assert_eq!(gf.divide(5, 0), Err(GaloisError::DivisionByZero));
        assert_eq!(gf.divide(0, 0), Err(GaloisError::DivisionByZero));

        for a in 0..=255u8 {
            for b in 1..=255u8 {
                let quotient = gf.divide(a, b).unwrap();
                assert_eq!(gf.multiply(quotient, b), a, "Failed for a={}, b={}", a, b);
            }
        }
    }

    #[test]
    fn test_gf256_power() {
        let gf = GF256::new();

        assert_eq!(gf.power(2, 0), 1);
        assert_eq!(gf.power(2, 1), 2);
        assert_eq!(gf.power(2, 2), 4);
        assert_eq!(gf.power(2, 3), 8);
        assert_eq!(gf.power(GENERATOR, 255), 1);

        assert_eq!(gf.power(0, 0), 1);
        assert_eq!(gf.power(0, 5), 0);

        for a in 1..=10 {
            assert_eq!(gf.power(a, 1), a);
        }
    }

    #[test]
    fn test_polynomial_evaluation() {
        let gf = GF256::new();

        let poly = vec![5];
        assert_eq!(gf.eval_polynomial(&poly, 10), 5);
        assert_eq!(gf.eval_polynomial(&[], 10), 0);

        // 3 + 2x
        let poly = vec![3, 2];
        assert_eq!(gf.eval_polynomial(&poly, 0), 3);
        assert_eq!(gf.eval_polynomial(&poly, 1), gf.add(3, 2));
        assert_eq!(gf.eval_polynomial(&poly, 5), gf.add(3, gf.multiply(2, 5)));

        // 1 + 2x + 3x^2
        let poly = vec![1, 2, 3];
        let x = 4;
        let expected = gf.add(gf.add(1, gf.multiply(2, x)), gf.multiply(3, gf.multiply(x, x)));
        assert_eq!(gf.eval_polynomial(&poly, x), expected);
    }

    #[test]
    fn test_lagrange_interpolation() {
        let gf = GF256::new();

        let points = vec![(1, 5), (2, 5), (3, 5)];
        assert_eq!(gf.lagrange_interpolate_at_zero(&points).unwrap(), 5);

        let secret = 42u8;
        let poly = vec![secret, 17, 23];
        let points = vec![
            (1, gf.eval_polynomial(&poly, 1)),
            (7, gf.eval_polynomial(&poly, 7)),
            (200, gf.eval_polynomial(&poly, 200)),
        ];
        assert_eq!(gf.lagrange_interpolate_at_zero(&points).unwrap(), secret);
    }

    #[test]
    fn test_basis_sums_to_one() {
        // Interpolating the constant polynomial 1 must give 1, so the basis sums to 1.
        let gf = GF256::new();
        let basis = gf.lagrange_basis_at_zero(&[3, 9, 27, 81]).unwrap();
        assert_eq!(basis.iter().fold(0u8, |acc, &b| gf.add(acc, b)), 1);
    }

    #[test]
    fn test_repeated_coordinate_is_rejected() {
        let gf = GF256::new();
        assert_eq!(
            gf.lagrange_basis_at_zero(&[4, 9, 4]),
            Err(GaloisError::DivisionByZero)
        );
    }

    #[test]
    fn test_global_is_shared_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| GF256::global() as *const GF256 as usize))
            .collect();
        let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(GF256::global().multiply(0x53, 0xCA), 1);
    }
}

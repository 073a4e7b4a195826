//! Sample extension module, loaded by programs as `testutils`.
//!
//! - utility 0 `printnum`: pop a number and print it
//! - utility 1 `pow`: pop exponent, pop base, push base^exponent

use hss_ext::prelude::*;

pub fn printnum(utils: &mut Utilities) {
    let num = utils.pop();
    println!("Your number was: {}", num);
}

pub fn pow(utils: &mut Utilities) {
    let exp = utils.pop();
    let base = utils.pop();
    utils.push(power(base, exp));
}

/// `base^exp` truncated to 16 bits. Negative exponents truncate the
/// fraction toward zero.
pub fn power(base: Word, exp: Word) -> Word {
    if exp >= 0 {
        return base.wrapping_pow(exp as u32);
    }
    match base {
        1 => 1,
        -1 if exp % 2 == 0 => 1,
        -1 => -1,
        _ => 0,
    }
}

hss_ext::export_utilities!(printnum, pow);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power() {
        assert_eq!(power(2, 10), 1024);
        assert_eq!(power(-3, 3), -27);
        assert_eq!(power(7, 0), 1);
        assert_eq!(power(2, 16), 0);
        assert_eq!(power(3, 11), 177147u32 as i16);
    }

    #[test]
    fn test_negative_exponent() {
        assert_eq!(power(2, -1), 0);
        assert_eq!(power(1, -5), 1);
        assert_eq!(power(-1, -2), 1);
        assert_eq!(power(-1, -3), -1);
    }

    #[test]
    fn test_table() {
        let lib = initialize();
        assert_eq!(lib.count, 2);
        assert!(!lib.utilities.is_null());
    }
}

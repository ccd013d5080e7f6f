//! Reed-Solomon ECC over GF(2^8) with the field polynomial 0x11D.

/// Generator polynomial of the given degree, highest coefficient first with
/// the leading 1 dropped.
pub(crate) fn compute_divisor(degree: usize) -> Vec<u8> {
    debug_assert!((1..=255).contains(&degree));
    let mut result = vec![0u8; degree - 1];
    result.push(1);

    // Multiply (x - r^0)(x - r^1)...(x - r^{degree-1}).
    let mut root: u8 = 1;
    for _ in 0..degree {
        for j in 0..degree {
            result[j] = multiply(result[j], root);
            if j + 1 < result.len() {
                result[j] ^= result[j + 1];
            }
        }
        root = multiply(root, 0x02);
    }
    result
}

/// Remainder of `data` divided by `divisor`: the ECC codewords for one block.
pub(crate) fn compute_remainder(data: &[u8], divisor: &[u8]) -> Vec<u8> {
    let mut result = vec![0u8; divisor.len()];
    for &byte in data {
        let factor = byte ^ result.remove(0);
        result.push(0);
        for (r, &d) in result.iter_mut().zip(divisor) {
            *r ^= multiply(d, factor);
        }
    }
    result
}

/// Russian peasant multiplication in GF(2^8).
pub(crate) fn multiply(x: u8, y: u8) -> u8 {
    let mut z: u8 = 0;
    for i in (0..8).rev() {
        z = (z << 1) ^ ((z >> 7) * 0x1D);
        z ^= ((y >> i) & 1) * x;
    }
    z
}

// Sequential scan and result comparison, used to check the parallel scan.

/// In-place inclusive prefix sum, one element at a time.
pub fn sequential_prefix_sum(data: &mut [i64]) {
    for i in 1..data.len() {
        data[i] = data[i].wrapping_add(data[i - 1]);
    }
}

pub fn check_result(expected: &[i64], actual: &[i64]) -> bool {
    expected.len() == actual.len() && first_mismatch(expected, actual).is_none()
}

/// Position of the first differing element, comparing up to the shorter length.
pub fn first_mismatch(expected: &[i64], actual: &[i64]) -> Option<usize> {
    expected.iter().zip(actual).position(|(e, a)| e != a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_prefix_sum() {
        let mut data = [1, 2, 3, 4, 5];
        sequential_prefix_sum(&mut data);
        assert_eq!(data, [1, 3, 6, 10, 15]);

        let mut empty: [i64; 0] = [];
        sequential_prefix_sum(&mut empty);
    }

    #[test]
    fn test_check_result() {
        assert!(check_result(&[1, 2, 3], &[1, 2, 3]));
        assert!(!check_result(&[1, 2, 3], &[1, 2]));
        assert!(!check_result(&[1, 2, 3], &[1, 5, 3]));
        assert_eq!(first_mismatch(&[1, 2, 3], &[1, 5, 4]), Some(1));
        assert_eq!(first_mismatch(&[1, 2], &[1, 2]), None);
    }
}

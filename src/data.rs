// Input generation and array dumps for the driver binaries.

use std::fmt::Write;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Values are drawn from `0..VALUE_RANGE`.
pub const VALUE_RANGE: i64 = 5;

/// Random input of `len` items; a fixed `seed` makes it reproducible.
pub fn random_data(len: usize, seed: Option<u64>) -> Vec<i64> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    (0..len).map(|_| rng.gen_range(0..VALUE_RANGE)).collect()
}

/// `message` followed by every element, space separated.
pub fn format_data(message: &str, data: &[i64]) -> String {
    let mut out = String::with_capacity(message.len() + data.len() * 3);
    out.push_str(message);
    for value in data {
        let _ = write!(out, " {value}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_data_in_range() {
        let data = random_data(10_000, None);
        assert_eq!(data.len(), 10_000);
        assert!(data.iter().all(|v| (0..VALUE_RANGE).contains(v)));
    }

    #[test]
    fn test_seeded_data_repeats() {
        assert_eq!(random_data(64, Some(7)), random_data(64, Some(7)));
    }

    #[test]
    fn test_format_data() {
        assert_eq!(format_data("initial data :", &[1, 0, 4]), "initial data : 1 0 4");
        assert_eq!(format_data("empty:", &[]), "empty:");
    }
}

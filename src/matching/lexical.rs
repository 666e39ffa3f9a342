//! Character-level similarity.
//!
//! The ratio is the Indel similarity `(|a| + |b| - indel(a, b)) / (|a| + |b|)`, where the
//! Indel distance counts insertions and deletions only. It is rounded to a whole percent,
//! so scores carry two decimals.

/// Similarity of two strings in `[0, 1]`, computed over Unicode scalar values.
///
/// Equal strings score `1.0` (two empty strings included); a single empty side scores `0.0`.
/// The ratio is symmetric in its arguments.
pub fn lexical_ratio(a: &str, b: &str) -> f32 {
    if a == b {
        return 1.0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let total = a.len() + b.len();
    let matched = 2 * longest_common_subsequence(&a, &b);
    let percent = (100.0 * matched as f64 / total as f64).round_ties_even();

    (percent / 100.0) as f32
}

/// Length of the longest common subsequence (two-row dynamic programme).
fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let (outer, inner) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    let mut prev = vec![0usize; inner.len() + 1];
    let mut curr = vec![0usize; inner.len() + 1];

    for &oc in outer {
        for (j, &ic) in inner.iter().enumerate() {
            curr[j + 1] = if oc == ic {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[inner.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_similarity_is_one() {
        assert_eq!(lexical_ratio("gita", "gita"), 1.0);
        assert_eq!(lexical_ratio("", ""), 1.0);
    }

    #[test]
    fn test_empty_side_is_zero() {
        assert_eq!(lexical_ratio("gita", ""), 0.0);
        assert_eq!(lexical_ratio("", "gita"), 0.0);
    }

    #[test]
    fn test_disjoint_strings() {
        assert_eq!(lexical_ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_known_ratios() {
        // lcs("gita", "geeta") = "gta" -> 6 / 9
        assert_eq!(lexical_ratio("gita", "geeta"), 0.67);
        // lcs("priya", "prya") = "prya" -> 8 / 9
        assert_eq!(lexical_ratio("priya", "prya"), 0.89);
        // lcs("kris", "krish") = 4 -> 8 / 9
        assert_eq!(lexical_ratio("kris", "krish"), 0.89);
        // lcs("mohammad", "mohammed") = 7 -> 14 / 16
        assert_eq!(lexical_ratio("mohammad", "mohammed"), 0.88);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ("gita", "geetha"),
            ("amit", "amitabh"),
            ("sandeep", "sandip"),
            ("aisha", "aiesha"),
        ];
        for (a, b) in pairs {
            assert_eq!(lexical_ratio(a, b), lexical_ratio(b, a), "{a} vs {b}");
        }
    }

    #[test]
    fn test_case_sensitive() {
        assert!(lexical_ratio("Gita", "gita") < 1.0);
    }

    #[test]
    fn test_unicode_counts_scalars() {
        // one substituted scalar out of four on each side: lcs = 3 -> 6 / 8
        assert_eq!(lexical_ratio("café", "cafe"), 0.75);
    }

    #[test]
    fn test_half_percent_rounds_to_even() {
        // lcs = 1 over total 16 -> 12.5%
        assert_eq!(lexical_ratio("abcdefgh", "ijklmnoa"), 0.12);
    }

    #[test]
    fn test_range() {
        let names = ["Geetha", "Gitanjali", "Priyanshu", "Rama", "Lakshmi"];
        for a in names {
            for b in names {
                let r = lexical_ratio(a, b);
                assert!((0.0..=1.0).contains(&r));
            }
        }
    }
}

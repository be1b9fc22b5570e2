/// Length of the shortest prefix of `record` that, overlaid on `default`,
/// reproduces `record`.
///
/// This is the stored length of a property blob. It is never below 1 so a
/// blob always carries at least its first byte; a result of 1 means the
/// record can be written as the default.
pub fn compute_cch(record: &[u8], default: &[u8]) -> usize {
    debug_assert_eq!(record.len(), default.len());

    record
        .iter()
        .zip(default)
        .rposition(|(a, b)| a != b)
        .map_or(1, |last| (last + 1).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_is_one() {
        assert_eq!(compute_cch(&[0, 24, 0], &[0, 24, 0]), 1);
    }

    #[test]
    fn test_last_difference_sets_length() {
        assert_eq!(compute_cch(&[0, 1, 24, 0], &[0, 0, 24, 0]), 2);
        assert_eq!(compute_cch(&[0, 0, 24, 9], &[0, 0, 24, 0]), 4);
    }

    #[test]
    fn test_difference_in_first_byte() {
        assert_eq!(compute_cch(&[5, 0], &[0, 0]), 1);
    }
}

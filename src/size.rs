const UNIT: u64 = 1024;
const PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

/// Render a byte count with binary (1024 based) magnitude steps.
///
/// Below 1024 the integer count is shown with a `B` suffix. Otherwise the largest unit keeping
/// the scaled value below 1024 is picked and shown with one fractional digit, e.g. `1536` is
/// `"1.5 KB"`.
pub fn human_readable_size(size: u64) -> String {
    if size < UNIT {
        return format!("{} B", size);
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = size / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!("{:.1} {}B", size as f64 / div as f64, PREFIXES[exp])
}

#[cfg(test)]
mod tests {
    use super::human_readable_size;

    #[test]
    fn test_bytes() {
        assert_eq!(human_readable_size(0), "0 B");
        assert_eq!(human_readable_size(1), "1 B");
        assert_eq!(human_readable_size(1023), "1023 B");
    }

    #[test]
    fn test_units() {
        assert_eq!(human_readable_size(1024), "1.0 KB");
        assert_eq!(human_readable_size(1536), "1.5 KB");
        assert_eq!(human_readable_size(5000), "4.9 KB");
        assert_eq!(human_readable_size(1 << 20), "1.0 MB");
        assert_eq!(human_readable_size(1 << 30), "1.0 GB");
        assert_eq!(human_readable_size(1 << 32), "4.0 GB");
        assert_eq!(human_readable_size(1 << 40), "1.0 TB");
        assert_eq!(human_readable_size(1 << 50), "1.0 PB");
        assert_eq!(human_readable_size(1 << 60), "1.0 EB");
    }

    #[test]
    fn test_largest() {
        assert_eq!(human_readable_size(u64::MAX), "16.0 EB");
    }
}

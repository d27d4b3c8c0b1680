/// Keeps the major.minor part of a dotted version: `1.0.1` becomes `1.0`.
pub fn truncate_minor(version: &str) -> String {
    version.split('.').take(2).collect::<Vec<_>>().join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_minor() {
        assert_eq!(truncate_minor("1.0.1"), "1.0");
        assert_eq!(truncate_minor("4.0.0rc1"), "4.0");
        assert_eq!(truncate_minor("0.7"), "0.7");
        assert_eq!(truncate_minor("3"), "3");
        assert_eq!(truncate_minor(""), "");
    }

    #[test]
    fn test_truncate_idempotent() {
        for v in ["1.2.3", "1.2", "10.20.30.40", "2", "1.0.0.dev1"] {
            let once = truncate_minor(v);
            assert_eq!(truncate_minor(&once), once);
        }
    }
}

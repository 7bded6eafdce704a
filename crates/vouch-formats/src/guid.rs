//! GUID recognizer: 32 hex digits grouped 8-4-4-4-12.

const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

/// True for `{`-`}` wrapped or bare GUIDs. Each hyphen between groups is
/// independently optional; braces must be balanced.
pub fn is_guid(value: &str) -> bool {
    let body = match (value.strip_prefix('{'), value.strip_suffix('}')) {
        (Some(_), Some(_)) if value.len() >= 2 => &value[1..value.len() - 1],
        (None, None) => value,
        _ => return false,
    };
    let mut rest = body.as_bytes();
    for (index, width) in GROUPS.iter().enumerate() {
        if index > 0 {
            if let Some(stripped) = rest.strip_prefix(b"-") {
                rest = stripped;
            }
        }
        if rest.len() < *width || !rest[..*width].iter().all(u8::is_ascii_hexdigit) {
            return false;
        }
        rest = &rest[*width..];
    }
    rest.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_shapes() {
        assert!(is_guid("{D1A5279D-B27D-4CD4-A05E-EFDD53D08E8D}"));
        assert!(is_guid("69593D62-71EA-4548-85E4-04FC71357423"));
        assert!(is_guid("677E2553DD4D43B09DA77414DB1EB8EA"));
        assert!(is_guid("{D1A5279DB27D-4CD4A05E-EFDD53D08E8D}"));
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(!is_guid("{D1A5279D-B27D-4CD4-A05E-EFDD53D08E8D"));
        assert!(!is_guid("D1A5279D-B27D-4CD4-A05E-EFDD53D08E8D}"));
        assert!(!is_guid("69593D62-71EA-4548-85E4-04FC7135742"));
        assert!(!is_guid("Z9593D62-71EA-4548-85E4-04FC71357423"));
        assert!(!is_guid("69593D62--71EA-4548-85E4-04FC71357423"));
        assert!(!is_guid("{}"));
        assert!(!is_guid(""));
    }
}

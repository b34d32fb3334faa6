pub mod csv;
pub mod gpkg;
pub mod shapefile;

/// dBase restricts field names to 10 bytes. Longer attribute names are
/// truncated and uniquified the way desktop GIS drivers do; values are
/// untouched.
pub(crate) fn dbf_field_names(names: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let mut short: String = name.chars().take(10).collect();
        let mut counter = 1u32;
        while seen.iter().any(|s| s.eq_ignore_ascii_case(&short)) {
            let suffix = counter.to_string();
            let keep = 10usize.saturating_sub(suffix.len());
            short = name.chars().take(keep).collect::<String>() + &suffix;
            counter += 1;
        }
        seen.push(short);
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_and_uniquifies() {
        let names = vec![
            "exported_by".to_string(),
            "exported_date".to_string(),
            "exported_bytes".to_string(),
        ];
        let short = dbf_field_names(&names);
        assert_eq!(short, vec!["exported_b", "exported_d", "exported_1"]);
    }

    #[test]
    fn short_names_pass_through() {
        let names = vec!["id".to_string(), "lon".to_string()];
        assert_eq!(dbf_field_names(&names), names);
    }
}

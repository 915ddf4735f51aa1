use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// `CODESHAPE_QUIET=1` suppresses human-readable output
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| quiet_from(std::env::var("CODESHAPE_QUIET").ok().as_deref()))
}

fn quiet_from(value: Option<&str>) -> bool {
    value
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

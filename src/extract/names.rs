use super::text::clean_text;

/// Stand-in anchor id when a name token has no link at all.
pub const NO_LINK: &str = "NO LINK";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalName {
    pub name: String,
    pub indexed: bool,
    pub component: bool,
}

/// Canonical SimVar key: the label up to the first `:`, underscores read as spaces,
/// upper-cased, only letters/digits/spaces kept, whitespace collapsed.
///
/// `:name` marks a sub-component (which implies an index); `:index`, `:i` and `:N`
/// style markers set the indexed flag.
pub fn canonical_simvar_name(raw: &str) -> CanonicalName {
    let cleaned = clean_text(raw);
    let mut parts = cleaned.split(':');
    let base = parts.next().unwrap_or_default();
    let markers = parts.collect::<Vec<&str>>();

    let component = markers.iter().any(|marker| marker.starts_with("name"));
    let indexed = component
        || markers
            .iter()
            .any(|marker| marker.starts_with(['i', 'I', 'N']));

    let filtered = base
        .replace('_', " ")
        .to_ascii_uppercase()
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || ch.is_whitespace())
        .collect::<String>();

    CanonicalName {
        name: filtered.split_whitespace().collect::<Vec<&str>>().join(" "),
        indexed,
        component,
    }
}

/// Canonical Key Event key: word characters only. Underscores are part of event names.
pub fn canonical_event_name(raw: &str) -> String {
    clean_text(raw)
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .collect()
}

pub fn event_anchor_matches(name: &str, anchor_id: &str) -> bool {
    name == anchor_id
}

/// SimVar anchors spell spaces as underscores.
pub fn simvar_anchor_matches(name: &str, anchor_id: &str) -> bool {
    anchor_id.replace('_', " ") == name
}

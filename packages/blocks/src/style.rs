//! Presentation-only prop subset used by the style clipboard

use crate::Props;

/// Prop keys that carry presentation, never content
pub const STYLE_PROP_KEYS: [&str; 17] = [
    "className",
    "style",
    "customCss",
    "animation",
    "textAlign",
    "fontSize",
    "fontWeight",
    "color",
    "background",
    "backgroundColor",
    "padding",
    "margin",
    "border",
    "borderRadius",
    "shadow",
    "opacity",
    "columns",
];

pub fn is_style_key(key: &str) -> bool {
    STYLE_PROP_KEYS.contains(&key)
}

/// Copy the allow-listed keys present in `props`
pub fn extract_style_payload(props: &Props) -> Props {
    props
        .iter()
        .filter(|(key, _)| is_style_key(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Merge `payload` into `props`, skipping anything outside the allow-list
pub fn apply_style_payload(props: &Props, payload: &Props) -> Props {
    let mut merged = props.clone();
    for (key, value) in payload {
        if is_style_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn props(value: Value) -> Props {
        crate::props_from(value)
    }

    #[test]
    fn test_extract_only_style_keys() {
        let source = props(json!({
            "text": "Buy",
            "link": "/cart",
            "color": "red",
            "padding": "8px",
        }));

        let payload = extract_style_payload(&source);
        assert_eq!(payload.len(), 2);
        assert_eq!(payload["color"], "red");
        assert!(!payload.contains_key("text"));
    }

    #[test]
    fn test_apply_leaves_content_untouched() {
        let target = props(json!({ "text": "Hello", "link": "/", "color": "blue" }));
        let payload = props(json!({ "color": "red", "text": "Injected", "opacity": 0.5 }));

        let merged = apply_style_payload(&target, &payload);
        assert_eq!(merged["text"], "Hello");
        assert_eq!(merged["link"], "/");
        assert_eq!(merged["color"], "red");
        assert_eq!(merged["opacity"], 0.5);
    }
}

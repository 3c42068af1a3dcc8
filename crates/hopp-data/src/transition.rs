//! Body transition between content types
//!
//! | from \ to   | none | raw text    | urlencoded  | form data       |
//! |-------------|------|-------------|-------------|-----------------|
//! | none        | none | `""`        | `""`        | `[]`            |
//! | raw text    | none | keep string | keep string | `[]`            |
//! | urlencoded  | none | keep string | keep string | parse lines     |
//! | form data   | none | `""`        | render text | keep entries    |
//!
//! A transition to the current content type returns the body untouched.

use std::sync::Arc;

use crate::body::{BodyKind, ContentType, FormDataKeyValue, RestReqBody};
use crate::raw_kv::{parse_raw_key_value, raw_key_value_to_string, RawKeyValueEntry};

/// Map `current` into the shape required by `target`, keeping what survives
pub fn apply_body_transition(
    current: &Arc<RestReqBody>,
    target: Option<ContentType>,
) -> Arc<RestReqBody> {
    if current.content_type() == target {
        return Arc::clone(current);
    }
    let Some(target) = target else {
        return Arc::new(RestReqBody::None);
    };

    let next = match (current.as_ref(), target.kind()) {
        (RestReqBody::None, _) => RestReqBody::empty(Some(target)),
        (RestReqBody::Text { body, .. }, BodyKind::RawText | BodyKind::UrlEncoded) => {
            RestReqBody::text(target, body.clone())
        }
        (RestReqBody::Text { content_type, body }, BodyKind::FormData) => {
            match content_type.kind() {
                BodyKind::UrlEncoded => RestReqBody::FormData(form_entries_from_text(body)),
                _ => RestReqBody::FormData(Vec::new()),
            }
        }
        (RestReqBody::FormData(entries), BodyKind::UrlEncoded) => {
            RestReqBody::text(target, text_from_form_entries(entries))
        }
        (RestReqBody::FormData(_), BodyKind::RawText) => RestReqBody::text(target, ""),
        (RestReqBody::FormData(entries), BodyKind::FormData) => {
            RestReqBody::FormData(entries.clone())
        }
    };

    log::debug!(
        "Body transition {:?} -> {}",
        current.content_type().map(|ct| ct.as_str()),
        target
    );
    Arc::new(next)
}

fn form_entries_from_text(text: &str) -> Vec<FormDataKeyValue> {
    parse_raw_key_value(text)
        .into_iter()
        .map(|entry| FormDataKeyValue {
            key: entry.key,
            value: entry.value,
            active: entry.active,
            is_file: false,
        })
        .collect()
}

fn text_from_form_entries(entries: &[FormDataKeyValue]) -> String {
    let text_entries: Vec<RawKeyValueEntry> = entries
        .iter()
        .filter(|entry| !entry.is_file)
        .map(|entry| RawKeyValueEntry {
            key: entry.key.clone(),
            value: entry.value.clone(),
            active: entry.active,
        })
        .collect();
    raw_key_value_to_string(&text_entries)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn body(b: RestReqBody) -> Arc<RestReqBody> {
        Arc::new(b)
    }

    #[test]
    fn test_same_type_keeps_identity() {
        let current = body(RestReqBody::text(ContentType::Json, "{\"a\":1}"));
        let next = apply_body_transition(&current, Some(ContentType::Json));
        assert!(Arc::ptr_eq(&current, &next));
    }

    #[test]
    fn test_to_none_clears_body() {
        let current = body(RestReqBody::text(ContentType::Json, "{}"));
        assert_eq!(*apply_body_transition(&current, None), RestReqBody::None);
    }

    #[test]
    fn test_from_none_gives_empty_body_of_target() {
        let current = body(RestReqBody::None);
        assert_eq!(
            *apply_body_transition(&current, Some(ContentType::Xml)),
            RestReqBody::text(ContentType::Xml, "")
        );
        assert_eq!(
            *apply_body_transition(&current, Some(ContentType::MultipartFormData)),
            RestReqBody::FormData(Vec::new())
        );
    }

    #[test]
    fn test_raw_to_raw_keeps_text() {
        let current = body(RestReqBody::text(ContentType::Json, "{\"a\":1}"));
        assert_eq!(
            *apply_body_transition(&current, Some(ContentType::Plain)),
            RestReqBody::text(ContentType::Plain, "{\"a\":1}")
        );
    }

    #[test]
    fn test_json_to_form_data_is_empty() {
        let current = body(RestReqBody::text(ContentType::Json, "{\"a\":1}"));
        assert_eq!(
            *apply_body_transition(&current, Some(ContentType::MultipartFormData)),
            RestReqBody::FormData(Vec::new())
        );
    }

    #[test]
    fn test_urlencoded_and_form_data_convert_entries() {
        let current = body(RestReqBody::text(
            ContentType::FormUrlEncoded,
            "a: 1\n#b: 2",
        ));
        let form = apply_body_transition(&current, Some(ContentType::MultipartFormData));
        let mut inactive = FormDataKeyValue::text("b", "2");
        inactive.active = false;
        assert_eq!(
            *form,
            RestReqBody::FormData(vec![FormDataKeyValue::text("a", "1"), inactive])
        );

        let back = apply_body_transition(&form, Some(ContentType::FormUrlEncoded));
        assert_eq!(
            *back,
            RestReqBody::text(ContentType::FormUrlEncoded, "a: 1\n#b: 2")
        );
    }

    #[test]
    fn test_form_data_to_raw_is_empty_text() {
        let current = body(RestReqBody::FormData(vec![FormDataKeyValue::text("a", "1")]));
        assert_eq!(
            *apply_body_transition(&current, Some(ContentType::Json)),
            RestReqBody::text(ContentType::Json, "")
        );
    }

    #[test]
    fn test_every_pair_yields_target_type() {
        let samples = [
            RestReqBody::None,
            RestReqBody::text(ContentType::Json, "{}"),
            RestReqBody::text(ContentType::FormUrlEncoded, "a: 1"),
            RestReqBody::FormData(vec![FormDataKeyValue::text("a", "1")]),
        ];
        for sample in samples {
            let current = body(sample);
            for target in ContentType::ALL {
                let next = apply_body_transition(&current, Some(target));
                assert_eq!(next.content_type(), Some(target));
            }
        }
    }
}

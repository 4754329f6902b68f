use core::cmp::Ordering;

use crate::EntryAttributes;

/// Catalog order: ranking ascending, then name, then version (both compared
/// as plain text).
///
/// An absent name or version compares as the empty string, so unnamed
/// entries sort ahead of named ones with the same ranking.
///
/// Lower rankings come first even though a higher ranking marks the more
/// prominent entry. Callers that want "most prominent first" reverse the
/// result themselves.
pub fn by_rank<T: AsRef<EntryAttributes> + ?Sized>(a: &T, b: &T) -> Ordering {
    let (a, b) = (a.as_ref(), b.as_ref());
    a.ranking()
        .cmp(&b.ranking())
        .then_with(|| text(&a.name).cmp(text(&b.name)))
        .then_with(|| text(&a.version).cmp(text(&b.version)))
}

fn text(field: &Option<alloc::string::String>) -> &str {
    field.as_deref().unwrap_or_default()
}

impl AsRef<EntryAttributes> for EntryAttributes {
    fn as_ref(&self) -> &EntryAttributes {
        self
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    fn attrs(ranking: Option<i32>, name: Option<&str>, version: Option<&str>) -> EntryAttributes {
        EntryAttributes {
            ranking,
            name: name.map(Into::into),
            version: version.map(Into::into),
            ..EntryAttributes::default()
        }
    }

    #[test]
    fn ranking_sorts_ascending() {
        let high = attrs(Some(10), Some("tasks"), Some("v2"));
        let low = attrs(Some(5), Some("tasks"), Some("v1"));
        assert_eq!(by_rank(&high, &low), Ordering::Greater);
    }

    #[test]
    fn absent_ranking_sorts_as_zero() {
        let unranked = attrs(None, Some("b"), None);
        let zero = attrs(Some(0), Some("b"), None);
        assert_eq!(by_rank(&unranked, &zero), Ordering::Equal);
        assert_eq!(
            by_rank(&attrs(Some(-1), Some("z"), None), &unranked),
            Ordering::Less
        );
    }

    #[test]
    fn ties_break_on_name_then_version() {
        let mut entries = vec![
            attrs(Some(1), Some("urlshortener"), Some("v1")),
            attrs(Some(1), Some("tasks"), Some("v2")),
            attrs(Some(1), Some("tasks"), Some("v1")),
            attrs(Some(1), None, None),
        ];
        entries.sort_by(by_rank);
        let keys: Vec<_> = entries
            .iter()
            .map(|e| (e.name.as_deref(), e.version.as_deref()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (None, None),
                (Some("tasks"), Some("v1")),
                (Some("tasks"), Some("v2")),
                (Some("urlshortener"), Some("v1")),
            ]
        );
    }

    #[test]
    fn versions_compare_lexically() {
        let v10 = attrs(None, Some("a"), Some("v10"));
        let v9 = attrs(None, Some("a"), Some("v9"));
        assert_eq!(by_rank(&v10, &v9), Ordering::Less);
    }
}

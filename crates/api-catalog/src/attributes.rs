use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;

use chrono::NaiveDate;
use url::Url;

/// Descriptive fields for one API version.
///
/// Every field tracks its own presence: `None` means "not specified", which is
/// distinct from `Some(false)` or `Some(0)`. Overlays depend on that
/// distinction, so never collapse an absent field into its fallback value
/// when storing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryAttributes {
    /// API name. Together with `version` this forms the entry identity.
    pub name: Option<String>,
    pub version: Option<String>,
    /// Human-readable title. Read it through [`Self::display_name`].
    pub display_name: Option<String>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    /// Icon links keyed by size (`"x16"`, `"32"`, ...).
    pub icon_links: BTreeMap<String, Url>,
    /// Free-form tags.
    pub labels: BTreeSet<String>,
    pub release_date: Option<NaiveDate>,
    pub release_notes_link: Option<Url>,
    /// Sort key. Absent reads as `0`; see [`crate::by_rank`] for the ordering
    /// it feeds.
    pub ranking: Option<i32>,
    pub discovery_link: Option<Url>,
    pub documentation_link: Option<Url>,
    pub download_link: Option<Url>,
    pub tos_link: Option<Url>,
    pub preferred: Option<bool>,
}

impl EntryAttributes {
    /// The title if one was given, otherwise the name.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref().or(self.name.as_deref())
    }

    pub fn ranking(&self) -> i32 {
        self.ranking.unwrap_or(0)
    }

    pub fn is_preferred(&self) -> bool {
        self.preferred.unwrap_or(false)
    }

    /// Fill gaps from `defaults`.
    ///
    /// Scalar and link fields are copied only where `self` has none. Labels
    /// are unioned. Icon links are copied only for keys `self` lacks.
    pub fn apply_defaults(&mut self, defaults: &EntryAttributes) {
        fill(&mut self.name, &defaults.name);
        fill(&mut self.version, &defaults.version);
        fill(&mut self.display_name, &defaults.display_name);
        fill(&mut self.publisher, &defaults.publisher);
        fill(&mut self.description, &defaults.description);
        fill(&mut self.release_date, &defaults.release_date);
        fill(&mut self.release_notes_link, &defaults.release_notes_link);
        fill(&mut self.ranking, &defaults.ranking);
        fill(&mut self.discovery_link, &defaults.discovery_link);
        fill(&mut self.documentation_link, &defaults.documentation_link);
        fill(&mut self.download_link, &defaults.download_link);
        fill(&mut self.tos_link, &defaults.tos_link);
        fill(&mut self.preferred, &defaults.preferred);

        self.labels.extend(defaults.labels.iter().cloned());
        for (key, link) in &defaults.icon_links {
            self.icon_links
                .entry(key.clone())
                .or_insert_with(|| link.clone());
        }
    }

    /// Apply `overrides` unconditionally.
    ///
    /// Every field `overrides` specifies replaces the current value. A
    /// non-empty label set replaces the whole label set. Icon links are
    /// written per key, overwriting existing keys and keeping the others.
    pub fn apply_overrides(&mut self, overrides: &EntryAttributes) {
        replace(&mut self.name, &overrides.name);
        replace(&mut self.version, &overrides.version);
        replace(&mut self.display_name, &overrides.display_name);
        replace(&mut self.publisher, &overrides.publisher);
        replace(&mut self.description, &overrides.description);
        replace(&mut self.release_date, &overrides.release_date);
        replace(&mut self.release_notes_link, &overrides.release_notes_link);
        replace(&mut self.ranking, &overrides.ranking);
        replace(&mut self.discovery_link, &overrides.discovery_link);
        replace(&mut self.documentation_link, &overrides.documentation_link);
        replace(&mut self.download_link, &overrides.download_link);
        replace(&mut self.tos_link, &overrides.tos_link);
        replace(&mut self.preferred, &overrides.preferred);

        if !overrides.labels.is_empty() {
            self.labels.clone_from(&overrides.labels);
        }
        for (key, link) in &overrides.icon_links {
            self.icon_links.insert(key.clone(), link.clone());
        }
    }

    /// Return a copy with every link passed through `rewrite`.
    pub fn map_links(&self, mut rewrite: impl FnMut(&Url) -> Url) -> EntryAttributes {
        let mut mapped = self.clone();
        for link in [
            &mut mapped.release_notes_link,
            &mut mapped.discovery_link,
            &mut mapped.documentation_link,
            &mut mapped.download_link,
            &mut mapped.tos_link,
        ]
        .into_iter()
        .flatten()
        {
            *link = rewrite(link);
        }
        for link in mapped.icon_links.values_mut() {
            *link = rewrite(link);
        }
        mapped
    }
}

fn fill<T: Clone>(slot: &mut Option<T>, default: &Option<T>) {
    if slot.is_none() {
        slot.clone_from(default);
    }
}

fn replace<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        slot.clone_from(value);
    }
}

#[cfg(test)]
mod tests {
    use alloc::borrow::ToOwned;

    use super::*;

    fn link(s: &str) -> Url {
        Url::parse(s).expect("valid test link")
    }

    fn with_icons(icons: &[(&str, &str)]) -> EntryAttributes {
        EntryAttributes {
            icon_links: icons
                .iter()
                .map(|(k, v)| ((*k).to_owned(), link(v)))
                .collect(),
            ..EntryAttributes::default()
        }
    }

    #[test]
    fn display_name_falls_back_to_name() {
        let mut attrs = EntryAttributes {
            name: Some("tasks".into()),
            ..EntryAttributes::default()
        };
        assert_eq!(attrs.display_name(), Some("tasks"));

        attrs.display_name = Some("Tasks API".into());
        assert_eq!(attrs.display_name(), Some("Tasks API"));
    }

    #[test]
    fn absent_ranking_reads_as_zero() {
        let attrs = EntryAttributes::default();
        assert_eq!(attrs.ranking(), 0);
        assert!(attrs.ranking.is_none());
    }

    #[test]
    fn preferred_false_is_not_absent() {
        let mut entry = EntryAttributes {
            preferred: Some(false),
            ..EntryAttributes::default()
        };
        entry.apply_defaults(&EntryAttributes {
            preferred: Some(true),
            ..EntryAttributes::default()
        });
        assert_eq!(entry.preferred, Some(false));
    }

    #[test]
    fn defaults_fill_only_gaps() {
        let mut entry = EntryAttributes {
            description: Some("mine".into()),
            ..EntryAttributes::default()
        };
        entry.apply_defaults(&EntryAttributes {
            description: Some("theirs".into()),
            publisher: Some("Google".into()),
            ranking: Some(7),
            ..EntryAttributes::default()
        });
        assert_eq!(entry.description.as_deref(), Some("mine"));
        assert_eq!(entry.publisher.as_deref(), Some("Google"));
        assert_eq!(entry.ranking, Some(7));
    }

    #[test]
    fn defaults_union_labels() {
        let mut entry = EntryAttributes {
            labels: ["labs".to_owned()].into(),
            ..EntryAttributes::default()
        };
        entry.apply_defaults(&EntryAttributes {
            labels: ["labs".to_owned(), "deprecated".to_owned()].into(),
            ..EntryAttributes::default()
        });
        assert_eq!(
            entry.labels,
            BTreeSet::from(["deprecated".to_owned(), "labs".to_owned()])
        );
    }

    #[test]
    fn overrides_replace_labels_wholesale() {
        let mut entry = EntryAttributes {
            labels: ["labs".to_owned(), "beta".to_owned()].into(),
            ..EntryAttributes::default()
        };
        entry.apply_overrides(&EntryAttributes {
            labels: ["stable".to_owned()].into(),
            ..EntryAttributes::default()
        });
        assert_eq!(entry.labels, BTreeSet::from(["stable".to_owned()]));
    }

    #[test]
    fn empty_override_labels_keep_existing() {
        let mut entry = EntryAttributes {
            labels: ["labs".to_owned()].into(),
            ..EntryAttributes::default()
        };
        entry.apply_overrides(&EntryAttributes::default());
        assert_eq!(entry.labels, BTreeSet::from(["labs".to_owned()]));
    }

    #[test]
    fn overrides_replace_set_fields_only() {
        let mut entry = EntryAttributes {
            description: Some("mine".into()),
            publisher: Some("Me".into()),
            preferred: Some(true),
            ..EntryAttributes::default()
        };
        entry.apply_overrides(&EntryAttributes {
            description: Some("theirs".into()),
            preferred: Some(false),
            ..EntryAttributes::default()
        });
        assert_eq!(entry.description.as_deref(), Some("theirs"));
        assert_eq!(entry.publisher.as_deref(), Some("Me"));
        assert_eq!(entry.preferred, Some(false));
    }

    #[test]
    fn icon_overlay_asymmetry() {
        let original = with_icons(&[("16", "http://a.test/16.png")]);
        let overlay = with_icons(&[
            ("16", "http://b.test/16.png"),
            ("32", "http://b.test/32.png"),
        ]);

        let mut overridden = original.clone();
        overridden.apply_overrides(&overlay);
        assert_eq!(overridden.icon_links["16"].as_str(), "http://b.test/16.png");
        assert_eq!(overridden.icon_links["32"].as_str(), "http://b.test/32.png");

        let mut defaulted = original;
        defaulted.apply_defaults(&overlay);
        assert_eq!(defaulted.icon_links["16"].as_str(), "http://a.test/16.png");
        assert_eq!(defaulted.icon_links["32"].as_str(), "http://b.test/32.png");
    }

    #[test]
    fn map_links_touches_every_link() {
        let attrs = EntryAttributes {
            discovery_link: Some(link("http://a.test/d")),
            tos_link: Some(link("http://a.test/t")),
            icon_links: [("16".to_owned(), link("http://a.test/i"))].into(),
            ..EntryAttributes::default()
        };
        let mapped = attrs.map_links(|_| link("http://z.test/"));
        assert_eq!(
            mapped.discovery_link.as_ref().map(Url::as_str),
            Some("http://z.test/")
        );
        assert_eq!(
            mapped.tos_link.as_ref().map(Url::as_str),
            Some("http://z.test/")
        );
        assert_eq!(mapped.icon_links["16"].as_str(), "http://z.test/");
        assert!(mapped.download_link.is_none());
    }
}

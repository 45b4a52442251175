use crate::client::ClientError;
use crate::payload::StatsPayload;
use crate::render::escape_html;

pub const KEY_INDEX_NAME: &str = "name-index";
pub const KEY_PERMUTATIONS: &str = "num-permutations";
pub const KEY_TRIPLES: &str = "num-triples-normal";
pub const KEY_SUBJECTS: &str = "num-subjects-normal";
pub const KEY_PREDICATES: &str = "num-predicates-normal";
pub const KEY_OBJECTS: &str = "num-objects-normal";
pub const KEY_TEXT_NAME: &str = "name-text-index";
pub const KEY_TEXT_RECORDS: &str = "num-text-records";
pub const KEY_WORD_OCCURRENCES: &str = "num-word-occurrences";
pub const KEY_ENTITY_OCCURRENCES: &str = "num-entity-occurrences";

/// Permutation count of an index built with all six orders. Only such an
/// index can report distinct subject and object counts.
pub const ALL_PERMUTATIONS: &str = "6";

/// A display slot of the stats panel: element id, label, stats key.
struct Slot {
    id: &'static str,
    label: &'static str,
    key: &'static str,
}

const BASE_SLOTS: &[Slot] = &[
    Slot { id: "kbname", label: "Index", key: KEY_INDEX_NAME },
    Slot { id: "ntriples", label: "Triples", key: KEY_TRIPLES },
];

static PERMUTATION_SLOT: Slot = Slot {
    id: "npermutations",
    label: "Permutations",
    key: KEY_PERMUTATIONS,
};

const EXTENDED_SLOTS: &[Slot] = &[
    Slot { id: "nsubjects", label: "Subjects", key: KEY_SUBJECTS },
    Slot { id: "npredicates", label: "Predicates", key: KEY_PREDICATES },
    Slot { id: "nobjects", label: "Objects", key: KEY_OBJECTS },
];

const TEXT_SLOTS: &[Slot] = &[
    Slot { id: "textname", label: "Text index", key: KEY_TEXT_NAME },
    Slot { id: "ntexts", label: "Text records", key: KEY_TEXT_RECORDS },
    Slot { id: "nwo", label: "Word occurrences", key: KEY_WORD_OCCURRENCES },
    Slot { id: "neo", label: "Entity occurrences", key: KEY_ENTITY_OCCURRENCES },
];

pub fn has_all_permutations(stats: &StatsPayload) -> bool {
    stats
        .text(KEY_PERMUTATIONS)
        .map(|v| v.trim() == ALL_PERMUTATIONS)
        .unwrap_or(false)
}

/// Label/value pairs in display order, values already formatted.
pub fn stats_lines(stats: &StatsPayload) -> Vec<(&'static str, String)> {
    visible_slots(stats)
        .into_iter()
        .map(|slot| (slot.label, stats.display(slot.key)))
        .collect()
}

fn visible_slots(stats: &StatsPayload) -> Vec<&'static Slot> {
    let mut slots: Vec<&'static Slot> = BASE_SLOTS.iter().collect();
    slots.push(&PERMUTATION_SLOT);
    if has_all_permutations(stats) {
        slots.extend(EXTENDED_SLOTS.iter());
    }
    slots.extend(TEXT_SLOTS.iter());
    slots
}

pub fn render_stats(stats: &StatsPayload) -> String {
    let mut out = String::from("<div id=\"stats\" class=\"stats\">\n  <dl>\n");
    for slot in visible_slots(stats) {
        out.push_str(&format!(
            "    <dt>{}</dt><dd id=\"{}\">{}</dd>\n",
            slot.label,
            slot.id,
            escape_html(&stats.display(slot.key))
        ));
    }
    out.push_str("  </dl>\n</div>\n");
    out
}

pub fn render_stats_unavailable(err: &ClientError) -> String {
    format!(
        "<div id=\"stats\" class=\"stats unavailable\">\n  \
         <p>Index statistics are not available.</p>\n  \
         <p class=\"detail\">{}</p>\n\
         </div>\n",
        escape_html(&err.to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(raw: &str) -> StatsPayload {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn six_permutations_render_the_breakdown() {
        let s = stats(
            r#"{"name-index":"wikidata","num-permutations":6,"num-triples-normal":17000000000,
                "num-subjects-normal":1200000,"num-predicates-normal":40000,"num-objects-normal":3000000}"#,
        );
        assert!(has_all_permutations(&s));
        let html = render_stats(&s);
        assert!(html.contains("<dd id=\"npermutations\">6</dd>"));
        assert!(html.contains("<dd id=\"nsubjects\">1,200,000</dd>"));
        assert!(html.contains("<dd id=\"npredicates\">40,000</dd>"));
        assert!(html.contains("<dd id=\"nobjects\">3,000,000</dd>"));
        assert!(html.contains("<dd id=\"ntriples\">17,000,000,000</dd>"));
    }

    #[test]
    fn string_six_counts_as_all_permutations() {
        assert!(has_all_permutations(&stats(r#"{"num-permutations":"6"}"#)));
    }

    #[test]
    fn other_counts_render_only_the_permutation_count() {
        let s = stats(r#"{"num-permutations":2,"num-predicates-normal":10}"#);
        assert!(!has_all_permutations(&s));
        let html = render_stats(&s);
        assert!(html.contains("<dd id=\"npermutations\">2</dd>"));
        assert!(!html.contains("nsubjects"));
        assert!(!html.contains("npredicates"));
        assert!(!html.contains("nobjects"));
    }

    #[test]
    fn missing_counters_render_empty_slots() {
        let html = render_stats(&stats("{}"));
        assert!(html.contains("<dd id=\"kbname\"></dd>"));
        let lines = stats_lines(&stats(r#"{"name-index":"<b>"}"#));
        assert_eq!(lines[0], ("Index", "<b>".to_string()));
        assert!(render_stats(&stats(r#"{"name-index":"<b>"}"#)).contains("&lt;b&gt;"));
    }
}

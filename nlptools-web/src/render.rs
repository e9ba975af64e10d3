//! Páginas HTML renderizadas com askama.

use askama::Template;
use nlptools_core::TaggedDocument;

/// Cores fixas dos rótulos mais comuns.
const KNOWN_COLORS: [(&str, &str); 4] = [
    ("PER", "#3b82f6"),
    ("ORG", "#10b981"),
    ("LOC", "#f59e0b"),
    ("MISC", "#8b5cf6"),
];

/// Paleta para os demais rótulos, escolhida pelo próprio rótulo.
const FALLBACK_COLORS: [&str; 6] = ["#ef4444", "#ec4899", "#14b8a6", "#84cc16", "#6366f1", "#f97316"];

/// Cor de fundo de um rótulo. O mesmo rótulo recebe sempre a mesma cor.
pub fn label_color(label: &str) -> &'static str {
    let upper = label.to_uppercase();
    if let Some((_, color)) = KNOWN_COLORS.iter().find(|(known, _)| *known == upper) {
        return color;
    }
    let hash = upper.bytes().fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
    FALLBACK_COLORS[hash % FALLBACK_COLORS.len()]
}

struct SegmentView {
    text: String,
    /// Vazio para trechos sem entidade.
    label: String,
    color: &'static str,
}

struct LegendEntry {
    label: String,
    color: &'static str,
}

#[derive(Template)]
#[template(path = "entities.html")]
struct EntitiesTemplate {
    title: String,
    segments: Vec<SegmentView>,
    legend: Vec<LegendEntry>,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    legend: Vec<LegendEntry>,
}

/// Texto do documento com as entidades destacadas.
pub fn entities(doc: &TaggedDocument) -> Result<String, askama::Error> {
    let displacy = doc.displacy_format();
    let segments: Vec<SegmentView> = doc
        .segments()
        .into_iter()
        .map(|segment| match segment.label {
            Some(label) => SegmentView {
                text: segment.text,
                color: label_color(&label),
                label,
            },
            None => SegmentView {
                text: segment.text,
                label: String::new(),
                color: "",
            },
        })
        .collect();

    let mut labels: Vec<&str> = displacy.ents.iter().map(|e| e.label.as_str()).collect();
    labels.sort_unstable();
    labels.dedup();
    let legend = labels
        .into_iter()
        .map(|label| LegendEntry {
            label: label.to_string(),
            color: label_color(label),
        })
        .collect();

    EntitiesTemplate {
        title: displacy.title,
        segments,
        legend,
    }
    .render()
}

pub fn index() -> Result<String, askama::Error> {
    let legend = KNOWN_COLORS
        .iter()
        .map(|(label, color)| LegendEntry {
            label: label.to_string(),
            color,
        })
        .collect();
    IndexTemplate { legend }.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_colors() {
        assert_eq!(label_color("PER"), "#3b82f6");
        assert_eq!(label_color("loc"), "#f59e0b");
        let other = label_color("RAZON_SOCIAL");
        assert!(FALLBACK_COLORS.contains(&other));
        assert_eq!(other, label_color("razon_social"));
    }

    #[test]
    fn test_entities_page_marks_and_escapes() {
        let doc = TaggedDocument::from_json(
            r#"{
                "doc_id": "d<1>",
                "text": "Juan & Ana viven en Córdoba",
                "entities": {"tags": [
                    {"start": 20, "end": 27, "tag": "LOC", "text": "Córdoba"},
                    {"start": 0, "end": 4, "tag": "PER", "text": "Juan"}
                ]}
            }"#,
        )
        .unwrap();

        let html = entities(&doc).unwrap();
        assert!(html.contains("d&#60;1&#62;") || html.contains("d&lt;1&gt;"));
        assert!(html.contains("Córdoba"));
        assert!(html.contains("#f59e0b"));
        assert!(html.contains("#3b82f6"));
        assert!(!html.contains("Juan & Ana"));
        assert!(html.find("Juan").unwrap() < html.find("Córdoba").unwrap());
    }

    #[test]
    fn test_index_page_renders() {
        let html = index().unwrap();
        assert!(html.contains("/ws"));
        assert!(html.contains("MISC"));
    }
}

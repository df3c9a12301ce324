//! Static copy for the landing page

use ragpage_core::page::{CardKind, CardSpec, NavLink, SectionSpec};

pub const SITE_TITLE: &str = "WP RAG Assistant";

pub fn nav_links() -> Vec<NavLink> {
    vec![
        NavLink::new("Overview", "#overview"),
        NavLink::new("How it works", "#architecture"),
        NavLink::new("Metrics", "#metrics"),
        NavLink::new("Findings", "#findings"),
        NavLink::new("Try it", "#demo"),
    ]
}

pub fn sections() -> Vec<SectionSpec> {
    vec![
        SectionSpec::new(
            "overview",
            "Answers for WordPress developers, grounded in the docs",
            &[
                "A retrieval-augmented assistant over the WordPress developer handbooks,",
                "code reference and plugin/theme guides. Every answer cites its sources.",
            ],
            vec![
                CardSpec::new(
                    CardKind::Card,
                    "Hybrid retrieval",
                    &[
                        "Keyword and vector search are combined so exact function",
                        "names like wp_enqueue_script match as well as concepts.",
                    ],
                ),
                CardSpec::new(
                    CardKind::Card,
                    "Query classification",
                    &[
                        "Questions are sorted into how-to, conceptual and reference",
                        "queries before retrieval picks its strategy.",
                    ],
                ),
                CardSpec::new(
                    CardKind::Card,
                    "Cited answers",
                    &[
                        "The top three documents are passed to the generator and",
                        "listed under each answer with a relevance score.",
                    ],
                ),
            ],
        ),
        SectionSpec::new(
            "architecture",
            "How a question is answered",
            &["Each query runs through the same pipeline on the API server."],
            vec![
                CardSpec::new(CardKind::FlowStep, "1. Ask", &["The question is posted to /query with k = 3."]),
                CardSpec::new(CardKind::FlowStep, "2. Classify", &["The query type selects retrieval weights."]),
                CardSpec::new(CardKind::FlowStep, "3. Retrieve", &["Candidate chunks come from both indexes and are merged."]),
                CardSpec::new(CardKind::FlowStep, "4. Generate", &["The answer is written from the top-ranked chunks only."]),
                CardSpec::new(CardKind::FlowStep, "5. Cite", &["Titles, types and scores are returned with the answer."]),
            ],
        ),
        SectionSpec::new(
            "metrics",
            "Evaluation",
            &["Measured on a held-out set of developer questions."],
            vec![
                CardSpec::new(CardKind::MetricCard, "Documents per answer", &["3"]),
                CardSpec::new(CardKind::MetricCard, "Retrieval time", &["reported per query in milliseconds"]),
                CardSpec::new(CardKind::MetricCard, "Source coverage", &["handbooks, code reference, guides"]),
            ],
        ),
        SectionSpec::new(
            "findings",
            "What we learned",
            &[],
            vec![
                CardSpec::new(
                    CardKind::FindingItem,
                    "Exact identifiers need keyword search",
                    &["Pure vector search often missed hook and function names."],
                ),
                CardSpec::new(
                    CardKind::FindingItem,
                    "Fewer, better chunks",
                    &["Three well-ranked chunks beat ten loosely related ones."],
                ),
                CardSpec::new(
                    CardKind::FindingItem,
                    "Citations build trust",
                    &["Showing sources made wrong answers easy to spot."],
                ),
            ],
        ),
        SectionSpec::new(
            "demo",
            "Try it",
            &[
                "Use the chat panel on the right. Press Tab to reach the input,",
                "type a question and press Enter or click Send.",
            ],
            Vec::new(),
        ),
    ]
}

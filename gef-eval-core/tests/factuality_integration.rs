//! End-to-end factuality aggregation over realistic fixtures

use gef_eval_core::data::{summaries_from_records, GenerationRecord, SourceDocument};
use gef_eval_core::factuality::SummaryOutcome;
use gef_eval_core::{
    EntityAnnotation, EntityLabel, EvaluationInput, EvaluationOptions, FactualityEvaluator,
    GeneratedSummaries, GeneratedSummary, Metadata, SourceDocuments,
};
use std::collections::BTreeMap;

const EPSILON: f64 = 1e-9;

struct Corpus {
    generated: GeneratedSummaries,
    gold_summaries: BTreeMap<String, String>,
    gold_metadata: Metadata,
    documents: SourceDocuments,
}

impl Corpus {
    fn new() -> Self {
        Self {
            generated: GeneratedSummaries::new(),
            gold_summaries: BTreeMap::new(),
            gold_metadata: Metadata::new(),
            documents: SourceDocuments::new(),
        }
    }

    fn add(&mut self, id: &str, document: &str, reference: &str, generated: GeneratedSummary) {
        self.gold_summaries
            .insert(id.to_string(), reference.to_string());
        self.documents.insert(
            id.to_string(),
            SourceDocument {
                document: document.to_string(),
                summary: reference.to_string(),
            },
        );
        self.generated.insert(id.to_string(), generated);
    }

    fn input(&self) -> EvaluationInput<'_> {
        EvaluationInput {
            generated: &self.generated,
            gold_summaries: &self.gold_summaries,
            gold_metadata: &self.gold_metadata,
            documents: &self.documents,
        }
    }
}

fn labelled(labels: &[(EntityLabel, usize)]) -> Vec<EntityAnnotation> {
    labels
        .iter()
        .flat_map(|&(label, n)| std::iter::repeat(label).take(n))
        .enumerate()
        .map(|(i, label)| EntityAnnotation::new(format!("Entity{i}"), i * 10, i * 10 + 7, label))
        .collect()
}

/// 100 summaries from an oracle-guided run: 65 factual, 12 with intrinsic
/// hallucinations, 23 skipped by the process, 7 flagged as failed
fn oracle_run() -> Corpus {
    use EntityLabel::*;

    let mut corpus = Corpus::new();
    for i in 0..100 {
        let id = format!("{i:03}");
        let entities = match i {
            // factual: 1 or 2 factual hallucinations plus 2 supported entities
            0..=22 => labelled(&[(FactualHallucination, 2), (NonHallucinated, 2)]),
            23..=64 => labelled(&[(FactualHallucination, 1), (NonHallucinated, 2)]),
            // intrinsic: two summaries carry two intrinsic errors
            65..=66 => labelled(&[(IntrinsicHallucination, 2), (NonHallucinated, 2)]),
            67..=76 => labelled(&[(IntrinsicHallucination, 1), (NonHallucinated, 2)]),
            // skipped
            77..=78 => labelled(&[
                (FactualHallucination, 1),
                (IntrinsicHallucination, 1),
                (NonFactualHallucination, 1),
                (NonHallucinated, 1),
            ]),
            79..=86 => labelled(&[
                (FactualHallucination, 1),
                (NonFactualHallucination, 1),
                (NonHallucinated, 1),
            ]),
            _ => labelled(&[(NonFactualHallucination, 1), (NonHallucinated, 1)]),
        };

        let mut summary =
            GeneratedSummary::new(format!("Summary number {i}.")).with_entities(entities);
        if i >= 77 {
            summary = summary.skipped();
        }
        if i % 15 == 0 {
            summary = summary.failed();
        }
        corpus.add(&id, "Source article.", "Reference summary.", summary);
    }
    corpus
}

fn oracle_options(count_skips: bool) -> EvaluationOptions {
    EvaluationOptions {
        is_fbs: true,
        is_oracle: true,
        count_skips,
        ..Default::default()
    }
}

#[test]
fn oracle_run_counting_skips() {
    let corpus = oracle_run();
    let report = FactualityEvaluator::new(oracle_options(true))
        .unwrap()
        .evaluate(&corpus.input())
        .unwrap();
    let s = &report.metrics.summaries;
    let e = &report.metrics.entities;

    assert_eq!(s.total, 100);
    assert!((s.factual - 0.65).abs() < EPSILON);
    assert!((s.non_factual - 0.12).abs() < EPSILON);
    assert!((s.non_factual_intrinsic - 0.12).abs() < EPSILON);
    assert_eq!(s.non_factual_extrinsic, 0.0);
    assert!((s.skipped - 0.23).abs() < EPSILON);
    assert_eq!(s.unknown, 0.0);
    assert_eq!(s.failed, 7);
    assert!((s.factual + s.non_factual + s.skipped + s.unknown - 1.0).abs() < EPSILON);

    assert_eq!(e.factual_hallucination, 88);
    assert_eq!(e.intrinsic_hallucination, 14);
    assert_eq!(e.non_factual_hallucination, 0);
    assert_eq!(e.non_hallucinated, 154);
    assert_eq!(e.unknown, 0);
    assert_eq!(e.total, 88 + 14 + 154);

    let ratio = e.extrinsic_factuality_ratio.unwrap();
    assert!((ratio.mean - 1.0).abs() < EPSILON);
    assert!(ratio.stdev.abs() < EPSILON);

    assert!(report.unknown_entities.is_empty());
    assert_eq!(report.summaries[80].outcome, SummaryOutcome::Skipped);
    assert!(report.summaries[80].entities.is_empty());
}

#[test]
fn oracle_run_evaluating_skips() {
    let corpus = oracle_run();
    let report = FactualityEvaluator::new(oracle_options(false))
        .unwrap()
        .evaluate(&corpus.input())
        .unwrap();
    let s = &report.metrics.summaries;
    let e = &report.metrics.entities;

    assert!((s.factual - 0.65).abs() < EPSILON);
    assert!((s.non_factual - 0.35).abs() < EPSILON);
    assert!((s.non_factual_extrinsic - 0.23).abs() < EPSILON);
    assert!((s.non_factual_intrinsic - 0.14).abs() < EPSILON);
    assert_eq!(s.skipped, 0.0);
    assert_eq!(s.failed, 7);
    assert!((s.factual + s.non_factual + s.unknown - 1.0).abs() < EPSILON);

    assert_eq!(e.factual_hallucination, 98);
    assert_eq!(e.intrinsic_hallucination, 16);
    assert_eq!(e.non_factual_hallucination, 23);
    assert_eq!(e.non_hallucinated, 177);
    assert_eq!(e.total, 98 + 16 + 23 + 177);

    // 77 summaries at 1, 10 skipped at 2/3, 13 skipped at 1/2
    let ratio = e.extrinsic_factuality_ratio.unwrap();
    assert!((ratio.mean - 541.0 / 600.0).abs() < EPSILON);
    assert!((ratio.stdev - 12219f64.sqrt() / 600.0).abs() < EPSILON);
}

#[test]
fn generation_log_without_entities_falls_back_to_extraction() {
    let records: Vec<GenerationRecord> = serde_json::from_str(
        r#"[
            {"id": "1", "iterations": [{"summary": "Obama visited Dublin."}]},
            {"id": "2", "iterations": [{"summary": "Obama visited Dublin.", "entities": []}]}
        ]"#,
    )
    .unwrap();
    let summaries = summaries_from_records(records, None, "inline").unwrap();
    assert_eq!(summaries["1"].entities, None);

    let mut corpus = Corpus::new();
    for (id, summary) in summaries {
        corpus.add(&id, "Doc.", "Ref.", summary);
    }
    let report = FactualityEvaluator::new(EvaluationOptions::default())
        .unwrap()
        .evaluate(&corpus.input())
        .unwrap();

    let extracted: Vec<_> = report.summaries[0]
        .entities
        .iter()
        .map(|e| (e.ent.as_str(), e.label))
        .collect();
    assert_eq!(
        extracted,
        vec![("Obama", EntityLabel::Unknown), ("Dublin", EntityLabel::Unknown)]
    );
    assert_eq!(report.summaries[0].outcome, SummaryOutcome::Unknown);

    // an explicit empty list is taken as given
    assert!(report.summaries[1].entities.is_empty());
    assert_eq!(report.summaries[1].outcome, SummaryOutcome::Factual);
    assert_eq!(report.metrics.entities.total, 2);
}

#[test]
fn gold_against_gold_is_fully_factual() {
    let references = [
        (
            "101",
            "The Welsh Rugby Union confirmed the match in Cardiff will go ahead.",
            "The Welsh Rugby Union says the Cardiff match will go ahead.",
        ),
        (
            "102",
            "Shares in Tesco rose 3% after the results were published in London.",
            "Tesco shares have risen 3% in London.",
        ),
        (
            "103",
            "A man has been arrested after a crash on the M4.",
            "Police in Swansea arrested a man after a crash.",
        ),
    ];

    let mut corpus = Corpus::new();
    for (id, document, reference) in references {
        corpus.add(id, document, reference, GeneratedSummary::new(reference));
    }

    let report = FactualityEvaluator::new(EvaluationOptions::default())
        .unwrap()
        .evaluate(&corpus.input())
        .unwrap();

    assert_eq!(report.metrics.summaries.factual, 1.0);
    assert_eq!(report.metrics.entities.unknown, 0);
    assert!(report.metrics.entities.total > 0);
    let ratio = report.metrics.entities.extrinsic_factuality_ratio.unwrap();
    assert!((ratio.mean - 1.0).abs() < EPSILON);
    assert!(ratio.stdev.abs() < EPSILON);

    // "Swansea" is only in the reference
    let swansea = report.summaries[2]
        .entities
        .iter()
        .find(|e| e.ent == "Swansea")
        .unwrap();
    assert_eq!(swansea.label, EntityLabel::FactualHallucination);
}

#[test]
fn empty_summary_set_is_an_error() {
    let corpus = Corpus::new();
    let err = FactualityEvaluator::new(EvaluationOptions::default())
        .unwrap()
        .evaluate(&corpus.input())
        .unwrap_err();
    assert!(matches!(err, gef_eval_core::EvalError::NoSummaries));
}

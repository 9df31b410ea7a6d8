//! Adjudication sessions persisted through the JSON store

use gef_eval_core::annotation::{HumanDecision, ScriptedDecisions, Verdict};
use gef_eval_core::data::{summaries_from_store, SourceDocument};
use gef_eval_core::factuality::SummaryOutcome;
use gef_eval_core::store::load_gold_data;
use gef_eval_core::{
    EntityLabel, EvaluationInput, EvaluationOptions, FactualityEvaluator, JsonFileStore,
    MetadataStore, SourceDocuments, StoreTarget,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const GENERATED: &str = "Wales won in Dublin.";

fn write_store(root: &Path) {
    let gold = root.join("xsum").join("gold");
    fs::create_dir_all(&gold).unwrap();
    fs::write(
        gold.join("summaries.json"),
        r#"{"1": {"summary": "Wales won the Six Nations."}}"#,
    )
    .unwrap();
    fs::write(
        gold.join("metadata.json"),
        r#"{"1": {"xent_annotations": [0.25], "our_annotations": {}}}"#,
    )
    .unwrap();

    let model = root.join("xsum").join("bart");
    fs::create_dir_all(&model).unwrap();
    fs::write(
        model.join("summaries.json"),
        format!(r#"{{"1": {{"summary": "{GENERATED}"}}}}"#),
    )
    .unwrap();
}

fn documents() -> SourceDocuments {
    let mut documents = SourceDocuments::new();
    documents.insert(
        "1".to_string(),
        SourceDocument {
            document: "Wales beat France in Cardiff on Saturday.".to_string(),
            summary: "Wales won the Six Nations.".to_string(),
        },
    );
    documents
}

fn annotating() -> EvaluationOptions {
    EvaluationOptions {
        should_annotate: true,
        ..Default::default()
    }
}

#[test]
fn adjudicated_label_is_persisted_and_reused() {
    let dir = TempDir::new().unwrap();
    write_store(dir.path());
    let mut store = JsonFileStore::new(dir.path());
    let gold_target = StoreTarget::new("xsum", "gold");

    let gold = load_gold_data(&store, &gold_target).unwrap();
    let generated = summaries_from_store(
        store
            .get_summaries(&StoreTarget::new("xsum", "bart"))
            .unwrap(),
    );
    let documents = documents();
    let input = EvaluationInput {
        generated: &generated,
        gold_summaries: &gold.summaries,
        gold_metadata: &gold.metadata,
        documents: &documents,
    };

    let mut decisions = ScriptedDecisions::new([HumanDecision::Label(Verdict::Intrinsic)]);
    let (report, session) = FactualityEvaluator::new(annotating())
        .unwrap()
        .evaluate_with_annotation(&input, &mut store, &gold_target, &mut decisions)
        .unwrap();

    let session = session.unwrap();
    assert!(session.completed);
    assert_eq!(session.len(), 1);
    assert_eq!(
        report.summaries[0].outcome,
        SummaryOutcome::NonFactual {
            intrinsic: true,
            extrinsic: false
        }
    );
    assert!(report.unknown_entities.is_empty());

    // On disk: appended under the generated text, other fields untouched
    let stored = store.get_metadata(&gold_target).unwrap();
    let bucket = stored["1"].annotations_for(GENERATED);
    assert_eq!(bucket.len(), 1);
    assert_eq!(bucket[0].ent, "Dublin");
    assert_eq!((bucket[0].start, bucket[0].end), (13, 19));
    assert_eq!(bucket[0].label, EntityLabel::IntrinsicHallucination);
    assert!(stored["1"].extra.contains_key("xent_annotations"));

    // A later run reads the stored label without asking
    let reloaded = load_gold_data(&store, &gold_target).unwrap();
    let input = EvaluationInput {
        gold_metadata: &reloaded.metadata,
        ..input
    };
    let report = FactualityEvaluator::new(EvaluationOptions::default())
        .unwrap()
        .evaluate(&input)
        .unwrap();
    let dublin = &report.summaries[0].entities[1];
    assert_eq!(dublin.label, EntityLabel::IntrinsicHallucination);
}

#[test]
fn declined_session_keeps_unknowns() {
    let dir = TempDir::new().unwrap();
    write_store(dir.path());
    let mut store = JsonFileStore::new(dir.path());
    let gold_target = StoreTarget::new("xsum", "gold");
    let before = fs::read_to_string(dir.path().join("xsum/gold/metadata.json")).unwrap();

    let gold = load_gold_data(&store, &gold_target).unwrap();
    let generated = summaries_from_store(
        store
            .get_summaries(&StoreTarget::new("xsum", "bart"))
            .unwrap(),
    );
    let documents = documents();
    let input = EvaluationInput {
        generated: &generated,
        gold_summaries: &gold.summaries,
        gold_metadata: &gold.metadata,
        documents: &documents,
    };

    let (report, session) = FactualityEvaluator::new(annotating())
        .unwrap()
        .evaluate_with_annotation(
            &input,
            &mut store,
            &gold_target,
            &mut ScriptedDecisions::declining(),
        )
        .unwrap();

    assert!(session.is_none());
    assert_eq!(report.summaries[0].outcome, SummaryOutcome::Unknown);
    assert_eq!(report.unknown_entities["1"][0].ent, "Dublin");
    let after = fs::read_to_string(dir.path().join("xsum/gold/metadata.json")).unwrap();
    assert_eq!(before, after);
}

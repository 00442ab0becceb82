mod common;

use common::fake_render::FakeRenderService;
use common::fixtures::{case_id, pdf_with_pages, section, three_section_dossier};
use common::pdf_assertions::assert_page_shows;
use common::{GeneratedPdf, TestResult, init_logger, pipeline_with};
use dossier::{
    AssemblyError, DocumentPlan, DossierConfig, InMemoryArtifactStore, InMemoryCaseRepository,
    PartSource, PipelineBuilder, SectionPlan, StoredReference,
};
use dossier_storage::FilesystemArtifactStore;
use dossier_traits::ArtifactStore;
use std::io::Cursor;
use std::sync::Arc;

#[tokio::test]
async fn test_second_assembly_returns_stored_artifact() -> TestResult {
    init_logger();
    let render = Arc::new(FakeRenderService::new());
    let store = Arc::new(InMemoryArtifactStore::new());
    let pipeline = pipeline_with(&render, store.clone());

    let first = pipeline.assemble(&case_id(), three_section_dossier()).await?;
    assert!(!first.is_cached());
    assert_eq!(first.result().version, Some(1));
    let calls_after_first = render.convert_calls();

    let second = pipeline.assemble(&case_id(), three_section_dossier()).await?;
    assert!(second.is_cached());
    assert_eq!(second.result().bytes, first.result().bytes);
    assert_eq!(second.result().page_count, 7);
    assert_eq!(second.result().version, Some(1));
    assert_eq!(
        second.result().key.as_ref().map(|k| k.to_string()),
        Some("case-7/DOSSIER".to_string())
    );

    assert_eq!(render.convert_calls(), calls_after_first);
    assert_eq!(render.merge_calls(), 1);
    assert_eq!(store.version_count(&case_id(), "DOSSIER"), 1);
    Ok(())
}

#[tokio::test]
async fn test_categories_are_assembled_independently() -> TestResult {
    init_logger();
    let render = Arc::new(FakeRenderService::new());
    let store = Arc::new(InMemoryArtifactStore::new());
    let pipeline = pipeline_with(&render, store.clone());

    pipeline.assemble(&case_id(), three_section_dossier()).await?;
    let letter = DocumentPlan::letter("LETTER", None).with_section(section("Letter", 1));
    let outcome = pipeline.assemble(&case_id(), letter).await?;

    assert!(!outcome.is_cached());
    assert_eq!(store.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_preview_neither_reads_nor_writes_the_store() -> TestResult {
    init_logger();
    let render = Arc::new(FakeRenderService::new());
    let store = Arc::new(InMemoryArtifactStore::new());
    let pipeline = pipeline_with(&render, store.clone());

    pipeline.assemble(&case_id(), three_section_dossier()).await?;
    let calls = render.convert_calls();

    let preview = pipeline.preview(&case_id(), three_section_dossier()).await?;
    assert!(preview.key.is_none());
    assert!(preview.version.is_none());
    assert!(render.convert_calls() > calls);
    assert_eq!(store.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_stored_attachment_takes_part_in_toc_and_merge() -> TestResult {
    init_logger();
    let render = Arc::new(FakeRenderService::new());
    let store = Arc::new(InMemoryArtifactStore::new());
    store.put(&case_id(), "PART_A", pdf_with_pages("Old", 1)).await?;
    store.put(&case_id(), "PART_A", pdf_with_pages("Annex", 2)).await?;
    let pipeline = pipeline_with(&render, store.clone());

    let plan = DocumentPlan::dossier("DOSSIER", "toc")
        .with_section(section("Licence", 1))
        .with_section(SectionPlan::attachment(
            "Annex",
            PartSource::Stored(StoredReference {
                case_id: case_id(),
                category: "PART_A".to_string(),
                version: None,
            }),
        ))
        .with_section(section("Order", 1));
    let outcome = pipeline.assemble(&case_id(), plan).await?;

    assert_eq!(outcome.result().page_count, 5);
    // Only the template sections and the table of contents hit the renderer.
    assert_eq!(render.convert_calls(), 3);
    let toc = render.html_for("Contents").expect("table of contents was rendered");
    assert!(toc.contains("<li>Licence:1</li><li>Annex:2</li><li>Order:4</li>"));

    let pages = GeneratedPdf::from_bytes(outcome.into_result().bytes)?.page_texts();
    assert_page_shows(&pages, 3, "Annex 1");
    assert_page_shows(&pages, 4, "Annex 2");
    Ok(())
}

#[tokio::test]
async fn test_pinned_attachment_version_and_in_memory_sources() -> TestResult {
    init_logger();
    let render = Arc::new(FakeRenderService::new());
    let store = Arc::new(InMemoryArtifactStore::new());
    store.put(&case_id(), "PART_A", pdf_with_pages("First", 1)).await?;
    store.put(&case_id(), "PART_A", pdf_with_pages("Second", 3)).await?;
    let pipeline = pipeline_with(&render, store.clone());

    let plan = DocumentPlan::new("BUNDLE")
        .with_section(SectionPlan::attachment(
            "Pinned",
            PartSource::Stored(StoredReference {
                case_id: case_id(),
                category: "PART_A".to_string(),
                version: Some(1),
            }),
        ))
        .with_section(SectionPlan::attachment(
            "Streamed",
            PartSource::Stream(Box::new(Cursor::new(pdf_with_pages("Streamed", 1)))),
        ))
        .with_section(SectionPlan::attachment(
            "Inline",
            PartSource::Bytes(pdf_with_pages("Inline", 1)),
        ));
    let result = pipeline.preview(&case_id(), plan).await?;

    assert_eq!(render.convert_calls(), 0);
    let pages = GeneratedPdf::from_bytes(result.bytes)?.page_texts();
    assert_eq!(
        pages,
        vec![
            vec!["First 1".to_string()],
            vec!["Streamed 1".to_string()],
            vec!["Inline 1".to_string()],
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_stored_attachment_is_storage_error() -> TestResult {
    init_logger();
    let render = Arc::new(FakeRenderService::new());
    let store = Arc::new(InMemoryArtifactStore::new());
    let pipeline = pipeline_with(&render, store.clone());

    let plan = DocumentPlan::dossier("DOSSIER", "toc")
        .with_section(section("Licence", 1))
        .with_section(SectionPlan::attachment(
            "Annex",
            PartSource::Stored(StoredReference {
                case_id: case_id(),
                category: "PART_A".to_string(),
                version: None,
            }),
        ));
    let err = pipeline.assemble(&case_id(), plan).await.unwrap_err();

    assert!(matches!(err, AssemblyError::Storage { .. }), "got {:?}", err);
    assert_eq!(render.merge_calls(), 0);
    assert!(store.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_filesystem_store_end_to_end() -> TestResult {
    init_logger();
    let dir = tempfile::tempdir()?;
    let render = Arc::new(FakeRenderService::new());

    let store = Arc::new(FilesystemArtifactStore::new(dir.path()).await?);
    let pipeline = pipeline_with(&render, store.clone());
    let outcome = pipeline.assemble(&case_id(), three_section_dossier()).await?;
    assert_eq!(outcome.result().version, Some(1));
    assert!(dir.path().join("case-7/DOSSIER/v1.pdf").exists());

    // A fresh store over the same directory sees the artifact.
    let reopened = Arc::new(FilesystemArtifactStore::new(dir.path()).await?);
    let pipeline = pipeline_with(&render, reopened.clone());
    let again = pipeline.assemble(&case_id(), three_section_dossier()).await?;
    assert!(again.is_cached());
    assert_eq!(again.result().bytes, outcome.result().bytes);
    assert_eq!(reopened.latest_version(&case_id(), "DOSSIER").await?, Some(1));
    Ok(())
}

#[tokio::test]
async fn test_pipeline_from_config() -> TestResult {
    init_logger();
    let dir = tempfile::tempdir()?;
    let templates_dir = dir.path().join("templates");
    std::fs::create_dir_all(&templates_dir)?;
    std::fs::write(templates_dir.join("section.hbs"), common::fixtures::SECTION_TEMPLATE)?;
    std::fs::write(templates_dir.join("toc.hbs"), common::fixtures::TOC_TEMPLATE)?;

    let config_path = dir.path().join("dossier.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[render_service]
base_url = "http://127.0.0.1:9"
timeout_ms = 500

[pipeline]
max_concurrent_renders = 2

[templates]
dir = "{}"

[storage]
root = "{}"
"#,
            templates_dir.display(),
            dir.path().join("artifacts").display()
        ),
    )?;

    let config = DossierConfig::load_from(&config_path)?;
    let pipeline = PipelineBuilder::from_config(&config)
        .await?
        .with_case_repository(Arc::new(InMemoryCaseRepository::new()))
        .build()?;

    assert_eq!(pipeline.context().max_concurrent_renders, 2);
    assert_eq!(pipeline.context().render_service.name(), "HttpRenderClient");
    assert_eq!(pipeline.context().store.name(), "FilesystemArtifactStore");
    assert!(pipeline.context().templates.has_template("toc"));
    assert!(dir.path().join("artifacts").is_dir());
    Ok(())
}

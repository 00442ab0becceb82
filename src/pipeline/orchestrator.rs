use super::context::PipelineContext;
use super::plan::{Decoration, DocumentPlan, SectionPlan, SectionSource};
use super::section::SectionRenderer;
use super::toc::TableOfContentsBuilder;
use crate::error::AssemblyError;
use dossier_pdf_composer::count_pages;
use dossier_traits::{ArtifactStore, StorageError};
use dossier_types::{
    AssemblyResult, CaseId, CaseRecord, DocumentPart, NamedBytes, PersistenceKey, RenderedSection,
    SectionContext,
};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};

const COMPONENT: &str = "AssemblyPipeline";
const DECORATOR_COMPONENT: &str = "PdfDecorator";

/// What [`AssemblyPipeline::assemble`] did to produce its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyOutcome {
    /// An artifact was already stored under the key; nothing was rendered.
    Cached(AssemblyResult),
    /// The document was rendered, decorated and stored as a new version.
    Rendered(AssemblyResult),
}

impl AssemblyOutcome {
    pub fn result(&self) -> &AssemblyResult {
        match self {
            AssemblyOutcome::Cached(r) | AssemblyOutcome::Rendered(r) => r,
        }
    }

    pub fn into_result(self) -> AssemblyResult {
        match self {
            AssemblyOutcome::Cached(r) | AssemblyOutcome::Rendered(r) => r,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, AssemblyOutcome::Cached(_))
    }
}

/// The document assembly pipeline.
///
/// One call assembles one document: case facts are loaded, every section is
/// rendered concurrently, a table of contents is built from the rendered page
/// counts, the parts are merged in declared order and the result is
/// decorated. Any failure aborts the request and nothing is persisted.
#[derive(Clone)]
pub struct AssemblyPipeline {
    context: Arc<PipelineContext>,
}

impl AssemblyPipeline {
    pub(crate) fn new(context: PipelineContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Assembles `plan` for a case, at most once per `(case, category)` key.
    ///
    /// When an artifact is already stored under the key it is returned as
    /// [`AssemblyOutcome::Cached`] without touching the rendering service.
    /// Two concurrent requests for the same key may both render; the store
    /// keeps whichever version is written last as the latest.
    pub async fn assemble(&self, case_id: &CaseId, plan: DocumentPlan) -> Result<AssemblyOutcome, AssemblyError> {
        plan.validate()?;
        let store = &self.context.store;
        let key = PersistenceKey::new(case_id.clone(), plan.category.clone());

        let existing = store
            .get(case_id, &plan.category, None)
            .await
            .map_err(|e| AssemblyError::storage(COMPONENT, e))?;
        if let Some(artifact) = existing {
            let bytes = Arc::unwrap_or_clone(artifact.bytes);
            let category = plan.category.clone();
            let (bytes, page_count) = task::spawn_blocking(move || {
                count_pages(&bytes)
                    .map(|pages| (bytes, pages))
                    .map_err(|e| AssemblyError::composer(COMPONENT, &category, e))
            })
            .await
            .map_err(|e| AssemblyError::task(COMPONENT, e.to_string()))??;
            info!(
                "[ASSEMBLY] {} v{} already stored in {}; skipping render",
                key,
                artifact.version,
                store.name()
            );
            return Ok(AssemblyOutcome::Cached(AssemblyResult {
                bytes,
                page_count,
                key: Some(key),
                version: Some(artifact.version),
            }));
        }

        let mut result = self.run(case_id, plan).await?;
        let version = store
            .put(case_id, &key.category, result.bytes.clone())
            .await
            .map_err(|e| AssemblyError::storage(COMPONENT, e))?;
        info!("[ASSEMBLY] {} stored as v{} ({} pages)", key, version, result.page_count);

        result.key = Some(key);
        result.version = Some(version);
        Ok(AssemblyOutcome::Rendered(result))
    }

    /// Assembles `plan` without consulting or writing the store.
    pub async fn preview(&self, case_id: &CaseId, plan: DocumentPlan) -> Result<AssemblyResult, AssemblyError> {
        plan.validate()?;
        self.run(case_id, plan).await
    }

    async fn run(&self, case_id: &CaseId, mut plan: DocumentPlan) -> Result<AssemblyResult, AssemblyError> {
        let start = Instant::now();
        let category = plan.category.clone();
        let sections = std::mem::take(&mut plan.sections);

        // Idle -> ContextBuilt
        let case = self
            .context
            .case_repository
            .load_case(case_id)
            .await
            .map_err(|source| AssemblyError::CaseData {
                component: COMPONENT.to_string(),
                source,
            })?;
        if let Some(fact) = plan.required_facts.iter().find(|f| !case.has_fact(f)) {
            return Err(AssemblyError::PreconditionUnmet {
                component: COMPONENT.to_string(),
                case_id: case_id.clone(),
                fact: fact.clone(),
            });
        }
        let case = Arc::new(case);
        info!("[ASSEMBLY] {}/{}: case context built", case_id, category);

        // ContextBuilt -> SectionsRendered
        let renderer = SectionRenderer::new(
            Arc::clone(&self.context.render_service),
            Arc::clone(&self.context.templates),
        );
        let rendered = self.render_sections(&renderer, &case, sections).await?;
        let body_pages: usize = rendered.iter().map(|s| s.page_count).sum();
        info!(
            "[ASSEMBLY] {}/{}: {} sections rendered ({} pages)",
            case_id,
            category,
            rendered.len(),
            body_pages
        );

        // SectionsRendered -> TocBuilt
        let toc = match &plan.table_of_contents {
            Some(toc_plan) => {
                let toc = TableOfContentsBuilder::new(renderer.clone())
                    .build(&case, toc_plan, &rendered)
                    .await?;
                info!(
                    "[ASSEMBLY] {}/{}: table of contents built ({} pages)",
                    case_id, category, toc.page_count
                );
                Some(toc)
            }
            None => None,
        };
        let toc_pages = toc.as_ref().map_or(0, |t| t.page_count);

        // TocBuilt -> Merged
        let mut parts: Vec<NamedBytes> = toc
            .iter()
            .chain(rendered.iter())
            .map(RenderedSection::to_named_bytes)
            .collect();
        let merged = if parts.len() == 1 {
            debug!("[ASSEMBLY] Single part; skipping merge");
            parts.remove(0).bytes
        } else {
            self.context
                .render_service
                .merge_pdfs(COMPONENT, &parts)
                .await
                .map_err(|e| AssemblyError::render(COMPONENT, e))?
        };
        drop(parts);

        // Merged -> Decorated
        let expected_pages = toc_pages + body_pages;
        let numbering = plan.numbering_for(toc_pages);
        let decoration = plan.decoration.clone();
        let decorator = self.context.decorator.clone();
        let document = category.clone();
        let (bytes, page_count) = task::spawn_blocking(move || -> Result<(Vec<u8>, usize), AssemblyError> {
            let page_count =
                count_pages(&merged).map_err(|e| AssemblyError::composer(COMPONENT, &document, e))?;
            if page_count != expected_pages {
                return Err(AssemblyError::MalformedDocument {
                    component: COMPONENT.to_string(),
                    document,
                    message: format!(
                        "merged document has {} pages, expected {}",
                        page_count, expected_pages
                    ),
                });
            }
            debug!("[ASSEMBLY] {}: merged ({} pages)", document, page_count);

            let decorated = match (&decoration, numbering) {
                (Decoration::PageNumbers, _) => decorator.number_pages(&merged, toc_pages),
                (Decoration::HeaderFooter { .. }, Some(spec)) => {
                    decorator.number_pages_with_header_footer(&merged, &spec)
                }
                (Decoration::CentralHeader(text), _) => decorator.central_header(&merged, text),
                _ => return Ok((merged, page_count)),
            };
            decorated
                .map(|bytes| (bytes, page_count))
                .map_err(|e| AssemblyError::composer(DECORATOR_COMPONENT, &document, e))
        })
        .await
        .map_err(|e| AssemblyError::task(DECORATOR_COMPONENT, e.to_string()))??;
        info!(
            "[ASSEMBLY] {}/{}: merged and decorated ({} pages); done in {:.2?}",
            case_id,
            category,
            page_count,
            start.elapsed()
        );

        // Decorated -> Done
        Ok(AssemblyResult {
            bytes,
            page_count,
            key: None,
            version: None,
        })
    }

    /// Fans every section out onto the runtime, bounded by the render limit,
    /// and joins the results back into declared order.
    ///
    /// The first failure closes the semaphore: sections still waiting for a
    /// slot are cancelled without calling the rendering service, while those
    /// already in flight are drained. The first failure to complete is the
    /// one reported.
    async fn render_sections(
        &self,
        renderer: &SectionRenderer,
        case: &Arc<CaseRecord>,
        sections: Vec<SectionPlan>,
    ) -> Result<Vec<RenderedSection>, AssemblyError> {
        let semaphore = Arc::new(Semaphore::new(self.context.max_concurrent_renders));
        let mut tasks = JoinSet::new();

        for (ordinal, section) in sections.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let renderer = renderer.clone();
            let store = Arc::clone(&self.context.store);
            let case = Arc::clone(case);

            tasks.spawn(async move {
                // Closed means a sibling already failed.
                let Ok(_permit) = Arc::clone(&semaphore).acquire_owned().await else {
                    return (ordinal, None);
                };
                let SectionPlan { title, source } = section;
                let result = match source {
                    SectionSource::Template {
                        template,
                        variables,
                        images,
                        options,
                    } => {
                        let context = SectionContext::for_section(&case, &title, &variables);
                        renderer
                            .render_section(&title, &template, &context, &images, &options)
                            .await
                    }
                    SectionSource::Attachment(source) => {
                        let part = DocumentPart {
                            ordinal,
                            name: title,
                            source,
                        };
                        resolve_attachment(store.as_ref(), part).await
                    }
                };
                // Close while the permit is still held so no waiter is handed it.
                if result.is_err() {
                    semaphore.close();
                }
                (ordinal, Some(result))
            });
        }

        let mut ordered = BTreeMap::new();
        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((ordinal, Some(Ok(section)))) => {
                    ordered.insert(ordinal, section);
                }
                Ok((ordinal, Some(Err(e)))) => {
                    warn!("[ASSEMBLY] Section #{} failed: {}", ordinal, e);
                    first_error.get_or_insert(e);
                }
                Ok((ordinal, None)) => {
                    debug!("[ASSEMBLY] Section #{} cancelled before rendering", ordinal);
                }
                Err(e) => {
                    warn!("[ASSEMBLY] Section task did not complete: {}", e);
                    semaphore.close();
                    first_error.get_or_insert(AssemblyError::task(COMPONENT, e.to_string()));
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(ordered.into_values().collect()),
        }
    }
}

/// Reads an attachment into memory and counts its pages. Stored references
/// are fetched from the artifact store; a missing one is a storage error.
async fn resolve_attachment(
    store: &dyn ArtifactStore,
    part: DocumentPart,
) -> Result<RenderedSection, AssemblyError> {
    let DocumentPart { ordinal, name, source } = part;
    let local = task::spawn_blocking(move || source.read_local())
        .await
        .map_err(|e| AssemblyError::task(COMPONENT, e.to_string()))?
        .map_err(|e| AssemblyError::storage(COMPONENT, StorageError::from(e)))?;

    let pdf_bytes = match local {
        Ok(bytes) => bytes,
        Err(reference) => {
            let artifact = store
                .get(&reference.case_id, &reference.category, reference.version)
                .await
                .map_err(|e| AssemblyError::storage(COMPONENT, e))?
                .ok_or_else(|| {
                    AssemblyError::storage(
                        COMPONENT,
                        StorageError::ReadFailed {
                            key: reference.to_string(),
                            message: "no stored artifact".to_string(),
                        },
                    )
                })?;
            Arc::unwrap_or_clone(artifact.bytes)
        }
    };

    let page_count = count_pages(&pdf_bytes).map_err(|e| AssemblyError::composer(COMPONENT, &name, e))?;
    debug!("[SECTION] Attachment #{} '{}' ({} pages)", ordinal, name, page_count);
    Ok(RenderedSection {
        name,
        pdf_bytes,
        page_count,
    })
}

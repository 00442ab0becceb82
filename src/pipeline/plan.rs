//! Declarative description of one document: which sections, in which order,
//! with which table of contents and decoration.

use crate::error::AssemblyError;
use dossier_traits::RenderOptions;
use dossier_types::{NamedBytes, NumberingSpec, PartSource};
use serde_json::{Map, Value};
use std::collections::HashSet;

const COMPONENT: &str = "AssemblyPipeline";

/// Where the PDF bytes of a section come from.
#[derive(Debug)]
pub enum SectionSource {
    /// Rendered from a named HTML template with the case facts.
    Template {
        template: String,
        variables: Map<String, Value>,
        images: Vec<NamedBytes>,
        options: RenderOptions,
    },
    /// A complete PDF supplied by the caller or held by the artifact store.
    Attachment(PartSource),
}

/// One section of a document, in its final position.
#[derive(Debug)]
pub struct SectionPlan {
    pub title: String,
    pub source: SectionSource,
}

impl SectionPlan {
    pub fn template(title: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source: SectionSource::Template {
                template: template.into(),
                variables: Map::new(),
                images: Vec::new(),
                options: RenderOptions::zero_margins(),
            },
        }
    }

    pub fn attachment(title: impl Into<String>, source: PartSource) -> Self {
        Self {
            title: title.into(),
            source: SectionSource::Attachment(source),
        }
    }

    /// Adds a section-specific template variable. Ignored for attachments.
    pub fn with_variable(mut self, key: impl Into<String>, value: Value) -> Self {
        if let SectionSource::Template { variables, .. } = &mut self.source {
            variables.insert(key.into(), value);
        }
        self
    }

    /// Adds an image the template can reference by file name.
    pub fn with_image(mut self, image: NamedBytes) -> Self {
        if let SectionSource::Template { images, .. } = &mut self.source {
            images.push(image);
        }
        self
    }

    pub fn with_options(mut self, render_options: RenderOptions) -> Self {
        if let SectionSource::Template { options, .. } = &mut self.source {
            *options = render_options;
        }
        self
    }
}

/// The table of contents rendered ahead of the body.
#[derive(Debug, Clone)]
pub struct TableOfContentsPlan {
    pub template: String,
    pub title: String,
    pub options: RenderOptions,
}

impl TableOfContentsPlan {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            title: "Contents".to_string(),
            options: RenderOptions::zero_margins(),
        }
    }
}

/// What gets stamped onto the merged document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Decoration {
    #[default]
    None,
    /// Page numbers on the body; table-of-contents pages stay unnumbered.
    PageNumbers,
    /// Page numbers plus header and footer text. Offsets are 1-based and
    /// counted from the first body page.
    HeaderFooter {
        should_count_all_pages: bool,
        header_text: Option<String>,
        header_offset: usize,
        footer_text: Option<String>,
        footer_offset: usize,
    },
    /// One bold header line centred on every page.
    CentralHeader(String),
}

/// Everything needed to assemble one document for a case.
#[derive(Debug)]
pub struct DocumentPlan {
    /// Document category; also the persistence key below the case id.
    pub category: String,
    pub sections: Vec<SectionPlan>,
    pub table_of_contents: Option<TableOfContentsPlan>,
    pub decoration: Decoration,
    /// Case facts that must be present before anything is rendered.
    pub required_facts: Vec<String>,
}

impl DocumentPlan {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            sections: Vec::new(),
            table_of_contents: None,
            decoration: Decoration::None,
            required_facts: Vec::new(),
        }
    }

    /// A multi-section dossier: table of contents first, numbered body.
    pub fn dossier(category: impl Into<String>, toc_template: impl Into<String>) -> Self {
        Self {
            table_of_contents: Some(TableOfContentsPlan::new(toc_template)),
            decoration: Decoration::PageNumbers,
            ..Self::new(category)
        }
    }

    /// A letter: no table of contents, optional central header.
    pub fn letter(category: impl Into<String>, header: Option<String>) -> Self {
        Self {
            decoration: header.map(Decoration::CentralHeader).unwrap_or_default(),
            ..Self::new(category)
        }
    }

    pub fn with_section(mut self, section: SectionPlan) -> Self {
        self.sections.push(section);
        self
    }

    pub fn with_table_of_contents(mut self, toc: TableOfContentsPlan) -> Self {
        self.table_of_contents = Some(toc);
        self
    }

    pub fn with_decoration(mut self, decoration: Decoration) -> Self {
        self.decoration = decoration;
        self
    }

    pub fn requires(mut self, fact: impl Into<String>) -> Self {
        self.required_facts.push(fact.into());
        self
    }

    /// Checks the plan before any external call is made.
    pub fn validate(&self) -> Result<(), AssemblyError> {
        if self.category.trim().is_empty() {
            return Err(AssemblyError::configuration(COMPONENT, "document category is empty"));
        }
        if self.sections.is_empty() {
            return Err(AssemblyError::configuration(
                COMPONENT,
                format!("document '{}' has no sections", self.category),
            ));
        }

        // Section titles double as merge part names, the contents page included.
        let mut seen: HashSet<&str> = self.table_of_contents.iter().map(|t| t.title.as_str()).collect();
        for section in &self.sections {
            if !seen.insert(section.title.as_str()) {
                return Err(AssemblyError::configuration(
                    COMPONENT,
                    format!("duplicate section title '{}'", section.title),
                ));
            }
        }

        if let Decoration::HeaderFooter {
            header_text,
            header_offset,
            footer_text,
            footer_offset,
            ..
        } = &self.decoration
        {
            if header_text.is_some() && *header_offset == 0 {
                return Err(AssemblyError::configuration(COMPONENT, "header offset must be at least 1"));
            }
            if footer_text.is_some() && *footer_offset == 0 {
                return Err(AssemblyError::configuration(COMPONENT, "footer offset must be at least 1"));
            }
        }
        Ok(())
    }

    /// Numbering for a merged document whose first `toc_pages` pages are the
    /// table of contents. `None` when page numbers are not stamped.
    pub fn numbering_for(&self, toc_pages: usize) -> Option<NumberingSpec> {
        match &self.decoration {
            Decoration::PageNumbers => Some(NumberingSpec {
                number_of_pages_to_skip: toc_pages,
                ..NumberingSpec::default()
            }),
            Decoration::HeaderFooter {
                should_count_all_pages,
                header_text,
                header_offset,
                footer_text,
                footer_offset,
            } => Some(NumberingSpec {
                number_of_pages_to_skip: toc_pages,
                should_count_all_pages: *should_count_all_pages,
                header_text: header_text.clone(),
                first_header_page: toc_pages + header_offset,
                footer_text: footer_text.clone(),
                first_footer_page: toc_pages + footer_offset,
            }),
            Decoration::None | Decoration::CentralHeader(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_sections() -> DocumentPlan {
        DocumentPlan::dossier("DOSSIER", "toc")
            .with_section(SectionPlan::template("Licence", "licence"))
            .with_section(SectionPlan::template("Report", "report"))
            .with_section(SectionPlan::template("Order", "order"))
    }

    #[test]
    fn test_dossier_plan_defaults() {
        let plan = three_sections();
        assert!(plan.validate().is_ok());
        assert_eq!(plan.decoration, Decoration::PageNumbers);
        assert_eq!(plan.table_of_contents.as_ref().map(|t| t.title.as_str()), Some("Contents"));
    }

    #[test]
    fn test_empty_plan_is_rejected() {
        let err = DocumentPlan::dossier("DOSSIER", "toc").validate().unwrap_err();
        assert!(matches!(err, AssemblyError::Configuration { .. }));
    }

    #[test]
    fn test_duplicate_titles_are_rejected() {
        let plan = DocumentPlan::new("DOSSIER")
            .with_section(SectionPlan::template("Licence", "licence"))
            .with_section(SectionPlan::template("Licence", "other"));
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_section_titled_like_the_contents_is_rejected() {
        let plan = three_sections().with_section(SectionPlan::template("Contents", "annex"));
        let err = plan.validate().unwrap_err();
        assert!(matches!(err, AssemblyError::Configuration { .. }));
        assert!(err.to_string().contains("'Contents'"));

        // Without a table of contents the title is free.
        let letter = DocumentPlan::new("LETTER").with_section(SectionPlan::template("Contents", "annex"));
        assert!(letter.validate().is_ok());
    }

    #[test]
    fn test_zero_offset_rejected_only_with_text() {
        let without_text = three_sections().with_decoration(Decoration::HeaderFooter {
            should_count_all_pages: false,
            header_text: None,
            header_offset: 0,
            footer_text: None,
            footer_offset: 0,
        });
        assert!(without_text.validate().is_ok());

        let with_text = three_sections().with_decoration(Decoration::HeaderFooter {
            should_count_all_pages: false,
            header_text: Some("OFFICIAL".into()),
            header_offset: 0,
            footer_text: None,
            footer_offset: 1,
        });
        assert!(with_text.validate().is_err());
    }

    #[test]
    fn test_numbering_skips_toc_pages() {
        let spec = three_sections().numbering_for(2).unwrap();
        assert_eq!(spec.number_of_pages_to_skip, 2);
        assert_eq!(spec.label_for(2), None);
        assert_eq!(spec.label_for(3), Some(1));
    }

    #[test]
    fn test_header_footer_offsets_are_body_relative() {
        let plan = three_sections().with_decoration(Decoration::HeaderFooter {
            should_count_all_pages: true,
            header_text: Some("OFFICIAL".into()),
            header_offset: 2,
            footer_text: Some("Case 7".into()),
            footer_offset: 1,
        });
        let spec = plan.numbering_for(1).unwrap();
        assert_eq!(spec.first_header_page, 3);
        assert_eq!(spec.first_footer_page, 2);
        assert_eq!(spec.label_for(2), Some(2));
    }

    #[test]
    fn test_letter_plan() {
        let plain = DocumentPlan::letter("LETTER", None);
        assert_eq!(plain.decoration, Decoration::None);
        assert!(plain.numbering_for(0).is_none());

        let headed = DocumentPlan::letter("LETTER", Some("OFFICIAL SENSITIVE".into()));
        assert_eq!(headed.decoration, Decoration::CentralHeader("OFFICIAL SENSITIVE".into()));
        assert!(headed.table_of_contents.is_none());
    }

    #[test]
    fn test_builder_methods_ignore_attachments() {
        let section = SectionPlan::attachment("Annex", PartSource::Bytes(vec![1, 2, 3]))
            .with_variable("x", Value::Bool(true));
        assert!(matches!(section.source, SectionSource::Attachment(_)));
    }
}

//! Decoration configuration: which pages receive numbers, headers and footers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumberingError {
    #[error("firstHeaderPage must be at least 1, got {0}")]
    HeaderPageOutOfRange(usize),

    #[error("firstFooterPage must be at least 1, got {0}")]
    FooterPageOutOfRange(usize),
}

/// How page numbers, header and footer are stamped onto a merged document.
///
/// The three ranges are independent: numbers start after
/// `number_of_pages_to_skip`, the header from `first_header_page` and the
/// footer from `first_footer_page` (all 1-based, absolute page positions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NumberingSpec {
    pub number_of_pages_to_skip: usize,
    /// Stamp the absolute page index instead of the skip-adjusted one.
    pub should_count_all_pages: bool,
    pub header_text: Option<String>,
    pub first_header_page: usize,
    pub footer_text: Option<String>,
    pub first_footer_page: usize,
}

impl Default for NumberingSpec {
    fn default() -> Self {
        Self {
            number_of_pages_to_skip: 0,
            should_count_all_pages: false,
            header_text: None,
            first_header_page: 1,
            footer_text: None,
            first_footer_page: 1,
        }
    }
}

impl NumberingSpec {
    /// Rejects page positions that cannot address any page. Values are never
    /// clamped.
    pub fn validate(&self) -> Result<(), NumberingError> {
        if self.header_text.is_some() && self.first_header_page == 0 {
            return Err(NumberingError::HeaderPageOutOfRange(self.first_header_page));
        }
        if self.footer_text.is_some() && self.first_footer_page == 0 {
            return Err(NumberingError::FooterPageOutOfRange(self.first_footer_page));
        }
        Ok(())
    }

    /// The number to stamp on the 1-based page `page`, or `None` if the page
    /// falls inside the skipped range.
    pub fn label_for(&self, page: usize) -> Option<usize> {
        if page <= self.number_of_pages_to_skip {
            return None;
        }
        if self.should_count_all_pages {
            Some(page)
        } else {
            Some(page - self.number_of_pages_to_skip)
        }
    }

    pub fn header_for(&self, page: usize) -> Option<&str> {
        self.header_text
            .as_deref()
            .filter(|_| page >= self.first_header_page)
    }

    pub fn footer_for(&self, page: usize) -> Option<&str> {
        self.footer_text
            .as_deref()
            .filter(|_| page >= self.first_footer_page)
    }
}

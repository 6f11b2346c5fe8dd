use crate::extraction::PageContent;
use serde::{Deserialize, Serialize};

/// One trimmed, non-empty line of report text.
///
/// `line_index` is the line's position within its page before blank lines
/// were dropped, so it still points at the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLine {
    pub page_index: usize,
    pub line_index: usize,
    pub text: String,
}

/// Ordered, page-annotated line sequence for one report.
#[derive(Debug, Clone, Default)]
pub struct LineSource {
    lines: Vec<RawLine>,
}

impl LineSource {
    pub fn from_pages(pages: &[PageContent]) -> Self {
        let lines = pages
            .iter()
            .flat_map(|page| {
                page.lines
                    .iter()
                    .enumerate()
                    .filter_map(move |(line_index, text)| {
                        let text = text.trim();
                        if text.is_empty() {
                            None
                        } else {
                            Some(RawLine {
                                page_index: page.page_number,
                                line_index,
                                text: text.to_string(),
                            })
                        }
                    })
            })
            .collect();
        LineSource { lines }
    }

    /// Treat a text blob as a single page.
    pub fn from_text(text: &str) -> Self {
        Self::from_pages(&[PageContent::from_text(1, text)])
    }

    pub fn lines(&self) -> &[RawLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total characters across all kept lines.
    pub fn text_length(&self) -> usize {
        self.lines.iter().map(|l| l.text.chars().count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_dropped_indices_kept() {
        let pages = vec![
            PageContent::from_text(1, "Location Details\n\n   \n  Name Dispensary  "),
            PageContent::from_text(2, "\nRecordings"),
        ];
        let source = LineSource::from_pages(&pages);
        assert_eq!(source.len(), 3);
        assert_eq!(source.lines()[1].text, "Name Dispensary");
        assert_eq!(source.lines()[1].line_index, 3);
        assert_eq!(source.lines()[2].page_index, 2);
        assert_eq!(source.lines()[2].line_index, 1);
    }

    #[test]
    fn test_empty_text() {
        assert!(LineSource::from_text("\n\n").is_empty());
    }
}

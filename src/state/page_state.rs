/// Page lifecycle definitions for the traversal engine
///
/// Every page moves through the same sequence of states while it is being
/// processed. Transitions are validated so an out-of-order step in the
/// coordinator surfaces as an error instead of silently writing output.
use std::fmt;

/// Represents the current state of a page in the traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    /// Navigation has been issued and has not settled yet
    NavigateStart,

    /// The main-content region was converted and written to `content.md`
    ContentExtracted,

    /// The main-content region was missing from the DOM (terminal)
    ExtractionFailed,

    /// Every network response of the page load has been offered to the image acceptor
    ImagesCollected,

    /// Outbound links have been read from the DOM
    LinksEnumerated,

    /// Every accepted child link has been traversed (terminal)
    BranchComplete,
}

impl PageState {
    /// Checks whether moving from `self` to `next` is a legal transition
    ///
    /// `NavigateStart → ContentExtracted | ExtractionFailed → ImagesCollected
    /// → LinksEnumerated → BranchComplete`
    pub fn can_transition_to(&self, next: PageState) -> bool {
        matches!(
            (self, next),
            (Self::NavigateStart, Self::ContentExtracted)
                | (Self::NavigateStart, Self::ExtractionFailed)
                | (Self::ContentExtracted, Self::ImagesCollected)
                | (Self::ImagesCollected, Self::LinksEnumerated)
                | (Self::LinksEnumerated, Self::BranchComplete)
        )
    }

    /// Short lowercase label used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NavigateStart => "navigate_start",
            Self::ContentExtracted => "content_extracted",
            Self::ExtractionFailed => "extraction_failed",
            Self::ImagesCollected => "images_collected",
            Self::LinksEnumerated => "links_enumerated",
            Self::BranchComplete => "branch_complete",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

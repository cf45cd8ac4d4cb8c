//! Which panels the listing edit screen shows, and the single-select job-type
//! panel.

use tracing::debug;

use crate::panels::WritePanels;
use crate::sanitize::esc_html;
use crate::terms::{Term, JOB_TYPE_TAXONOMY};
use crate::types::ListingRecord;

/// Number of terms in the "Most Used" tab.
const POPULAR_TERM_LIMIT: usize = 10;

/// What happens to the host's own job-type taxonomy panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomyPanel {
    /// Left as the host draws it (multiple types allowed)
    Default,
    /// Removed without replacement
    Removed,
    /// Replaced by the radio panel of [`WritePanels::render_job_type_metabox`]
    SingleSelect,
}

/// The panels of the listing edit screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaBoxPlan {
    /// Title of the listing data panel, always present.
    pub listing_data_title: String,
    pub taxonomy_panel: TaxonomyPanel,
}

impl WritePanels {
    /// Decide the edit-screen panels from the configuration and the number
    /// of job-type terms.
    pub fn plan_meta_boxes(&self) -> MetaBoxPlan {
        let term_count = self.terms.count_terms(JOB_TYPE_TAXONOMY);
        let taxonomy_panel = if !self.config.enable_types || term_count == 0 {
            TaxonomyPanel::Removed
        } else if !self.config.multi_job_type {
            TaxonomyPanel::SingleSelect
        } else {
            TaxonomyPanel::Default
        };
        debug!(term_count, ?taxonomy_panel, "planned meta boxes");
        MetaBoxPlan {
            listing_data_title: "Job Data".to_string(),
            taxonomy_panel,
        }
    }

    /// Radio-button job-type panel with an "All" and a "Most Used" tab.
    pub fn render_job_type_metabox(&self, listing: &ListingRecord) -> String {
        let taxonomy = JOB_TYPE_TAXONOMY;
        let name = format!("tax_input[{taxonomy}]");
        let current = self
            .terms
            .listing_terms(listing.id, taxonomy)
            .last()
            .map(|term| term.id)
            .unwrap_or(0);

        let all = self.terms.terms(taxonomy);
        let popular = self.terms.popular_terms(taxonomy, POPULAR_TERM_LIMIT);

        let mut out = format!("<div id=\"taxonomy-{taxonomy}\" class=\"categorydiv\">\n");
        out.push_str(&format!(
            "<ul id=\"{taxonomy}-tabs\" class=\"category-tabs\">\n\
             <li class=\"tabs\"><a href=\"#{taxonomy}-all\" tabindex=\"3\">All Job Types</a></li>\n\
             <li class=\"hide-if-no-js\"><a href=\"#{taxonomy}-pop\" tabindex=\"3\">Most Used</a></li>\n\
             </ul>\n"
        ));

        out.push_str(&format!(
            "<div id=\"{taxonomy}-all\" class=\"tabs-panel\">\n\
             <ul id=\"{taxonomy}checklist\" class=\"list:{taxonomy} categorychecklist form-no-clear\">\n"
        ));
        for term in &all {
            out.push_str(&term_radio(
                &format!("{taxonomy}-{}", term.id),
                Some(&name),
                term,
                current,
            ));
        }
        out.push_str("</ul>\n</div>\n");

        out.push_str(&format!(
            "<div id=\"{taxonomy}-pop\" class=\"tabs-panel\" style=\"display: none;\">\n\
             <ul id=\"{taxonomy}checklist-pop\" class=\"categorychecklist form-no-clear\">\n"
        ));
        for term in &popular {
            out.push_str(&term_radio(
                &format!("popular-{taxonomy}-{}", term.id),
                None,
                term,
                current,
            ));
        }
        out.push_str("</ul>\n</div>\n</div>\n");
        out
    }
}

/// One radio list item. Items of the "Most Used" tab carry no name and only
/// mirror the "All" tab.
fn term_radio(id: &str, name: Option<&str>, term: &Term, current: u64) -> String {
    let name = name
        .map(|name| format!(" name=\"{}\"", esc_html(name)))
        .unwrap_or_default();
    let checked = if term.id == current {
        " checked=\"checked\""
    } else {
        ""
    };
    format!(
        "<li id=\"{id}\"><label class=\"selectit\"><input type=\"radio\" id=\"in-{id}\"{name}{checked} value=\"{}\" />{}<br /></label></li>\n",
        term.id,
        esc_html(&term.name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radio_marks_current_term() {
        let term = Term {
            id: 4,
            name: "Freelance".into(),
            count: 2,
        };
        let html = term_radio("job_listing_type-4", Some("tax_input[job_listing_type]"), &term, 4);
        assert!(html.contains("checked=\"checked\""));
        assert!(html.contains("name=\"tax_input[job_listing_type]\""));
        assert!(!term_radio("popular-4", None, &term, 1).contains("checked"));
    }
}

// src/services/selectors.rs

//! Static CSS selectors for the registry's listing markup.
//!
//! Kept in one place so upstream markup drift is a one-file fix, caught by
//! the golden-fixture test rather than by silent data loss.

use std::sync::OnceLock;

use scraper::Selector;

/// Parsed selectors for one listing-page project card.
pub struct ListingSelectors {
    /// Self-contained project card
    pub card: Selector,
    /// "#"-prefixed registration number label
    pub rera_id: Selector,
    /// Project display name
    pub name: Selector,
    /// Developer display name
    pub developer: Selector,
    /// First entry of the location list
    pub location: Selector,
    /// Caption node of a labeled field ("District:", "Pincode:", ...)
    pub field_label: Selector,
    /// Value node adjacent to a caption
    pub field_value: Selector,
    /// Anchor whose trailing path segment is the internal id
    pub detail_link: Selector,
    /// Extension-certificate document link markers
    pub ext_cert_flag: Selector,
    pub ext_cert_title: Selector,
}

static LISTING: OnceLock<ListingSelectors> = OnceLock::new();

/// Selectors for the listing page, parsed once.
pub fn listing() -> &'static ListingSelectors {
    LISTING.get_or_init(|| ListingSelectors {
        card: parse(".shadow.p-3.mb-5.bg-body.rounded"),
        rera_id: parse(".col-xl-4 p.p-0"),
        name: parse("h4.title4 strong"),
        developer: parse("p.darkBlue.bold"),
        location: parse(".col-xl-4 .listingList li:first-child a"),
        field_label: parse(".greyColor"),
        field_value: parse("p"),
        detail_link: parse("a.click-projectmodal"),
        ext_cert_flag: parse(r#"a[data-qstr-flag="DocProjectExtCert"]"#),
        ext_cert_title: parse(r#"a[title="View Extension Certificate"]"#),
    })
}

fn parse(selector: &str) -> Selector {
    Selector::parse(selector).expect("static selector must parse")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_selectors_parse() {
        let selectors = listing();
        // Spot-check one compound selector survived the parser.
        assert!(!format!("{:?}", selectors.card).is_empty());
    }
}

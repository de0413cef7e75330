//! Golden-fixture test for the listing extractor.
//!
//! The fixture mirrors the registry's search-result markup. If the
//! registry changes its page structure, this test fails loudly instead of
//! the crawler silently persisting empty batches.

use chrono::NaiveDate;
use rera_crawler::services::parse_listing_html;

const LISTING_PAGE: &str = include_str!("fixtures/listing_page.html");

#[test]
fn extracts_the_expected_records_from_the_fixture() {
    let projects = parse_listing_html(LISTING_PAGE);

    // Three well-formed cards; the card without a registration number is
    // dropped.
    assert_eq!(projects.len(), 3);

    let emerald = &projects[0];
    assert_eq!(emerald.rera_id, "P52100034567");
    assert_eq!(emerald.project_name, "Emerald Heights Phase II");
    assert_eq!(emerald.developer.as_deref(), Some("Emerald Developers LLP"));
    assert_eq!(
        emerald.location_taluka.as_deref(),
        Some("Andheri, Mumbai Suburban")
    );
    assert_eq!(emerald.district.as_deref(), Some("Mumbai Suburban"));
    assert_eq!(emerald.pincode.as_deref(), Some("400053"));
    // Day-month-year caption reinterpreted on direct-parse failure.
    assert_eq!(emerald.last_modified, NaiveDate::from_ymd_opt(2024, 3, 22));
    assert_eq!(emerald.internal_id, Some(45067));
    assert!(emerald.has_extension_cert);

    let lakeside = &projects[1];
    assert_eq!(lakeside.rera_id, "P52100051234");
    assert_eq!(lakeside.project_name, "Lakeside Residency");
    assert_eq!(lakeside.developer, None, "blank developer treated as absent");
    assert_eq!(lakeside.district, None);
    assert_eq!(lakeside.last_modified, NaiveDate::from_ymd_opt(2024, 2, 29));
    assert_eq!(lakeside.internal_id, Some(51230));
    assert!(!lakeside.has_extension_cert);

    let harbour = &projects[2];
    assert_eq!(harbour.rera_id, "P52100067890");
    assert_eq!(
        harbour.internal_id, None,
        "non-numeric detail path segment yields no internal id"
    );
    assert!(
        harbour.has_extension_cert,
        "title-marked certificate link detected"
    );
}

#[test]
fn fixture_extraction_is_deterministic() {
    assert_eq!(
        parse_listing_html(LISTING_PAGE),
        parse_listing_html(LISTING_PAGE)
    );
}

//! Field tables and placement rules for every page kind.

use folio_sdk::types::{FieldDefinition, FieldType, ReferenceTarget};
use serde_json::json;

use super::{PageKind, PageTypeDefinition};
use crate::models::children::ChildKind;

const PROMOTE: [&str; 3] = ["slug", "seo_title", "search_description"];

fn char(name: &str) -> FieldDefinition {
    FieldDefinition::new(name, FieldType::char()).required()
}

fn char_opt(name: &str) -> FieldDefinition {
    FieldDefinition::new(name, FieldType::char())
}

fn text(name: &str) -> FieldDefinition {
    FieldDefinition::new(name, FieldType::Text).required()
}

fn text_opt(name: &str) -> FieldDefinition {
    FieldDefinition::new(name, FieldType::Text)
}

fn rich(name: &str) -> FieldDefinition {
    FieldDefinition::new(name, FieldType::RichText).required()
}

fn rich_opt(name: &str) -> FieldDefinition {
    FieldDefinition::new(name, FieldType::RichText)
}

fn url(name: &str) -> FieldDefinition {
    FieldDefinition::new(name, FieldType::Url).required()
}

fn url_opt(name: &str) -> FieldDefinition {
    FieldDefinition::new(name, FieldType::Url)
}

fn flag(name: &str) -> FieldDefinition {
    FieldDefinition::new(name, FieldType::Boolean)
}

fn stream(name: &str, schema: &str) -> FieldDefinition {
    FieldDefinition::new(name, FieldType::Stream(schema.to_string())).required()
}

fn reference(name: &str, target: ReferenceTarget) -> FieldDefinition {
    FieldDefinition::new(name, FieldType::Reference(target))
}

/// A page that lives directly under the home page.
fn home_child(
    kind: PageKind,
    label: &'static str,
    fields: Vec<FieldDefinition>,
    api_fields: Vec<&'static str>,
) -> PageTypeDefinition {
    PageTypeDefinition {
        kind,
        label,
        fields,
        children: Vec::new(),
        computed: Vec::new(),
        api_fields,
        parent_types: vec![PageKind::HomePage],
        subpage_types: Vec::new(),
    }
}

fn with_promote(mut api_fields: Vec<&'static str>) -> Vec<&'static str> {
    api_fields.extend(PROMOTE);
    api_fields
}

pub(super) fn standard_definitions() -> Vec<PageTypeDefinition> {
    vec![
        home_page(),
        higher_education(),
        contact_us(),
        about_us(),
        general_page(),
        ecosystem_allies(),
        foundation_support(),
        our_impact(),
        give(),
        terms_of_service(),
        ap(),
        faq(),
        support(),
        give_form(),
        accessibility(),
        licensing(),
        intro_only(PageKind::CompCopy, "Comp copy"),
        intro_only(PageKind::AdoptForm, "Adopt form"),
        intro_only(PageKind::InterestForm, "Interest form"),
        marketing(),
        technology(),
        book_index(),
        book(),
        ally(),
    ]
}

fn home_page() -> PageTypeDefinition {
    let subpage_types = PageKind::ALL
        .into_iter()
        .filter(|kind| !matches!(kind, PageKind::HomePage | PageKind::Book))
        .collect();
    PageTypeDefinition {
        kind: PageKind::HomePage,
        label: "Home Page",
        fields: (1..=5)
            .map(|n| stream(&format!("row_{n}"), "column_row"))
            .collect(),
        children: Vec::new(),
        computed: Vec::new(),
        api_fields: with_promote(vec!["title", "row_1", "row_2", "row_3", "row_4", "row_5"]),
        parent_types: Vec::new(),
        subpage_types,
    }
}

fn higher_education() -> PageTypeDefinition {
    let fields = vec![
        char("intro_heading"),
        text("intro_description"),
        stream("row_1", "column_row"),
        char("get_started_heading"),
        char("get_started_step_1_heading"),
        text("get_started_step_1_description"),
        char("get_started_step_1_cta"),
        char("get_started_step_2_heading"),
        text("get_started_step_2_description"),
        char("get_started_step_2_logged_in_cta"),
        char("get_started_step_2_logged_out_cta"),
        char("get_started_step_3_heading"),
        text("get_started_step_3_description"),
        char("get_started_step_3_cta"),
        char("adopt_heading"),
        text("adopt_description"),
        char("adopt_cta"),
        stream("row_2", "column_row"),
        stream("row_3", "column_row"),
    ];
    let api_fields = with_promote(vec![
        "intro_heading",
        "intro_description",
        "row_1",
        "get_started_heading",
        "get_started_step_1_heading",
        "get_started_step_1_description",
        "get_started_step_1_cta",
        "get_started_step_2_heading",
        "get_started_step_2_description",
        "get_started_step_2_logged_in_cta",
        "get_started_step_2_logged_out_cta",
        "get_started_step_3_heading",
        "get_started_step_3_description",
        "get_started_step_3_cta",
        "adopt_heading",
        "adopt_description",
        "adopt_cta",
        "row_2",
        "row_3",
    ]);
    home_child(PageKind::HigherEducation, "Higher education", fields, api_fields)
}

fn contact_us() -> PageTypeDefinition {
    home_child(
        PageKind::ContactUs,
        "Contact us",
        vec![
            char("tagline"),
            char("mailing_header"),
            rich("mailing_address"),
            rich("customer_service"),
        ],
        with_promote(vec![
            "title",
            "tagline",
            "mailing_header",
            "mailing_address",
            "customer_service",
        ]),
    )
}

fn about_us() -> PageTypeDefinition {
    let mut def = home_child(
        PageKind::AboutUs,
        "About us",
        vec![
            char("tagline"),
            char("intro_heading"),
            rich("intro_paragraph"),
            char("our_team_heading"),
        ],
        with_promote(vec![
            "tagline",
            "intro_heading",
            "intro_paragraph",
            "our_team_heading",
            "openstax_team",
            "strategic_advisors",
        ]),
    );
    def.children = vec![
        ("openstax_team", ChildKind::TeamMembers),
        ("strategic_advisors", ChildKind::Advisors),
    ];
    def
}

fn general_page() -> PageTypeDefinition {
    home_child(
        PageKind::GeneralPage,
        "General page",
        vec![stream("body", "general_body")],
        with_promote(vec!["title", "body"]),
    )
}

fn ecosystem_allies() -> PageTypeDefinition {
    let mut def = home_child(
        PageKind::EcosystemAllies,
        "Ecosystem allies",
        vec![text("page_description")],
        with_promote(vec!["title", "page_description", "allies"]),
    );
    def.computed = vec!["allies"];
    def
}

fn foundation_support() -> PageTypeDefinition {
    let mut def = home_child(
        PageKind::FoundationSupport,
        "Foundation support",
        vec![text("page_description")],
        with_promote(vec!["title", "page_description", "funders"]),
    );
    def.children = vec![("funders", ChildKind::Funders)];
    def
}

fn our_impact() -> PageTypeDefinition {
    let mut def = home_child(
        PageKind::OurImpact,
        "Our impact",
        vec![
            char("intro_heading"),
            text("intro_description"),
            stream("row_1", "column_row"),
        ],
        with_promote(vec![
            "title",
            "intro_heading",
            "intro_description",
            "row_1",
            "institutions",
        ]),
    );
    def.children = vec![("institutions", ChildKind::Institutions)];
    def
}

fn give() -> PageTypeDefinition {
    let fields = vec![
        char("intro_heading"),
        text("intro_description"),
        char("other_payment_methods_heading"),
        char("payment_method_1_heading"),
        rich("payment_method_1_content"),
        char("payment_method_2_heading"),
        rich("payment_method_2_content"),
        char("payment_method_3_heading"),
        rich("payment_method_3_content"),
        char_opt("payment_method_4_heading"),
        rich_opt("payment_method_4_content"),
        char("give_cta"),
        url("give_cta_link"),
    ];
    let api_fields = with_promote(vec![
        "intro_heading",
        "intro_description",
        "other_payment_methods_heading",
        "payment_method_1_heading",
        "payment_method_1_content",
        "payment_method_2_heading",
        "payment_method_2_content",
        "payment_method_3_heading",
        "payment_method_3_content",
        "payment_method_4_heading",
        "payment_method_4_content",
        "give_cta",
        "give_cta_link",
    ]);
    home_child(PageKind::Give, "Give", fields, api_fields)
}

fn terms_of_service() -> PageTypeDefinition {
    home_child(
        PageKind::TermsOfService,
        "Terms of service",
        vec![char("intro_heading"), rich("terms_of_service_content")],
        with_promote(vec!["title", "intro_heading", "terms_of_service_content"]),
    )
}

fn ap() -> PageTypeDefinition {
    home_child(
        PageKind::Ap,
        "AP",
        vec![
            char("intro_heading"),
            text("intro_description"),
            stream("row_1", "column_row"),
            stream("row_2", "column_row"),
        ],
        vec!["intro_heading", "intro_description", "row_1", "row_2"],
    )
}

fn faq() -> PageTypeDefinition {
    home_child(
        PageKind::Faq,
        "FAQ",
        vec![
            char("intro_heading"),
            rich("intro_description"),
            stream("questions", "faq_questions"),
        ],
        vec!["intro_heading", "intro_description", "questions"],
    )
}

fn support() -> PageTypeDefinition {
    home_child(
        PageKind::Support,
        "Support",
        vec![
            char("intro_heading"),
            rich("intro_description"),
            stream("row_1", "column_row"),
        ],
        vec!["intro_heading", "intro_description", "row_1"],
    )
}

fn give_form() -> PageTypeDefinition {
    home_child(
        PageKind::GiveForm,
        "Give form",
        vec![text("page_description")],
        with_promote(vec!["title", "page_description"]),
    )
}

fn accessibility() -> PageTypeDefinition {
    home_child(
        PageKind::Accessibility,
        "Accessibility",
        vec![char("intro_heading"), rich("accessibility_content")],
        with_promote(vec!["title", "intro_heading", "accessibility_content"]),
    )
}

fn licensing() -> PageTypeDefinition {
    home_child(
        PageKind::Licensing,
        "Licensing",
        vec![char("intro_heading"), rich("licensing_content")],
        with_promote(vec!["title", "intro_heading", "licensing_content"]),
    )
}

/// Form landing pages that only carry an intro.
fn intro_only(kind: PageKind, label: &'static str) -> PageTypeDefinition {
    home_child(
        kind,
        label,
        vec![char("intro_heading"), rich("intro_description")],
        vec!["intro_heading", "intro_description"],
    )
}

fn marketing() -> PageTypeDefinition {
    let mut def = home_child(
        PageKind::Marketing,
        "Marketing",
        vec![
            char("section_1_heading"),
            char("section_1_subheading"),
            rich("section_1_paragraph"),
            url("section_1_cta_link"),
            char("section_1_cta_text"),
            char("section_2_heading"),
            char("section_2_subheading"),
            rich("section_2_paragraph"),
            char("section_3_heading"),
            rich("section_3_paragraph"),
            char("section_4_heading"),
            char("section_4_book_heading"),
            char("section_5_heading"),
            rich("section_5_paragraph"),
            stream("faqs", "marketing_faqs"),
            char("section_7_heading"),
            char("section_7_subheading"),
            char("section_7_cta_text_1"),
            url("section_7_cta_link_1"),
            char("section_7_cta_blurb_1"),
            char_opt("section_7_cta_text_2"),
            url_opt("section_7_cta_link_2"),
            char_opt("section_7_cta_blurb_2"),
        ],
        with_promote(vec![
            "title",
            "section_1_heading",
            "section_1_subheading",
            "section_1_paragraph",
            "section_1_cta_link",
            "section_1_cta_text",
            "section_2_heading",
            "section_2_subheading",
            "section_2_paragraph",
            "section_3_heading",
            "section_3_paragraph",
            "marketing_videos",
            "resource_availability",
            "section_4_heading",
            "section_4_book_heading",
            "marketing_books",
            "section_5_heading",
            "section_5_paragraph",
            "faqs",
            "section_7_heading",
            "section_7_subheading",
            "section_7_cta_text_1",
            "section_7_cta_link_1",
            "section_7_cta_blurb_1",
            "section_7_cta_text_2",
            "section_7_cta_link_2",
            "section_7_cta_blurb_2",
        ]),
    );
    def.children = vec![
        ("marketing_videos", ChildKind::Videos),
        ("resource_availability", ChildKind::Availability),
    ];
    def.computed = vec!["marketing_books"];
    def
}

fn technology() -> PageTypeDefinition {
    let fields = vec![
        char("intro_heading"),
        rich("intro_description"),
        char("banner_cta"),
        url_opt("banner_cta_link"),
        char("select_tech_heading"),
        char("select_tech_step_1"),
        char("select_tech_step_2"),
        char("select_tech_step_3"),
        char("new_frontier_heading"),
        char("new_frontier_subheading"),
        rich("new_frontier_description"),
        char("new_frontier_cta_1"),
        url_opt("new_frontier_cta_link_1"),
        char("new_frontier_cta_2"),
        url_opt("new_frontier_cta_link_2"),
    ];
    let api_fields = vec![
        "intro_heading",
        "intro_description",
        "banner_cta",
        "banner_cta_link",
        "select_tech_heading",
        "select_tech_step_1",
        "select_tech_step_2",
        "select_tech_step_3",
        "new_frontier_heading",
        "new_frontier_subheading",
        "new_frontier_description",
        "new_frontier_cta_1",
        "new_frontier_cta_link_1",
        "new_frontier_cta_2",
        "new_frontier_cta_link_2",
    ];
    home_child(PageKind::Technology, "Technology", fields, api_fields)
}

fn book_index() -> PageTypeDefinition {
    let fields = vec![
        text("page_description"),
        char_opt("dev_standards_heading"),
        char_opt("dev_standard_1_heading"),
        rich("dev_standard_1_description"),
        char_opt("dev_standard_2_heading"),
        rich("dev_standard_2_description"),
        char_opt("dev_standard_3_heading"),
        rich("dev_standard_3_description"),
        char_opt("subject_list_heading"),
    ];
    let api_fields = vec![
        "title",
        "page_description",
        "dev_standards_heading",
        "dev_standard_1_heading",
        "dev_standard_1_description",
        "dev_standard_2_heading",
        "dev_standard_2_description",
        "dev_standard_3_heading",
        "dev_standard_3_description",
        "subject_list_heading",
        "books",
    ];
    let mut def = home_child(PageKind::BookIndex, "Book index", fields, api_fields);
    def.computed = vec!["books"];
    def.subpage_types = vec![PageKind::Book];
    def
}

fn book() -> PageTypeDefinition {
    let fields = vec![
        char_opt("cnx_id").help("This is used to pull relevant information from CNX."),
        char_opt("salesforce_abbreviation"),
        char_opt("salesforce_name"),
        reference("subject", ReferenceTarget::Subject),
        flag("is_ap"),
        rich_opt("description").help("Description shown on Book Detail page."),
        reference("cover", ReferenceTarget::Document),
        FieldDefinition::new("publish_date", FieldType::Date),
        FieldDefinition::new("authors", FieldType::Stream("authors".to_string())).read_only(),
        char_opt("print_isbn_10"),
        char_opt("print_isbn_13"),
        char_opt("digital_isbn_10"),
        char_opt("digital_isbn_13"),
        char_opt("ibook_isbn_10"),
        char_opt("ibook_isbn_13"),
        char_opt("ibook_volume_2_isbn_10"),
        char_opt("ibook_volume_2_isbn_13"),
        text_opt("license_text").help("Text blurb that describes the license."),
        char_opt("license_name").read_only(),
        char_opt("license_version").read_only(),
        char_opt("license_url").read_only(),
        reference("high_resolution_pdf", ReferenceTarget::Document),
        reference("low_resolution_pdf", ReferenceTarget::Document),
        reference("student_handbook", ReferenceTarget::Document),
        url_opt("community_resource_url"),
        char_opt("community_resource_cta"),
        flag("coming_soon"),
        url_opt("ibook_link").help("Link to iBook"),
        url_opt("ibook_link_volume_2").help("Link to secondary iBook"),
        url_opt("webview_link")
            .help("Link to CNX Webview book")
            .read_only(),
        url_opt("concept_coach_link").help("Link to Concept Coach"),
        url_opt("bookshare_link").help("Link to Bookshare resources"),
        flag("amazon_coming_soon"),
        url_opt("amazon_link").help("Link to Amazon"),
        FieldDefinition::new(
            "amazon_price",
            FieldType::Decimal {
                max_digits: 6,
                decimal_places: 2,
            },
        )
        .default_value(json!("0.00")),
        text_opt("amazon_blurb"),
        flag("bookstore_coming_soon"),
        url_opt("bookstore_link").help("Link to Bookstore"),
        text_opt("bookstore_blurb"),
        flag("comp_copy_available").default_value(json!(true)),
        url_opt("errata_link").help("Link to view openstaxcollege.org errata"),
        url_opt("errata_corrections_link").help("Link errata corrections"),
        FieldDefinition::new("table_of_contents", FieldType::Json).read_only(),
        flag("tutor_marketing_book"),
    ];

    PageTypeDefinition {
        kind: PageKind::Book,
        label: "Book",
        fields,
        children: vec![
            ("book_quotes", ChildKind::Quotes),
            ("book_allies", ChildKind::Allies),
            ("book_student_resources", ChildKind::StudentResources),
            ("book_faculty_resources", ChildKind::FacultyResources),
            ("book_contributing_authors", ChildKind::Authors),
        ],
        computed: vec![
            "subject_name",
            "cover_url",
            "high_resolution_pdf_url",
            "low_resolution_pdf_url",
            "student_handbook_url",
            "urls",
        ],
        api_fields: vec![
            "created",
            "updated",
            "slug",
            "title",
            "cnx_id",
            "salesforce_abbreviation",
            "salesforce_name",
            "subject_name",
            "is_ap",
            "description",
            "cover_url",
            "book_quotes",
            "book_allies",
            "book_student_resources",
            "book_faculty_resources",
            "book_contributing_authors",
            "publish_date",
            "authors",
            "print_isbn_10",
            "print_isbn_13",
            "digital_isbn_10",
            "digital_isbn_13",
            "ibook_isbn_10",
            "ibook_isbn_13",
            "ibook_volume_2_isbn_10",
            "ibook_volume_2_isbn_13",
            "license_text",
            "license_name",
            "license_version",
            "license_url",
            "high_resolution_pdf_url",
            "low_resolution_pdf_url",
            "student_handbook_url",
            "community_resource_url",
            "community_resource_cta",
            "coming_soon",
            "ibook_link",
            "ibook_link_volume_2",
            "webview_link",
            "concept_coach_link",
            "bookshare_link",
            "amazon_coming_soon",
            "amazon_link",
            "amazon_price",
            "amazon_blurb",
            "bookstore_coming_soon",
            "bookstore_link",
            "bookstore_blurb",
            "comp_copy_available",
            "errata_link",
            "errata_corrections_link",
            "table_of_contents",
            "tutor_marketing_book",
        ],
        parent_types: vec![PageKind::BookIndex],
        subpage_types: Vec::new(),
    }
}

fn ally() -> PageTypeDefinition {
    let mut def = home_child(
        PageKind::Ally,
        "Ally",
        vec![
            char("heading"),
            text("short_description"),
            text("long_description"),
            flag("is_ap"),
            flag("do_not_display"),
            reference("logo_color", ReferenceTarget::Image),
            reference("logo_bw", ReferenceTarget::Image),
        ],
        with_promote(vec![
            "title",
            "heading",
            "short_description",
            "long_description",
            "is_ap",
            "do_not_display",
            "ally_color_logo",
            "ally_bw_logo",
            "subjects",
        ]),
    );
    def.children = vec![("ally_subjects", ChildKind::AllySubjects)];
    def.computed = vec!["ally_color_logo", "ally_bw_logo", "subjects"];
    def
}

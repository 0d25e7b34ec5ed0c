//! Built-in page types of the content site

use crate::field::FieldDef;
use crate::page_type::PageTypeSchema;
use crate::section::SectionDef;

pub(crate) fn builtin_schemas() -> Vec<PageTypeSchema> {
    vec![city_page(), exam_landing(), course_page()]
}

fn seo_fields(schema: PageTypeSchema) -> PageTypeSchema {
    schema
        .with_field(FieldDef::text("title", "Title").required())
        .with_field(FieldDef::text("slug", "Slug").required())
        .with_field(FieldDef::textarea("meta_description", "Meta Description"))
}

fn faq_section() -> SectionDef {
    SectionDef::new(
        "faq",
        "FAQ",
        vec![
            FieldDef::text("heading", "Heading"),
            FieldDef::array(
                "items",
                "Questions",
                vec![
                    FieldDef::text("question", "Question").required(),
                    FieldDef::editor("answer", "Answer"),
                ],
            ),
        ],
    )
}

fn city_page() -> PageTypeSchema {
    seo_fields(PageTypeSchema::new("city_page", "City Page"))
        .with_field(FieldDef::text("city", "City").required())
        .with_field(FieldDef::file("banner_image", "Banner Image"))
        .with_field(FieldDef::date("published_at", "Publish Date"))
        .with_section(SectionDef::new(
            "hero",
            "Hero",
            vec![
                FieldDef::text("heading", "Heading").required(),
                FieldDef::textarea("subheading", "Subheading"),
                FieldDef::file("background_image", "Background Image"),
            ],
        ))
        .with_section(SectionDef::new(
            "why_choose_us",
            "Why Choose Us",
            vec![
                FieldDef::text("heading", "Heading"),
                FieldDef::array(
                    "reasons",
                    "Reasons",
                    vec![
                        FieldDef::text("title", "Title"),
                        FieldDef::textarea("description", "Description"),
                    ],
                ),
            ],
        ))
        .with_section(SectionDef::new(
            "top_universities",
            "Top Universities",
            vec![
                FieldDef::text("heading", "Heading"),
                FieldDef::array(
                    "universities",
                    "Universities",
                    vec![
                        FieldDef::text("name", "Name").required(),
                        FieldDef::number("ranking", "Ranking"),
                        FieldDef::file("logo", "Logo"),
                    ],
                ),
            ],
        ))
        .with_section(SectionDef::new(
            "cost_of_living",
            "Cost of Living",
            vec![
                FieldDef::text("heading", "Heading"),
                FieldDef::number("average_monthly_cost", "Average Monthly Cost"),
                FieldDef::array(
                    "breakdown",
                    "Breakdown",
                    vec![
                        FieldDef::text("item", "Item"),
                        FieldDef::number("amount", "Amount"),
                    ],
                ),
            ],
        ))
        .with_section(faq_section())
}

fn exam_landing() -> PageTypeSchema {
    seo_fields(PageTypeSchema::new("exam_landing", "Exam Landing Page"))
        .with_field(FieldDef::text("exam", "Exam").required())
        .with_field(FieldDef::editor("description", "Description"))
        .with_section(SectionDef::new(
            "intro",
            "Intro",
            vec![
                FieldDef::text("heading", "Heading"),
                FieldDef::array("bullets", "Bullets", vec![FieldDef::text("text", "Text")]),
            ],
        ))
        .with_section(SectionDef::new(
            "test_format",
            "Test Format",
            vec![
                FieldDef::text("heading", "Heading"),
                FieldDef::array(
                    "parts",
                    "Parts",
                    vec![
                        FieldDef::text("name", "Name").required(),
                        FieldDef::number("duration_minutes", "Duration (minutes)"),
                        FieldDef::textarea("description", "Description"),
                    ],
                ),
            ],
        ))
        .with_section(SectionDef::new(
            "score_bands",
            "Score Bands",
            vec![
                FieldDef::text("heading", "Heading"),
                FieldDef::array(
                    "bands",
                    "Bands",
                    vec![
                        FieldDef::text("band", "Band"),
                        FieldDef::textarea("description", "Description"),
                    ],
                ),
            ],
        ))
        .with_section(faq_section())
}

fn course_page() -> PageTypeSchema {
    seo_fields(PageTypeSchema::new("course_page", "Course Page"))
        .with_field(FieldDef::number("price", "Price"))
        .with_field(FieldDef::date("start_date", "Start Date"))
        .with_field(FieldDef::editor("syllabus", "Syllabus"))
        .with_section(SectionDef::new(
            "overview",
            "Overview",
            vec![
                FieldDef::text("heading", "Heading").required(),
                FieldDef::editor("body", "Body"),
            ],
        ))
        .with_section(SectionDef::new(
            "instructors",
            "Instructors",
            vec![
                FieldDef::text("heading", "Heading"),
                FieldDef::array(
                    "people",
                    "People",
                    vec![
                        FieldDef::text("name", "Name").required(),
                        FieldDef::textarea("bio", "Bio"),
                        FieldDef::file("photo", "Photo"),
                    ],
                ),
            ],
        ))
        .with_section(SectionDef::new(
            "testimonials",
            "Testimonials",
            vec![
                FieldDef::text("heading", "Heading"),
                FieldDef::array(
                    "quotes",
                    "Quotes",
                    vec![
                        FieldDef::text("author", "Author"),
                        FieldDef::textarea("quote", "Quote"),
                    ],
                ),
            ],
        ))
}

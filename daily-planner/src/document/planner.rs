//! Default daily planner page layout

use super::{Border, Color, Document, Element};
use crate::fields::FieldName;

/// Id of the planner surface that gets exported
pub const PLANNER_ID: &str = "planner";

/// Id of the form wrapping the planner
pub const PLANNER_FORM_ID: &str = "plannerForm";

/// Hours shown in the schedule table
pub const SCHEDULE_HOURS: std::ops::RangeInclusive<u32> = 6..=21;

fn field_control(field: FieldName) -> Element {
    let tag = if field.is_multiline() { "textarea" } else { "input" };
    let mut control = Element::new(tag).with_id(field.key()).styled(|s| {
        s.padding = 6;
        s.border = Some(Border {
            width: 1,
            color: Color::BORDER,
        });
        s.background = Some(Color::WHITE);
        if field.is_multiline() {
            s.min_height = Some(64);
        }
    });
    if !field.is_multiline() {
        let kind = match field {
            FieldName::Email => "email",
            FieldName::Date => "date",
            _ => "text",
        };
        control = control.with_attr("type", kind);
    }
    control
}

fn labelled(field: FieldName) -> Element {
    Element::new("label")
        .styled(|s| s.padding = 4)
        .with_child(Element::new("span").with_text(field.label()))
        .with_child(field_control(field))
}

fn schedule() -> Element {
    let rows = SCHEDULE_HOURS.map(|hour| {
        Element::new("tr")
            .with_child(Element::new("th").with_text(format!("{hour:02}:00")))
            .with_child(
                Element::new("td")
                    .with_id(format!("schedule-{hour:02}"))
                    .with_attr("contenteditable", "true")
                    .styled(|s| {
                        s.padding = 4;
                        s.min_height = Some(24);
                        s.border = Some(Border {
                            width: 1,
                            color: Color::BORDER,
                        });
                    }),
            )
    });
    Element::new("table").with_id("schedule").with_children(rows)
}

impl Document {
    /// Build the daily planner page
    ///
    /// Every [`FieldName`] has a control whose id equals the field key, and
    /// the schedule consists of `contenteditable` cells.
    #[must_use]
    pub fn daily_planner() -> Self {
        let header = Element::new("header")
            .with_child(Element::new("h1").with_text("Daily Planner"))
            .with_children([
                labelled(FieldName::Name),
                labelled(FieldName::Email),
                labelled(FieldName::Date),
            ]);

        let planner = Element::new("div")
            .with_id(PLANNER_ID)
            .styled(|s| {
                s.padding = 16;
                s.background = Some(Color(248, 249, 250));
            })
            .with_child(header)
            .with_child(labelled(FieldName::Priorities))
            .with_child(labelled(FieldName::Todo))
            .with_child(
                Element::new("section")
                    .with_child(Element::new("h2").with_text("Schedule"))
                    .with_child(schedule()),
            )
            .with_child(labelled(FieldName::Notes))
            .with_child(labelled(FieldName::Quote));

        let form = Element::new("form")
            .with_id(PLANNER_FORM_ID)
            .with_child(planner)
            .with_child(
                Element::new("button")
                    .with_attr("type", "submit")
                    .with_text("Email my planner"),
            )
            .with_child(
                Element::new("button")
                    .with_id("clearPlannerBtn")
                    .with_attr("type", "button")
                    .with_text("Clear planner"),
            );

        Self::new(Element::new("body").with_child(form))
    }
}

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::api::hal::{rels, uris, HalModel};
use crate::database::models::{ActionItem, TrackedCase, TrackedPerson};
use crate::services::{CaseActionSummary, MessageCatalog};

fn iso_date(date: Option<NaiveDate>) -> Value {
    match date {
        Some(d) => Value::String(d.format("%Y-%m-%d").to_string()),
        None => Value::Null,
    }
}

/// Trimmed down case for selection dialogues: names plus a link to the case
pub fn tracked_case_select(case: &TrackedCase, person: &TrackedPerson) -> Value {
    HalModel::of(json!({
        "firstName": person.first_name,
        "lastName": person.last_name,
        "dateOfBirth": iso_date(person.date_of_birth),
    }))
    .link(rels::SELF, uris::case(case.id))
    .build()
}

fn summary_properties(case: &TrackedCase, person: &TrackedPerson) -> Value {
    json!({
        "caseId": case.id,
        "caseType": case.case_type,
        "status": case.status,
        "firstName": person.first_name,
        "lastName": person.last_name,
        "email": person.email,
        "phone": person.phone,
        "dateOfBirth": iso_date(person.date_of_birth),
        "quarantineStart": iso_date(case.quarantine.map(|q| q.from)),
        "quarantineEnd": iso_date(case.quarantine.map(|q| q.to)),
    })
}

pub fn tracked_case_summary(case: &TrackedCase, person: &TrackedPerson) -> Value {
    HalModel::of(summary_properties(case, person))
        .link(rels::SELF, uris::case(case.id))
        .build()
}

fn item_representation(item: &ActionItem, messages: &MessageCatalog) -> Value {
    json!({
        "id": item.id,
        "type": item.item_type,
        "description": messages.render(&item.description),
        "resolved": item.resolved,
        "date": item.created_at.to_rfc3339(),
    })
}

/// All action items of a case, split into health and process anomalies
pub fn case_actions(
    case: &TrackedCase,
    person: &TrackedPerson,
    items: &[ActionItem],
    messages: &MessageCatalog,
) -> Value {
    let (health, process): (Vec<&ActionItem>, Vec<&ActionItem>) =
        items.iter().partition(|item| item.is_medical_incident());

    let comments: Vec<Value> = case
        .comments
        .iter()
        .map(|c| {
            json!({
                "date": c.date.to_rfc3339(),
                "comment": c.text,
                "author": c.author,
            })
        })
        .collect();

    let mut model = HalModel::of(json!({
        "caseId": case.id,
        "firstName": person.first_name,
        "lastName": person.last_name,
        "comments": comments,
        "anomalies": {
            "health": health.into_iter().map(|i| item_representation(i, messages)).collect::<Vec<_>>(),
            "process": process.into_iter().map(|i| item_representation(i, messages)).collect::<Vec<_>>(),
        },
    }))
    .link(rels::SELF, uris::actions(case.id))
    .link(rels::CASE, uris::case(case.id));

    if case.is_open() && items.iter().any(|i| !i.resolved) {
        model = model.link(rels::RESOLVE, uris::resolve_actions(case.id));
    }

    model.build()
}

/// List entry for the department's action overview. Origin cases are
/// embedded only when there are any.
pub fn case_action_summary(
    summary: &CaseActionSummary,
    origins: &[(TrackedCase, TrackedPerson)],
    messages: &MessageCatalog,
) -> Value {
    let mut properties = summary_properties(&summary.case, &summary.person);
    let (health, process): (Vec<&ActionItem>, Vec<&ActionItem>) =
        summary.unresolved.iter().partition(|item| item.is_medical_incident());

    if let Value::Object(obj) = &mut properties {
        obj.insert("priority".into(), json!(summary.priority()));
        obj.insert("numberOfActions".into(), json!(summary.unresolved.len()));
        obj.insert(
            "healthSummary".into(),
            json!(health.iter().map(|i| messages.render(&i.description)).collect::<Vec<_>>()),
        );
        obj.insert(
            "processSummary".into(),
            json!(process.iter().map(|i| messages.render(&i.description)).collect::<Vec<_>>()),
        );
    }

    let mut model = HalModel::of(properties).link(rels::SELF, uris::actions(summary.case.id));

    if !origins.is_empty() {
        let selects = origins
            .iter()
            .map(|(case, person)| tracked_case_select(case, person))
            .collect();
        model = model.embed(rels::ORIGIN_CASES, selects);
    }

    model.build()
}

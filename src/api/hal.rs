use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Link relation names used in response bodies
pub mod rels {
    pub const SELF: &str = "self";
    pub const NEXT: &str = "next";
    pub const CASE: &str = "case";
    pub const RESOLVE: &str = "resolve";
    pub const CHANGE_PASSWORD: &str = "change-password";
    pub const ORIGIN_CASES: &str = "originCases";
}

/// Paths of the resources links point at
pub mod uris {
    use super::Uuid;

    pub fn case(id: Uuid) -> String {
        format!("/api/hd/cases/{}", id)
    }

    pub fn actions(case_id: Uuid) -> String {
        format!("/api/hd/actions/{}", case_id)
    }

    pub fn resolve_actions(case_id: Uuid) -> String {
        format!("/api/hd/actions/{}/resolve", case_id)
    }

    pub fn change_password() -> String {
        "/api/user/me/password".to_string()
    }
}

/// Ordered link relations, rendered as `{ "rel": { "href": ... } }`
#[derive(Debug, Clone, Default)]
pub struct Links(Vec<(String, String)>);

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, rel: impl Into<String>, href: impl Into<String>) -> Self {
        self.0.push((rel.into(), href.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let mut links = Map::new();
        for (rel, href) in &self.0 {
            links.insert(rel.clone(), json!({ "href": href }));
        }
        Value::Object(links)
    }
}

/// Builder for HAL documents: plain properties plus `_links` and `_embedded`
#[derive(Debug, Clone)]
pub struct HalModel {
    properties: Map<String, Value>,
    links: Links,
    embedded: Map<String, Value>,
}

impl HalModel {
    /// Start from an object value; anything else is wrapped under `content`
    pub fn of(value: Value) -> Self {
        let properties = match value {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("content".into(), other);
                map
            }
        };

        Self {
            properties,
            links: Links::new(),
            embedded: Map::new(),
        }
    }

    pub fn link(mut self, rel: impl Into<String>, href: impl Into<String>) -> Self {
        self.links = self.links.and(rel, href);
        self
    }

    pub fn embed(mut self, rel: impl Into<String>, items: Vec<Value>) -> Self {
        self.embedded.insert(rel.into(), Value::Array(items));
        self
    }

    pub fn build(self) -> Value {
        let mut obj = self.properties;
        if !self.links.is_empty() {
            obj.insert("_links".into(), self.links.to_json());
        }
        if !self.embedded.is_empty() {
            obj.insert("_embedded".into(), Value::Object(self.embedded));
        }
        Value::Object(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_links_and_embedded() {
        let id = Uuid::new_v4();
        let doc = HalModel::of(json!({ "name": "x" }))
            .link(rels::SELF, uris::case(id))
            .embed(rels::ORIGIN_CASES, vec![json!({ "firstName": "A" })])
            .build();

        assert_eq!(doc["name"], "x");
        assert_eq!(doc["_links"]["self"]["href"], format!("/api/hd/cases/{}", id));
        assert_eq!(doc["_embedded"]["originCases"][0]["firstName"], "A");
    }

    #[test]
    fn omits_empty_sections() {
        let doc = HalModel::of(json!({ "name": "x" })).build();
        assert!(doc.get("_links").is_none());
        assert!(doc.get("_embedded").is_none());
    }

    #[test]
    fn non_object_is_wrapped() {
        let doc = HalModel::of(json!([1, 2])).build();
        assert_eq!(doc["content"], json!([1, 2]));
    }

    #[test]
    fn links_render_each_relation() {
        let links = Links::new().and(rels::NEXT, "/a").and(rels::CHANGE_PASSWORD, "/a");
        assert_eq!(links.to_json()["next"]["href"], "/a");
        assert_eq!(links.to_json()["change-password"]["href"], "/a");
    }
}

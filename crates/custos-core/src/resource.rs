//! The target entity acted upon.

use serde::{Deserialize, Serialize};

use crate::validation::{require_non_empty, Validate, ValidationErrors};
use crate::Attributes;

/// Separator between path segments in [`Resource::full_path`].
pub const PATH_SEPARATOR: &str = "/";

/// The entity an action was performed on.
///
/// A resource may be nested under a parent, which may itself have a parent,
/// and so on. Each node exclusively owns its parent, so the ancestor chain is
/// a finite singly-linked list with no sharing and no cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ResourceRecord")]
pub struct Resource {
    #[serde(rename = "type")]
    pub(crate) resource_type: String,

    pub(crate) id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) parent_resource: Option<Box<Resource>>,

    pub(crate) attributes: Attributes,
}

/// Wire form of a resource chain, before validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResourceRecord {
    #[serde(rename = "type")]
    resource_type: String,
    id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    parent_resource: Option<Box<ResourceRecord>>,
    #[serde(default)]
    attributes: Attributes,
}

impl ResourceRecord {
    pub(crate) fn into_unchecked(self) -> Resource {
        Resource {
            resource_type: self.resource_type,
            id: self.id,
            display_name: self.display_name,
            parent_resource: self
                .parent_resource
                .map(|parent| Box::new((*parent).into_unchecked())),
            attributes: self.attributes,
        }
    }
}

impl TryFrom<ResourceRecord> for Resource {
    type Error = ValidationErrors;

    fn try_from(record: ResourceRecord) -> Result<Self, Self::Error> {
        let resource = record.into_unchecked();
        resource.validate()?;
        Ok(resource)
    }
}

impl Resource {
    /// Resource type, e.g. `order` or `user_profile`.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Resource identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable name.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// The enclosing resource, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        self.parent_resource.as_deref()
    }

    /// Free-form resource attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Returns this resource as a `type:id` segment.
    #[must_use]
    pub fn segment(&self) -> String {
        format!("{}:{}", self.resource_type, self.id)
    }

    /// Iterates from this resource up through every ancestor (leaf first).
    pub fn ancestry(&self) -> impl Iterator<Item = &Self> {
        std::iter::successors(Some(self), |r| r.parent())
    }

    /// Number of nodes in the chain, counting this one.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.ancestry().count()
    }

    /// Returns the full path of this resource, ordered root to leaf.
    ///
    /// # Examples
    ///
    /// ```
    /// use custos_core::ResourceBuilder;
    ///
    /// let project = ResourceBuilder::new("project", "123").build().unwrap();
    /// let task = ResourceBuilder::new("task", "456").parent(project).build().unwrap();
    /// let comment = ResourceBuilder::new("comment", "789").parent(task).build().unwrap();
    ///
    /// assert_eq!(comment.full_path(), "project:123/task:456/comment:789");
    /// ```
    #[must_use]
    pub fn full_path(&self) -> String {
        let mut segments: Vec<String> = self.ancestry().map(Self::segment).collect();
        segments.reverse();
        segments.join(PATH_SEPARATOR)
    }
}

impl Validate for Resource {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut prefix = String::new();
        for node in self.ancestry() {
            require_non_empty(&mut errors, &format!("{prefix}type"), &node.resource_type);
            require_non_empty(&mut errors, &format!("{prefix}id"), &node.id);
            prefix.push_str("parentResource.");
        }
        errors.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResourceBuilder;

    fn chain() -> Resource {
        let project = ResourceBuilder::new("project", "123").build().unwrap();
        let task = ResourceBuilder::new("task", "456")
            .parent(project)
            .build()
            .unwrap();
        ResourceBuilder::new("comment", "789")
            .parent(task)
            .build()
            .unwrap()
    }

    #[test]
    fn test_full_path_single_node() {
        let resource = ResourceBuilder::new("order", "ord-1").build().unwrap();
        assert_eq!(resource.full_path(), "order:ord-1");
        assert_eq!(resource.depth(), 1);
    }

    #[test]
    fn test_full_path_three_levels() {
        let comment = chain();
        assert_eq!(comment.full_path(), "project:123/task:456/comment:789");
        assert_eq!(comment.depth(), 3);
        assert_eq!(comment.parent().unwrap().id(), "456");
    }

    #[test]
    fn test_ancestry_is_leaf_first() {
        let comment = chain();
        let types: Vec<_> = comment.ancestry().map(Resource::resource_type).collect();
        assert_eq!(types, vec!["comment", "task", "project"]);
    }

    #[test]
    fn test_validate_reports_ancestor_path() {
        let mut resource = chain();
        if let Some(task) = resource.parent_resource.as_mut() {
            if let Some(project) = task.parent_resource.as_mut() {
                project.id = String::new();
            }
        }

        let errors = resource.validate().unwrap_err();
        assert_eq!(
            errors.first().unwrap().field,
            "parentResource.parentResource.id"
        );
    }

    #[test]
    fn test_type_serialized_as_type() {
        let resource = ResourceBuilder::new("order", "1").build().unwrap();
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["type"], "order");
        assert!(json.get("displayName").is_none());
        assert!(json.get("parentResource").is_none());
    }

    #[test]
    fn test_deserialize_rejects_empty_ancestor_id() {
        let document = serde_json::json!({
            "type": "comment",
            "id": "789",
            "parentResource": {"type": "task", "id": ""}
        });

        let err = serde_json::from_value::<Resource>(document).unwrap_err();
        assert!(err.to_string().contains("parentResource.id"), "{err}");
    }

    #[test]
    fn test_deserialize_valid_chain() {
        let resource: Resource = serde_json::from_value(serde_json::to_value(chain()).unwrap()).unwrap();
        assert_eq!(resource, chain());
    }
}

//! Resource model: the value types handed out by the namespace translator
//!
//! A [`Resource`] names one node in the simulated hierarchy. Its identity is
//! the full object key; its display name is always derived from that key and
//! never stored on its own.

use serde::{Deserialize, Serialize};

/// Path separator used to fold flat keys into folders
pub const SEPARATOR: char = '/';

/// Kind of node a key represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// A stored object
    File,

    /// A virtual folder (a key prefix ending in the separator)
    Folder,
}

impl ResourceType {
    /// Infer the type structurally from a key's trailing separator
    pub fn infer(id: &str) -> Self {
        if id.ends_with(SEPARATOR) {
            ResourceType::Folder
        } else {
            ResourceType::File
        }
    }

    pub fn is_folder(self) -> bool {
        self == ResourceType::Folder
    }
}

/// One node of the simulated hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "ResourceWire", into = "ResourceWire")]
pub struct Resource {
    id: String,
    name: String,
    resource_type: ResourceType,
}

impl Resource {
    /// Create a resource with an explicit type
    pub fn new(id: impl Into<String>, resource_type: ResourceType) -> Self {
        let id = id.into();
        let name = extract_name(&id).to_string();
        Self {
            id,
            name,
            resource_type,
        }
    }

    /// Create a file resource
    pub fn file(id: impl Into<String>) -> Self {
        Self::new(id, ResourceType::File)
    }

    /// Create a folder resource
    pub fn folder(id: impl Into<String>) -> Self {
        Self::new(id, ResourceType::Folder)
    }

    /// Create a resource whose type is inferred from the id
    pub fn infer(id: impl Into<String>) -> Self {
        let id = id.into();
        let resource_type = ResourceType::infer(&id);
        Self::new(id, resource_type)
    }

    /// Full key in the backing store
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Last path segment of the id
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn is_folder(&self) -> bool {
        self.resource_type.is_folder()
    }

    pub fn is_file(&self) -> bool {
        !self.is_folder()
    }
}

/// Serialized shape of a [`Resource`]
///
/// `name` is written for clients but ignored on the way in, so a
/// deserialized resource can never carry a name that disagrees with its id.
#[derive(Serialize, Deserialize)]
struct ResourceWire {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    resource_type: ResourceType,
}

impl From<ResourceWire> for Resource {
    fn from(wire: ResourceWire) -> Self {
        Resource::new(wire.id, wire.resource_type)
    }
}

impl From<Resource> for ResourceWire {
    fn from(resource: Resource) -> Self {
        ResourceWire {
            id: resource.id,
            name: resource.name,
            resource_type: resource.resource_type,
        }
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResult<T> {
    /// Entries of this page, folders first
    pub resources: Vec<T>,

    /// Continuation token for the next page, `None` on the last page
    pub cursor: Option<String>,
}

impl<T> ListResult<T> {
    pub fn new(resources: Vec<T>, cursor: Option<String>) -> Self {
        Self { resources, cursor }
    }

    /// An empty final page
    pub fn empty() -> Self {
        Self {
            resources: Vec::new(),
            cursor: None,
        }
    }

    /// Whether more pages follow this one
    pub fn has_more(&self) -> bool {
        self.cursor.is_some()
    }
}

/// Extract the final component of a key or prefix
///
/// Exactly one trailing separator is dropped before looking for the last
/// separator, so `"a/b/c.txt"` gives `"c.txt"` and `"a/b/"` gives `"b"`.
pub fn extract_name(key: &str) -> &str {
    let trimmed = key.strip_suffix(SEPARATOR).unwrap_or(key);
    match trimmed.rfind(SEPARATOR) {
        Some(idx) => &trimmed[idx + SEPARATOR.len_utf8()..],
        None => trimmed,
    }
}

/// Guarantee a trailing separator on a folder id
pub fn as_folder_prefix(id: &str) -> String {
    if id.ends_with(SEPARATOR) {
        id.to_string()
    } else {
        format!("{}{}", id, SEPARATOR)
    }
}

//! Document identity as the store keeps it.
//!
//! Stores key every document by its `_id` field. Documents written by this crate get
//! an ObjectId, but collections shared with other writers may hold UUIDs as well, so
//! [`DocumentId`] accepts both and reads either from BSON or from text.

use std::{fmt, str::FromStr};

use bson::{oid::ObjectId, Bson, Uuid};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DocumentStoreError;

/// Field holding a document's identity in every backend.
pub const ID_FIELD: &str = "_id";

/// Identity of a stored document.
///
/// Serializes to the matching BSON type, never to a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentId {
    ObjectId(ObjectId),
    Uuid(Uuid),
}

impl DocumentId {
    /// A fresh ObjectId.
    pub fn new() -> Self {
        DocumentId::ObjectId(ObjectId::new())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for DocumentId {
    fn from(oid: ObjectId) -> Self {
        DocumentId::ObjectId(oid)
    }
}

impl From<Uuid> for DocumentId {
    fn from(uuid: Uuid) -> Self {
        DocumentId::Uuid(uuid)
    }
}

impl From<DocumentId> for Bson {
    fn from(id: DocumentId) -> Self {
        match id {
            DocumentId::ObjectId(oid) => Bson::ObjectId(oid),
            DocumentId::Uuid(uuid) => Bson::from(uuid),
        }
    }
}

impl TryFrom<Bson> for DocumentId {
    type Error = DocumentStoreError;

    fn try_from(value: Bson) -> Result<Self, Self::Error> {
        match value {
            Bson::ObjectId(oid) => Ok(oid.into()),
            Bson::Binary(binary) => binary
                .to_uuid()
                .map(Into::into)
                .map_err(|e| DocumentStoreError::InvalidDocument(format!("binary id is not a UUID: {e}"))),
            Bson::String(text) => text.parse(),
            other => Err(DocumentStoreError::InvalidDocument(
                format!("{other} is not an ObjectId or UUID"),
            )),
        }
    }
}

impl FromStr for DocumentId {
    type Err = DocumentStoreError;

    /// Reads a 24-digit hex ObjectId or a hyphenated UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(oid) = ObjectId::parse_str(s) {
            return Ok(oid.into());
        }

        Uuid::parse_str(s)
            .map(Into::into)
            .map_err(|_| DocumentStoreError::InvalidDocument(format!("{s:?} is not an ObjectId or UUID")))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::ObjectId(oid) => write!(f, "{}", oid.to_hex()),
            DocumentId::Uuid(uuid) => write!(f, "{uuid}"),
        }
    }
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Bson::from(*self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        DocumentId::try_from(Bson::deserialize(deserializer)?).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{de::deserialize_from_bson, doc, ser::serialize_to_bson};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Owned {
        #[serde(rename = "_id")]
        id: DocumentId,
    }

    #[test]
    fn test_object_id_stays_object_id() {
        let oid = ObjectId::new();
        let bson = serialize_to_bson(&Owned { id: oid.into() }).unwrap();

        assert_eq!(bson.as_document().unwrap().get_object_id(ID_FIELD).unwrap(), oid);
        assert_eq!(deserialize_from_bson::<Owned>(bson).unwrap().id, DocumentId::ObjectId(oid));
    }

    #[test]
    fn test_uuid_reads_back_from_binary() {
        let uuid = Uuid::new();
        let bson = serialize_to_bson(&Owned { id: uuid.into() }).unwrap();

        assert!(matches!(bson.as_document().unwrap().get(ID_FIELD), Some(Bson::Binary(_))));
        assert_eq!(deserialize_from_bson::<Owned>(bson).unwrap().id, DocumentId::Uuid(uuid));
    }

    #[test]
    fn test_parse_either_form() {
        let oid: DocumentId = "65a1f0c2e4b0a1b2c3d4e5f6".parse().unwrap();
        assert!(matches!(oid, DocumentId::ObjectId(_)));
        assert_eq!(oid.to_string(), "65a1f0c2e4b0a1b2c3d4e5f6");

        let uuid: DocumentId = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();
        assert!(matches!(uuid, DocumentId::Uuid(_)));
        assert_eq!(uuid.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");

        assert!("nobody".parse::<DocumentId>().is_err());
    }

    #[test]
    fn test_other_bson_types_are_rejected() {
        let result = deserialize_from_bson::<Owned>(Bson::Document(doc! { "_id": 42 }));
        assert!(result.is_err());
    }
}

//! Core traits for document representation and serialization.
//!
//! Backends only ever see BSON. The [`Document`] trait ties a Rust type to a
//! collection and an identifier, and [`DocumentExt`] converts it to and from the
//! stored representation.

use bson::{Bson, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Deserialize, Serialize};

use crate::{error::DocumentStoreResult, id::DocumentId};

/// Core trait that all documents stored in a document store must implement.
///
/// # Example
///
/// ```ignore
/// use ticketdesk_core::{document::Document, id::DocumentId};
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Venue {
///     #[serde(rename = "_id")]
///     pub id: DocumentId,
///     pub name: String,
/// }
///
/// impl Document for Venue {
///     fn id(&self) -> &DocumentId {
///         &self.id
///     }
///
///     fn collection_name() -> &'static str {
///         "venues"
///     }
/// }
/// ```
pub trait Document: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns a reference to this document's unique identifier.
    ///
    /// Implementors serialize it as `_id` so reads see the identity the store keeps.
    fn id(&self) -> &DocumentId;

    /// Returns the name of the collection this document belongs to.
    fn collection_name() -> &'static str;
}

/// Serialization helpers implemented for every [`Document`].
pub trait DocumentExt: Document {
    /// Converts this document to a BSON value for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_bson(&self) -> DocumentStoreResult<Bson>;

    /// Creates a document from a stored BSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not have the document's shape.
    fn from_bson(bson: Bson) -> DocumentStoreResult<Self>;
}

impl<D: Document> DocumentExt for D {
    fn to_bson(&self) -> DocumentStoreResult<Bson> {
        Ok(serialize_to_bson(self)?)
    }

    fn from_bson(bson: Bson) -> DocumentStoreResult<Self> {
        Ok(deserialize_from_bson(bson)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Venue {
        #[serde(rename = "_id")]
        id: DocumentId,
        name: String,
        seats: i64,
    }

    impl Document for Venue {
        fn id(&self) -> &DocumentId {
            &self.id
        }

        fn collection_name() -> &'static str {
            "venues"
        }
    }

    #[test]
    fn test_to_bson_produces_document() {
        let venue = Venue { id: DocumentId::new(), name: "Hall".to_string(), seats: 300 };
        let bson = venue.to_bson().unwrap();

        let doc = bson.as_document().unwrap();
        assert_eq!(doc.get_str("name").unwrap(), "Hall");
        assert_eq!(doc.get_i64("seats").unwrap(), 300);
        assert_eq!(Bson::from(venue.id), doc.get("_id").cloned().unwrap());
        assert_eq!(Venue::from_bson(bson).unwrap(), venue);
    }

    #[test]
    fn test_from_bson_rejects_wrong_shape() {
        let result = Venue::from_bson(Bson::String("not a venue".to_string()));
        assert!(result.is_err());
    }
}

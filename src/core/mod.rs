//! Core XML text primitives
//!
//! Building blocks shared by the path grammar and the serializer:
//! - Entities: escaping of text and attribute values, CDATA sections
//! - Names: the identifier grammar for element and attribute names

pub mod entities;
pub mod names;

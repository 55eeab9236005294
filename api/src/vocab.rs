//! IRI constants for the vocabularies the Turtle pipeline has to know about.

/// The `rdf:` vocabulary.
pub mod rdf {
    /// Namespace of the vocabulary.
    pub const NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// `rdf:type`, the predicate behind the Turtle `a` keyword.
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    /// `rdf:langString`, the datatype of all language-tagged literals.
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

/// The `rdfs:` vocabulary.
pub mod rdfs {
    /// Namespace of the vocabulary.
    pub const NAMESPACE: &str = "http://www.w3.org/2000/01/rdf-schema#";
    /// `rdfs:label`.
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
    /// `rdfs:comment`.
    pub const COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";
}

/// The `xsd:` datatypes.
pub mod xsd {
    /// Namespace of the vocabulary.
    pub const NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";
    /// `xsd:string`, the implicit datatype of plain literals.
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
}

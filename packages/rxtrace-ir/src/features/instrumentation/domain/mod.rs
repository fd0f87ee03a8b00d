//! Instrumentation domain models

mod construct;
mod dependency;
mod diagnostic;
mod metadata;

pub use construct::{
    ConstructKind, OperatorPosition, WRAP_CREATION_OPERATOR, WRAP_JOIN_CREATION_OPERATOR,
    WRAP_OBSERVABLE_SUBJECT_CONSTRUCTOR, WRAP_PIPE, WRAP_PIPEABLE_OPERATOR,
    WRAP_PROPERTY_DECLARATION, WRAP_SUBSCRIBE,
};
pub use dependency::Dependency;
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use metadata::{
    BaseObservable, ConstructMetadata, CreationOperatorMetadata, JoinCreationOperatorMetadata,
    MetadataHeader, ObservableSubjectConstructorMetadata, PipeMetadata, PipeableOperatorMetadata,
    PropertyDeclarationMetadata, SubscribeMetadata,
};

/// A construct rewritten in a file, with the metadata embedded for it
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct InstrumentedConstruct {
    pub kind: ConstructKind,
    pub metadata: ConstructMetadata,
}
